use anyhow::Result;
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Shared handle to the CSV data directory.
///
/// Holds the base directory plus the status write lock that makes the
/// read-check-append cycle in the status repository atomic within the
/// process. Cloning is cheap; clones share the lock.
#[derive(Clone)]
pub struct CsvConnection {
    base_directory: PathBuf,
    status_write_lock: Arc<Mutex<()>>,
}

impl CsvConnection {
    /// Create a new connection rooted at the given data directory
    pub fn new<P: AsRef<Path>>(base_directory: P) -> Result<Self> {
        let base_directory = base_directory.as_ref().to_path_buf();
        fs::create_dir_all(&base_directory)?;
        debug!("CSV storage rooted at {:?}", base_directory);
        Ok(Self {
            base_directory,
            status_write_lock: Arc::new(Mutex::new(())),
        })
    }

    pub fn base_directory(&self) -> &Path {
        &self.base_directory
    }

    pub fn assignments_file_path(&self) -> PathBuf {
        self.base_directory.join("assignments.csv")
    }

    pub fn couples_file_path(&self) -> PathBuf {
        self.base_directory.join("couples.csv")
    }

    pub fn coaches_file_path(&self) -> PathBuf {
        self.base_directory.join("coaches.csv")
    }

    /// Directory holding one status file per assignment
    pub fn statuses_directory(&self) -> PathBuf {
        self.base_directory.join("statuses")
    }

    /// Path of the status file for one assignment.
    /// "assignment::1700000000000" -> "statuses/assignment-1700000000000.csv"
    pub fn status_file_path(&self, assignment_id: &str) -> PathBuf {
        let stem: String = assignment_id
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
            .collect();
        let stem = stem.trim_matches('-').replace("--", "-");
        self.statuses_directory().join(format!("{}.csv", stem))
    }

    pub fn ensure_statuses_directory(&self) -> Result<()> {
        fs::create_dir_all(self.statuses_directory())?;
        Ok(())
    }

    /// Run `f` while holding the status write lock
    pub fn with_status_lock<T>(&self, f: impl FnOnce() -> Result<T>) -> Result<T> {
        let _guard = self
            .status_write_lock
            .lock()
            .map_err(|_| anyhow::anyhow!("Status write lock poisoned"))?;
        f()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_creates_base_directory() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("data").join("ministry");
        let conn = CsvConnection::new(&nested).unwrap();
        assert!(nested.exists());
        assert_eq!(conn.base_directory(), nested.as_path());
    }

    #[test]
    fn test_status_file_path_is_sanitized() {
        let temp_dir = TempDir::new().unwrap();
        let conn = CsvConnection::new(temp_dir.path()).unwrap();
        let path = conn.status_file_path("assignment::1700000000000");
        assert_eq!(
            path.file_name().unwrap().to_str().unwrap(),
            "assignment-1700000000000.csv"
        );
    }
}
