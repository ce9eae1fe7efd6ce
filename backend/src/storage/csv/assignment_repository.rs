use anyhow::{anyhow, Result};
use csv::{Reader, Writer};
use log::info;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};

use super::connection::CsvConnection;
use crate::domain::models::assignment::Assignment;
use crate::storage::traits::AssignmentStorage;

const HEADER: [&str; 8] = [
    "id",
    "title",
    "description",
    "content",
    "week_number",
    "due_date",
    "created_at",
    "updated_at",
];

/// CSV-based assignment repository
///
/// All assignments live in a single `assignments.csv` file; reads load the
/// whole file and writes replace it atomically via a temp file.
#[derive(Clone)]
pub struct AssignmentRepository {
    connection: CsvConnection,
}

impl AssignmentRepository {
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    fn read_assignments(&self) -> Result<Vec<Assignment>> {
        let file_path = self.connection.assignments_file_path();
        if !file_path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&file_path)?;
        let mut csv_reader = Reader::from_reader(BufReader::new(file));

        let mut assignments = Vec::new();
        for result in csv_reader.records() {
            let record = result?;
            let get = |i: usize| record.get(i).unwrap_or("").to_string();

            let description = get(2);
            let due_date = get(5);
            assignments.push(Assignment {
                id: get(0),
                title: get(1),
                description: if description.is_empty() { None } else { Some(description) },
                content: get(3),
                week_number: get(4)
                    .parse::<u32>()
                    .map_err(|e| anyhow!("Failed to parse week_number '{}': {}", get(4), e))?,
                due_date: if due_date.is_empty() {
                    None
                } else {
                    Some(
                        chrono::NaiveDate::parse_from_str(&due_date, "%Y-%m-%d")
                            .map_err(|e| anyhow!("Failed to parse due_date: {}", e))?,
                    )
                },
                created_at: parse_timestamp(&get(6))?,
                updated_at: parse_timestamp(&get(7))?,
            });
        }

        Ok(assignments)
    }

    fn write_assignments(&self, assignments: &[Assignment]) -> Result<()> {
        let file_path = self.connection.assignments_file_path();
        let temp_path = file_path.with_extension("tmp");

        let file = File::create(&temp_path)?;
        let mut csv_writer = Writer::from_writer(BufWriter::new(file));

        csv_writer.write_record(HEADER)?;
        for assignment in assignments {
            csv_writer.write_record(&[
                assignment.id.as_str(),
                assignment.title.as_str(),
                assignment.description.as_deref().unwrap_or(""),
                assignment.content.as_str(),
                &assignment.week_number.to_string(),
                &assignment
                    .due_date
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_default(),
                &assignment.created_at.to_rfc3339(),
                &assignment.updated_at.to_rfc3339(),
            ])?;
        }
        csv_writer.flush()?;
        drop(csv_writer);

        fs::rename(&temp_path, &file_path)?;
        Ok(())
    }
}

/// Parse an RFC 3339 timestamp back into UTC
pub(super) fn parse_timestamp(s: &str) -> Result<chrono::DateTime<chrono::Utc>> {
    chrono::DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&chrono::Utc))
        .map_err(|e| anyhow!("Failed to parse timestamp '{}': {}", s, e))
}

impl AssignmentStorage for AssignmentRepository {
    fn store_assignment(&self, assignment: &Assignment) -> Result<()> {
        let mut assignments = self.read_assignments()?;
        assignments.push(assignment.clone());
        self.write_assignments(&assignments)?;
        info!("Stored assignment {} ({})", assignment.title, assignment.id);
        Ok(())
    }

    fn get_assignment(&self, assignment_id: &str) -> Result<Option<Assignment>> {
        let assignments = self.read_assignments()?;
        Ok(assignments.into_iter().find(|a| a.id == assignment_id))
    }

    fn list_assignments(&self) -> Result<Vec<Assignment>> {
        let mut assignments = self.read_assignments()?;
        assignments.sort_by(|a, b| {
            a.week_number
                .cmp(&b.week_number)
                .then_with(|| a.title.cmp(&b.title))
        });
        Ok(assignments)
    }

    fn update_assignment(&self, assignment: &Assignment) -> Result<()> {
        let mut assignments = self.read_assignments()?;
        let slot = assignments
            .iter_mut()
            .find(|a| a.id == assignment.id)
            .ok_or_else(|| anyhow!("Assignment not found for update: {}", assignment.id))?;
        *slot = assignment.clone();
        self.write_assignments(&assignments)
    }

    fn delete_assignment(&self, assignment_id: &str) -> Result<bool> {
        let mut assignments = self.read_assignments()?;
        let before = assignments.len();
        assignments.retain(|a| a.id != assignment_id);
        if assignments.len() == before {
            return Ok(false);
        }
        self.write_assignments(&assignments)?;
        info!("Deleted assignment {}", assignment_id);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn setup_test_repo() -> (AssignmentRepository, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let connection = CsvConnection::new(temp_dir.path()).unwrap();
        (AssignmentRepository::new(connection), temp_dir)
    }

    fn sample_assignment(id: &str, title: &str) -> Assignment {
        let now = chrono::Utc::now();
        Assignment {
            id: id.to_string(),
            title: title.to_string(),
            description: Some("Talk it through together".to_string()),
            content: "Read chapter 3,\nthen discuss the questions.".to_string(),
            week_number: 3,
            due_date: NaiveDate::from_ymd_opt(2026, 9, 1),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_store_and_get_assignment() {
        let (repo, _temp_dir) = setup_test_repo();
        let assignment = sample_assignment("assignment::1", "Week 3 Homework");
        repo.store_assignment(&assignment).unwrap();

        let loaded = repo.get_assignment("assignment::1").unwrap().unwrap();
        assert_eq!(loaded.title, "Week 3 Homework");
        assert_eq!(loaded.week_number, 3);
        assert_eq!(loaded.due_date, NaiveDate::from_ymd_opt(2026, 9, 1));
        // Content with embedded commas and newlines survives the CSV round trip
        assert_eq!(loaded.content, assignment.content);
    }

    #[test]
    fn test_list_orders_by_week_then_title() {
        let (repo, _temp_dir) = setup_test_repo();
        let mut a = sample_assignment("assignment::1", "Zebra");
        a.week_number = 2;
        let mut b = sample_assignment("assignment::2", "Apple");
        b.week_number = 2;
        let mut c = sample_assignment("assignment::3", "First");
        c.week_number = 1;
        repo.store_assignment(&a).unwrap();
        repo.store_assignment(&b).unwrap();
        repo.store_assignment(&c).unwrap();

        let listed = repo.list_assignments().unwrap();
        let titles: Vec<&str> = listed.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, vec!["First", "Apple", "Zebra"]);
    }

    #[test]
    fn test_corrupt_week_number_is_an_error() {
        let (repo, temp_dir) = setup_test_repo();
        std::fs::write(
            temp_dir.path().join("assignments.csv"),
            "id,title,description,content,week_number,due_date,created_at,updated_at\n\
             assignment::1,Week 3,,Body,three,,2026-01-01T00:00:00+00:00,2026-01-01T00:00:00+00:00\n",
        )
        .unwrap();

        assert!(repo.list_assignments().is_err());
    }

    #[test]
    fn test_update_and_delete() {
        let (repo, _temp_dir) = setup_test_repo();
        let mut assignment = sample_assignment("assignment::1", "Original");
        repo.store_assignment(&assignment).unwrap();

        assignment.title = "Edited".to_string();
        assignment.due_date = None;
        repo.update_assignment(&assignment).unwrap();
        let loaded = repo.get_assignment("assignment::1").unwrap().unwrap();
        assert_eq!(loaded.title, "Edited");
        assert!(loaded.due_date.is_none());

        assert!(repo.delete_assignment("assignment::1").unwrap());
        assert!(!repo.delete_assignment("assignment::1").unwrap());
        assert!(repo.get_assignment("assignment::1").unwrap().is_none());
    }
}
