//! Environment-driven server configuration.

use std::net::SocketAddr;
use std::path::PathBuf;

const DEFAULT_DATA_DIR: &str = "./data";
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

/// Runtime settings, read once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Directory holding the CSV data files
    pub data_directory: PathBuf,
    /// Address the HTTP server binds to
    pub bind_address: SocketAddr,
}

impl AppConfig {
    /// Load configuration from `MINISTRY_DATA_DIR` and `MINISTRY_BIND_ADDR`,
    /// falling back to defaults when unset.
    pub fn from_env() -> anyhow::Result<Self> {
        let data_directory = std::env::var("MINISTRY_DATA_DIR")
            .unwrap_or_else(|_| DEFAULT_DATA_DIR.to_string())
            .into();

        let bind_address = std::env::var("MINISTRY_BIND_ADDR")
            .unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string())
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid MINISTRY_BIND_ADDR: {}", e))?;

        Ok(Self {
            data_directory,
            bind_address,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig {
            data_directory: DEFAULT_DATA_DIR.into(),
            bind_address: DEFAULT_BIND_ADDR.parse().unwrap(),
        };
        assert_eq!(config.data_directory, PathBuf::from("./data"));
        assert_eq!(config.bind_address.port(), 3000);
    }
}
