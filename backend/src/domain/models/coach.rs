use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoachStatus {
    Active,
    Inactive,
}

impl CoachStatus {
    /// Convert to string for CSV storage
    pub fn as_str(&self) -> &'static str {
        match self {
            CoachStatus::Active => "active",
            CoachStatus::Inactive => "inactive",
        }
    }

    /// Parse from string for CSV loading
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "active" => Ok(CoachStatus::Active),
            "inactive" => Ok(CoachStatus::Inactive),
            _ => Err(format!("Invalid coach status: {}", s)),
        }
    }
}

/// Domain model for a mentor coach.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coach {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub status: CoachStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Coach {
    /// Generate a unique ID for a coach
    pub fn generate_id(timestamp_millis: u64) -> String {
        format!("coach::{}", timestamp_millis)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CoachValidationError {
    #[error("Coach name cannot be empty")]
    EmptyName,
    #[error("Coach name cannot exceed 100 characters")]
    NameTooLong,
    #[error("Invalid email address")]
    InvalidEmail,
    #[error("Invalid coach status: {0}")]
    InvalidStatus(String),
}
