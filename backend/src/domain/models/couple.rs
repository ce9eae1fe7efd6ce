use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a couple in the program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoupleStatus {
    Active,
    Inactive,
    Completed,
}

impl CoupleStatus {
    /// Convert to string for CSV storage
    pub fn as_str(&self) -> &'static str {
        match self {
            CoupleStatus::Active => "active",
            CoupleStatus::Inactive => "inactive",
            CoupleStatus::Completed => "completed",
        }
    }

    /// Parse from string for CSV loading
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "active" => Ok(CoupleStatus::Active),
            "inactive" => Ok(CoupleStatus::Inactive),
            "completed" => Ok(CoupleStatus::Completed),
            _ => Err(format!("Invalid couple status: {}", s)),
        }
    }
}

/// Domain model for a participant couple.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Couple {
    pub id: String,
    pub partner_one_name: String,
    pub partner_two_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub coach_id: Option<String>,
    pub status: CoupleStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Couple {
    /// Generate a unique ID for a couple
    pub fn generate_id(timestamp_millis: u64) -> String {
        format!("couple::{}", timestamp_millis)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CoupleValidationError {
    #[error("Partner name cannot be empty")]
    EmptyPartnerName,
    #[error("Partner name cannot exceed 100 characters")]
    PartnerNameTooLong,
    #[error("Invalid email address")]
    InvalidEmail,
    #[error("Invalid couple status: {0}")]
    InvalidStatus(String),
}
