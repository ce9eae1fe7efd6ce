use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Domain model for a weekly homework assignment.
///
/// Immutable once distributed, except through an explicit edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub content: String,
    pub week_number: u32,
    pub due_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Assignment {
    /// Generate a unique ID for an assignment
    pub fn generate_id(timestamp_millis: u64) -> String {
        format!("assignment::{}", timestamp_millis)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AssignmentValidationError {
    #[error("Title cannot be empty")]
    EmptyTitle,
    #[error("Title cannot exceed 200 characters")]
    TitleTooLong,
    #[error("Content cannot be empty")]
    EmptyContent,
    #[error("Week number must be between 1 and 52")]
    WeekNumberOutOfRange,
    #[error("Invalid due date format. Use YYYY-MM-DD.")]
    InvalidDueDate,
}
