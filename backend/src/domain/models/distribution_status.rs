use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of a distributed assignment for one couple.
///
/// Created in `Sent` by the distribution writer. Moves to `Completed` when
/// the couple submits homework, or to `Overdue` when the assignment's due
/// date passes first. `Pending` covers statuses whose notification delivery
/// is still queued by the external delivery subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DistributionState {
    Pending,
    Sent,
    Completed,
    Overdue,
}

impl DistributionState {
    /// Convert to string for CSV storage
    pub fn as_str(&self) -> &'static str {
        match self {
            DistributionState::Pending => "pending",
            DistributionState::Sent => "sent",
            DistributionState::Completed => "completed",
            DistributionState::Overdue => "overdue",
        }
    }

    /// Parse from string for CSV loading
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(DistributionState::Pending),
            "sent" => Ok(DistributionState::Sent),
            "completed" => Ok(DistributionState::Completed),
            "overdue" => Ok(DistributionState::Overdue),
            _ => Err(format!("Invalid distribution state: {}", s)),
        }
    }

    /// States that can still transition to `Completed` or `Overdue`
    pub fn is_open(&self) -> bool {
        matches!(self, DistributionState::Pending | DistributionState::Sent)
    }
}

/// One couple's copy of one assignment.
///
/// At most one record exists per (assignment, couple) pair; the storage
/// layer enforces this on insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionStatus {
    pub id: String,
    pub assignment_id: String,
    pub couple_id: String,
    pub state: DistributionState,
    pub sent_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DistributionStatus {
    /// Generate a deterministic ID from the (assignment, couple) pair.
    ///
    /// The pair is the natural key, so the ID is derived from it rather than
    /// from a timestamp.
    pub fn generate_id(assignment_id: &str, couple_id: &str) -> String {
        let assignment_part = assignment_id
            .strip_prefix("assignment::")
            .unwrap_or(assignment_id);
        let couple_part = couple_id.strip_prefix("couple::").unwrap_or(couple_id);
        format!("status::{}::{}", assignment_part, couple_part)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_round_trip() {
        for state in [
            DistributionState::Pending,
            DistributionState::Sent,
            DistributionState::Completed,
            DistributionState::Overdue,
        ] {
            assert_eq!(DistributionState::from_str(state.as_str()).unwrap(), state);
        }
        assert!(DistributionState::from_str("shipped").is_err());
    }

    #[test]
    fn test_open_states() {
        assert!(DistributionState::Pending.is_open());
        assert!(DistributionState::Sent.is_open());
        assert!(!DistributionState::Completed.is_open());
        assert!(!DistributionState::Overdue.is_open());
    }

    #[test]
    fn test_generate_id_strips_prefixes() {
        assert_eq!(
            DistributionStatus::generate_id("assignment::100", "couple::200"),
            "status::100::200"
        );
        assert_eq!(
            DistributionStatus::generate_id("a1", "c1"),
            "status::a1::c1"
        );
    }
}
