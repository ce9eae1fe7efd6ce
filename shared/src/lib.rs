use serde::{Deserialize, Serialize};

/// Assignment as exposed over the API.
///
/// ID format: "assignment::<epoch_millis>"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentDto {
    pub id: String,
    /// Short title shown in lists (max 200 characters)
    pub title: String,
    /// Optional longer description for the detail view
    pub description: Option<String>,
    /// The homework content body
    pub content: String,
    /// Program week this assignment belongs to (1-52)
    pub week_number: u32,
    /// Optional due date (YYYY-MM-DD)
    pub due_date: Option<String>,
    /// Creation timestamp (RFC 3339)
    pub created_at: String,
    /// Last update timestamp (RFC 3339)
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateAssignmentRequest {
    pub title: String,
    pub description: Option<String>,
    pub content: String,
    pub week_number: u32,
    /// Optional due date (YYYY-MM-DD)
    pub due_date: Option<String>,
}

/// All fields optional; only provided fields are updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateAssignmentRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    pub week_number: Option<u32>,
    pub due_date: Option<String>,
}

/// Couple as exposed over the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoupleDto {
    pub id: String,
    pub partner_one_name: String,
    pub partner_two_name: String,
    pub email: String,
    pub phone: Option<String>,
    /// Coach this couple is assigned to, if any
    pub coach_id: Option<String>,
    /// Lifecycle status: "active", "inactive" or "completed"
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateCoupleRequest {
    pub partner_one_name: String,
    pub partner_two_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub coach_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateCoupleRequest {
    pub partner_one_name: Option<String>,
    pub partner_two_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub coach_id: Option<String>,
    /// Lifecycle status: "active", "inactive" or "completed"
    pub status: Option<String>,
}

/// Coach as exposed over the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoachDto {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    /// Lifecycle status: "active" or "inactive"
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateCoachRequest {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateCoachRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    /// Lifecycle status: "active" or "inactive"
    pub status: Option<String>,
}

/// Minimal coach entry for UI dropdowns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoachOption {
    pub id: String,
    pub name: String,
}

/// Target selection for a distribution request.
///
/// `mode` is one of "all", "coach" or "specific". `coach_id` is required for
/// "coach" mode, `couple_ids` for "specific" mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributeRequest {
    pub mode: String,
    pub coach_id: Option<String>,
    pub couple_ids: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributeResponse {
    /// Number of status records actually created; 0 when every resolved
    /// couple already had one
    pub created_count: u32,
}

/// Distribution status row for the progress dashboards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionStatusDto {
    pub id: String,
    pub assignment_id: String,
    pub couple_id: String,
    /// "pending", "sent", "completed" or "overdue"
    pub state: String,
    pub sent_at: Option<String>,
    pub completed_at: Option<String>,
}

/// A couple submitting homework for a distributed assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitHomeworkRequest {
    pub couple_id: String,
    /// Free-form response text (max 4000 characters)
    pub response: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverdueSweepResponse {
    /// Number of statuses transitioned to overdue
    pub marked_overdue: u32,
}
