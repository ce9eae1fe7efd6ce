//! Domain-level command and query types
//!
//! These structs are used by services inside the domain layer and are **not**
//! exposed over the public API. The REST layer maps the public DTOs defined
//! in the `shared` crate to these internal types.

pub mod assignments {
    use crate::domain::models::assignment::Assignment;

    /// Input for creating a new assignment.
    #[derive(Debug, Clone)]
    pub struct CreateAssignmentCommand {
        pub title: String,
        pub description: Option<String>,
        pub content: String,
        pub week_number: u32,
        /// Optional due date as YYYY-MM-DD
        pub due_date: Option<String>,
    }

    /// Input for updating an assignment; only provided fields change.
    #[derive(Debug, Clone, Default)]
    pub struct UpdateAssignmentCommand {
        pub assignment_id: String,
        pub title: Option<String>,
        pub description: Option<String>,
        pub content: Option<String>,
        pub week_number: Option<u32>,
        pub due_date: Option<String>,
    }

    #[derive(Debug, Clone)]
    pub struct CreateAssignmentResult {
        pub assignment: Assignment,
    }

    #[derive(Debug, Clone)]
    pub struct UpdateAssignmentResult {
        pub assignment: Assignment,
    }

    #[derive(Debug, Clone)]
    pub struct DeleteAssignmentResult {
        /// Statuses removed by the cascade
        pub cascaded_statuses: u32,
    }
}

pub mod couples {
    use crate::domain::models::couple::Couple;

    /// Input for enrolling a new couple.
    #[derive(Debug, Clone)]
    pub struct CreateCoupleCommand {
        pub partner_one_name: String,
        pub partner_two_name: String,
        pub email: String,
        pub phone: Option<String>,
        pub coach_id: Option<String>,
    }

    /// Input for updating a couple; only provided fields change.
    #[derive(Debug, Clone, Default)]
    pub struct UpdateCoupleCommand {
        pub couple_id: String,
        pub partner_one_name: Option<String>,
        pub partner_two_name: Option<String>,
        pub email: Option<String>,
        pub phone: Option<String>,
        pub coach_id: Option<String>,
        /// Lifecycle status string ("active", "inactive", "completed")
        pub status: Option<String>,
    }

    #[derive(Debug, Clone)]
    pub struct CreateCoupleResult {
        pub couple: Couple,
    }

    #[derive(Debug, Clone)]
    pub struct UpdateCoupleResult {
        pub couple: Couple,
    }

    #[derive(Debug, Clone)]
    pub struct DeleteCoupleResult {
        /// Statuses removed by the cascade
        pub cascaded_statuses: u32,
    }
}

pub mod coaches {
    use crate::domain::models::coach::Coach;

    /// Input for adding a new coach.
    #[derive(Debug, Clone)]
    pub struct CreateCoachCommand {
        pub name: String,
        pub email: String,
        pub phone: Option<String>,
    }

    /// Input for updating a coach; only provided fields change.
    #[derive(Debug, Clone, Default)]
    pub struct UpdateCoachCommand {
        pub coach_id: String,
        pub name: Option<String>,
        pub email: Option<String>,
        pub phone: Option<String>,
        /// Lifecycle status string ("active", "inactive")
        pub status: Option<String>,
    }

    #[derive(Debug, Clone)]
    pub struct CreateCoachResult {
        pub coach: Coach,
    }

    #[derive(Debug, Clone)]
    pub struct UpdateCoachResult {
        pub coach: Coach,
    }

    /// Minimal entry for the coach picklist
    #[derive(Debug, Clone, PartialEq)]
    pub struct CoachOption {
        pub id: String,
        pub name: String,
    }
}

pub mod distribution {
    use crate::domain::models::distribution_status::DistributionStatus;

    /// Which couples a distribution should reach.
    #[derive(Debug, Clone, PartialEq)]
    pub enum DistributionTarget {
        /// Every couple with active status
        All,
        /// Every active couple assigned to this coach
        Coach { coach_id: String },
        /// An explicit list of couple ids; duplicates collapse
        Specific { couple_ids: Vec<String> },
    }

    #[derive(Debug, Clone)]
    pub struct DistributeAssignmentCommand {
        pub assignment_id: String,
        pub target: DistributionTarget,
    }

    #[derive(Debug, Clone)]
    pub struct DistributeAssignmentResult {
        /// Number of status records actually created; may be zero
        pub created_count: u32,
    }

    /// A couple submitting homework for a distributed assignment.
    #[derive(Debug, Clone)]
    pub struct SubmitHomeworkCommand {
        pub assignment_id: String,
        pub couple_id: String,
        pub response: String,
    }

    #[derive(Debug, Clone)]
    pub struct SubmitHomeworkResult {
        pub status: DistributionStatus,
    }

    #[derive(Debug, Clone)]
    pub struct OverdueSweepResult {
        pub marked_overdue: u32,
    }
}
