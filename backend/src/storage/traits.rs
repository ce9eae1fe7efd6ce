//! # Storage Traits
//!
//! Storage abstraction traits that let the domain layer work against
//! different backends (the bundled CSV files, a hosted table store, ...)
//! without modification.

use anyhow::Result;

use crate::domain::models::assignment::Assignment;
use crate::domain::models::coach::Coach;
use crate::domain::models::couple::Couple;
use crate::domain::models::distribution_status::DistributionStatus;

/// Interface for assignment storage operations
pub trait AssignmentStorage: Send + Sync {
    /// Store a new assignment
    fn store_assignment(&self, assignment: &Assignment) -> Result<()>;

    /// Retrieve a specific assignment by ID
    fn get_assignment(&self, assignment_id: &str) -> Result<Option<Assignment>>;

    /// List all assignments ordered by week number, then title
    fn list_assignments(&self) -> Result<Vec<Assignment>>;

    /// Update an existing assignment
    fn update_assignment(&self, assignment: &Assignment) -> Result<()>;

    /// Delete an assignment by ID
    /// Returns true if the assignment was found and deleted
    fn delete_assignment(&self, assignment_id: &str) -> Result<bool>;
}

/// Interface for couple storage operations
pub trait CoupleStorage: Send + Sync {
    /// Store a new couple
    fn store_couple(&self, couple: &Couple) -> Result<()>;

    /// Retrieve a specific couple by ID
    fn get_couple(&self, couple_id: &str) -> Result<Option<Couple>>;

    /// List all couples ordered by partner names
    fn list_couples(&self) -> Result<Vec<Couple>>;

    /// Update an existing couple
    fn update_couple(&self, couple: &Couple) -> Result<()>;

    /// Delete a couple by ID
    /// Returns true if the couple was found and deleted
    fn delete_couple(&self, couple_id: &str) -> Result<bool>;
}

/// Interface for coach storage operations
pub trait CoachStorage: Send + Sync {
    /// Store a new coach
    fn store_coach(&self, coach: &Coach) -> Result<()>;

    /// Retrieve a specific coach by ID
    fn get_coach(&self, coach_id: &str) -> Result<Option<Coach>>;

    /// List all coaches ordered by name
    fn list_coaches(&self) -> Result<Vec<Coach>>;

    /// Update an existing coach
    fn update_coach(&self, coach: &Coach) -> Result<()>;

    /// Delete a coach by ID
    /// Returns true if the coach was found and deleted
    fn delete_coach(&self, coach_id: &str) -> Result<bool>;
}

/// Interface for distribution status storage operations
///
/// The implementation owns the (assignment, couple) uniqueness guarantee:
/// `insert_statuses` must skip pairs that already have a record rather than
/// create a duplicate, and report how many records it actually wrote.
pub trait DistributionStatusStorage: Send + Sync {
    /// Insert a batch of status records, skipping any whose
    /// (assignment, couple) pair already exists.
    /// Returns the number of records actually inserted.
    fn insert_statuses(&self, statuses: &[DistributionStatus]) -> Result<u32>;

    /// Retrieve the status for one (assignment, couple) pair
    fn get_status(&self, assignment_id: &str, couple_id: &str)
        -> Result<Option<DistributionStatus>>;

    /// List all statuses for an assignment
    fn list_for_assignment(&self, assignment_id: &str) -> Result<Vec<DistributionStatus>>;

    /// List all statuses for a couple across assignments
    fn list_for_couple(&self, couple_id: &str) -> Result<Vec<DistributionStatus>>;

    /// Update an existing status record
    fn update_status(&self, status: &DistributionStatus) -> Result<()>;

    /// Delete all statuses for an assignment (cascade on assignment delete)
    /// Returns the number of records deleted
    fn delete_for_assignment(&self, assignment_id: &str) -> Result<u32>;

    /// Delete all statuses for a couple (cascade on couple delete)
    /// Returns the number of records deleted
    fn delete_for_couple(&self, couple_id: &str) -> Result<u32>;
}
