use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use log::{info, warn};

use crate::domain::commands::assignments::{
    CreateAssignmentCommand, CreateAssignmentResult, DeleteAssignmentResult,
    UpdateAssignmentCommand, UpdateAssignmentResult,
};
use crate::domain::models::assignment::{Assignment, AssignmentValidationError};
use crate::storage::csv::{AssignmentRepository, CsvConnection, DistributionStatusRepository};
use crate::storage::traits::{AssignmentStorage, DistributionStatusStorage};

/// Service for managing weekly homework assignments
#[derive(Clone)]
pub struct AssignmentService {
    assignment_repository: AssignmentRepository,
    status_repository: DistributionStatusRepository,
}

impl AssignmentService {
    pub fn new(connection: CsvConnection) -> Self {
        Self {
            assignment_repository: AssignmentRepository::new(connection.clone()),
            status_repository: DistributionStatusRepository::new(connection),
        }
    }

    /// Create a new assignment
    pub fn create_assignment(
        &self,
        command: CreateAssignmentCommand,
    ) -> Result<CreateAssignmentResult> {
        info!(
            "Creating assignment: title={}, week={}",
            command.title, command.week_number
        );

        validate_title(&command.title)?;
        validate_content(&command.content)?;
        validate_week_number(command.week_number)?;
        let due_date = parse_due_date(command.due_date.as_deref())?;

        let now = Utc::now();
        let assignment = Assignment {
            id: Assignment::generate_id(crate::domain::next_id_millis()),
            title: command.title.trim().to_string(),
            description: command
                .description
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
            content: command.content,
            week_number: command.week_number,
            due_date,
            created_at: now,
            updated_at: now,
        };

        self.assignment_repository.store_assignment(&assignment)?;
        info!("Created assignment {} ({})", assignment.title, assignment.id);

        Ok(CreateAssignmentResult { assignment })
    }

    /// Get an assignment by ID
    pub fn get_assignment(&self, assignment_id: &str) -> Result<Option<Assignment>> {
        self.assignment_repository.get_assignment(assignment_id)
    }

    /// List all assignments ordered by week number
    pub fn list_assignments(&self) -> Result<Vec<Assignment>> {
        self.assignment_repository.list_assignments()
    }

    /// Update an existing assignment
    pub fn update_assignment(
        &self,
        command: UpdateAssignmentCommand,
    ) -> Result<UpdateAssignmentResult> {
        info!("Updating assignment: {}", command.assignment_id);

        let mut assignment = self
            .assignment_repository
            .get_assignment(&command.assignment_id)?
            .ok_or_else(|| {
                anyhow::anyhow!("Assignment not found: {}", command.assignment_id)
            })?;

        if let Some(title) = command.title {
            validate_title(&title)?;
            assignment.title = title.trim().to_string();
        }
        if let Some(description) = command.description {
            let trimmed = description.trim().to_string();
            assignment.description = if trimmed.is_empty() { None } else { Some(trimmed) };
        }
        if let Some(content) = command.content {
            validate_content(&content)?;
            assignment.content = content;
        }
        if let Some(week_number) = command.week_number {
            validate_week_number(week_number)?;
            assignment.week_number = week_number;
        }
        if let Some(due_date) = command.due_date {
            // An empty string clears the due date
            assignment.due_date = if due_date.trim().is_empty() {
                None
            } else {
                parse_due_date(Some(&due_date))?
            };
        }

        assignment.updated_at = Utc::now();
        self.assignment_repository.update_assignment(&assignment)?;
        info!("Updated assignment {} ({})", assignment.title, assignment.id);

        Ok(UpdateAssignmentResult { assignment })
    }

    /// Delete an assignment and cascade its distribution statuses
    pub fn delete_assignment(&self, assignment_id: &str) -> Result<DeleteAssignmentResult> {
        info!("Deleting assignment: {}", assignment_id);

        let deleted = self.assignment_repository.delete_assignment(assignment_id)?;
        if !deleted {
            warn!("Attempted to delete a non-existent assignment: {}", assignment_id);
            return Err(anyhow::anyhow!("Assignment not found: {}", assignment_id));
        }

        let cascaded_statuses = self
            .status_repository
            .delete_for_assignment(assignment_id)
            .context("Assignment deleted but status cascade failed")?;

        Ok(DeleteAssignmentResult { cascaded_statuses })
    }
}

fn validate_title(title: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(AssignmentValidationError::EmptyTitle.into());
    }
    if title.len() > 200 {
        return Err(AssignmentValidationError::TitleTooLong.into());
    }
    Ok(())
}

fn validate_content(content: &str) -> Result<()> {
    if content.trim().is_empty() {
        return Err(AssignmentValidationError::EmptyContent.into());
    }
    Ok(())
}

fn validate_week_number(week_number: u32) -> Result<()> {
    if !(1..=52).contains(&week_number) {
        return Err(AssignmentValidationError::WeekNumberOutOfRange.into());
    }
    Ok(())
}

fn parse_due_date(due_date: Option<&str>) -> Result<Option<NaiveDate>> {
    match due_date {
        None => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map(Some)
            .map_err(|_| AssignmentValidationError::InvalidDueDate.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::distribution_status::{DistributionState, DistributionStatus};
    use tempfile::tempdir;

    fn setup_test() -> (AssignmentService, DistributionStatusRepository, tempfile::TempDir) {
        let temp_dir = tempdir().unwrap();
        let conn = CsvConnection::new(temp_dir.path()).unwrap();
        (
            AssignmentService::new(conn.clone()),
            DistributionStatusRepository::new(conn),
            temp_dir,
        )
    }

    fn create_command() -> CreateAssignmentCommand {
        CreateAssignmentCommand {
            title: "  Week 1: Communication  ".to_string(),
            description: Some("Listening exercise".to_string()),
            content: "Set aside 30 minutes and take turns sharing.".to_string(),
            week_number: 1,
            due_date: Some("2026-09-07".to_string()),
        }
    }

    #[test]
    fn test_create_assignment_trims_and_parses() {
        let (service, _status_repo, _temp_dir) = setup_test();
        let result = service.create_assignment(create_command()).unwrap();
        assert_eq!(result.assignment.title, "Week 1: Communication");
        assert_eq!(
            result.assignment.due_date,
            NaiveDate::from_ymd_opt(2026, 9, 7)
        );
    }

    #[test]
    fn test_create_assignment_validation() {
        let (service, _status_repo, _temp_dir) = setup_test();

        let mut cmd = create_command();
        cmd.title = "  ".to_string();
        assert!(service.create_assignment(cmd).is_err());

        let mut cmd = create_command();
        cmd.title = "a".repeat(201);
        assert!(service.create_assignment(cmd).is_err());

        let mut cmd = create_command();
        cmd.week_number = 0;
        assert!(service.create_assignment(cmd).is_err());

        let mut cmd = create_command();
        cmd.week_number = 53;
        assert!(service.create_assignment(cmd).is_err());

        let mut cmd = create_command();
        cmd.due_date = Some("07/09/2026".to_string());
        assert!(service.create_assignment(cmd).is_err());
    }

    #[test]
    fn test_update_assignment_partial_fields() {
        let (service, _status_repo, _temp_dir) = setup_test();
        let created = service.create_assignment(create_command()).unwrap();

        let result = service
            .update_assignment(UpdateAssignmentCommand {
                assignment_id: created.assignment.id.clone(),
                week_number: Some(2),
                due_date: Some("".to_string()),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(result.assignment.week_number, 2);
        assert!(result.assignment.due_date.is_none());
        // Untouched fields survive
        assert_eq!(result.assignment.title, "Week 1: Communication");
    }

    #[test]
    fn test_update_nonexistent_assignment() {
        let (service, _status_repo, _temp_dir) = setup_test();
        let result = service.update_assignment(UpdateAssignmentCommand {
            assignment_id: "assignment::missing".to_string(),
            title: Some("New".to_string()),
            ..Default::default()
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_delete_assignment_cascades_statuses() {
        let (service, status_repo, _temp_dir) = setup_test();
        let created = service.create_assignment(create_command()).unwrap();
        let assignment_id = created.assignment.id;

        let now = Utc::now();
        status_repo
            .insert_statuses(&[DistributionStatus {
                id: DistributionStatus::generate_id(&assignment_id, "couple::1"),
                assignment_id: assignment_id.clone(),
                couple_id: "couple::1".to_string(),
                state: DistributionState::Sent,
                sent_at: Some(now),
                completed_at: None,
                created_at: now,
                updated_at: now,
            }])
            .unwrap();

        let result = service.delete_assignment(&assignment_id).unwrap();
        assert_eq!(result.cascaded_statuses, 1);
        assert!(service.get_assignment(&assignment_id).unwrap().is_none());
        assert!(status_repo.list_for_assignment(&assignment_id).unwrap().is_empty());
    }

    #[test]
    fn test_delete_nonexistent_assignment() {
        let (service, _status_repo, _temp_dir) = setup_test();
        assert!(service.delete_assignment("assignment::missing").is_err());
    }
}
