//! Assignment distribution with idempotent target resolution.
//!
//! A distribution runs in three steps over the current store snapshot:
//! resolve the target mode to a candidate couple set, subtract couples that
//! already hold a status for the assignment, then batch-insert one `Sent`
//! status per remaining couple. No state is retained between calls, and the
//! storage layer's insert-if-absent makes a retried or racing distribution
//! converge to a skip instead of a duplicate record.

use std::collections::{BTreeSet, HashSet};

use anyhow::Result;
use chrono::{NaiveDate, Utc};
use log::{debug, info};

use crate::domain::commands::distribution::{
    DistributeAssignmentCommand, DistributeAssignmentResult, DistributionTarget,
    OverdueSweepResult, SubmitHomeworkCommand, SubmitHomeworkResult,
};
use crate::domain::models::couple::CoupleStatus;
use crate::domain::models::distribution_status::{DistributionState, DistributionStatus};
use crate::storage::csv::{
    AssignmentRepository, CoachRepository, CoupleRepository, CsvConnection,
    DistributionStatusRepository,
};
use crate::storage::traits::{
    AssignmentStorage, CoachStorage, CoupleStorage, DistributionStatusStorage,
};

const MAX_RESPONSE_LENGTH: usize = 4000;

/// Distribution failures the caller must tell apart.
///
/// Not-found kinds map to 404 at the REST layer and validation kinds to 400;
/// everything else is a storage failure.
#[derive(Debug, thiserror::Error)]
pub enum DistributionError {
    #[error("Assignment not found: {0}")]
    AssignmentNotFound(String),
    #[error("Coach not found: {0}")]
    CoachNotFound(String),
    #[error("Assignment {0} was not distributed to couple {1}")]
    NotDistributed(String, String),
    #[error("Homework for assignment {0} was already submitted")]
    AlreadySubmitted(String),
    #[error("Response cannot be empty")]
    EmptyResponse,
    #[error("Response cannot exceed 4000 characters")]
    ResponseTooLong,
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

/// Service for distributing assignments and tracking per-couple progress
#[derive(Clone)]
pub struct DistributionService {
    assignment_repository: AssignmentRepository,
    couple_repository: CoupleRepository,
    coach_repository: CoachRepository,
    status_repository: DistributionStatusRepository,
}

impl DistributionService {
    pub fn new(connection: CsvConnection) -> Self {
        Self {
            assignment_repository: AssignmentRepository::new(connection.clone()),
            couple_repository: CoupleRepository::new(connection.clone()),
            coach_repository: CoachRepository::new(connection.clone()),
            status_repository: DistributionStatusRepository::new(connection),
        }
    }

    /// Distribute an assignment to the couples selected by the target.
    ///
    /// Idempotent: couples that already hold a status for this assignment
    /// are skipped, so the created count equals the resolved candidate set
    /// minus the already-distributed overlap, and re-running the same
    /// distribution creates nothing.
    pub fn distribute(
        &self,
        command: DistributeAssignmentCommand,
    ) -> Result<DistributeAssignmentResult, DistributionError> {
        info!(
            "Distributing {} to target {:?}",
            command.assignment_id, command.target
        );

        self.assignment_repository
            .get_assignment(&command.assignment_id)?
            .ok_or_else(|| DistributionError::AssignmentNotFound(command.assignment_id.clone()))?;

        let candidates = self.resolve_targets(&command.target)?;
        if candidates.is_empty() {
            debug!("Target resolved to no couples, nothing to distribute");
            return Ok(DistributeAssignmentResult { created_count: 0 });
        }

        let already_distributed: HashSet<String> = self
            .status_repository
            .list_for_assignment(&command.assignment_id)?
            .into_iter()
            .map(|s| s.couple_id)
            .collect();

        let now = Utc::now();
        let new_statuses: Vec<DistributionStatus> = candidates
            .into_iter()
            .filter(|couple_id| !already_distributed.contains(couple_id))
            .map(|couple_id| DistributionStatus {
                id: DistributionStatus::generate_id(&command.assignment_id, &couple_id),
                assignment_id: command.assignment_id.clone(),
                couple_id,
                state: DistributionState::Sent,
                sent_at: Some(now),
                completed_at: None,
                created_at: now,
                updated_at: now,
            })
            .collect();

        if new_statuses.is_empty() {
            info!(
                "Every resolved couple already has {} distributed",
                command.assignment_id
            );
            return Ok(DistributeAssignmentResult { created_count: 0 });
        }

        // The store skips pairs a racing distribution inserted since the
        // read above, so the returned count is what actually landed.
        let created_count = self.status_repository.insert_statuses(&new_statuses)?;
        info!(
            "Distributed {} to {} couples",
            command.assignment_id, created_count
        );

        Ok(DistributeAssignmentResult { created_count })
    }

    /// Resolve a target mode to a de-duplicated set of couple ids.
    ///
    /// An empty result is not an error; it simply means nothing to send.
    fn resolve_targets(
        &self,
        target: &DistributionTarget,
    ) -> Result<BTreeSet<String>, DistributionError> {
        match target {
            DistributionTarget::All => {
                let couples = self.couple_repository.list_couples()?;
                Ok(couples
                    .into_iter()
                    .filter(|c| c.status == CoupleStatus::Active)
                    .map(|c| c.id)
                    .collect())
            }
            DistributionTarget::Coach { coach_id } => {
                self.coach_repository
                    .get_coach(coach_id)?
                    .ok_or_else(|| DistributionError::CoachNotFound(coach_id.clone()))?;
                let couples = self.couple_repository.list_couples()?;
                Ok(couples
                    .into_iter()
                    .filter(|c| {
                        c.status == CoupleStatus::Active
                            && c.coach_id.as_deref() == Some(coach_id.as_str())
                    })
                    .map(|c| c.id)
                    .collect())
            }
            DistributionTarget::Specific { couple_ids } => {
                if couple_ids.is_empty() {
                    return Ok(BTreeSet::new());
                }
                // Unknown ids are dropped rather than rejected; the couple
                // may have been deleted since the caller loaded their list
                let known: HashSet<String> = self
                    .couple_repository
                    .list_couples()?
                    .into_iter()
                    .map(|c| c.id)
                    .collect();
                Ok(couple_ids
                    .iter()
                    .filter(|id| known.contains(*id))
                    .cloned()
                    .collect())
            }
        }
    }

    /// List the distribution statuses of an assignment
    pub fn list_statuses(
        &self,
        assignment_id: &str,
    ) -> Result<Vec<DistributionStatus>, DistributionError> {
        self.assignment_repository
            .get_assignment(assignment_id)?
            .ok_or_else(|| DistributionError::AssignmentNotFound(assignment_id.to_string()))?;
        Ok(self.status_repository.list_for_assignment(assignment_id)?)
    }

    /// Record a couple's homework submission and mark their status completed.
    ///
    /// Late submissions are accepted: an `Overdue` status still transitions
    /// to `Completed`.
    pub fn submit_homework(
        &self,
        command: SubmitHomeworkCommand,
    ) -> Result<SubmitHomeworkResult, DistributionError> {
        info!(
            "Homework submission for {} by {}",
            command.assignment_id, command.couple_id
        );

        let response = command.response.trim();
        if response.is_empty() {
            return Err(DistributionError::EmptyResponse);
        }
        if response.chars().count() > MAX_RESPONSE_LENGTH {
            return Err(DistributionError::ResponseTooLong);
        }

        self.assignment_repository
            .get_assignment(&command.assignment_id)?
            .ok_or_else(|| DistributionError::AssignmentNotFound(command.assignment_id.clone()))?;

        let mut status = self
            .status_repository
            .get_status(&command.assignment_id, &command.couple_id)?
            .ok_or_else(|| {
                DistributionError::NotDistributed(
                    command.assignment_id.clone(),
                    command.couple_id.clone(),
                )
            })?;

        if status.state == DistributionState::Completed {
            return Err(DistributionError::AlreadySubmitted(command.assignment_id));
        }

        let now = Utc::now();
        status.state = DistributionState::Completed;
        status.completed_at = Some(now);
        status.updated_at = now;
        self.status_repository.update_status(&status)?;

        info!(
            "Marked {} completed for {}",
            status.assignment_id, status.couple_id
        );
        Ok(SubmitHomeworkResult { status })
    }

    /// Mark open statuses overdue for every assignment whose due date has
    /// passed. Returns how many statuses transitioned.
    pub fn overdue_sweep(&self, today: NaiveDate) -> Result<OverdueSweepResult> {
        let assignments = self.assignment_repository.list_assignments()?;
        let mut marked_overdue = 0u32;

        for assignment in assignments {
            let Some(due_date) = assignment.due_date else {
                continue;
            };
            if due_date >= today {
                continue;
            }

            for mut status in self.status_repository.list_for_assignment(&assignment.id)? {
                if !status.state.is_open() {
                    continue;
                }
                status.state = DistributionState::Overdue;
                status.updated_at = Utc::now();
                self.status_repository.update_status(&status)?;
                marked_overdue += 1;
            }
        }

        if marked_overdue > 0 {
            info!("Overdue sweep marked {} statuses", marked_overdue);
        }
        Ok(OverdueSweepResult { marked_overdue })
    }
}
