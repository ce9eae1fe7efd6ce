use anyhow::Result;
use chrono::Utc;
use log::{info, warn};

use crate::domain::commands::couples::{
    CreateCoupleCommand, CreateCoupleResult, DeleteCoupleResult, UpdateCoupleCommand,
    UpdateCoupleResult,
};
use crate::domain::models::couple::{Couple, CoupleStatus, CoupleValidationError};
use crate::storage::csv::{CoachRepository, CoupleRepository, CsvConnection,
    DistributionStatusRepository};
use crate::storage::traits::{CoachStorage, CoupleStorage, DistributionStatusStorage};

/// Service for managing participant couples
#[derive(Clone)]
pub struct CoupleService {
    couple_repository: CoupleRepository,
    coach_repository: CoachRepository,
    status_repository: DistributionStatusRepository,
}

impl CoupleService {
    pub fn new(connection: CsvConnection) -> Self {
        Self {
            couple_repository: CoupleRepository::new(connection.clone()),
            coach_repository: CoachRepository::new(connection.clone()),
            status_repository: DistributionStatusRepository::new(connection),
        }
    }

    /// Enroll a new couple; new couples start in active status
    pub fn create_couple(&self, command: CreateCoupleCommand) -> Result<CreateCoupleResult> {
        info!(
            "Creating couple: {} & {}",
            command.partner_one_name, command.partner_two_name
        );

        validate_partner_name(&command.partner_one_name)?;
        validate_partner_name(&command.partner_two_name)?;
        validate_email(&command.email)?;
        if let Some(ref coach_id) = command.coach_id {
            self.require_coach(coach_id)?;
        }

        let now = Utc::now();
        let couple = Couple {
            id: Couple::generate_id(crate::domain::next_id_millis()),
            partner_one_name: command.partner_one_name.trim().to_string(),
            partner_two_name: command.partner_two_name.trim().to_string(),
            email: command.email.trim().to_string(),
            phone: command.phone.map(|p| p.trim().to_string()).filter(|p| !p.is_empty()),
            coach_id: command.coach_id,
            status: CoupleStatus::Active,
            created_at: now,
            updated_at: now,
        };

        self.couple_repository.store_couple(&couple)?;
        info!("Created couple {} ({})", couple.email, couple.id);

        Ok(CreateCoupleResult { couple })
    }

    /// Get a couple by ID
    pub fn get_couple(&self, couple_id: &str) -> Result<Option<Couple>> {
        self.couple_repository.get_couple(couple_id)
    }

    /// List all couples
    pub fn list_couples(&self) -> Result<Vec<Couple>> {
        self.couple_repository.list_couples()
    }

    /// List all couples assigned to one coach
    pub fn list_couples_for_coach(&self, coach_id: &str) -> Result<Vec<Couple>> {
        let couples = self.couple_repository.list_couples()?;
        Ok(couples
            .into_iter()
            .filter(|c| c.coach_id.as_deref() == Some(coach_id))
            .collect())
    }

    /// Update an existing couple
    pub fn update_couple(&self, command: UpdateCoupleCommand) -> Result<UpdateCoupleResult> {
        info!("Updating couple: {}", command.couple_id);

        let mut couple = self
            .couple_repository
            .get_couple(&command.couple_id)?
            .ok_or_else(|| anyhow::anyhow!("Couple not found: {}", command.couple_id))?;

        if let Some(name) = command.partner_one_name {
            validate_partner_name(&name)?;
            couple.partner_one_name = name.trim().to_string();
        }
        if let Some(name) = command.partner_two_name {
            validate_partner_name(&name)?;
            couple.partner_two_name = name.trim().to_string();
        }
        if let Some(email) = command.email {
            validate_email(&email)?;
            couple.email = email.trim().to_string();
        }
        if let Some(phone) = command.phone {
            let trimmed = phone.trim().to_string();
            couple.phone = if trimmed.is_empty() { None } else { Some(trimmed) };
        }
        if let Some(coach_id) = command.coach_id {
            // An empty string unassigns the coach
            if coach_id.trim().is_empty() {
                couple.coach_id = None;
            } else {
                self.require_coach(&coach_id)?;
                couple.coach_id = Some(coach_id);
            }
        }
        if let Some(status) = command.status {
            couple.status = CoupleStatus::from_str(&status)
                .map_err(|_| CoupleValidationError::InvalidStatus(status))?;
        }

        couple.updated_at = Utc::now();
        self.couple_repository.update_couple(&couple)?;
        info!("Updated couple {} ({})", couple.email, couple.id);

        Ok(UpdateCoupleResult { couple })
    }

    /// Delete a couple and cascade their distribution statuses
    pub fn delete_couple(&self, couple_id: &str) -> Result<DeleteCoupleResult> {
        info!("Deleting couple: {}", couple_id);

        let deleted = self.couple_repository.delete_couple(couple_id)?;
        if !deleted {
            warn!("Attempted to delete a non-existent couple: {}", couple_id);
            return Err(anyhow::anyhow!("Couple not found: {}", couple_id));
        }

        let cascaded_statuses = self.status_repository.delete_for_couple(couple_id)?;
        Ok(DeleteCoupleResult { cascaded_statuses })
    }

    fn require_coach(&self, coach_id: &str) -> Result<()> {
        self.coach_repository
            .get_coach(coach_id)?
            .ok_or_else(|| anyhow::anyhow!("Coach not found: {}", coach_id))?;
        Ok(())
    }
}

fn validate_partner_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(CoupleValidationError::EmptyPartnerName.into());
    }
    if name.len() > 100 {
        return Err(CoupleValidationError::PartnerNameTooLong.into());
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<()> {
    let email = email.trim();
    // Shape check only; deliverability is the notification subsystem's problem
    let valid = email.split_once('@').map_or(false, |(local, domain)| {
        !local.is_empty() && domain.contains('.') && !domain.starts_with('.')
    });
    if !valid {
        return Err(CoupleValidationError::InvalidEmail.into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::coach::{Coach, CoachStatus};
    use crate::domain::models::distribution_status::{DistributionState, DistributionStatus};
    use tempfile::tempdir;

    struct TestContext {
        service: CoupleService,
        coach_repo: CoachRepository,
        status_repo: DistributionStatusRepository,
        _temp_dir: tempfile::TempDir,
    }

    fn setup_test() -> TestContext {
        let temp_dir = tempdir().unwrap();
        let conn = CsvConnection::new(temp_dir.path()).unwrap();
        TestContext {
            service: CoupleService::new(conn.clone()),
            coach_repo: CoachRepository::new(conn.clone()),
            status_repo: DistributionStatusRepository::new(conn),
            _temp_dir: temp_dir,
        }
    }

    fn create_command() -> CreateCoupleCommand {
        CreateCoupleCommand {
            partner_one_name: " Jordan ".to_string(),
            partner_two_name: "Sam".to_string(),
            email: "jordan.sam@example.com".to_string(),
            phone: None,
            coach_id: None,
        }
    }

    fn seed_coach(ctx: &TestContext, id: &str) {
        let now = Utc::now();
        ctx.coach_repo
            .store_coach(&Coach {
                id: id.to_string(),
                name: "Coach Alex".to_string(),
                email: "alex@example.com".to_string(),
                phone: None,
                status: CoachStatus::Active,
                created_at: now,
                updated_at: now,
            })
            .unwrap();
    }

    #[test]
    fn test_create_couple_starts_active() {
        let ctx = setup_test();
        let result = ctx.service.create_couple(create_command()).unwrap();
        assert_eq!(result.couple.partner_one_name, "Jordan");
        assert_eq!(result.couple.status, CoupleStatus::Active);
    }

    #[test]
    fn test_create_couple_validation() {
        let ctx = setup_test();

        let mut cmd = create_command();
        cmd.partner_one_name = "  ".to_string();
        assert!(ctx.service.create_couple(cmd).is_err());

        let mut cmd = create_command();
        cmd.email = "not-an-email".to_string();
        assert!(ctx.service.create_couple(cmd).is_err());

        // Unknown coach reference is rejected
        let mut cmd = create_command();
        cmd.coach_id = Some("coach::missing".to_string());
        assert!(ctx.service.create_couple(cmd).is_err());
    }

    #[test]
    fn test_create_couple_with_known_coach() {
        let ctx = setup_test();
        seed_coach(&ctx, "coach::1");

        let mut cmd = create_command();
        cmd.coach_id = Some("coach::1".to_string());
        let result = ctx.service.create_couple(cmd).unwrap();
        assert_eq!(result.couple.coach_id.as_deref(), Some("coach::1"));
    }

    #[test]
    fn test_list_couples_for_coach() {
        let ctx = setup_test();
        seed_coach(&ctx, "coach::1");

        let mut cmd = create_command();
        cmd.coach_id = Some("coach::1".to_string());
        let assigned = ctx.service.create_couple(cmd).unwrap();
        ctx.service.create_couple(create_command()).unwrap();

        let for_coach = ctx.service.list_couples_for_coach("coach::1").unwrap();
        assert_eq!(for_coach.len(), 1);
        assert_eq!(for_coach[0].id, assigned.couple.id);
        assert!(ctx
            .service
            .list_couples_for_coach("coach::other")
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_update_couple_status_and_unassign_coach() {
        let ctx = setup_test();
        seed_coach(&ctx, "coach::1");
        let mut cmd = create_command();
        cmd.coach_id = Some("coach::1".to_string());
        let created = ctx.service.create_couple(cmd).unwrap();

        let result = ctx
            .service
            .update_couple(UpdateCoupleCommand {
                couple_id: created.couple.id.clone(),
                status: Some("completed".to_string()),
                coach_id: Some("".to_string()),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(result.couple.status, CoupleStatus::Completed);
        assert!(result.couple.coach_id.is_none());

        let bad_status = ctx.service.update_couple(UpdateCoupleCommand {
            couple_id: created.couple.id,
            status: Some("graduated".to_string()),
            ..Default::default()
        });
        assert!(bad_status.is_err());
    }

    #[test]
    fn test_delete_couple_cascades_statuses() {
        let ctx = setup_test();
        let created = ctx.service.create_couple(create_command()).unwrap();
        let couple_id = created.couple.id;

        let now = Utc::now();
        ctx.status_repo
            .insert_statuses(&[DistributionStatus {
                id: DistributionStatus::generate_id("assignment::1", &couple_id),
                assignment_id: "assignment::1".to_string(),
                couple_id: couple_id.clone(),
                state: DistributionState::Sent,
                sent_at: Some(now),
                completed_at: None,
                created_at: now,
                updated_at: now,
            }])
            .unwrap();

        let result = ctx.service.delete_couple(&couple_id).unwrap();
        assert_eq!(result.cascaded_statuses, 1);
        assert!(ctx.service.get_couple(&couple_id).unwrap().is_none());
    }

    #[test]
    fn test_delete_nonexistent_couple() {
        let ctx = setup_test();
        assert!(ctx.service.delete_couple("couple::missing").is_err());
    }
}
