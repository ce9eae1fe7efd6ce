use anyhow::Result;
use chrono::Utc;
use log::{info, warn};

use crate::domain::commands::coaches::{
    CoachOption, CreateCoachCommand, CreateCoachResult, UpdateCoachCommand, UpdateCoachResult,
};
use crate::domain::models::coach::{Coach, CoachStatus, CoachValidationError};
use crate::storage::csv::{CoachRepository, CsvConnection};
use crate::storage::traits::CoachStorage;

/// Service for managing mentor coaches
#[derive(Clone)]
pub struct CoachService {
    coach_repository: CoachRepository,
}

impl CoachService {
    pub fn new(connection: CsvConnection) -> Self {
        Self {
            coach_repository: CoachRepository::new(connection),
        }
    }

    /// Add a new coach; new coaches start in active status
    pub fn create_coach(&self, command: CreateCoachCommand) -> Result<CreateCoachResult> {
        info!("Creating coach: {}", command.name);

        validate_name(&command.name)?;
        validate_email(&command.email)?;

        let now = Utc::now();
        let coach = Coach {
            id: Coach::generate_id(crate::domain::next_id_millis()),
            name: command.name.trim().to_string(),
            email: command.email.trim().to_string(),
            phone: command.phone.map(|p| p.trim().to_string()).filter(|p| !p.is_empty()),
            status: CoachStatus::Active,
            created_at: now,
            updated_at: now,
        };

        self.coach_repository.store_coach(&coach)?;
        info!("Created coach {} ({})", coach.name, coach.id);

        Ok(CreateCoachResult { coach })
    }

    /// Get a coach by ID
    pub fn get_coach(&self, coach_id: &str) -> Result<Option<Coach>> {
        self.coach_repository.get_coach(coach_id)
    }

    /// List all coaches ordered by name
    pub fn list_coaches(&self) -> Result<Vec<Coach>> {
        self.coach_repository.list_coaches()
    }

    /// Active coaches for UI dropdowns.
    ///
    /// A non-critical UI aid: a storage failure degrades to an empty list
    /// with a logged warning instead of failing the caller's screen.
    pub fn coach_picklist(&self) -> Vec<CoachOption> {
        match self.coach_repository.list_coaches() {
            Ok(coaches) => coaches
                .into_iter()
                .filter(|c| c.status == CoachStatus::Active)
                .map(|c| CoachOption { id: c.id, name: c.name })
                .collect(),
            Err(e) => {
                warn!("Failed to load coach picklist, returning empty list: {}", e);
                Vec::new()
            }
        }
    }

    /// Update an existing coach
    pub fn update_coach(&self, command: UpdateCoachCommand) -> Result<UpdateCoachResult> {
        info!("Updating coach: {}", command.coach_id);

        let mut coach = self
            .coach_repository
            .get_coach(&command.coach_id)?
            .ok_or_else(|| anyhow::anyhow!("Coach not found: {}", command.coach_id))?;

        if let Some(name) = command.name {
            validate_name(&name)?;
            coach.name = name.trim().to_string();
        }
        if let Some(email) = command.email {
            validate_email(&email)?;
            coach.email = email.trim().to_string();
        }
        if let Some(phone) = command.phone {
            let trimmed = phone.trim().to_string();
            coach.phone = if trimmed.is_empty() { None } else { Some(trimmed) };
        }
        if let Some(status) = command.status {
            coach.status = CoachStatus::from_str(&status)
                .map_err(|_| CoachValidationError::InvalidStatus(status))?;
        }

        coach.updated_at = Utc::now();
        self.coach_repository.update_coach(&coach)?;
        info!("Updated coach {} ({})", coach.name, coach.id);

        Ok(UpdateCoachResult { coach })
    }

    /// Delete a coach.
    ///
    /// Couples referencing the coach keep their reference; the couple screen
    /// treats a dangling coach id as unassigned.
    pub fn delete_coach(&self, coach_id: &str) -> Result<()> {
        info!("Deleting coach: {}", coach_id);

        let deleted = self.coach_repository.delete_coach(coach_id)?;
        if !deleted {
            warn!("Attempted to delete a non-existent coach: {}", coach_id);
            return Err(anyhow::anyhow!("Coach not found: {}", coach_id));
        }
        Ok(())
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(CoachValidationError::EmptyName.into());
    }
    if name.len() > 100 {
        return Err(CoachValidationError::NameTooLong.into());
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<()> {
    let email = email.trim();
    let valid = email.split_once('@').map_or(false, |(local, domain)| {
        !local.is_empty() && domain.contains('.') && !domain.starts_with('.')
    });
    if !valid {
        return Err(CoachValidationError::InvalidEmail.into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn setup_test() -> (CoachService, tempfile::TempDir) {
        let temp_dir = tempdir().unwrap();
        let conn = CsvConnection::new(temp_dir.path()).unwrap();
        (CoachService::new(conn), temp_dir)
    }

    fn create_command(name: &str) -> CreateCoachCommand {
        CreateCoachCommand {
            name: name.to_string(),
            email: "coach@example.com".to_string(),
            phone: None,
        }
    }

    #[test]
    fn test_create_coach() {
        let (service, _temp_dir) = setup_test();
        let result = service.create_coach(create_command("  Alex  ")).unwrap();
        assert_eq!(result.coach.name, "Alex");
        assert_eq!(result.coach.status, CoachStatus::Active);
    }

    #[test]
    fn test_create_coach_validation() {
        let (service, _temp_dir) = setup_test();

        let mut cmd = create_command(" ");
        assert!(service.create_coach(cmd).is_err());

        cmd = create_command("Alex");
        cmd.email = "alex-at-example".to_string();
        assert!(service.create_coach(cmd).is_err());
    }

    #[test]
    fn test_picklist_excludes_inactive_coaches() {
        let (service, _temp_dir) = setup_test();
        let active = service.create_coach(create_command("Active Coach")).unwrap();
        let inactive = service.create_coach(create_command("Inactive Coach")).unwrap();

        service
            .update_coach(UpdateCoachCommand {
                coach_id: inactive.coach.id,
                status: Some("inactive".to_string()),
                ..Default::default()
            })
            .unwrap();

        let options = service.coach_picklist();
        assert_eq!(options.len(), 1);
        assert_eq!(options[0].id, active.coach.id);
    }

    #[test]
    fn test_picklist_degrades_to_empty_on_storage_failure() {
        let temp_dir = tempdir().unwrap();
        let conn = CsvConnection::new(temp_dir.path()).unwrap();
        let service = CoachService::new(conn.clone());

        // A directory where the data file belongs makes every read fail
        std::fs::create_dir(conn.coaches_file_path()).unwrap();

        assert!(service.list_coaches().is_err());
        assert!(service.coach_picklist().is_empty());
    }

    #[test]
    fn test_update_nonexistent_coach() {
        let (service, _temp_dir) = setup_test();
        let result = service.update_coach(UpdateCoachCommand {
            coach_id: "coach::missing".to_string(),
            name: Some("New".to_string()),
            ..Default::default()
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_delete_coach() {
        let (service, _temp_dir) = setup_test();
        let created = service.create_coach(create_command("Alex")).unwrap();
        service.delete_coach(&created.coach.id).unwrap();
        assert!(service.get_coach(&created.coach.id).unwrap().is_none());
        assert!(service.delete_coach(&created.coach.id).is_err());
    }
}
