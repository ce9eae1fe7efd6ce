use anyhow::{anyhow, Result};
use csv::{Reader, Writer};
use log::info;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};

use super::assignment_repository::parse_timestamp;
use super::connection::CsvConnection;
use crate::domain::models::coach::{Coach, CoachStatus};
use crate::storage::traits::CoachStorage;

const HEADER: [&str; 7] = [
    "id",
    "name",
    "email",
    "phone",
    "status",
    "created_at",
    "updated_at",
];

/// CSV-based coach repository backed by a single `coaches.csv` file
#[derive(Clone)]
pub struct CoachRepository {
    connection: CsvConnection,
}

impl CoachRepository {
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    fn read_coaches(&self) -> Result<Vec<Coach>> {
        let file_path = self.connection.coaches_file_path();
        if !file_path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&file_path)?;
        let mut csv_reader = Reader::from_reader(BufReader::new(file));

        let mut coaches = Vec::new();
        for result in csv_reader.records() {
            let record = result?;
            let get = |i: usize| record.get(i).unwrap_or("").to_string();

            let phone = get(3);
            coaches.push(Coach {
                id: get(0),
                name: get(1),
                email: get(2),
                phone: if phone.is_empty() { None } else { Some(phone) },
                status: CoachStatus::from_str(&get(4)).map_err(|e| anyhow!(e))?,
                created_at: parse_timestamp(&get(5))?,
                updated_at: parse_timestamp(&get(6))?,
            });
        }

        Ok(coaches)
    }

    fn write_coaches(&self, coaches: &[Coach]) -> Result<()> {
        let file_path = self.connection.coaches_file_path();
        let temp_path = file_path.with_extension("tmp");

        let file = File::create(&temp_path)?;
        let mut csv_writer = Writer::from_writer(BufWriter::new(file));

        csv_writer.write_record(HEADER)?;
        for coach in coaches {
            csv_writer.write_record(&[
                coach.id.as_str(),
                coach.name.as_str(),
                coach.email.as_str(),
                coach.phone.as_deref().unwrap_or(""),
                coach.status.as_str(),
                &coach.created_at.to_rfc3339(),
                &coach.updated_at.to_rfc3339(),
            ])?;
        }
        csv_writer.flush()?;
        drop(csv_writer);

        fs::rename(&temp_path, &file_path)?;
        Ok(())
    }
}

impl CoachStorage for CoachRepository {
    fn store_coach(&self, coach: &Coach) -> Result<()> {
        let mut coaches = self.read_coaches()?;
        coaches.push(coach.clone());
        self.write_coaches(&coaches)?;
        info!("Stored coach {} ({})", coach.name, coach.id);
        Ok(())
    }

    fn get_coach(&self, coach_id: &str) -> Result<Option<Coach>> {
        let coaches = self.read_coaches()?;
        Ok(coaches.into_iter().find(|c| c.id == coach_id))
    }

    fn list_coaches(&self) -> Result<Vec<Coach>> {
        let mut coaches = self.read_coaches()?;
        coaches.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(coaches)
    }

    fn update_coach(&self, coach: &Coach) -> Result<()> {
        let mut coaches = self.read_coaches()?;
        let slot = coaches
            .iter_mut()
            .find(|c| c.id == coach.id)
            .ok_or_else(|| anyhow!("Coach not found for update: {}", coach.id))?;
        *slot = coach.clone();
        self.write_coaches(&coaches)
    }

    fn delete_coach(&self, coach_id: &str) -> Result<bool> {
        let mut coaches = self.read_coaches()?;
        let before = coaches.len();
        coaches.retain(|c| c.id != coach_id);
        if coaches.len() == before {
            return Ok(false);
        }
        self.write_coaches(&coaches)?;
        info!("Deleted coach {}", coach_id);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup_test_repo() -> (CoachRepository, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let connection = CsvConnection::new(temp_dir.path()).unwrap();
        (CoachRepository::new(connection), temp_dir)
    }

    fn sample_coach(id: &str, name: &str) -> Coach {
        let now = chrono::Utc::now();
        Coach {
            id: id.to_string(),
            name: name.to_string(),
            email: "coach@example.com".to_string(),
            phone: Some("555-0100".to_string()),
            status: CoachStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_store_list_ordered_by_name() {
        let (repo, _temp_dir) = setup_test_repo();
        repo.store_coach(&sample_coach("coach::2", "Morgan")).unwrap();
        repo.store_coach(&sample_coach("coach::1", "Alex")).unwrap();

        let coaches = repo.list_coaches().unwrap();
        let names: Vec<&str> = coaches.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Alex", "Morgan"]);
    }

    #[test]
    fn test_update_and_delete_coach() {
        let (repo, _temp_dir) = setup_test_repo();
        let mut coach = sample_coach("coach::1", "Alex");
        repo.store_coach(&coach).unwrap();

        coach.status = CoachStatus::Inactive;
        repo.update_coach(&coach).unwrap();
        assert_eq!(
            repo.get_coach("coach::1").unwrap().unwrap().status,
            CoachStatus::Inactive
        );

        assert!(repo.delete_coach("coach::1").unwrap());
        assert!(repo.get_coach("coach::1").unwrap().is_none());
    }
}
