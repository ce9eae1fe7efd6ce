use anyhow::{anyhow, Result};
use csv::{Reader, Writer};
use log::info;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};

use super::assignment_repository::parse_timestamp;
use super::connection::CsvConnection;
use crate::domain::models::couple::{Couple, CoupleStatus};
use crate::storage::traits::CoupleStorage;

const HEADER: [&str; 9] = [
    "id",
    "partner_one_name",
    "partner_two_name",
    "email",
    "phone",
    "coach_id",
    "status",
    "created_at",
    "updated_at",
];

/// CSV-based couple repository backed by a single `couples.csv` file
#[derive(Clone)]
pub struct CoupleRepository {
    connection: CsvConnection,
}

impl CoupleRepository {
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    fn read_couples(&self) -> Result<Vec<Couple>> {
        let file_path = self.connection.couples_file_path();
        if !file_path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&file_path)?;
        let mut csv_reader = Reader::from_reader(BufReader::new(file));

        let mut couples = Vec::new();
        for result in csv_reader.records() {
            let record = result?;
            let get = |i: usize| record.get(i).unwrap_or("").to_string();

            let phone = get(4);
            let coach_id = get(5);
            couples.push(Couple {
                id: get(0),
                partner_one_name: get(1),
                partner_two_name: get(2),
                email: get(3),
                phone: if phone.is_empty() { None } else { Some(phone) },
                coach_id: if coach_id.is_empty() { None } else { Some(coach_id) },
                status: CoupleStatus::from_str(&get(6)).map_err(|e| anyhow!(e))?,
                created_at: parse_timestamp(&get(7))?,
                updated_at: parse_timestamp(&get(8))?,
            });
        }

        Ok(couples)
    }

    fn write_couples(&self, couples: &[Couple]) -> Result<()> {
        let file_path = self.connection.couples_file_path();
        let temp_path = file_path.with_extension("tmp");

        let file = File::create(&temp_path)?;
        let mut csv_writer = Writer::from_writer(BufWriter::new(file));

        csv_writer.write_record(HEADER)?;
        for couple in couples {
            csv_writer.write_record(&[
                couple.id.as_str(),
                couple.partner_one_name.as_str(),
                couple.partner_two_name.as_str(),
                couple.email.as_str(),
                couple.phone.as_deref().unwrap_or(""),
                couple.coach_id.as_deref().unwrap_or(""),
                couple.status.as_str(),
                &couple.created_at.to_rfc3339(),
                &couple.updated_at.to_rfc3339(),
            ])?;
        }
        csv_writer.flush()?;
        drop(csv_writer);

        fs::rename(&temp_path, &file_path)?;
        Ok(())
    }
}

impl CoupleStorage for CoupleRepository {
    fn store_couple(&self, couple: &Couple) -> Result<()> {
        let mut couples = self.read_couples()?;
        couples.push(couple.clone());
        self.write_couples(&couples)?;
        info!(
            "Stored couple {} & {} ({})",
            couple.partner_one_name, couple.partner_two_name, couple.id
        );
        Ok(())
    }

    fn get_couple(&self, couple_id: &str) -> Result<Option<Couple>> {
        let couples = self.read_couples()?;
        Ok(couples.into_iter().find(|c| c.id == couple_id))
    }

    fn list_couples(&self) -> Result<Vec<Couple>> {
        let mut couples = self.read_couples()?;
        couples.sort_by(|a, b| {
            a.partner_one_name
                .cmp(&b.partner_one_name)
                .then_with(|| a.partner_two_name.cmp(&b.partner_two_name))
        });
        Ok(couples)
    }

    fn update_couple(&self, couple: &Couple) -> Result<()> {
        let mut couples = self.read_couples()?;
        let slot = couples
            .iter_mut()
            .find(|c| c.id == couple.id)
            .ok_or_else(|| anyhow!("Couple not found for update: {}", couple.id))?;
        *slot = couple.clone();
        self.write_couples(&couples)
    }

    fn delete_couple(&self, couple_id: &str) -> Result<bool> {
        let mut couples = self.read_couples()?;
        let before = couples.len();
        couples.retain(|c| c.id != couple_id);
        if couples.len() == before {
            return Ok(false);
        }
        self.write_couples(&couples)?;
        info!("Deleted couple {}", couple_id);
        Ok(true)
    }
}
