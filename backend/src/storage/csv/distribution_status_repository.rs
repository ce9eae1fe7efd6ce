use anyhow::{anyhow, Result};
use csv::{Reader, Writer};
use log::{debug, info};
use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::Path;

use super::assignment_repository::parse_timestamp;
use super::connection::CsvConnection;
use crate::domain::models::distribution_status::{DistributionState, DistributionStatus};
use crate::storage::traits::DistributionStatusStorage;

const HEADER: [&str; 8] = [
    "id",
    "assignment_id",
    "couple_id",
    "state",
    "sent_at",
    "completed_at",
    "created_at",
    "updated_at",
];

/// CSV-based distribution status repository.
///
/// One file per assignment under `statuses/`, mirroring how statuses are
/// queried (almost always by assignment). The (assignment, couple)
/// uniqueness invariant lives here: `insert_statuses` re-checks existing
/// pairs under the connection's write lock and skips conflicts, so a racing
/// second distribution converges to a skip instead of a duplicate.
#[derive(Clone)]
pub struct DistributionStatusRepository {
    connection: CsvConnection,
}

impl DistributionStatusRepository {
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    fn read_statuses_file(&self, path: &Path) -> Result<Vec<DistributionStatus>> {
        if !path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(path)?;
        let mut csv_reader = Reader::from_reader(BufReader::new(file));

        let mut statuses = Vec::new();
        for result in csv_reader.records() {
            let record = result?;
            let get = |i: usize| record.get(i).unwrap_or("").to_string();

            let sent_at = get(4);
            let completed_at = get(5);
            statuses.push(DistributionStatus {
                id: get(0),
                assignment_id: get(1),
                couple_id: get(2),
                state: DistributionState::from_str(&get(3)).map_err(|e| anyhow!(e))?,
                sent_at: if sent_at.is_empty() {
                    None
                } else {
                    Some(parse_timestamp(&sent_at)?)
                },
                completed_at: if completed_at.is_empty() {
                    None
                } else {
                    Some(parse_timestamp(&completed_at)?)
                },
                created_at: parse_timestamp(&get(6))?,
                updated_at: parse_timestamp(&get(7))?,
            });
        }

        Ok(statuses)
    }

    fn read_statuses(&self, assignment_id: &str) -> Result<Vec<DistributionStatus>> {
        let path = self.connection.status_file_path(assignment_id);
        self.read_statuses_file(&path)
    }

    fn write_statuses(&self, assignment_id: &str, statuses: &[DistributionStatus]) -> Result<()> {
        self.connection.ensure_statuses_directory()?;
        let file_path = self.connection.status_file_path(assignment_id);

        if statuses.is_empty() {
            if file_path.exists() {
                fs::remove_file(&file_path)?;
            }
            return Ok(());
        }

        let temp_path = file_path.with_extension("tmp");
        let file = File::create(&temp_path)?;
        let mut csv_writer = Writer::from_writer(BufWriter::new(file));

        csv_writer.write_record(HEADER)?;
        for status in statuses {
            csv_writer.write_record(&[
                status.id.as_str(),
                status.assignment_id.as_str(),
                status.couple_id.as_str(),
                status.state.as_str(),
                &status.sent_at.map(|t| t.to_rfc3339()).unwrap_or_default(),
                &status
                    .completed_at
                    .map(|t| t.to_rfc3339())
                    .unwrap_or_default(),
                &status.created_at.to_rfc3339(),
                &status.updated_at.to_rfc3339(),
            ])?;
        }
        csv_writer.flush()?;
        drop(csv_writer);

        fs::rename(&temp_path, &file_path)?;
        Ok(())
    }

    /// Read every status file in the statuses directory
    fn read_all_statuses(&self) -> Result<Vec<DistributionStatus>> {
        let dir = self.connection.statuses_directory();
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut all = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) == Some("csv") {
                all.extend(self.read_statuses_file(&path)?);
            }
        }
        Ok(all)
    }
}

impl DistributionStatusStorage for DistributionStatusRepository {
    fn insert_statuses(&self, statuses: &[DistributionStatus]) -> Result<u32> {
        if statuses.is_empty() {
            return Ok(0);
        }
        let assignment_id = statuses[0].assignment_id.clone();
        if statuses.iter().any(|s| s.assignment_id != assignment_id) {
            return Err(anyhow!("Batch insert spans more than one assignment"));
        }

        self.connection.with_status_lock(|| {
            let mut existing = self.read_statuses(&assignment_id)?;
            let existing_couples: HashSet<String> =
                existing.iter().map(|s| s.couple_id.clone()).collect();

            let mut inserted = 0u32;
            for status in statuses {
                if existing_couples.contains(&status.couple_id) {
                    debug!(
                        "Skipping existing status for {} / {}",
                        status.assignment_id, status.couple_id
                    );
                    continue;
                }
                existing.push(status.clone());
                inserted += 1;
            }

            if inserted > 0 {
                self.write_statuses(&assignment_id, &existing)?;
            }
            info!(
                "Inserted {} of {} status records for {}",
                inserted,
                statuses.len(),
                assignment_id
            );
            Ok(inserted)
        })
    }

    fn get_status(
        &self,
        assignment_id: &str,
        couple_id: &str,
    ) -> Result<Option<DistributionStatus>> {
        let statuses = self.read_statuses(assignment_id)?;
        Ok(statuses.into_iter().find(|s| s.couple_id == couple_id))
    }

    fn list_for_assignment(&self, assignment_id: &str) -> Result<Vec<DistributionStatus>> {
        let mut statuses = self.read_statuses(assignment_id)?;
        statuses.sort_by(|a, b| a.couple_id.cmp(&b.couple_id));
        Ok(statuses)
    }

    fn list_for_couple(&self, couple_id: &str) -> Result<Vec<DistributionStatus>> {
        let all = self.read_all_statuses()?;
        Ok(all.into_iter().filter(|s| s.couple_id == couple_id).collect())
    }

    fn update_status(&self, status: &DistributionStatus) -> Result<()> {
        self.connection.with_status_lock(|| {
            let mut statuses = self.read_statuses(&status.assignment_id)?;
            let slot = statuses
                .iter_mut()
                .find(|s| s.id == status.id)
                .ok_or_else(|| anyhow!("Status not found for update: {}", status.id))?;
            *slot = status.clone();
            self.write_statuses(&status.assignment_id, &statuses)
        })
    }

    fn delete_for_assignment(&self, assignment_id: &str) -> Result<u32> {
        self.connection.with_status_lock(|| {
            let count = self.read_statuses(assignment_id)?.len() as u32;
            let path = self.connection.status_file_path(assignment_id);
            if path.exists() {
                fs::remove_file(&path)?;
                info!("Deleted {} status records for {}", count, assignment_id);
            }
            Ok(count)
        })
    }

    fn delete_for_couple(&self, couple_id: &str) -> Result<u32> {
        self.connection.with_status_lock(|| {
            let mut deleted = 0u32;
            // Group by assignment so each file is rewritten once
            let all = self.read_all_statuses()?;
            let mut assignment_ids: Vec<String> =
                all.iter().map(|s| s.assignment_id.clone()).collect();
            assignment_ids.sort();
            assignment_ids.dedup();

            for assignment_id in assignment_ids {
                let mut statuses = self.read_statuses(&assignment_id)?;
                let before = statuses.len();
                statuses.retain(|s| s.couple_id != couple_id);
                if statuses.len() != before {
                    deleted += (before - statuses.len()) as u32;
                    self.write_statuses(&assignment_id, &statuses)?;
                }
            }
            if deleted > 0 {
                info!("Deleted {} status records for couple {}", deleted, couple_id);
            }
            Ok(deleted)
        })
    }
}
