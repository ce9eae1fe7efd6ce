//! Ministry tracker backend.
//!
//! Layers, top to bottom:
//! - `rest`: axum handlers translating HTTP + DTOs to domain commands
//! - `domain`: services, commands, models, the role capability table
//! - `storage`: entity traits and their CSV file implementations

pub mod config;
pub mod domain;
pub mod rest;
pub mod storage;

use std::path::Path;

use anyhow::Result;

use crate::domain::{AssignmentService, CoachService, CoupleService, DistributionService};
use crate::rest::AppState;
use crate::storage::csv::CsvConnection;

/// Wire every service over one CSV connection rooted at `data_directory`.
pub fn build_state<P: AsRef<Path>>(data_directory: P) -> Result<AppState> {
    let connection = CsvConnection::new(data_directory)?;
    Ok(AppState {
        assignment_service: AssignmentService::new(connection.clone()),
        couple_service: CoupleService::new(connection.clone()),
        coach_service: CoachService::new(connection.clone()),
        distribution_service: DistributionService::new(connection),
    })
}
