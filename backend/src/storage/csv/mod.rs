//! # CSV Storage Module
//!
//! File-based storage implementation for the ministry tracker. Entities live
//! as flat CSV files under the data directory:
//!
//! ```text
//! assignments.csv
//! couples.csv
//! coaches.csv
//! statuses/<assignment>.csv   one file per distributed assignment
//! ```
//!
//! Every write replaces the target file atomically (temp file + rename).
//! Status inserts are insert-if-absent under the connection's write lock,
//! which is where the one-status-per-(assignment, couple) invariant is
//! enforced.

pub mod assignment_repository;
pub mod coach_repository;
pub mod connection;
pub mod couple_repository;
pub mod distribution_status_repository;

pub use assignment_repository::AssignmentRepository;
pub use coach_repository::CoachRepository;
pub use connection::CsvConnection;
pub use couple_repository::CoupleRepository;
pub use distribution_status_repository::DistributionStatusRepository;
