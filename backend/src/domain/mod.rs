pub mod assignment_service;
pub mod coach_service;
pub mod commands;
pub mod couple_service;
pub mod distribution_service;
pub mod models;
pub mod permissions;

pub use assignment_service::AssignmentService;
pub use coach_service::CoachService;
pub use couple_service::CoupleService;
pub use distribution_service::{DistributionError, DistributionService};

use std::sync::atomic::{AtomicU64, Ordering};

static LAST_ID_MILLIS: AtomicU64 = AtomicU64::new(0);

/// Millisecond timestamp for ID generation, bumped past the previous value
/// so two creates in the same millisecond still get distinct IDs.
pub(crate) fn next_id_millis() -> u64 {
    let now = chrono::Utc::now().timestamp_millis() as u64;
    let mut prev = LAST_ID_MILLIS.load(Ordering::SeqCst);
    loop {
        let next = now.max(prev + 1);
        match LAST_ID_MILLIS.compare_exchange(prev, next, Ordering::SeqCst, Ordering::SeqCst) {
            Ok(_) => return next,
            Err(actual) => prev = actual,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::next_id_millis;

    #[test]
    fn test_next_id_millis_is_strictly_increasing() {
        let a = next_id_millis();
        let b = next_id_millis();
        let c = next_id_millis();
        assert!(a < b && b < c);
    }
}
