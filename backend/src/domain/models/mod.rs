pub mod assignment;
pub mod coach;
pub mod couple;
pub mod distribution_status;
