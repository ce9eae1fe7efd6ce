//! Role-based capability table.
//!
//! A static map from role to boolean capability flags; the REST layer checks
//! these before running mutating operations. The session provider supplies
//! the role, authentication itself happens upstream.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Coach,
    Couple,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Coach => "coach",
            Role::Couple => "couple",
        }
    }

    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "coach" => Ok(Role::Coach),
            "couple" => Ok(Role::Couple),
            _ => Err(format!("Unknown role: {}", s)),
        }
    }
}

/// Capability flags for one role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Permissions {
    pub manage_assignments: bool,
    pub manage_couples: bool,
    pub manage_coaches: bool,
    pub distribute_assignments: bool,
    pub view_all_progress: bool,
    pub view_assigned_progress: bool,
    pub submit_homework: bool,
}

/// Look up the capability flags for a role
pub fn for_role(role: Role) -> Permissions {
    match role {
        Role::Admin => Permissions {
            manage_assignments: true,
            manage_couples: true,
            manage_coaches: true,
            distribute_assignments: true,
            view_all_progress: true,
            view_assigned_progress: true,
            submit_homework: false,
        },
        Role::Coach => Permissions {
            manage_assignments: false,
            manage_couples: false,
            manage_coaches: false,
            distribute_assignments: true,
            view_all_progress: false,
            view_assigned_progress: true,
            submit_homework: false,
        },
        Role::Couple => Permissions {
            manage_assignments: false,
            manage_couples: false,
            manage_coaches: false,
            distribute_assignments: false,
            view_all_progress: false,
            view_assigned_progress: false,
            submit_homework: true,
        },
    }
}
