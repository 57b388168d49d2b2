//! Role model and the UI-only primary role.
//!
//! Role names must match the `user_roles.role` CHECK constraint in
//! `20260301000002_create_user_roles.sql`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A role a user holds, usually within one establishment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Student,
    Parent,
    Teacher,
    SchoolAdmin,
    SystemAdmin,
}

impl Role {
    /// Every role, highest priority first.
    pub const BY_PRIORITY: [Role; 5] = [
        Role::SystemAdmin,
        Role::SchoolAdmin,
        Role::Teacher,
        Role::Parent,
        Role::Student,
    ];

    /// Database / wire representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Student => "STUDENT",
            Role::Parent => "PARENT",
            Role::Teacher => "TEACHER",
            Role::SchoolAdmin => "SCHOOL_ADMIN",
            Role::SystemAdmin => "SYSTEM_ADMIN",
        }
    }

    /// Priority used for primary-role selection. Higher wins.
    pub fn priority(self) -> u8 {
        match self {
            Role::SystemAdmin => 5,
            Role::SchoolAdmin => 4,
            Role::Teacher => 3,
            Role::Parent => 2,
            Role::Student => 1,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "STUDENT" => Ok(Role::Student),
            "PARENT" => Ok(Role::Parent),
            "TEACHER" => Ok(Role::Teacher),
            "SCHOOL_ADMIN" => Ok(Role::SchoolAdmin),
            "SYSTEM_ADMIN" => Ok(Role::SystemAdmin),
            other => Err(format!("Unknown role '{other}'")),
        }
    }
}

/// Select the highest-priority role of a role set.
///
/// Only the frontend uses this to pick a landing dashboard; access checks
/// always test role membership directly.
pub fn primary_role<I>(roles: I) -> Option<Role>
where
    I: IntoIterator<Item = Role>,
{
    roles.into_iter().max_by_key(|r| r.priority())
}
