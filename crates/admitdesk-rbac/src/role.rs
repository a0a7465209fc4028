//! Staff roles and their privilege ordering.
//!
//! Roles are totally ordered from lowest to highest privilege:
//!
//! ```text
//! sales < manager < chief < admin
//! ```
//!
//! Role names arrive from the auth provider and the profile store as plain
//! strings. They are parsed once, at the ingestion boundary, into an
//! [`AssignedRole`] so that an unrecognized value is carried explicitly
//! instead of being trusted as a string everywhere else.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// A staff role, ordered by privilege.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Sales,
    Manager,
    Chief,
    Admin,
}

/// Every role, lowest privilege first. A role's index is its rank.
pub const ROLE_HIERARCHY: [Role; 4] = [Role::Sales, Role::Manager, Role::Chief, Role::Admin];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown role '{0}'")]
pub struct UnknownRole(pub String);

impl Role {
    /// The least privileged role. Unrecognized roles fall back to its table.
    pub const LOWEST: Role = Role::Sales;

    /// Position of the role in [`ROLE_HIERARCHY`].
    pub fn rank(self) -> usize {
        match self {
            Role::Sales => 0,
            Role::Manager => 1,
            Role::Chief => 2,
            Role::Admin => 3,
        }
    }

    pub fn is_higher_than(self, other: Role) -> bool {
        self.rank() > other.rank()
    }

    /// Whether this role ranks at or above `minimum`.
    pub fn meets(self, minimum: Role) -> bool {
        self.rank() >= minimum.rank()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Sales => "sales",
            Role::Manager => "manager",
            Role::Chief => "chief",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sales" => Ok(Role::Sales),
            "manager" => Ok(Role::Manager),
            "chief" => Ok(Role::Chief),
            "admin" => Ok(Role::Admin),
            _ => Err(UnknownRole(s.to_string())),
        }
    }
}

/// A role as assigned to a user by an external system.
///
/// `Unrecognized` keeps the raw value for logging and display. It has no rank:
/// it sorts below every [`Role`] and is never "higher than" anything.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AssignedRole {
    Known(Role),
    Unrecognized(String),
}

impl AssignedRole {
    pub fn parse(raw: &str) -> Self {
        match raw.parse::<Role>() {
            Ok(role) => AssignedRole::Known(role),
            Err(_) => AssignedRole::Unrecognized(raw.to_string()),
        }
    }

    pub fn known(&self) -> Option<Role> {
        match self {
            AssignedRole::Known(role) => Some(*role),
            AssignedRole::Unrecognized(_) => None,
        }
    }

    /// Rank in the hierarchy; `None` ranks below every `Some`.
    pub fn rank(&self) -> Option<usize> {
        self.known().map(Role::rank)
    }

    pub fn as_str(&self) -> &str {
        match self {
            AssignedRole::Known(role) => role.as_str(),
            AssignedRole::Unrecognized(raw) => raw,
        }
    }
}

impl From<Role> for AssignedRole {
    fn from(role: Role) -> Self {
        AssignedRole::Known(role)
    }
}

impl From<String> for AssignedRole {
    fn from(raw: String) -> Self {
        AssignedRole::parse(&raw)
    }
}

impl From<AssignedRole> for String {
    fn from(role: AssignedRole) -> Self {
        role.as_str().to_string()
    }
}

impl fmt::Display for AssignedRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
