//! Per-feature permission entries and the actions they grant.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::feature::Feature;

/// An action a permission entry can grant. Wire names match the entry's
/// field names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum Action {
    #[serde(rename = "can_view")]
    View,
    #[serde(rename = "can_edit")]
    Edit,
    #[serde(rename = "can_delete")]
    Delete,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown action '{0}'")]
pub struct UnknownAction(pub String);

impl Action {
    pub const ALL: [Action; 3] = [Action::View, Action::Edit, Action::Delete];

    pub fn as_str(self) -> &'static str {
        match self {
            Action::View => "can_view",
            Action::Edit => "can_edit",
            Action::Delete => "can_delete",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = UnknownAction;

    /// Accepts both the wire name (`can_edit`) and the bare verb (`edit`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        let verb = wanted.strip_prefix("can_").unwrap_or(&wanted);
        match verb {
            "view" => Ok(Action::View),
            "edit" => Ok(Action::Edit),
            "delete" => Ok(Action::Delete),
            _ => Err(UnknownAction(s.to_string())),
        }
    }
}

/// The view/edit/delete triple granted to a role for one feature.
///
/// `can_edit` and `can_delete` do not imply `can_view`; each flag is read
/// independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub struct Permission {
    pub feature: Feature,
    pub can_view: bool,
    pub can_edit: bool,
    pub can_delete: bool,
}

impl Permission {
    pub const fn new(feature: Feature, can_view: bool, can_edit: bool, can_delete: bool) -> Self {
        Self {
            feature,
            can_view,
            can_edit,
            can_delete,
        }
    }

    pub fn allows(&self, action: Action) -> bool {
        match action {
            Action::View => self.can_view,
            Action::Edit => self.can_edit,
            Action::Delete => self.can_delete,
        }
    }
}
