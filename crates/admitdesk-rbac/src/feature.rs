//! Dashboard capability areas subject to access control.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// A dashboard feature. The same set keys both the permission table and the
/// minimum-role table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Feature {
    Students,
    Staff,
    Universities,
    Applications,
    Documents,
    Messages,
    Support,
    Analytics,
    Permissions,
    Settings,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown feature '{0}'")]
pub struct UnknownFeature(pub String);

impl Feature {
    pub const ALL: [Feature; 10] = [
        Feature::Students,
        Feature::Staff,
        Feature::Universities,
        Feature::Applications,
        Feature::Documents,
        Feature::Messages,
        Feature::Support,
        Feature::Analytics,
        Feature::Permissions,
        Feature::Settings,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Feature::Students => "students",
            Feature::Staff => "staff",
            Feature::Universities => "universities",
            Feature::Applications => "applications",
            Feature::Documents => "documents",
            Feature::Messages => "messages",
            Feature::Support => "support",
            Feature::Analytics => "analytics",
            Feature::Permissions => "permissions",
            Feature::Settings => "settings",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Feature {
    type Err = UnknownFeature;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Feature::ALL
            .into_iter()
            .find(|feature| feature.as_str() == wanted)
            .ok_or_else(|| UnknownFeature(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_every_feature() {
        for feature in Feature::ALL {
            assert_eq!(feature.as_str().parse::<Feature>(), Ok(feature));
        }
    }

    #[test]
    fn test_parse_unknown_feature() {
        assert_eq!(
            "billing".parse::<Feature>(),
            Err(UnknownFeature("billing".to_string()))
        );
    }

    #[test]
    fn test_serde_uses_lowercase_names() {
        let json = serde_json::to_string(&Feature::Universities).unwrap();
        assert_eq!(json, r#""universities""#);
    }
}
