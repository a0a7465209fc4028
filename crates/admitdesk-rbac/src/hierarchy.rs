//! Minimum-role gating with explicit permission overrides.
//!
//! This is a second access-control mechanism, independent from
//! [`crate::matrix`]. The two disagree when a permission list has no entry
//! for a feature: the matrix denies, [`can_access`] allows once the user's
//! role meets the feature's minimum. They are kept apart on purpose; callers
//! pick the one they mean.

use thiserror::Error;
use tracing::warn;

use crate::feature::Feature;
use crate::permission::{Action, Permission};
use crate::role::{AssignedRole, Role};

/// Minimum role required to reach each feature at all.
pub const FEATURE_MIN_ROLE: &[(Feature, Role)] = &[
    (Feature::Students, Role::Sales),
    (Feature::Staff, Role::Manager),
    (Feature::Universities, Role::Sales),
    (Feature::Applications, Role::Sales),
    (Feature::Documents, Role::Sales),
    (Feature::Messages, Role::Sales),
    (Feature::Support, Role::Sales),
    (Feature::Analytics, Role::Manager),
    (Feature::Permissions, Role::Admin),
    (Feature::Settings, Role::Chief),
];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HierarchyError {
    #[error("no minimum role defined for: {}", join_features(.0))]
    MissingMinRole(Vec<Feature>),

    #[error("minimum role defined more than once for: {}", join_features(.0))]
    DuplicateMinRole(Vec<Feature>),
}

fn join_features(features: &[Feature]) -> String {
    features
        .iter()
        .map(|feature| feature.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn min_role_in(table: &[(Feature, Role)], feature: Feature) -> Option<Role> {
    table
        .iter()
        .find(|(candidate, _)| *candidate == feature)
        .map(|(_, role)| *role)
}

pub fn min_role_for(feature: Feature) -> Option<Role> {
    min_role_in(FEATURE_MIN_ROLE, feature)
}

/// Checks that every feature has exactly one minimum-role entry.
pub fn validate_min_role_table(table: &[(Feature, Role)]) -> Result<(), HierarchyError> {
    let missing: Vec<Feature> = Feature::ALL
        .into_iter()
        .filter(|feature| min_role_in(table, *feature).is_none())
        .collect();
    if !missing.is_empty() {
        return Err(HierarchyError::MissingMinRole(missing));
    }

    let duplicated: Vec<Feature> = Feature::ALL
        .into_iter()
        .filter(|feature| table.iter().filter(|(f, _)| f == feature).count() > 1)
        .collect();
    if !duplicated.is_empty() {
        return Err(HierarchyError::DuplicateMinRole(duplicated));
    }

    Ok(())
}

/// Rank gate first, then explicit entries, then allow.
pub fn can_access(
    user_role: &AssignedRole,
    permissions: &[Permission],
    feature: Feature,
    action: Action,
) -> bool {
    can_access_with(FEATURE_MIN_ROLE, user_role, permissions, feature, action)
}

/// [`can_access`] against a caller-supplied minimum-role table.
///
/// A feature missing from `table` is denied; validate custom tables with
/// [`validate_min_role_table`] before use.
pub fn can_access_with(
    table: &[(Feature, Role)],
    user_role: &AssignedRole,
    permissions: &[Permission],
    feature: Feature,
    action: Action,
) -> bool {
    let Some(minimum) = min_role_in(table, feature) else {
        warn!(%feature, "No minimum role defined for feature, denying access");
        return false;
    };

    let Some(role) = user_role.known() else {
        return false;
    };
    if !role.meets(minimum) {
        return false;
    }

    match permissions.iter().find(|permission| permission.feature == feature) {
        Some(explicit) => explicit.allows(action),
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::{get_permissions_by_role, has_permission};
    use crate::role::ROLE_HIERARCHY;

    #[test]
    fn test_standard_table_is_complete() {
        assert_eq!(validate_min_role_table(FEATURE_MIN_ROLE), Ok(()));
    }

    #[test]
    fn test_validate_reports_missing_features() {
        let partial = &[(Feature::Students, Role::Sales), (Feature::Staff, Role::Manager)];
        match validate_min_role_table(partial) {
            Err(HierarchyError::MissingMinRole(missing)) => {
                assert_eq!(missing.len(), Feature::ALL.len() - 2);
                assert!(missing.contains(&Feature::Settings));
                assert!(!missing.contains(&Feature::Students));
            }
            other => panic!("expected missing features, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_reports_duplicates() {
        let mut table = FEATURE_MIN_ROLE.to_vec();
        table.push((Feature::Staff, Role::Admin));
        assert_eq!(
            validate_min_role_table(&table),
            Err(HierarchyError::DuplicateMinRole(vec![Feature::Staff]))
        );
    }

    #[test]
    fn test_empty_overrides_follow_rank_only() {
        for role in ROLE_HIERARCHY {
            for feature in Feature::ALL {
                let minimum = min_role_for(feature).unwrap();
                for action in Action::ALL {
                    assert_eq!(
                        can_access(&role.into(), &[], feature, action),
                        role.rank() >= minimum.rank(),
                        "{role} {feature} {action}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_rank_below_minimum_denies_despite_override() {
        let overrides = [Permission::new(Feature::Settings, true, true, true)];
        assert!(!can_access(&Role::Manager.into(), &overrides, Feature::Settings, Action::View));
    }

    #[test]
    fn test_explicit_false_denies() {
        let overrides = [Permission::new(Feature::Students, true, false, false)];
        let role = Role::Admin.into();
        assert!(can_access(&role, &overrides, Feature::Students, Action::View));
        assert!(!can_access(&role, &overrides, Feature::Students, Action::Edit));
        assert!(!can_access(&role, &overrides, Feature::Students, Action::Delete));
    }

    #[test]
    fn test_missing_entry_allows_where_matrix_denies() {
        let role: AssignedRole = Role::Manager.into();
        let permissions = get_permissions_by_role(&role);

        // With the analytics entry present both mechanisms deny editing.
        assert!(!has_permission(permissions, Feature::Analytics, Action::Edit));
        assert!(!can_access(&role, permissions, Feature::Analytics, Action::Edit));

        let without_analytics: Vec<Permission> = permissions
            .iter()
            .copied()
            .filter(|p| p.feature != Feature::Analytics)
            .collect();
        // Without it the matrix still denies, the rank gate alone allows.
        assert!(!has_permission(&without_analytics, Feature::Analytics, Action::Edit));
        assert!(can_access(&role, &without_analytics, Feature::Analytics, Action::Edit));
    }

    #[test]
    fn test_unrecognized_role_is_always_denied() {
        let unknown = AssignedRole::parse("temp");
        for feature in Feature::ALL {
            assert!(!can_access(&unknown, &[], feature, Action::View));
        }
    }

    #[test]
    fn test_custom_table_missing_feature_denies() {
        let table = &[(Feature::Students, Role::Sales)];
        let role = Role::Admin.into();
        assert!(can_access_with(table, &role, &[], Feature::Students, Action::View));
        assert!(!can_access_with(table, &role, &[], Feature::Staff, Action::View));
    }
}
