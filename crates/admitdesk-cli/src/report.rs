use std::fmt::Write;

use admitdesk_rbac::{
    Action, AssignedRole, Feature, ROLE_HIERARCHY, Role, can_access, get_permissions_by_role,
    has_permission, min_role_for, role_permissions,
};

fn mark(granted: bool) -> &'static str {
    if granted { "yes" } else { "no" }
}

/// One role's table. Features without an entry are listed as `-`.
pub fn render_role_table(role: Role) -> String {
    let permissions = role_permissions(role);
    let mut out = String::new();

    let _ = writeln!(out, "{} (rank {})", role, role.rank());
    let _ = writeln!(out, "  {:<14}{:<6}{:<6}{:<6}", "feature", "view", "edit", "delete");
    for feature in Feature::ALL {
        match permissions.iter().find(|p| p.feature == feature) {
            Some(p) => {
                let _ = writeln!(
                    out,
                    "  {:<14}{:<6}{:<6}{:<6}",
                    feature.as_str(),
                    mark(p.can_view),
                    mark(p.can_edit),
                    mark(p.can_delete)
                );
            }
            None => {
                let _ = writeln!(out, "  {:<14}-", feature.as_str());
            }
        }
    }
    out
}

/// Every role's table, lowest role first.
pub fn render_matrix() -> String {
    ROLE_HIERARCHY
        .iter()
        .map(|&role| render_role_table(role))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Both access decisions for one role, feature and action.
pub fn render_check(role: &AssignedRole, feature: Feature, action: Action) -> String {
    let permissions = get_permissions_by_role(role);
    let min_role = min_role_for(feature)
        .map(|r| r.to_string())
        .unwrap_or_else(|| "undefined".to_string());

    let mut out = String::new();
    let _ = writeln!(out, "role:            {}", role);
    let _ = writeln!(out, "feature/action:  {} {}", feature, action);
    let _ = writeln!(out, "minimum role:    {}", min_role);
    let _ = writeln!(
        out,
        "permission table: {}",
        if has_permission(permissions, feature, action) { "allow" } else { "deny" }
    );
    let _ = writeln!(
        out,
        "role hierarchy:   {}",
        if can_access(role, permissions, feature, action) { "allow" } else { "deny" }
    );
    out
}
