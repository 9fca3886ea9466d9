//! Role hierarchy comparator over the fixed bypass set
//! (member < mod < admin < superadmin).

use crate::error::AppResult;
use crate::store::AssignmentRepo;

use super::model::{BypassRole, RoleRecord, UserId};

/// Rank lookup for a role name. Names outside the bypass set (including every
/// synthetic per-resource role) carry no rank.
pub fn bypass_rank(role_name: &str) -> Option<u8> {
    BypassRole::from_name(role_name).map(|r| r.rank())
}

/// Maximum bypass rank across a role set; 0 when no held role is a named
/// bypass role.
pub fn max_bypass_rank(roles: &[RoleRecord]) -> u8 {
    roles
        .iter()
        .filter_map(|r| r.name.as_deref().and_then(bypass_rank))
        .max()
        .unwrap_or(0)
}

/// True iff `a` strictly outranks `b`. A user holding no roles whatsoever can
/// never outrank anyone, and nobody is judged higher than a roleless user
/// either, so privileged actions against unprivileged targets stay denied by
/// default.
pub fn is_higher(assignments: &dyn AssignmentRepo, a: &UserId, b: &UserId) -> AppResult<bool> {
    let roles_a = assignments.roles_for_user(a)?;
    let roles_b = assignments.roles_for_user(b)?;
    if roles_a.is_empty() || roles_b.is_empty() {
        return Ok(false);
    }
    Ok(max_bypass_rank(&roles_a) > max_bypass_rank(&roles_b))
}

/// Membership test, not a rank comparison: holds a role literally named
/// "admin" or "superadmin".
pub fn is_admin(assignments: &dyn AssignmentRepo, user: &UserId) -> AppResult<bool> {
    let roles = assignments.roles_for_user(user)?;
    Ok(roles.iter().any(|r| {
        r.name
            .as_deref()
            .map(|n| n.eq_ignore_ascii_case("admin") || n.eq_ignore_ascii_case("superadmin"))
            .unwrap_or(false)
    }))
}
