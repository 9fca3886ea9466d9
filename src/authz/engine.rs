//! The core grant/deny decision procedure. Loads roles and permissions
//! eagerly per call rather than caching, trading request latency for
//! correctness under role/permission churn; every decision is a consistent
//! snapshot taken at the start of the call.

use std::sync::Arc;

use crate::error::{AppError, AppResult};
use crate::store::AssignmentRepo;

use super::hierarchy::max_bypass_rank;
use super::hooks::{emit_post_auth, AuthEvent};
use super::model::{BypassRole, CapabilityCheck, CheckMode, PermissionRecord, UserId};

/// The decision value. Denial is not an error; callers pick between this and
/// the `require` adapter.
#[derive(Debug, Clone, serde::Serialize, PartialEq, Eq)]
pub struct Decision {
    pub allow: bool,
    pub reason: Option<String>,
}

impl Decision {
    fn allowed(reason: &str) -> Self {
        Decision { allow: true, reason: Some(reason.into()) }
    }

    fn denied(reason: &str) -> Self {
        Decision { allow: false, reason: Some(reason.into()) }
    }
}

pub struct Engine {
    assignments: Arc<dyn AssignmentRepo>,
}

impl Engine {
    pub fn new(assignments: Arc<dyn AssignmentRepo>) -> Self {
        Self { assignments }
    }

    /// Resolve whether `user` holds the required capabilities.
    ///
    /// 1. Load the user's complete role set.
    /// 2. If a bypass threshold is declared and the user's maximum bypass
    ///    rank meets or exceeds it (`>=`, inclusive), short-circuit to allow.
    /// 3. Otherwise union the permissions of every held role and test each
    ///    check for coverage, combined per `mode` (ALL conjunctive, ANY
    ///    disjunctive).
    ///
    /// Repository failures propagate as errors, never as an allow.
    pub fn authorize(
        &self,
        user: &UserId,
        checks: &[CapabilityCheck],
        mode: CheckMode,
        bypass: Option<BypassRole>,
    ) -> AppResult<Decision> {
        let roles = self.assignments.roles_for_user(user)?;

        if let Some(threshold) = bypass {
            if max_bypass_rank(&roles) >= threshold.rank() {
                let d = Decision::allowed(&format!("bypass_{}", threshold.name()));
                self.finish(user, checks, mode, &d);
                return Ok(d);
            }
        }

        let mut permissions: Vec<PermissionRecord> = Vec::new();
        for role in &roles {
            permissions.extend(self.assignments.permissions_for_role(role.id)?);
        }

        let covered = |c: &CapabilityCheck| {
            permissions.iter().any(|p| {
                p.action.satisfies(c.action)
                    && p.resource == c.resource
                    && p.scope.covers(c.resource_id.as_deref())
            })
        };
        let ok = match mode {
            CheckMode::All => checks.iter().all(covered),
            CheckMode::Any => checks.iter().any(covered),
        };

        let d = if ok {
            Decision::allowed("permission_match")
        } else if roles.is_empty() {
            Decision::denied("no_roles")
        } else {
            Decision::denied("no_covering_permission")
        };
        self.finish(user, checks, mode, &d);
        Ok(d)
    }

    /// Exception-style adapter: maps a denial to `AppError::Auth`.
    pub fn require(
        &self,
        user: &UserId,
        checks: &[CapabilityCheck],
        mode: CheckMode,
        bypass: Option<BypassRole>,
    ) -> AppResult<()> {
        let d = self.authorize(user, checks, mode, bypass)?;
        if d.allow {
            Ok(())
        } else {
            Err(AppError::auth(
                "unauthorized",
                format!(
                    "user {} denied ({})",
                    user.0,
                    d.reason.as_deref().unwrap_or("no_reason")
                ),
            ))
        }
    }

    fn finish(&self, user: &UserId, checks: &[CapabilityCheck], mode: CheckMode, decision: &Decision) {
        tracing::debug!(
            target: "authgate",
            user = %user.0,
            checks = checks.len(),
            ?mode,
            allow = decision.allow,
            reason = decision.reason.as_deref().unwrap_or(""),
            "authorize"
        );
        emit_post_auth(&AuthEvent {
            user: user.clone(),
            checks: checks.to_vec(),
            mode,
            decision: decision.clone(),
        });
    }
}
