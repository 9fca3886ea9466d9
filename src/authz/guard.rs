//! Route guard composition: statically-typed capability descriptors attached
//! at route registration. The guard resolves path-parameter placeholders into
//! literal resource ids (pure string substitution, never a pattern) before
//! handing the check list to the engine.

use std::collections::HashMap;

use crate::error::{AppError, AppResult};

use super::engine::Engine;
use super::model::{ActionType, BypassRole, CapabilityCheck, CheckMode, ResourceType, UserId};

/// One declared requirement on a protected operation. `resource_param` names
/// the request path parameter carrying the instance id; absent means a
/// type-level check.
#[derive(Debug, Clone, Copy)]
pub struct CapabilityDecl {
    pub resource: ResourceType,
    pub action: ActionType,
    pub resource_param: Option<&'static str>,
}

impl CapabilityDecl {
    pub const fn type_level(resource: ResourceType, action: ActionType) -> Self {
        Self { resource, action, resource_param: None }
    }

    pub const fn instance(resource: ResourceType, action: ActionType, param: &'static str) -> Self {
        Self { resource, action, resource_param: Some(param) }
    }
}

/// The full declaration attached to one protected operation: the required
/// checks, how they combine, and an optional bypass-role threshold.
#[derive(Debug, Clone)]
pub struct GuardSpec {
    pub checks: Vec<CapabilityDecl>,
    pub mode: CheckMode,
    pub bypass: Option<BypassRole>,
}

impl GuardSpec {
    pub fn all(checks: Vec<CapabilityDecl>) -> Self {
        Self { checks, mode: CheckMode::All, bypass: None }
    }

    pub fn any(checks: Vec<CapabilityDecl>) -> Self {
        Self { checks, mode: CheckMode::Any, bypass: None }
    }

    pub fn with_bypass(mut self, threshold: BypassRole) -> Self {
        self.bypass = Some(threshold);
        self
    }

    /// Substitute each declared `resource_param` from the request's path
    /// parameters. A missing parameter is a caller error, not a denial.
    pub fn resolve(&self, params: &HashMap<String, String>) -> AppResult<Vec<CapabilityCheck>> {
        let mut out = Vec::with_capacity(self.checks.len());
        for decl in &self.checks {
            let resource_id = match decl.resource_param {
                None => None,
                Some(name) => Some(
                    params
                        .get(name)
                        .cloned()
                        .ok_or_else(|| {
                            AppError::user(
                                "missing_path_param",
                                format!("path parameter '{}' not present on request", name),
                            )
                        })?,
                ),
            };
            out.push(CapabilityCheck { action: decl.action, resource: decl.resource, resource_id });
        }
        Ok(out)
    }

    /// Resolve and enforce in one step; denial surfaces as `AppError::Auth`.
    pub fn enforce(
        &self,
        engine: &Engine,
        user: &UserId,
        params: &HashMap<String, String>,
    ) -> AppResult<()> {
        let checks = self.resolve(params)?;
        engine.require(user, &checks, self.mode, self.bypass)
    }
}
