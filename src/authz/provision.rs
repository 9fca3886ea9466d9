//! Dynamic ACL provisioning: when an owned object is created (post, comment,
//! like, tag, view, category, file), mint a synthetic role carrying one
//! instance-scoped read-write permission and hand it to the creator. The
//! four-row chain is all-or-nothing from the caller's point of view: any
//! sub-step failure unwinds the rows already written.

use std::sync::Arc;

use crate::error::{AppError, AppResult};
use crate::store::{AssignmentRepo, PermissionRepo, RoleRepo};

use super::model::{
    ActionType, PermissionId, PermissionRecord, ResourceScope, ResourceType, RoleId, RoleRecord,
    UserId,
};

/// Deterministic name for the synthetic ownership role of one object.
/// Uniqueness is not enforced: every provisioning call mints a fresh row.
pub fn owner_role_name(kind: ResourceType, resource_id: &str) -> String {
    format!("{}:{}:owner", kind.as_str(), resource_id)
}

/// The rows minted for one ownership grant.
#[derive(Debug, Clone)]
pub struct OwnershipGrant {
    pub role: RoleRecord,
    pub permission: PermissionRecord,
}

pub struct Provisioner {
    roles: Arc<dyn RoleRepo>,
    permissions: Arc<dyn PermissionRepo>,
    assignments: Arc<dyn AssignmentRepo>,
}

impl Provisioner {
    pub fn new(
        roles: Arc<dyn RoleRepo>,
        permissions: Arc<dyn PermissionRepo>,
        assignments: Arc<dyn AssignmentRepo>,
    ) -> Self {
        Self { roles, permissions, assignments }
    }

    /// Mint role + instance-scoped read-write permission + both links for the
    /// creator of `resource_id`. On any failure every row already written in
    /// this call is removed before the error surfaces.
    pub fn provision_ownership(
        &self,
        creator: &UserId,
        kind: ResourceType,
        resource_id: &str,
    ) -> AppResult<OwnershipGrant> {
        let role_name = owner_role_name(kind, resource_id);
        let role = self
            .roles
            .create_role(Some(&role_name), Some("ownership grant"))
            .map_err(|e| provision_err("role", &e))?;

        let permission = match self.permissions.create_permission(
            &role_name,
            ActionType::ReadWrite,
            kind,
            ResourceScope::Exact(resource_id.to_string()),
            None,
        ) {
            Ok(p) => p,
            Err(e) => {
                self.unwind(Some(role.id), None);
                return Err(provision_err("permission", &e));
            }
        };

        if let Err(e) = self.assignments.grant_permission(role.id, permission.id) {
            self.unwind(Some(role.id), Some(permission.id));
            return Err(provision_err("role_permission_link", &e));
        }
        if let Err(e) = self.assignments.assign_role(creator, role.id) {
            self.unwind(Some(role.id), Some(permission.id));
            return Err(provision_err("user_role_link", &e));
        }

        tracing::debug!(
            target: "authgate",
            user = %creator.0,
            role = %role.id.0,
            resource = kind.as_str(),
            id = resource_id,
            "ownership provisioned"
        );
        Ok(OwnershipGrant { role, permission })
    }

    /// Run the caller's resource write and the ownership provisioning as one
    /// logical unit. If the write fails nothing has been provisioned; if
    /// provisioning fails, `undo` removes the resource row so no orphaned
    /// resource survives.
    pub fn create_owned<T>(
        &self,
        creator: &UserId,
        kind: ResourceType,
        resource_id: &str,
        write: impl FnOnce() -> AppResult<T>,
        undo: impl FnOnce(&T),
    ) -> AppResult<(T, OwnershipGrant)> {
        let resource = write()?;
        match self.provision_ownership(creator, kind, resource_id) {
            Ok(grant) => Ok((resource, grant)),
            Err(e) => {
                undo(&resource);
                Err(e)
            }
        }
    }

    // Best-effort reverse-order cleanup. Deleting the catalog rows cascades
    // whichever link rows were written.
    fn unwind(&self, role: Option<RoleId>, permission: Option<PermissionId>) {
        if let Some(p) = permission {
            if let Err(e) = self.permissions.delete_permission(p) {
                tracing::warn!(target: "authgate", "unwind: permission {} not removed: {}", p.0, e);
            }
        }
        if let Some(r) = role {
            if let Err(e) = self.roles.delete_role(r) {
                tracing::warn!(target: "authgate", "unwind: role {} not removed: {}", r.0, e);
            }
        }
    }
}

fn provision_err(step: &str, cause: &AppError) -> AppError {
    AppError::provisioning(
        "provision_failed",
        format!("ownership provisioning failed at {}: {}", step, cause),
    )
}
