//! Repository traits over the roles/permissions catalogs and their join
//! tables. The engine and provisioner receive these as injected handles;
//! process wiring owns the concrete store. All operations are synchronous
//! point reads/writes on the request path.

pub mod memory;

use crate::authz::model::{
    ActionType, PermissionId, PermissionRecord, ResourceScope, ResourceType, RoleId, RoleRecord,
    UserId,
};
use crate::error::AppResult;

pub trait RoleRepo: Send + Sync {
    fn create_role(&self, name: Option<&str>, description: Option<&str>) -> AppResult<RoleRecord>;
    fn get_role(&self, id: RoleId) -> AppResult<Option<RoleRecord>>;
    fn list_roles(&self) -> AppResult<Vec<RoleRecord>>;
    fn update_role(&self, id: RoleId, description: Option<&str>) -> AppResult<RoleRecord>;
    /// Delete a role and cascade its user/permission link rows.
    fn delete_role(&self, id: RoleId) -> AppResult<()>;
}

pub trait PermissionRepo: Send + Sync {
    fn create_permission(
        &self,
        name: &str,
        action: ActionType,
        resource: ResourceType,
        scope: ResourceScope,
        description: Option<&str>,
    ) -> AppResult<PermissionRecord>;
    fn get_permission(&self, id: PermissionId) -> AppResult<Option<PermissionRecord>>;
    fn list_permissions(&self) -> AppResult<Vec<PermissionRecord>>;
    /// Delete a permission and cascade its role link rows.
    fn delete_permission(&self, id: PermissionId) -> AppResult<()>;
}

/// The two many-to-many join tables: user_roles and role_permissions.
/// Missing referents surface as NotFound; duplicate links as Conflict
/// (composite-key semantics).
pub trait AssignmentRepo: Send + Sync {
    fn assign_role(&self, user: &UserId, role: RoleId) -> AppResult<()>;
    fn revoke_role(&self, user: &UserId, role: RoleId) -> AppResult<()>;
    /// Complete role set held by the user. No pagination short-cuts: a
    /// missing role silently under-authorizes.
    fn roles_for_user(&self, user: &UserId) -> AppResult<Vec<RoleRecord>>;
    fn grant_permission(&self, role: RoleId, permission: PermissionId) -> AppResult<()>;
    fn revoke_permission(&self, role: RoleId, permission: PermissionId) -> AppResult<()>;
    fn permissions_for_role(&self, role: RoleId) -> AppResult<Vec<PermissionRecord>>;
}

/// Moderation flags consulted by privileged workflows (ban).
pub trait ModerationRepo: Send + Sync {
    /// Idempotent: returns true when the user was newly banned, false when
    /// already banned.
    fn mark_banned(&self, user: &UserId) -> AppResult<bool>;
    fn is_banned(&self, user: &UserId) -> AppResult<bool>;
}

/// Find a role by exact name or create it. Used to seed the named bypass
/// roles at startup; safe to re-run.
pub fn ensure_named_role(roles: &dyn RoleRepo, name: &str) -> AppResult<RoleRecord> {
    if let Some(existing) = roles
        .list_roles()?
        .into_iter()
        .find(|r| r.name.as_deref() == Some(name))
    {
        return Ok(existing);
    }
    roles.create_role(Some(name), None)
}
