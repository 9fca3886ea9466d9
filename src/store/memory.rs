//! In-memory store backing all repository traits. Catalog rows live in maps
//! guarded by a single RwLock; the join tables are plain hash sets keyed by
//! the composite ids, mirroring the SQL layout
//! (user_roles(user_id, role_id), role_permissions(role_id, permission_id)).

use std::collections::{HashMap, HashSet};

use chrono::Utc;
use parking_lot::RwLock;
use uuid::Uuid;

use crate::authz::model::{
    ActionType, PermissionId, PermissionRecord, ResourceScope, ResourceType, RoleId, RoleRecord,
    UserId,
};
use crate::error::{AppError, AppResult};

use super::{AssignmentRepo, ModerationRepo, PermissionRepo, RoleRepo};

#[derive(Default)]
struct Inner {
    roles: HashMap<RoleId, RoleRecord>,
    permissions: HashMap<PermissionId, PermissionRecord>,
    user_roles: HashSet<(UserId, RoleId)>,
    role_permissions: HashSet<(RoleId, PermissionId)>,
    banned: HashSet<UserId>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn role_not_found(id: RoleId) -> AppError {
    AppError::not_found("role_not_found", format!("role {} does not exist", id.0))
}

fn permission_not_found(id: PermissionId) -> AppError {
    AppError::not_found("permission_not_found", format!("permission {} does not exist", id.0))
}

impl RoleRepo for MemoryStore {
    fn create_role(&self, name: Option<&str>, description: Option<&str>) -> AppResult<RoleRecord> {
        let rec = RoleRecord {
            id: RoleId(Uuid::new_v4()),
            name: name.map(|s| s.to_string()),
            description: description.map(|s| s.to_string()),
            created_at: Utc::now(),
        };
        self.inner.write().roles.insert(rec.id, rec.clone());
        Ok(rec)
    }

    fn get_role(&self, id: RoleId) -> AppResult<Option<RoleRecord>> {
        Ok(self.inner.read().roles.get(&id).cloned())
    }

    fn list_roles(&self) -> AppResult<Vec<RoleRecord>> {
        Ok(self.inner.read().roles.values().cloned().collect())
    }

    fn update_role(&self, id: RoleId, description: Option<&str>) -> AppResult<RoleRecord> {
        let mut g = self.inner.write();
        let rec = g.roles.get_mut(&id).ok_or_else(|| role_not_found(id))?;
        rec.description = description.map(|s| s.to_string());
        Ok(rec.clone())
    }

    fn delete_role(&self, id: RoleId) -> AppResult<()> {
        let mut g = self.inner.write();
        if g.roles.remove(&id).is_none() {
            return Err(role_not_found(id));
        }
        // Cascade both link tables
        g.user_roles.retain(|(_, r)| *r != id);
        g.role_permissions.retain(|(r, _)| *r != id);
        Ok(())
    }
}

impl PermissionRepo for MemoryStore {
    fn create_permission(
        &self,
        name: &str,
        action: ActionType,
        resource: ResourceType,
        scope: ResourceScope,
        description: Option<&str>,
    ) -> AppResult<PermissionRecord> {
        let rec = PermissionRecord {
            id: PermissionId(Uuid::new_v4()),
            name: name.to_string(),
            action,
            resource,
            scope,
            description: description.map(|s| s.to_string()),
            created_at: Utc::now(),
        };
        self.inner.write().permissions.insert(rec.id, rec.clone());
        Ok(rec)
    }

    fn get_permission(&self, id: PermissionId) -> AppResult<Option<PermissionRecord>> {
        Ok(self.inner.read().permissions.get(&id).cloned())
    }

    fn list_permissions(&self) -> AppResult<Vec<PermissionRecord>> {
        Ok(self.inner.read().permissions.values().cloned().collect())
    }

    fn delete_permission(&self, id: PermissionId) -> AppResult<()> {
        let mut g = self.inner.write();
        if g.permissions.remove(&id).is_none() {
            return Err(permission_not_found(id));
        }
        g.role_permissions.retain(|(_, p)| *p != id);
        Ok(())
    }
}

impl AssignmentRepo for MemoryStore {
    fn assign_role(&self, user: &UserId, role: RoleId) -> AppResult<()> {
        let mut g = self.inner.write();
        if !g.roles.contains_key(&role) {
            return Err(role_not_found(role));
        }
        if !g.user_roles.insert((user.clone(), role)) {
            return Err(AppError::conflict(
                "role_already_assigned",
                format!("user {} already holds role {}", user.0, role.0),
            ));
        }
        Ok(())
    }

    fn revoke_role(&self, user: &UserId, role: RoleId) -> AppResult<()> {
        let mut g = self.inner.write();
        if !g.user_roles.remove(&(user.clone(), role)) {
            return Err(AppError::not_found(
                "assignment_not_found",
                format!("user {} does not hold role {}", user.0, role.0),
            ));
        }
        Ok(())
    }

    fn roles_for_user(&self, user: &UserId) -> AppResult<Vec<RoleRecord>> {
        let g = self.inner.read();
        Ok(g.user_roles
            .iter()
            .filter(|(u, _)| u == user)
            .filter_map(|(_, r)| g.roles.get(r).cloned())
            .collect())
    }

    fn grant_permission(&self, role: RoleId, permission: PermissionId) -> AppResult<()> {
        let mut g = self.inner.write();
        if !g.roles.contains_key(&role) {
            return Err(role_not_found(role));
        }
        if !g.permissions.contains_key(&permission) {
            return Err(permission_not_found(permission));
        }
        if !g.role_permissions.insert((role, permission)) {
            return Err(AppError::conflict(
                "permission_already_granted",
                format!("role {} already carries permission {}", role.0, permission.0),
            ));
        }
        Ok(())
    }

    fn revoke_permission(&self, role: RoleId, permission: PermissionId) -> AppResult<()> {
        let mut g = self.inner.write();
        if !g.role_permissions.remove(&(role, permission)) {
            return Err(AppError::not_found(
                "grant_not_found",
                format!("role {} does not carry permission {}", role.0, permission.0),
            ));
        }
        Ok(())
    }

    fn permissions_for_role(&self, role: RoleId) -> AppResult<Vec<PermissionRecord>> {
        let g = self.inner.read();
        Ok(g.role_permissions
            .iter()
            .filter(|(r, _)| *r == role)
            .filter_map(|(_, p)| g.permissions.get(p).cloned())
            .collect())
    }
}

impl ModerationRepo for MemoryStore {
    fn mark_banned(&self, user: &UserId) -> AppResult<bool> {
        Ok(self.inner.write().banned.insert(user.clone()))
    }

    fn is_banned(&self, user: &UserId) -> AppResult<bool> {
        Ok(self.inner.read().banned.contains(user))
    }
}
