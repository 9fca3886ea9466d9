//! Catalog and join-table semantics of the in-memory store: NotFound on
//! missing referents, Conflict on duplicate links, cascading deletes.

use anyhow::Result;
use uuid::Uuid;

use authgate::authz::{ActionType, PermissionId, ResourceScope, ResourceType, RoleId, UserId};
use authgate::error::AppError;
use authgate::store::memory::MemoryStore;
use authgate::store::{ensure_named_role, AssignmentRepo, ModerationRepo, PermissionRepo, RoleRepo};

#[test]
fn role_crud_round_trip() -> Result<()> {
    let store = MemoryStore::new();
    let role = store.create_role(Some("editors"), Some("edit things"))?;
    assert_eq!(store.get_role(role.id)?.expect("created").name.as_deref(), Some("editors"));

    let updated = store.update_role(role.id, Some("edit more things"))?;
    assert_eq!(updated.description.as_deref(), Some("edit more things"));

    store.delete_role(role.id)?;
    assert!(store.get_role(role.id)?.is_none());

    match store.update_role(role.id, None) {
        Err(AppError::NotFound { .. }) => {}
        other => panic!("expected NotFound, got {:?}", other),
    }
    Ok(())
}

#[test]
fn assigning_a_missing_role_is_not_found() {
    let store = MemoryStore::new();
    let user = UserId("u".into());
    match store.assign_role(&user, RoleId(Uuid::new_v4())) {
        Err(AppError::NotFound { .. }) => {}
        other => panic!("expected NotFound, got {:?}", other),
    }
}

#[test]
fn duplicate_links_are_conflicts() -> Result<()> {
    let store = MemoryStore::new();
    let user = UserId("u".into());
    let role = store.create_role(Some("member"), None)?;
    let perm = store.create_permission(
        "read-files",
        ActionType::Read,
        ResourceType::File,
        ResourceScope::Any,
        None,
    )?;

    store.assign_role(&user, role.id)?;
    match store.assign_role(&user, role.id) {
        Err(AppError::Conflict { .. }) => {}
        other => panic!("expected Conflict, got {:?}", other),
    }

    store.grant_permission(role.id, perm.id)?;
    match store.grant_permission(role.id, perm.id) {
        Err(AppError::Conflict { .. }) => {}
        other => panic!("expected Conflict, got {:?}", other),
    }
    Ok(())
}

#[test]
fn revoking_absent_links_is_not_found() -> Result<()> {
    let store = MemoryStore::new();
    let user = UserId("u".into());
    let role = store.create_role(None, None)?;

    match store.revoke_role(&user, role.id) {
        Err(AppError::NotFound { .. }) => {}
        other => panic!("expected NotFound, got {:?}", other),
    }
    match store.revoke_permission(role.id, PermissionId(Uuid::new_v4())) {
        Err(AppError::NotFound { .. }) => {}
        other => panic!("expected NotFound, got {:?}", other),
    }
    Ok(())
}

#[test]
fn deletes_cascade_link_rows() -> Result<()> {
    let store = MemoryStore::new();
    let user = UserId("u".into());
    let role = store.create_role(Some("r"), None)?;
    let perm = store.create_permission(
        "p",
        ActionType::ReadWrite,
        ResourceType::BlogPost,
        ResourceScope::Exact("x".into()),
        None,
    )?;
    store.grant_permission(role.id, perm.id)?;
    store.assign_role(&user, role.id)?;

    // Deleting the permission clears the role link but not the role
    store.delete_permission(perm.id)?;
    assert!(store.permissions_for_role(role.id)?.is_empty());
    assert_eq!(store.roles_for_user(&user)?.len(), 1);

    // Deleting the role clears the user link
    store.delete_role(role.id)?;
    assert!(store.roles_for_user(&user)?.is_empty());
    Ok(())
}

#[test]
fn ensure_named_role_is_idempotent() -> Result<()> {
    let store = MemoryStore::new();
    let first = ensure_named_role(&store, "admin")?;
    let second = ensure_named_role(&store, "admin")?;
    assert_eq!(first.id, second.id, "seeding must reuse the existing named role");
    assert_eq!(store.list_roles()?.len(), 1);
    Ok(())
}

#[test]
fn ban_flag_is_idempotent() -> Result<()> {
    let store = MemoryStore::new();
    let user = UserId("u".into());
    assert!(!store.is_banned(&user)?);
    assert!(store.mark_banned(&user)?);
    assert!(!store.mark_banned(&user)?, "second mark reports already banned");
    assert!(store.is_banned(&user)?);
    Ok(())
}
