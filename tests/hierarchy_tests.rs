//! Rank comparator and moderation-gate behavior.

use anyhow::Result;

use authgate::authz::{is_admin, is_higher, max_bypass_rank, moderation, UserId};
use authgate::error::AppError;
use authgate::store::memory::MemoryStore;
use authgate::store::{AssignmentRepo, RoleRepo};

fn user_with_roles(store: &MemoryStore, user: &str, names: &[&str]) -> Result<UserId> {
    let uid = UserId(user.into());
    for name in names {
        let role = store.create_role(Some(name), None)?;
        store.assign_role(&uid, role.id)?;
    }
    Ok(uid)
}

#[test]
fn max_rank_is_maximum_over_named_bypass_roles() -> Result<()> {
    let store = MemoryStore::new();
    let u = user_with_roles(&store, "u", &["member", "blog-post:7:owner", "mod"])?;
    let roles = store.roles_for_user(&u)?;
    assert_eq!(max_bypass_rank(&roles), 2, "mod outranks member; owner role contributes nothing");
    Ok(())
}

#[test]
fn is_higher_requires_strictly_greater_rank() -> Result<()> {
    let store = MemoryStore::new();
    let admin = user_with_roles(&store, "admin-user", &["admin"])?;
    let moderator = user_with_roles(&store, "mod-user", &["mod"])?;
    let other_admin = user_with_roles(&store, "other-admin", &["admin"])?;

    assert!(is_higher(&store, &admin, &moderator)?);
    assert!(!is_higher(&store, &moderator, &admin)?);
    // Equal maximum ranks: false in both directions
    assert!(!is_higher(&store, &admin, &other_admin)?);
    assert!(!is_higher(&store, &other_admin, &admin)?);
    Ok(())
}

#[test]
fn roleless_users_never_outrank_and_are_never_outranked() -> Result<()> {
    let store = MemoryStore::new();
    let super_user = user_with_roles(&store, "root", &["superadmin"])?;
    let ghost = UserId("ghost".into());

    assert!(!is_higher(&store, &ghost, &super_user)?);
    assert!(
        !is_higher(&store, &super_user, &ghost)?,
        "nobody is judged higher than a user holding zero roles"
    );
    // Two roleless users: false both ways, no 0 > 0 degeneration
    let ghost2 = UserId("ghost2".into());
    assert!(!is_higher(&store, &ghost, &ghost2)?);
    assert!(!is_higher(&store, &ghost2, &ghost)?);
    Ok(())
}

#[test]
fn holder_of_only_synthetic_roles_is_outranked_by_member() -> Result<()> {
    let store = MemoryStore::new();
    let member = user_with_roles(&store, "member-user", &["member"])?;
    let owner_only = user_with_roles(&store, "owner-only", &["file:abc:owner"])?;

    assert!(is_higher(&store, &member, &owner_only)?);
    assert!(!is_higher(&store, &owner_only, &member)?);
    Ok(())
}

#[test]
fn is_admin_is_a_membership_test() -> Result<()> {
    let store = MemoryStore::new();
    let admin = user_with_roles(&store, "a", &["admin"])?;
    let root = user_with_roles(&store, "b", &["superadmin"])?;
    let moderator = user_with_roles(&store, "c", &["mod"])?;
    let ghost = UserId("ghost".into());

    assert!(is_admin(&store, &admin)?);
    assert!(is_admin(&store, &root)?);
    assert!(!is_admin(&store, &moderator)?, "mod is not admin regardless of rank proximity");
    assert!(!is_admin(&store, &ghost)?);
    Ok(())
}

#[test]
fn ban_requires_strict_outrank_and_is_idempotent() -> Result<()> {
    let store = MemoryStore::new();
    let admin = user_with_roles(&store, "a", &["admin"])?;
    let member = user_with_roles(&store, "m", &["member"])?;

    let newly = moderation::ban_user(&store, &store, &admin, &member)?;
    assert!(newly, "first ban marks the target");
    let again = moderation::ban_user(&store, &store, &admin, &member)?;
    assert!(!again, "double ban is harmless");

    match moderation::ban_user(&store, &store, &member, &admin) {
        Err(AppError::Auth { .. }) => {}
        other => panic!("upward ban must be denied, got {:?}", other),
    }

    // Equal rank: denied
    let admin2 = user_with_roles(&store, "a2", &["admin"])?;
    assert!(moderation::ban_user(&store, &store, &admin, &admin2).is_err());
    Ok(())
}
