//! Route-guard declarations: path-parameter resolution and end-to-end
//! enforcement through the engine, plus the audit file-logger sink.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;

use authgate::authz::{
    register_file_logger, ActionType, BypassRole, CapabilityDecl, CheckMode, Engine, GuardSpec,
    Provisioner, ResourceType, UserId,
};
use authgate::error::AppError;
use authgate::store::memory::MemoryStore;
use authgate::store::{AssignmentRepo, PermissionRepo, RoleRepo};

fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

fn wiring(store: &Arc<MemoryStore>) -> (Engine, Provisioner) {
    let engine = Engine::new(store.clone() as Arc<dyn AssignmentRepo>);
    let provisioner = Provisioner::new(
        store.clone() as Arc<dyn RoleRepo>,
        store.clone() as Arc<dyn PermissionRepo>,
        store.clone() as Arc<dyn AssignmentRepo>,
    );
    (engine, provisioner)
}

#[test]
fn resolve_substitutes_literal_path_params() -> Result<()> {
    let spec = GuardSpec::any(vec![
        CapabilityDecl::type_level(ResourceType::BlogPost, ActionType::ReadWrite),
        CapabilityDecl::instance(ResourceType::BlogPost, ActionType::ReadWrite, "post_id"),
    ]);
    let checks = spec.resolve(&params(&[("post_id", "p-42"), ("unused", "x")]))?;
    assert_eq!(checks.len(), 2);
    assert_eq!(checks[0].resource_id, None);
    assert_eq!(checks[1].resource_id.as_deref(), Some("p-42"));
    Ok(())
}

#[test]
fn missing_path_param_is_a_caller_error_not_a_denial() {
    let spec = GuardSpec::all(vec![CapabilityDecl::instance(
        ResourceType::File,
        ActionType::Read,
        "file_id",
    )]);
    match spec.resolve(&params(&[])) {
        Err(AppError::UserInput { .. }) => {}
        other => panic!("expected UserInput, got {:?}", other),
    }
}

#[test]
fn guard_admits_owner_or_blanket_holder_and_nobody_else() -> Result<()> {
    let store = Arc::new(MemoryStore::new());
    let (engine, provisioner) = wiring(&store);

    let owner = UserId("owner".into());
    let stranger = UserId("stranger".into());
    provisioner.provision_ownership(&owner, ResourceType::BlogPost, "p-42")?;

    // "Edit blog post": blanket kind-wide rights or this-specific-instance rights
    let spec = GuardSpec::any(vec![
        CapabilityDecl::type_level(ResourceType::BlogPost, ActionType::ReadWrite),
        CapabilityDecl::instance(ResourceType::BlogPost, ActionType::ReadWrite, "post_id"),
    ])
    .with_bypass(BypassRole::Admin);
    let p = params(&[("post_id", "p-42")]);

    assert!(spec.enforce(&engine, &owner, &p).is_ok());
    match spec.enforce(&engine, &stranger, &p) {
        Err(AppError::Auth { .. }) => {}
        other => panic!("expected Auth denial, got {:?}", other),
    }

    // The declared bypass admits an admin with zero permissions
    let admin = UserId("site-admin".into());
    let admin_role = store.create_role(Some("admin"), None)?;
    store.assign_role(&admin, admin_role.id)?;
    assert!(spec.enforce(&engine, &admin, &p).is_ok());
    Ok(())
}

#[test]
fn guard_declaration_carries_mode_and_bypass() -> Result<()> {
    let spec = GuardSpec::all(vec![CapabilityDecl::type_level(
        ResourceType::AdminAction,
        ActionType::ReadWrite,
    )])
    .with_bypass(BypassRole::Superadmin);
    assert_eq!(spec.mode, CheckMode::All);
    assert_eq!(spec.bypass, Some(BypassRole::Superadmin));
    Ok(())
}

#[test]
fn file_logger_captures_decisions() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("audit.jsonl");
    register_file_logger(path.to_str().expect("utf8 path"));

    let store = Arc::new(MemoryStore::new());
    let (engine, provisioner) = wiring(&store);
    let user = UserId("audited-user".into());
    provisioner.provision_ownership(&user, ResourceType::File, "f-1")?;

    let spec = GuardSpec::all(vec![CapabilityDecl::instance(
        ResourceType::File,
        ActionType::ReadWrite,
        "file_id",
    )]);
    spec.enforce(&engine, &user, &params(&[("file_id", "f-1")]))?;

    let contents = std::fs::read_to_string(&path)?;
    let line = contents
        .lines()
        .find(|l| l.contains("audited-user"))
        .expect("an audit line for the decision");
    authgate::tprintln!("audit line: {}", line);
    let v: serde_json::Value = serde_json::from_str(line)?;
    assert_eq!(v["allow"], serde_json::json!(true));
    assert_eq!(v["user"], serde_json::json!("audited-user"));
    Ok(())
}
