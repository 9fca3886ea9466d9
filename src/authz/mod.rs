//! Role/permission authorization engine: capability vocabulary, ranked bypass
//! roles, the grant/deny decision procedure, per-resource ownership
//! provisioning and the route-guard composition layer. Keep each concern in a
//! small sub-module.

pub mod model;
pub mod hierarchy;
pub mod engine;
pub mod provision;
pub mod guard;
pub mod hooks;
pub mod moderation;

// Re-exports for a thin public surface
pub use model::{
    ActionType, BypassRole, CapabilityCheck, CheckMode, PermissionId, PermissionRecord,
    ResourceScope, ResourceType, RoleId, RoleRecord, UserId,
};
pub use engine::{Decision, Engine};
pub use guard::{CapabilityDecl, GuardSpec};
pub use hierarchy::{bypass_rank, is_admin, is_higher, max_bypass_rank};
pub use hooks::{register_file_logger, register_post_auth, AuthEvent, PostAuthHook};
pub use provision::{owner_role_name, OwnershipGrant, Provisioner};
