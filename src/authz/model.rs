//! Capability vocabulary and catalog record shapes. Pure value types, no side
//! effects; everything here is serde-serializable so the same shapes travel
//! through the HTTP surface and the audit log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable user identity. Users themselves are owned by the auth collaborator;
/// this subsystem only ever reads the id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct UserId(pub String);

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct RoleId(pub Uuid);

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct PermissionId(pub Uuid);

/// Two-level action vocabulary. `ReadWrite` is the superset capability.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum ActionType {
    Read,
    ReadWrite,
}

impl ActionType {
    /// Whether a grant of `self` satisfies a check asking for `required`.
    /// Read-write subsumes read; read never satisfies a read-write check.
    pub fn satisfies(self, required: ActionType) -> bool {
        match (self, required) {
            (ActionType::ReadWrite, ActionType::Read) => true,
            (a, b) => a == b,
        }
    }
}

/// Closed enumeration of resource kinds. Extend by adding a variant, never by
/// free-form strings, so the matcher space stays finite.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceType {
    User,
    Role,
    Permission,
    AdminAction,
    File,
    BlogPost,
    BlogComment,
    BlogCategory,
    BlogTag,
    BlogLike,
    BlogView,
    ForumPost,
    ForumComment,
    ForumCategory,
    ForumTag,
    ForumLike,
    ForumView,
}

impl ResourceType {
    pub fn as_str(self) -> &'static str {
        match self {
            ResourceType::User => "user",
            ResourceType::Role => "role",
            ResourceType::Permission => "permission",
            ResourceType::AdminAction => "admin-action",
            ResourceType::File => "file",
            ResourceType::BlogPost => "blog-post",
            ResourceType::BlogComment => "blog-comment",
            ResourceType::BlogCategory => "blog-category",
            ResourceType::BlogTag => "blog-tag",
            ResourceType::BlogLike => "blog-like",
            ResourceType::BlogView => "blog-view",
            ResourceType::ForumPost => "forum-post",
            ResourceType::ForumComment => "forum-comment",
            ResourceType::ForumCategory => "forum-category",
            ResourceType::ForumTag => "forum-tag",
            ResourceType::ForumLike => "forum-like",
            ResourceType::ForumView => "forum-view",
        }
    }
}

impl std::str::FromStr for ResourceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(ResourceType::User),
            "role" => Ok(ResourceType::Role),
            "permission" => Ok(ResourceType::Permission),
            "admin-action" => Ok(ResourceType::AdminAction),
            "file" => Ok(ResourceType::File),
            "blog-post" => Ok(ResourceType::BlogPost),
            "blog-comment" => Ok(ResourceType::BlogComment),
            "blog-category" => Ok(ResourceType::BlogCategory),
            "blog-tag" => Ok(ResourceType::BlogTag),
            "blog-like" => Ok(ResourceType::BlogLike),
            "blog-view" => Ok(ResourceType::BlogView),
            "forum-post" => Ok(ResourceType::ForumPost),
            "forum-comment" => Ok(ResourceType::ForumComment),
            "forum-category" => Ok(ResourceType::ForumCategory),
            "forum-tag" => Ok(ResourceType::ForumTag),
            "forum-like" => Ok(ResourceType::ForumLike),
            "forum-view" => Ok(ResourceType::ForumView),
            other => Err(format!("unknown resource kind: {}", other)),
        }
    }
}

/// Explicit wildcard-vs-exact scope for a permission. `Any` is the type-level
/// grant (stored as NULL resource_id in a SQL layout); `Exact` pins the
/// permission to one instance. Serialized untagged so the wire shape is the
/// nullable `resource_id` column.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(untagged)]
pub enum ResourceScope {
    Exact(String),
    #[default]
    Any,
}

impl ResourceScope {
    pub fn from_option(id: Option<String>) -> Self {
        match id {
            Some(id) => ResourceScope::Exact(id),
            None => ResourceScope::Any,
        }
    }

    /// Whether this scope covers a check for `requested`. A type-level grant
    /// covers every instance and the no-id check; an exact grant covers only
    /// the matching instance.
    pub fn covers(&self, requested: Option<&str>) -> bool {
        match self {
            ResourceScope::Any => true,
            ResourceScope::Exact(id) => requested == Some(id.as_str()),
        }
    }
}

/// A single requirement to test against a caller's effective permission set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CapabilityCheck {
    pub action: ActionType,
    pub resource: ResourceType,
    #[serde(default)]
    pub resource_id: Option<String>,
}

impl CapabilityCheck {
    pub fn type_level(action: ActionType, resource: ResourceType) -> Self {
        Self { action, resource, resource_id: None }
    }

    pub fn instance(action: ActionType, resource: ResourceType, id: impl Into<String>) -> Self {
        Self { action, resource, resource_id: Some(id.into()) }
    }
}

/// Conjunctive vs. disjunctive combination of a check list.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CheckMode {
    #[default]
    All,
    Any,
}

/// The ranked bypass-role set. Holding a role at or above a declared
/// threshold short-circuits fine-grained checks.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum BypassRole {
    Member,
    Mod,
    Admin,
    Superadmin,
}

impl BypassRole {
    pub fn rank(self) -> u8 {
        match self {
            BypassRole::Member => 1,
            BypassRole::Mod => 2,
            BypassRole::Admin => 3,
            BypassRole::Superadmin => 4,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            BypassRole::Member => "member",
            BypassRole::Mod => "mod",
            BypassRole::Admin => "admin",
            BypassRole::Superadmin => "superadmin",
        }
    }

    pub fn from_name(name: &str) -> Option<BypassRole> {
        let n = name.trim();
        if n.eq_ignore_ascii_case("member") { return Some(BypassRole::Member); }
        if n.eq_ignore_ascii_case("mod") { return Some(BypassRole::Mod); }
        if n.eq_ignore_ascii_case("admin") { return Some(BypassRole::Admin); }
        if n.eq_ignore_ascii_case("superadmin") { return Some(BypassRole::Superadmin); }
        None
    }
}

/// A role row. Either a named system role (the bypass set) or a synthetic
/// per-resource role minted by the provisioner. Pure grouping entity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoleRecord {
    pub id: RoleId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A permission row. `(action, resource, scope)` is the unit of comparison;
/// id/name/description never influence matching.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PermissionRecord {
    pub id: PermissionId,
    pub name: String,
    pub action: ActionType,
    pub resource: ResourceType,
    #[serde(rename = "resource_id", default)]
    pub scope: ResourceScope,
    #[serde(default)]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}
