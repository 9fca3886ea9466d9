//! Thin axum admin surface over the engine, provisioner and catalogs. All
//! real decisions live in `authz`; handlers translate payloads and map
//! `AppError` onto HTTP statuses.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::authz::{
    moderation, register_file_logger, ActionType, BypassRole, CapabilityCheck, CheckMode, Engine,
    PermissionId, Provisioner, ResourceScope, ResourceType, RoleId, UserId,
};
use crate::error::{AppError, AppResult};
use crate::store::memory::MemoryStore;
use crate::store::{ensure_named_role, AssignmentRepo, PermissionRepo, RoleRepo};

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = Json(serde_json::json!({
            "status": "error",
            "code": self.code_str(),
            "message": self.message(),
        }));
        (status, body).into_response()
    }
}

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<MemoryStore>,
    pub engine: Arc<Engine>,
    pub provisioner: Arc<Provisioner>,
}

impl AppState {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let engine = Arc::new(Engine::new(store.clone() as Arc<dyn AssignmentRepo>));
        let provisioner = Arc::new(Provisioner::new(
            store.clone() as Arc<dyn RoleRepo>,
            store.clone() as Arc<dyn PermissionRepo>,
            store.clone() as Arc<dyn AssignmentRepo>,
        ));
        Self { store, engine, provisioner }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { "authgate ok" }))
        .route("/roles", get(list_roles).post(create_role))
        .route("/roles/{role_id}", get(get_role).delete(delete_role))
        .route(
            "/roles/{role_id}/permissions/{permission_id}",
            post(grant_permission).delete(revoke_permission),
        )
        .route("/permissions", get(list_permissions).post(create_permission))
        .route("/permissions/{permission_id}", get(get_permission).delete(delete_permission))
        .route("/users/{user_id}/roles", get(user_roles))
        .route(
            "/users/{user_id}/roles/{role_id}",
            post(assign_role).delete(revoke_role),
        )
        .route("/users/{user_id}/ban", post(ban_user))
        .route("/authz/check", post(authz_check))
        .route("/resources/{kind}/{resource_id}/ownership", post(provision_ownership))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct CreateRolePayload {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CreatePermissionPayload {
    name: String,
    action: ActionType,
    resource: ResourceType,
    #[serde(default)]
    resource_id: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CheckPayload {
    user_id: String,
    checks: Vec<CapabilityCheck>,
    #[serde(default)]
    mode: CheckMode,
    #[serde(default)]
    bypass: Option<BypassRole>,
}

#[derive(Debug, Deserialize)]
struct ProvisionPayload {
    creator: String,
}

async fn list_roles(State(state): State<AppState>) -> AppResult<Json<serde_json::Value>> {
    let roles = state.store.list_roles()?;
    Ok(Json(serde_json::json!({"status": "ok", "roles": roles})))
}

async fn create_role(
    State(state): State<AppState>,
    Json(payload): Json<CreateRolePayload>,
) -> AppResult<Json<serde_json::Value>> {
    let role = state
        .store
        .create_role(payload.name.as_deref(), payload.description.as_deref())?;
    Ok(Json(serde_json::json!({"status": "ok", "role": role})))
}

async fn get_role(
    State(state): State<AppState>,
    Path(role_id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    let role = state
        .store
        .get_role(RoleId(role_id))?
        .ok_or_else(|| AppError::not_found("role_not_found", format!("role {} does not exist", role_id)))?;
    Ok(Json(serde_json::json!({"status": "ok", "role": role})))
}

async fn delete_role(
    State(state): State<AppState>,
    Path(role_id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    state.store.delete_role(RoleId(role_id))?;
    Ok(Json(serde_json::json!({"status": "ok"})))
}

async fn list_permissions(State(state): State<AppState>) -> AppResult<Json<serde_json::Value>> {
    let permissions = state.store.list_permissions()?;
    Ok(Json(serde_json::json!({"status": "ok", "permissions": permissions})))
}

async fn create_permission(
    State(state): State<AppState>,
    Json(payload): Json<CreatePermissionPayload>,
) -> AppResult<Json<serde_json::Value>> {
    let permission = state.store.create_permission(
        &payload.name,
        payload.action,
        payload.resource,
        ResourceScope::from_option(payload.resource_id),
        payload.description.as_deref(),
    )?;
    Ok(Json(serde_json::json!({"status": "ok", "permission": permission})))
}

async fn get_permission(
    State(state): State<AppState>,
    Path(permission_id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    let permission = state.store.get_permission(PermissionId(permission_id))?.ok_or_else(|| {
        AppError::not_found(
            "permission_not_found",
            format!("permission {} does not exist", permission_id),
        )
    })?;
    Ok(Json(serde_json::json!({"status": "ok", "permission": permission})))
}

async fn delete_permission(
    State(state): State<AppState>,
    Path(permission_id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    state.store.delete_permission(PermissionId(permission_id))?;
    Ok(Json(serde_json::json!({"status": "ok"})))
}

async fn user_roles(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    let roles = state.store.roles_for_user(&UserId(user_id))?;
    Ok(Json(serde_json::json!({"status": "ok", "roles": roles})))
}

async fn assign_role(
    State(state): State<AppState>,
    Path((user_id, role_id)): Path<(String, Uuid)>,
) -> AppResult<Json<serde_json::Value>> {
    state.store.assign_role(&UserId(user_id), RoleId(role_id))?;
    Ok(Json(serde_json::json!({"status": "ok"})))
}

async fn revoke_role(
    State(state): State<AppState>,
    Path((user_id, role_id)): Path<(String, Uuid)>,
) -> AppResult<Json<serde_json::Value>> {
    state.store.revoke_role(&UserId(user_id), RoleId(role_id))?;
    Ok(Json(serde_json::json!({"status": "ok"})))
}

async fn grant_permission(
    State(state): State<AppState>,
    Path((role_id, permission_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<serde_json::Value>> {
    state.store.grant_permission(RoleId(role_id), PermissionId(permission_id))?;
    Ok(Json(serde_json::json!({"status": "ok"})))
}

async fn revoke_permission(
    State(state): State<AppState>,
    Path((role_id, permission_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<serde_json::Value>> {
    state.store.revoke_permission(RoleId(role_id), PermissionId(permission_id))?;
    Ok(Json(serde_json::json!({"status": "ok"})))
}

async fn authz_check(
    State(state): State<AppState>,
    Json(payload): Json<CheckPayload>,
) -> AppResult<Json<serde_json::Value>> {
    let decision = state.engine.authorize(
        &UserId(payload.user_id),
        &payload.checks,
        payload.mode,
        payload.bypass,
    )?;
    Ok(Json(serde_json::json!({"status": "ok", "decision": decision})))
}

async fn ban_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    headers: HeaderMap,
) -> AppResult<Json<serde_json::Value>> {
    let actor = headers
        .get("x-actor")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .ok_or_else(|| AppError::auth("missing_actor", "x-actor header required"))?;
    let newly = moderation::ban_user(
        state.store.as_ref(),
        state.store.as_ref(),
        &UserId(actor),
        &UserId(user_id),
    )?;
    Ok(Json(serde_json::json!({"status": "ok", "newly_banned": newly})))
}

async fn provision_ownership(
    State(state): State<AppState>,
    Path((kind, resource_id)): Path<(String, String)>,
    Json(payload): Json<ProvisionPayload>,
) -> AppResult<Json<serde_json::Value>> {
    let kind: ResourceType = kind
        .parse()
        .map_err(|e: String| AppError::user("bad_resource_kind", e))?;
    let grant = state
        .provisioner
        .provision_ownership(&UserId(payload.creator), kind, &resource_id)?;
    Ok(Json(serde_json::json!({
        "status": "ok",
        "role": grant.role,
        "permission": grant.permission,
    })))
}

/// Seed the four named bypass roles; safe to re-run on every boot.
pub fn seed_bypass_roles(roles: &dyn RoleRepo) -> AppResult<()> {
    for r in [BypassRole::Member, BypassRole::Mod, BypassRole::Admin, BypassRole::Superadmin] {
        ensure_named_role(roles, r.name())?;
    }
    Ok(())
}

pub async fn run_with_port(http_port: u16) -> anyhow::Result<()> {
    let state = AppState::new();
    seed_bypass_roles(state.store.as_ref() as &dyn RoleRepo)?;

    if let Ok(path) = std::env::var("AUTHGATE_AUDIT_LOG") {
        register_file_logger(&path);
        info!("audit log sink registered at {}", path);
    }

    let app = router(state);
    let addr: SocketAddr = format!("0.0.0.0:{}", http_port).parse()?;
    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// Convenience entry point using the default port (7878).
pub async fn run() -> anyhow::Result<()> {
    let http_port = std::env::var("AUTHGATE_HTTP_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(7878);
    run_with_port(http_port).await
}
