//! Post-authorization hook trait and registry. Hooks are best-effort audit
//! sinks; they never influence a decision and must not panic.

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::io::Write;

use super::engine::Decision;
use super::model::{CapabilityCheck, CheckMode, UserId};

#[derive(Debug, Clone)]
pub struct AuthEvent {
    pub user: UserId,
    pub checks: Vec<CapabilityCheck>,
    pub mode: CheckMode,
    pub decision: Decision,
}

pub trait PostAuthHook: Send + Sync {
    fn on_post_auth(&self, _ev: &AuthEvent) {}
}

// Global registry (process-local)
static REG: Lazy<RwLock<Vec<Box<dyn PostAuthHook>>>> = Lazy::new(|| RwLock::new(Vec::new()));

pub fn register_post_auth(h: Box<dyn PostAuthHook>) {
    REG.write().push(h);
}

pub fn emit_post_auth(ev: &AuthEvent) {
    for h in REG.read().iter() {
        h.on_post_auth(ev);
    }
}

// --- Simple file logger sink for audit events ---

struct FileLogger {
    path: String,
}

impl FileLogger {
    fn new(path: &str) -> Self {
        Self { path: path.to_string() }
    }
}

impl PostAuthHook for FileLogger {
    fn on_post_auth(&self, ev: &AuthEvent) {
        // Write a compact JSON line; ignore errors
        let ts = chrono::Utc::now().timestamp_millis();
        let obj = serde_json::json!({
            "ts": ts,
            "user": ev.user.0,
            "mode": ev.mode,
            "checks": ev.checks,
            "allow": ev.decision.allow,
            "reason": ev.decision.reason,
        });
        if let Ok(mut f) = std::fs::OpenOptions::new().create(true).append(true).open(&self.path) {
            let _ = writeln!(&mut f, "{}", obj);
        }
    }
}

/// Convenience: register a file logger sink to capture post-auth audit events.
pub fn register_file_logger(path: &str) {
    register_post_auth(Box::new(FileLogger::new(path)));
}
