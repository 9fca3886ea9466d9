//! Privileged moderation workflows built on the hierarchy comparator.

use crate::error::{AppError, AppResult};
use crate::store::{AssignmentRepo, ModerationRepo};

use super::hierarchy::is_higher;
use super::model::UserId;

/// Ban `target` on behalf of `actor`. Permitted only when the actor strictly
/// outranks the target. The mark itself is idempotent, so two concurrent bans
/// are harmless; returns true when the target was newly banned.
pub fn ban_user(
    assignments: &dyn AssignmentRepo,
    moderation: &dyn ModerationRepo,
    actor: &UserId,
    target: &UserId,
) -> AppResult<bool> {
    if !is_higher(assignments, actor, target)? {
        return Err(AppError::auth(
            "ban_denied",
            format!("user {} does not outrank {}", actor.0, target.0),
        ));
    }
    moderation.mark_banned(target)
}
