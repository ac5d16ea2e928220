//! Storage key builders for all ClaimDesk client state.
//!
//! Centralising key construction prevents typos and makes it easy
//! to find every key the application uses.

use claimdesk_core::types::UserId;

/// Prefix applied to all ClaimDesk storage keys.
const PREFIX: &str = "claimdesk";

// ── Durable keys ───────────────────────────────────────────

/// Key of the seen-task-id set.
///
/// With an account the record is private to that account; without one the
/// key is shared by everyone using the device.
pub fn seen_tasks(account: Option<&UserId>) -> String {
    match account {
        Some(user_id) => format!("{PREFIX}:seen_tasks:{user_id}"),
        None => format!("{PREFIX}:seen_tasks"),
    }
}

// ── Session keys ───────────────────────────────────────────

/// Key of the current login session token of a user.
pub fn session_token(user_id: &UserId) -> String {
    format!("{PREFIX}:session:{user_id}")
}

/// Key of the session token during which a popup was last shown.
pub fn popup_shown(user_id: &UserId) -> String {
    format!("{PREFIX}:popup_shown:{user_id}")
}
