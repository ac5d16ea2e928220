//! "Popup already shown this session" flag.
//!
//! Each login generates a fresh session token in the session store. Showing
//! a popup records that token under the user's popup key, so the flag is
//! set exactly when both tokens match and resets with the next login.

use std::sync::Arc;

use tracing::debug;

use claimdesk_core::result::AppResult;
use claimdesk_core::traits::KeyValueStore;
use claimdesk_core::types::{SessionToken, UserId};
use claimdesk_storage::keys;

/// Per-user, per-login-session popup flag.
#[derive(Debug)]
pub struct SessionFlag {
    store: Arc<dyn KeyValueStore>,
    user_id: UserId,
    token: SessionToken,
}

impl SessionFlag {
    /// Start a new login session for `user_id`.
    pub fn begin(store: Arc<dyn KeyValueStore>, user_id: UserId) -> AppResult<Self> {
        let token = SessionToken::generate();
        store.set(&keys::session_token(&user_id), token.as_str())?;
        debug!(user_id = %user_id, "Notification session started");
        Ok(Self {
            store,
            user_id,
            token,
        })
    }

    /// Token of the current session.
    pub fn token(&self) -> &SessionToken {
        &self.token
    }

    /// Whether a popup was already shown in this session.
    pub fn is_set(&self) -> AppResult<bool> {
        let shown = self.store.get(&keys::popup_shown(&self.user_id))?;
        Ok(shown.as_deref() == Some(self.token.as_str()))
    }

    /// Record that a popup was shown in this session.
    pub fn set(&self) -> AppResult<()> {
        self.store
            .set(&keys::popup_shown(&self.user_id), self.token.as_str())
    }

    /// End the session. The popup key is left behind; it no longer matches
    /// any future session token.
    pub fn end(self) -> AppResult<()> {
        self.store.remove(&keys::session_token(&self.user_id))
    }
}
