//! Auth session changes that affect the cart.
//!
//! The hosted platform owns authentication; this module only reacts to what
//! it reports. When the session ends (explicit sign-out, or no valid session
//! found on startup) the cart is cleared so one user's selection never leaks
//! into the next user's session, and any auth tokens the platform client left
//! in the same client-local storage are removed.

use shopfront_core::UserId;
use tracing::instrument;

use crate::storage::KeyValueStore;
use crate::store::CartStore;

const AUTH_TOKEN_PREFIX: &str = "sb-";
const AUTH_TOKEN_SUFFIX: &str = "-auth-token";

/// Session change reported by the auth platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    SignedIn(UserId),
    SignedOut,
    /// Startup found no valid session.
    SessionMissing,
}

/// Who, if anyone, is signed in after handling an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    SignedIn(UserId),
    SignedOut,
}

/// Tracks the signed-in user and resets client state on sign-out.
#[derive(Debug, Default)]
pub struct SessionSync {
    current: Option<UserId>,
}

impl SessionSync {
    #[must_use]
    pub const fn new() -> Self {
        Self { current: None }
    }

    #[must_use]
    pub const fn current_user(&self) -> Option<UserId> {
        self.current
    }

    /// Apply a session event to the cart and client storage.
    #[instrument(skip(self, store))]
    pub fn handle<S: KeyValueStore>(
        &mut self,
        store: &mut CartStore<S>,
        event: SessionEvent,
    ) -> SessionStatus {
        match event {
            SessionEvent::SignedIn(user_id) => {
                self.current = Some(user_id);
                SessionStatus::SignedIn(user_id)
            }
            SessionEvent::SignedOut | SessionEvent::SessionMissing => {
                self.current = None;
                store.clear_cart();
                let removed = purge_auth_tokens(store.storage(), store.key());
                tracing::info!(removed_tokens = removed, "Session ended, cart cleared");
                SessionStatus::SignedOut
            }
        }
    }
}

fn is_auth_token_key(key: &str) -> bool {
    key.starts_with(AUTH_TOKEN_PREFIX) && key.ends_with(AUTH_TOKEN_SUFFIX)
}

/// Remove stale platform auth tokens, never touching the cart's own key.
/// Returns how many were removed.
fn purge_auth_tokens<S: KeyValueStore>(storage: &S, cart_key: &str) -> usize {
    let keys = match storage.keys() {
        Ok(keys) => keys,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to list storage keys");
            return 0;
        }
    };

    let mut removed = 0;
    for key in keys
        .iter()
        .filter(|key| key.as_str() != cart_key && is_auth_token_key(key))
    {
        match storage.remove(key) {
            Ok(()) => {
                tracing::warn!(%key, "Removed stale auth token");
                removed += 1;
            }
            Err(e) => tracing::warn!(%key, error = %e, "Failed to remove auth token"),
        }
    }
    removed
}
