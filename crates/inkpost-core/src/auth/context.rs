//! The session state machine.
//!
//! `AuthContext` is created once by the front-end and passed by reference to
//! whatever needs credentials. Consumers that re-render on change hold a
//! `watch::Receiver<Session>` from [`AuthContext::subscribe`].

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::store::{KeyValueStore, EXPIRES_IN_KEY, TOKEN_KEY, USER_ID_KEY};
use super::validator::{format_expiry, is_session_valid, parse_expiry};
use crate::models::LoginResult;

/// Where the context is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Unauthenticated,
    Validating,
    Authenticated,
}

/// In-memory copy of the persisted session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub user_id: String,
    pub expires_in: String,
    pub user_authenticated: bool,
}

impl Session {
    /// Bearer token, only while authenticated.
    pub fn bearer(&self) -> Option<&str> {
        if self.user_authenticated && !self.token.is_empty() {
            Some(&self.token)
        } else {
            None
        }
    }

    pub fn user_id(&self) -> Option<&str> {
        if self.user_id.is_empty() {
            None
        } else {
            Some(&self.user_id)
        }
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        parse_expiry(&self.expires_in)
    }
}

pub struct AuthContext<S: KeyValueStore> {
    store: S,
    state: AuthState,
    tx: watch::Sender<Session>,
}

impl<S: KeyValueStore> AuthContext<S> {
    /// Create a context in the `Unauthenticated` state. Nothing is read from
    /// the store until [`validate_authentication`](Self::validate_authentication).
    pub fn new(store: S) -> Self {
        let (tx, _rx) = watch::channel(Session::default());
        Self {
            store,
            state: AuthState::Unauthenticated,
            tx,
        }
    }

    pub fn state(&self) -> AuthState {
        self.state
    }

    /// Snapshot of the current in-memory session.
    pub fn session(&self) -> Session {
        self.tx.borrow().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.tx.borrow().user_authenticated
    }

    /// Receive every session change from now on.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.tx.subscribe()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Read-only probe of the persisted session. Never mutates state, so it
    /// is safe to call while rendering.
    pub fn check_authentication(&self) -> bool {
        let token = self.store.get(TOKEN_KEY);
        let user_id = self.store.get(USER_ID_KEY);
        let expires_in = self.store.get(EXPIRES_IN_KEY);

        match (token, user_id) {
            (Some(token), Some(user_id)) if !token.is_empty() && !user_id.is_empty() => {
                is_session_valid(expires_in.as_deref())
            }
            _ => false,
        }
    }

    /// Load the persisted session into memory. An expired or incomplete
    /// session is removed from the store.
    pub fn validate_authentication(&mut self) -> AuthState {
        self.state = AuthState::Validating;

        let token = self.store.get(TOKEN_KEY).unwrap_or_default();
        let user_id = self.store.get(USER_ID_KEY).unwrap_or_default();
        let expires_in = self.store.get(EXPIRES_IN_KEY).unwrap_or_default();

        if token.is_empty() && user_id.is_empty() && expires_in.is_empty() {
            debug!("No persisted session");
            self.publish(Session::default());
            self.state = AuthState::Unauthenticated;
            return self.state;
        }

        if token.is_empty() || user_id.is_empty() || !is_session_valid(Some(&expires_in)) {
            info!(expires_in = %expires_in, "Persisted session expired or incomplete, clearing");
            self.clear_store();
            self.publish(Session::default());
            self.state = AuthState::Unauthenticated;
            return self.state;
        }

        debug!(user_id = %user_id, "Session validated");
        self.publish(Session {
            token,
            user_id,
            expires_in,
            user_authenticated: true,
        });
        self.state = AuthState::Authenticated;
        self.state
    }

    /// Forget the session locally. Always ends `Unauthenticated` with empty
    /// fields; a store failure is logged, not returned.
    pub fn logout_user(&mut self) {
        self.clear_store();
        self.publish(Session::default());
        self.state = AuthState::Unauthenticated;
        info!("Logged out");
    }

    /// Persist a freshly issued session and validate it.
    pub fn establish(&mut self, login: &LoginResult) -> Result<AuthState> {
        let expires_at = parse_expiry(&login.expires_in)
            .with_context(|| format!("Unrecognized session expiry: {}", login.expires_in))?;

        self.store.set(TOKEN_KEY, &login.token)?;
        self.store.set(USER_ID_KEY, &login.user_id)?;
        self.store.set(EXPIRES_IN_KEY, &format_expiry(expires_at))?;

        Ok(self.validate_authentication())
    }

    fn clear_store(&self) {
        for key in [TOKEN_KEY, USER_ID_KEY, EXPIRES_IN_KEY] {
            if let Err(e) = self.store.remove(key) {
                warn!(error = %e, key, "Failed to remove session key");
            }
        }
    }

    fn publish(&self, session: Session) {
        self.tx.send_replace(session);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::store::MemoryStore;
    use chrono::Duration;

    fn stored(expires_in: &str) -> MemoryStore {
        MemoryStore::with_entries(&[
            (TOKEN_KEY, "tok"),
            (USER_ID_KEY, "user-1"),
            (EXPIRES_IN_KEY, expires_in),
        ])
    }

    fn in_hours(hours: i64) -> String {
        format_expiry(Utc::now() + Duration::hours(hours))
    }

    #[test]
    fn test_validate_with_empty_store() {
        let mut auth = AuthContext::new(MemoryStore::new());
        assert_eq!(auth.validate_authentication(), AuthState::Unauthenticated);

        let session = auth.session();
        assert_eq!(session, Session::default());
        assert!(session.token.is_empty());
        assert!(session.user_id.is_empty());
        assert!(session.expires_in.is_empty());
        assert!(!session.user_authenticated);
    }

    #[test]
    fn test_validate_with_live_session() {
        let expiry = in_hours(1);
        let mut auth = AuthContext::new(stored(&expiry));

        assert_eq!(auth.validate_authentication(), AuthState::Authenticated);
        let session = auth.session();
        assert_eq!(session.token, "tok");
        assert_eq!(session.user_id, "user-1");
        assert_eq!(session.expires_in, expiry);
        assert!(session.user_authenticated);
        assert_eq!(session.bearer(), Some("tok"));
    }

    #[test]
    fn test_validate_with_expired_session_clears_store() {
        let mut auth = AuthContext::new(stored(&in_hours(-1)));

        assert_eq!(auth.validate_authentication(), AuthState::Unauthenticated);
        assert!(!auth.session().user_authenticated);
        assert!(auth.store().get(TOKEN_KEY).is_none());
        assert!(auth.store().get(USER_ID_KEY).is_none());
        assert!(auth.store().get(EXPIRES_IN_KEY).is_none());
    }

    #[test]
    fn test_validate_with_partial_session_clears_store() {
        let expiry = in_hours(1);
        let store =
            MemoryStore::with_entries(&[(TOKEN_KEY, "tok"), (EXPIRES_IN_KEY, expiry.as_str())]);
        let mut auth = AuthContext::new(store);

        assert_eq!(auth.validate_authentication(), AuthState::Unauthenticated);
        assert!(auth.store().is_empty());
    }

    #[test]
    fn test_check_authentication_does_not_mutate() {
        let auth = AuthContext::new(stored(&in_hours(1)));
        assert!(auth.check_authentication());
        // Probe only: memory is untouched until validate
        assert!(!auth.session().user_authenticated);
        assert_eq!(auth.state(), AuthState::Unauthenticated);

        let expired = AuthContext::new(stored(&in_hours(-1)));
        assert!(!expired.check_authentication());
        assert!(expired.store().get(TOKEN_KEY).is_some());
    }

    #[test]
    fn test_logout_always_resets() {
        let mut auth = AuthContext::new(stored(&in_hours(1)));
        auth.validate_authentication();
        auth.logout_user();
        assert_eq!(auth.session(), Session::default());
        assert_eq!(auth.state(), AuthState::Unauthenticated);
        assert!(auth.store().is_empty());

        // Logging out an already empty context is harmless
        let mut empty = AuthContext::new(MemoryStore::new());
        empty.logout_user();
        assert_eq!(empty.session(), Session::default());
    }

    #[test]
    fn test_establish_persists_and_authenticates() {
        let mut auth = AuthContext::new(MemoryStore::new());
        let login = LoginResult {
            token: "new-token".to_string(),
            user_id: "u9".to_string(),
            expires_in: in_hours(2),
        };

        assert_eq!(auth.establish(&login).unwrap(), AuthState::Authenticated);
        assert_eq!(auth.store().get(TOKEN_KEY).as_deref(), Some("new-token"));
        assert_eq!(auth.store().get(USER_ID_KEY).as_deref(), Some("u9"));
        assert!(auth.check_authentication());
    }

    #[test]
    fn test_establish_with_past_expiry_stays_logged_out() {
        let mut auth = AuthContext::new(MemoryStore::new());
        let login = LoginResult {
            token: "t".to_string(),
            user_id: "u".to_string(),
            expires_in: in_hours(-3),
        };

        assert_eq!(auth.establish(&login).unwrap(), AuthState::Unauthenticated);
        assert!(auth.store().is_empty());
    }

    #[test]
    fn test_establish_rejects_garbage_expiry() {
        let mut auth = AuthContext::new(MemoryStore::new());
        let login = LoginResult {
            token: "t".to_string(),
            user_id: "u".to_string(),
            expires_in: "soon".to_string(),
        };
        assert!(auth.establish(&login).is_err());
        assert!(auth.store().is_empty());
    }

    #[test]
    fn test_subscribers_see_changes() {
        let mut auth = AuthContext::new(stored(&in_hours(1)));
        let mut rx = auth.subscribe();

        auth.validate_authentication();
        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().user_authenticated);

        auth.logout_user();
        assert!(rx.has_changed().unwrap());
        assert!(!rx.borrow_and_update().user_authenticated);
    }
}
