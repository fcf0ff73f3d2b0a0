//! Session Module
//!
//! Single source of truth for authentication state. The store is a cheap,
//! cloneable handle; every clone sees the same session.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::models::User;
use crate::storage::SessionPersistence;

/// Authentication state of the dashboard
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    user: Option<User>,
    access_token: Option<String>,
    refresh_token: Option<String>,
}

impl Session {
    /// The empty, logged-out session
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn authenticated(user: User, access_token: String, refresh_token: String) -> Self {
        Self {
            user: Some(user),
            access_token: Some(access_token),
            refresh_token: Some(refresh_token),
        }
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref()
    }

    /// True exactly when both a user and an access token are present
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some() && self.access_token.is_some()
    }

    fn is_empty(&self) -> bool {
        self.user.is_none() && self.access_token.is_none() && self.refresh_token.is_none()
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // tokens stay out of logs
        f.debug_struct("Session")
            .field("user", &self.user.as_ref().map(|u| &u.email))
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
            .field("is_authenticated", &self.is_authenticated())
            .finish()
    }
}

/// Shared, observable session state
///
/// Each mutator replaces the session in one `watch` step, so readers never see
/// a half-written session. When persistence is attached, every change is
/// written through; write failures are logged and otherwise ignored.
#[derive(Clone)]
pub struct SessionStore {
    state: Arc<watch::Sender<Session>>,
    persistence: Option<Arc<dyn SessionPersistence>>,
}

impl SessionStore {
    /// In-memory store, nothing survives the process
    pub fn new() -> Self {
        let (state, _) = watch::channel(Session::anonymous());
        Self { state: Arc::new(state), persistence: None }
    }

    /// Store that writes every change through to `persistence`
    pub fn with_persistence(persistence: Arc<dyn SessionPersistence>) -> Self {
        let mut store = Self::new();
        store.persistence = Some(persistence);
        store
    }

    /// Populate the whole session from a successful login
    pub fn login(&self, user: User, access_token: String, refresh_token: String) {
        info!("Session set for user: {}", user.email);
        let next = Session::authenticated(user, access_token, refresh_token);
        self.state.send_modify(|session| {
            *session = next;
            self.persist(session);
        });
    }

    /// Clear the whole session; calling it while logged out is a no-op
    pub fn logout(&self) {
        let changed = self.state.send_if_modified(|session| {
            let changed = !session.is_empty();
            *session = Session::anonymous();
            self.clear_persisted();
            changed
        });

        if changed {
            info!("Session cleared");
        }
    }

    /// Replace the current user, keeping the credentials
    pub fn update_user(&self, user: User) {
        debug!("Updating session user: {}", user.email);
        self.state.send_modify(|session| {
            session.user = Some(user);
            self.persist(session);
        });
    }

    /// Replace the credentials pair, keeping the user
    pub fn set_tokens(&self, access_token: String, refresh_token: String) {
        debug!("Updating session tokens");
        self.state.send_modify(|session| {
            session.access_token = Some(access_token);
            session.refresh_token = Some(refresh_token);
            self.persist(session);
        });
    }

    /// Snapshot of the current session
    pub fn state(&self) -> Session {
        self.state.borrow().clone()
    }

    pub fn access_token(&self) -> Option<String> {
        self.state.borrow().access_token.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    /// Receiver notified after every session change
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }

    /// Load a session persisted by an earlier run. Returns whether the
    /// restored session is authenticated.
    pub fn rehydrate(&self) -> bool {
        let Some(persistence) = &self.persistence else {
            return false;
        };

        match persistence.load_session() {
            Ok(Some(session)) => {
                let authenticated = session.is_authenticated();
                if authenticated {
                    info!("Restored persisted session");
                } else {
                    debug!("Persisted session is not authenticated");
                }
                self.state.send_replace(session);
                authenticated
            }
            Ok(None) => {
                debug!("No persisted session found");
                false
            }
            Err(e) => {
                warn!("Failed to load persisted session: {}", e);
                false
            }
        }
    }

    // Called with the watch value locked, so memory and storage change together
    fn persist(&self, session: &Session) {
        if let Some(persistence) = &self.persistence {
            if let Err(e) = persistence.save_session(session) {
                error!("Failed to save session: {}", e);
            }
        }
    }

    fn clear_persisted(&self) {
        if let Some(persistence) = &self.persistence {
            if let Err(e) = persistence.clear_session() {
                error!("Failed to clear persisted session: {}", e);
            }
        }
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}
