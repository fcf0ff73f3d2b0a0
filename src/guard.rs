//! Route Guard Module
//!
//! Decides, at navigation time, whether a protected view may render.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::debug;

use crate::navigation::{Navigator, RedirectMode, LOGIN_PATH};
use crate::session::{Session, SessionStore};

/// Views reachable without a session
pub const PUBLIC_PATHS: [&str; 2] = [LOGIN_PATH, "/register"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardState {
    Authenticated,
    Anonymous,
}

impl From<&Session> for GuardState {
    fn from(session: &Session) -> Self {
        if session.is_authenticated() {
            GuardState::Authenticated
        } else {
            GuardState::Anonymous
        }
    }
}

/// Outcome of a guarded render
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access<T> {
    Granted(T),
    /// The view was not rendered; navigation went to this path instead
    Redirected(String),
}

impl<T> Access<T> {
    pub fn is_granted(&self) -> bool {
        matches!(self, Access::Granted(_))
    }

    pub fn granted(self) -> Option<T> {
        match self {
            Access::Granted(view) => Some(view),
            Access::Redirected(_) => None,
        }
    }
}

#[derive(Clone)]
pub struct RouteGuard {
    session: SessionStore,
    navigator: Arc<dyn Navigator>,
    login_path: String,
}

impl RouteGuard {
    pub fn new(session: SessionStore, navigator: Arc<dyn Navigator>) -> Self {
        Self { session, navigator, login_path: LOGIN_PATH.to_string() }
    }

    pub fn with_login_path(mut self, login_path: impl Into<String>) -> Self {
        self.login_path = login_path.into();
        self
    }

    /// Current state, read from the live session on every call
    pub fn state(&self) -> GuardState {
        GuardState::from(&self.session.state())
    }

    pub fn is_protected(path: &str) -> bool {
        !PUBLIC_PATHS.contains(&path)
    }

    /// Render a protected view. `view` only runs for an authenticated session;
    /// otherwise the guard redirects to the login view.
    pub fn render<T, F>(&self, view: F) -> Access<T>
    where
        F: FnOnce(&Session) -> T,
    {
        let session = self.session.state();
        if session.is_authenticated() {
            return Access::Granted(view(&session));
        }

        debug!("Anonymous session, redirecting to {}", self.login_path);
        self.navigator.navigate(&self.login_path, RedirectMode::InApp);
        Access::Redirected(self.login_path.clone())
    }

    /// Render the view mounted at `path`, guarding it unless the path is public
    pub fn render_path<T, F>(&self, path: &str, view: F) -> Access<T>
    where
        F: FnOnce(&Session) -> T,
    {
        if Self::is_protected(path) {
            self.render(view)
        } else {
            Access::Granted(view(&self.session.state()))
        }
    }

    /// Allow or deny without rendering anything
    pub fn check(&self) -> Access<()> {
        self.render(|_| ())
    }

    /// Follow the guard state as the session changes
    pub fn watch(&self) -> GuardWatch {
        GuardWatch { rx: self.session.subscribe() }
    }
}

/// Stream of guard states, one per session change
pub struct GuardWatch {
    rx: watch::Receiver<Session>,
}

impl GuardWatch {
    pub fn current(&self) -> GuardState {
        GuardState::from(&*self.rx.borrow())
    }

    /// Wait for the next session change and return the new state. `None` once
    /// the session store is gone.
    pub async fn changed(&mut self) -> Option<GuardState> {
        self.rx.changed().await.ok()?;
        Some(GuardState::from(&*self.rx.borrow_and_update()))
    }
}
