//! Dashboard Commands Module
//!
//! Session flows invoked by the dashboard views.

use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::api::routes::RouteQuery;
use crate::client::ApiError;
use crate::models::{Device, RouteList, User};
use crate::AppState;

/// What the views learn about the session after a flow
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionResponse {
    pub authenticated: bool,
    pub user_id: Option<String>,
    pub email: Option<String>,
    pub display_name: Option<String>,
}

impl SessionResponse {
    fn from_state(state: &AppState) -> Self {
        let session = state.session.state();
        let user = session.user();
        Self {
            authenticated: session.is_authenticated(),
            user_id: user.map(|u| u.id.clone()),
            email: user.map(|u| u.email.clone()),
            display_name: user.map(display_name),
        }
    }
}

/// Data behind the dashboard landing view
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overview {
    pub devices: Vec<Device>,
    pub recent_routes: RouteList,
}

fn display_name(user: &User) -> String {
    user.name.clone().unwrap_or_else(|| user.email.clone())
}

/// Restore a session persisted by an earlier run
pub fn restore_session(state: &AppState) -> SessionResponse {
    debug!("Restoring stored session");
    if !state.session.rehydrate() {
        debug!("No usable stored session");
    }
    SessionResponse::from_state(state)
}

/// Exchange credentials for tokens, then load the user they belong to. The
/// session is only replaced once both calls succeed; on failure it is left as
/// it was, apart from the logout a 401 always causes.
pub async fn sign_in(state: &AppState, email: &str, password: &str) -> Result<SessionResponse, ApiError> {
    info!("Signing in: {}", email);

    let tokens = state.auth.login(email, password).await.map_err(|e| {
        error!("Login failed: {}", e);
        e
    })?;

    let user = state.auth.me_with(&tokens.access_token).await.map_err(|e| {
        error!("Failed to load user after login: {}", e);
        e
    })?;

    state.session.login(user, tokens.access_token, tokens.refresh_token);
    Ok(SessionResponse::from_state(state))
}

/// Create an account and sign straight into it
pub async fn register(
    state: &AppState,
    email: &str,
    password: &str,
    name: Option<&str>,
) -> Result<SessionResponse, ApiError> {
    info!("Registering: {}", email);
    let user = state.auth.register(email, password, name).await?;
    debug!("Registered user {}", user.id);
    sign_in(state, email, password).await
}

/// End the session. The backend is told first; a failure there does not keep
/// the user logged in.
pub async fn sign_out(state: &AppState) {
    info!("Signing out");

    if state.session.access_token().is_some() {
        if let Err(e) = state.auth.logout().await {
            warn!("Backend logout failed: {}", e);
        }
    }

    state.session.logout();
}

/// Swap the refresh token for a new credentials pair
pub async fn refresh_session(state: &AppState) -> Result<SessionResponse, ApiError> {
    let Some(refresh_token) = state.session.state().refresh_token().map(str::to_string) else {
        return Err(ApiError::Request("no refresh token in session".into()));
    };

    let tokens = state.auth.refresh(&refresh_token).await?;
    state.session.set_tokens(tokens.access_token, tokens.refresh_token);
    info!("Session tokens refreshed");
    Ok(SessionResponse::from_state(state))
}

/// Devices and the first page of routes, fetched concurrently
pub async fn load_overview(state: &AppState) -> Result<Overview, ApiError> {
    let query = RouteQuery::default();
    let (devices, recent_routes) = tokio::join!(state.devices.list(), state.routes.list(&query));

    Ok(Overview {
        devices: devices?,
        recent_routes: recent_routes?,
    })
}
