//! Connect Dashboard Library
//!
//! Session and API-access core for the device and route dashboard.

pub mod api;
pub mod client;
pub mod commands;
pub mod config;
pub mod guard;
pub mod logging;
pub mod models;
pub mod navigation;
pub mod session;
pub mod storage;

use std::sync::Arc;

use api::{AuthApi, DeviceApi, RouteApi};
use client::{ApiClient, ApiError};
use config::ClientConfig;
use guard::RouteGuard;
use navigation::Navigator;
use session::SessionStore;

/// Application state shared across views
#[derive(Clone)]
pub struct AppState {
    pub session: SessionStore,
    pub api: ApiClient,
    pub auth: AuthApi,
    pub devices: DeviceApi,
    pub routes: RouteApi,
    pub guard: RouteGuard,
}

impl AppState {
    /// Wire every component around one session store and one navigator
    pub fn new(
        config: &ClientConfig,
        session: SessionStore,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, ApiError> {
        let api = ApiClient::new(config, session.clone(), navigator.clone())?;
        let guard = RouteGuard::new(session.clone(), navigator).with_login_path(config.login_path.clone());

        Ok(Self {
            auth: AuthApi::new(api.clone()),
            devices: DeviceApi::new(api.clone()),
            routes: RouteApi::new(api.clone()),
            session,
            api,
            guard,
        })
    }
}
