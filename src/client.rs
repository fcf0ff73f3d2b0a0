//! API Client Module
//!
//! Authenticated HTTP access to the Connect backend. Every request picks up
//! the current access token from the session store; a 401 ends the session
//! and sends the user back to the login view before the error is returned.

use std::sync::Arc;

use reqwest::{Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::{ClientConfig, API_PREFIX};
use crate::navigation::{Navigator, RedirectMode};
use crate::session::SessionStore;

/// HTTP client shared by every resource API
#[derive(Clone)]
pub struct ApiClient {
    origin: Url,
    client: reqwest::Client,
    session: SessionStore,
    navigator: Arc<dyn Navigator>,
    redirect_mode: RedirectMode,
    login_path: String,
}

impl ApiClient {
    /// Create a client for the configured origin
    pub fn new(
        config: &ClientConfig,
        session: SessionStore,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, ApiError> {
        let mut origin = Url::parse(&config.api_origin)
            .map_err(|e| ApiError::Request(format!("invalid origin {}: {}", config.api_origin, e)))?;
        if origin.cannot_be_a_base() {
            return Err(ApiError::Request(format!("invalid origin {}", config.api_origin)));
        }
        origin.set_query(None);
        origin.set_fragment(None);

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| ApiError::Request(e.to_string()))?;

        Ok(Self {
            origin,
            client,
            session,
            navigator,
            redirect_mode: config.redirect_mode,
            login_path: config.login_path.clone(),
        })
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Absolute URL of an API path, each segment percent-escaped
    pub fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.origin.clone();
        // cannot fail: the origin was checked to be a base URL
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(API_PREFIX).extend(segments);
        }
        url
    }

    /// Unsent request for an API path. Credentials are attached by `execute`.
    pub fn request(&self, method: Method, segments: &[&str]) -> RequestBuilder {
        self.client.request(method, self.endpoint(segments))
    }

    /// Attach the session's credentials, dispatch, and apply the
    /// authorization-failure policy
    pub async fn execute(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        self.dispatch(request, self.session.access_token()).await
    }

    /// Like `fetch`, but authenticated with `token` instead of the session's
    /// token. The session store is not read or written on success.
    pub async fn fetch_with_token<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        token: &str,
    ) -> Result<T, ApiError> {
        let response = self.dispatch(request, Some(token.to_string())).await?;
        decode(response).await
    }

    async fn dispatch(&self, request: RequestBuilder, token: Option<String>) -> Result<Response, ApiError> {
        let request = match token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };
        let request = request.build().map_err(|e| ApiError::Request(e.to_string()))?;
        let method = request.method().clone();
        let path = request.url().path().to_string();

        debug!("{} {}", method, path);

        let response = self.client
            .execute(request)
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();

        if status == StatusCode::UNAUTHORIZED {
            warn!("{} {} rejected as unauthorized, ending session", method, path);
            self.session.logout();
            self.navigator.navigate(&self.login_path, self.redirect_mode);
            return Err(ApiError::Unauthorized(body));
        }

        debug!("{} {} failed with status {}", method, path, status);
        Err(ApiError::Status { status: status.as_u16(), body })
    }

    /// Execute `request` and decode the JSON body of the response
    pub async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = self.execute(request).await?;
        decode(response).await
    }

    pub async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, ApiError> {
        self.fetch(self.request(Method::GET, segments)).await
    }

    pub async fn get_with_query<T, Q>(&self, segments: &[&str], query: &Q) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        self.fetch(self.request(Method::GET, segments).query(query)).await
    }

    pub async fn post<B, T>(&self, segments: &[&str], body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.fetch(self.request(Method::POST, segments).json(body)).await
    }

    /// POST without a request body
    pub async fn post_empty<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, ApiError> {
        self.fetch(self.request(Method::POST, segments)).await
    }

    pub async fn put<B, T>(&self, segments: &[&str], body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.fetch(self.request(Method::PUT, segments).json(body)).await
    }

    /// DELETE; the response body, if any, is discarded
    pub async fn delete(&self, segments: &[&str]) -> Result<(), ApiError> {
        self.execute(self.request(Method::DELETE, segments)).await?;
        Ok(())
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let bytes = response.bytes().await.map_err(|e| ApiError::Network(e.to_string()))?;
    serde_json::from_slice(&bytes).map_err(|e| ApiError::Parse(e.to_string()))
}

#[derive(Deserialize)]
struct ErrorResponse {
    detail: serde_json::Value,
}

/// API errors
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// No response was received
    #[error("Network error: {0}")]
    Network(String),

    /// The backend answered 401; the session has already been cleared
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Any other non-success status, body kept verbatim
    #[error("Server error {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid request: {0}")]
    Request(String),
}

impl ApiError {
    /// HTTP status of the failed response, if one was received
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized(_) => Some(StatusCode::UNAUTHORIZED.as_u16()),
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized(_))
    }

    pub fn is_network(&self) -> bool {
        matches!(self, ApiError::Network(_))
    }

    /// Human readable `detail` from a backend error body
    pub fn detail(&self) -> Option<String> {
        let body = match self {
            ApiError::Unauthorized(body) | ApiError::Status { body, .. } => body,
            _ => return None,
        };

        let parsed: ErrorResponse = serde_json::from_str(body).ok()?;
        match parsed.detail {
            serde_json::Value::String(message) => Some(message),
            other => Some(other.to_string()),
        }
    }
}
