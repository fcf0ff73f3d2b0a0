//! Auth endpoints under `/auth`.

use reqwest::Method;
use serde::Serialize;

use crate::client::{ApiClient, ApiError};
use crate::models::{TokenPair, User};

#[derive(Clone)]
pub struct AuthApi {
    client: ApiClient,
}

#[derive(Serialize)]
struct RegisterRequest<'a> {
    email: &'a str,
    password: &'a str,
    name: Option<&'a str>,
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

impl AuthApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Create an account. Does not log in.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        name: Option<&str>,
    ) -> Result<User, ApiError> {
        self.client
            .post(&["auth", "register"], &RegisterRequest { email, password, name })
            .await
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<TokenPair, ApiError> {
        self.client
            .post(&["auth", "login"], &LoginRequest { email, password })
            .await
    }

    /// Tell the backend the tokens are no longer in use
    pub async fn logout(&self) -> Result<serde_json::Value, ApiError> {
        self.client.post_empty(&["auth", "logout"]).await
    }

    /// The user owning the current access token
    pub async fn me(&self) -> Result<User, ApiError> {
        self.client.get(&["auth", "me"]).await
    }

    /// The user owning `access_token`, which need not be in the session yet
    pub async fn me_with(&self, access_token: &str) -> Result<User, ApiError> {
        let request = self.client.request(Method::GET, &["auth", "me"]);
        self.client.fetch_with_token(request, access_token).await
    }

    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, ApiError> {
        self.client
            .post(&["auth", "refresh"], &RefreshRequest { refresh_token })
            .await
    }
}
