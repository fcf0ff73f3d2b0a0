//! Shared fixtures: an axum stub backend that records every request, and a
//! navigator that records where it was sent.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use tokio::net::TcpListener;

use connect_dashboard_lib::config::ClientConfig;
use connect_dashboard_lib::models::User;
use connect_dashboard_lib::navigation::{Navigator, RedirectMode};
use connect_dashboard_lib::session::SessionStore;
use connect_dashboard_lib::AppState;

/// A request as the stub saw it
#[derive(Debug, Clone)]
pub struct Captured {
    pub method: String,
    /// Path plus query string
    pub target: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl Captured {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn path(&self) -> &str {
        self.target.split('?').next().unwrap_or_default()
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).unwrap()
    }
}

pub struct Reply {
    pub status: u16,
    pub body: String,
}

impl Reply {
    pub fn json(status: u16, body: serde_json::Value) -> Self {
        Self { status, body: body.to_string() }
    }

    pub fn status(status: u16) -> Self {
        Self { status, body: String::new() }
    }
}

type Handler = Arc<dyn Fn(&Captured) -> Reply + Send + Sync>;

#[derive(Clone)]
struct Stub {
    handler: Handler,
    requests: Arc<Mutex<Vec<Captured>>>,
}

/// Catch-all route: record the request, then answer with the test's reply
async fn record(
    State(stub): State<Stub>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let captured = Captured {
        method: method.to_string(),
        target: uri
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| uri.path().to_string()),
        headers: headers
            .iter()
            .map(|(name, value)| (name.as_str().to_string(), value.to_str().unwrap_or_default().to_string()))
            .collect(),
        body: String::from_utf8_lossy(&body).into_owned(),
    };

    let reply = (stub.handler)(&captured);
    stub.requests.lock().unwrap().push(captured);

    let status = StatusCode::from_u16(reply.status).unwrap();
    (status, [(header::CONTENT_TYPE, "application/json")], reply.body).into_response()
}

pub struct StubServer {
    pub origin: String,
    requests: Arc<Mutex<Vec<Captured>>>,
}

impl StubServer {
    pub async fn start<F>(handler: F) -> Self
    where
        F: Fn(&Captured) -> Reply + Send + Sync + 'static,
    {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let stub = Stub { handler: Arc::new(handler), requests: requests.clone() };
        let app = Router::new().fallback(record).with_state(stub);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let origin = format!("http://{}", listener.local_addr().unwrap());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { origin, requests }
    }

    pub fn requests(&self) -> Vec<Captured> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> Captured {
        self.requests().pop().expect("no request reached the stub")
    }
}

/// Records every navigation
#[derive(Default)]
pub struct RecordingNavigator {
    visits: Mutex<Vec<(String, RedirectMode)>>,
}

impl RecordingNavigator {
    pub fn visits(&self) -> Vec<(String, RedirectMode)> {
        self.visits.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, path: &str, mode: RedirectMode) {
        self.visits.lock().unwrap().push((path.to_string(), mode));
    }
}

pub fn app(config: &ClientConfig, session: SessionStore) -> (AppState, Arc<RecordingNavigator>) {
    let navigator = Arc::new(RecordingNavigator::default());
    let state = AppState::new(config, session, navigator.clone()).unwrap();
    (state, navigator)
}

pub fn user() -> User {
    User {
        id: "3f1c2b9e".into(),
        email: "driver@example.com".into(),
        name: Some("Driver".into()),
        role: "user".into(),
        created_at: None,
    }
}

pub fn user_json() -> serde_json::Value {
    serde_json::json!({
        "id": "3f1c2b9e",
        "email": "driver@example.com",
        "name": "Driver",
        "role": "user",
        "created_at": "2024-03-01T09:30:00Z"
    })
}

pub fn device_json(dongle_id: &str) -> serde_json::Value {
    serde_json::json!({
        "id": format!("dev-{}", dongle_id),
        "dongle_id": dongle_id,
        "alias": null,
        "is_paired": true,
        "serial": null,
        "last_seen": null,
        "created_at": "2024-03-01T09:30:00Z"
    })
}

pub fn route_list_json() -> serde_json::Value {
    serde_json::json!({
        "routes": [{
            "id": "r1",
            "device_id": "dev-abc123",
            "fullname": "abc123|2024-03-02--10-00-00",
            "start_time": "2024-03-02T10:00:00Z",
            "end_time": null,
            "duration_seconds": 600,
            "distance_meters": 8200.0,
            "upload_complete": true,
            "processed": true,
            "has_video": true,
            "created_at": "2024-03-02T10:20:00Z"
        }],
        "total": 1,
        "page": 1,
        "page_size": 20
    })
}
