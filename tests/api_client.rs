mod common;

use serde_json::json;

use common::{app, device_json, route_list_json, user, Reply, StubServer};
use connect_dashboard_lib::api::devices::{DeviceUpdate, NewDevice};
use connect_dashboard_lib::api::routes::RouteQuery;
use connect_dashboard_lib::client::ApiError;
use connect_dashboard_lib::config::ClientConfig;
use connect_dashboard_lib::navigation::RedirectMode;
use connect_dashboard_lib::session::{Session, SessionStore};

fn logged_in(token: &str) -> SessionStore {
    let session = SessionStore::new();
    session.login(user(), token.to_string(), "refresh-1".to_string());
    session
}

#[tokio::test]
async fn attaches_current_token_as_bearer() {
    let server = StubServer::start(|_| Reply::json(200, json!([device_json("abc123")]))).await;
    let (state, _nav) = app(&ClientConfig::new(&server.origin), logged_in("tok-123"));

    let devices = state.devices.list().await.unwrap();

    assert_eq!(devices.len(), 1);
    let request = server.last_request();
    assert_eq!(request.method, "GET");
    assert_eq!(request.path(), "/api/v1/devices");
    assert_eq!(request.header("authorization"), Some("Bearer tok-123"));
}

#[tokio::test]
async fn token_is_read_at_dispatch_time() {
    let server = StubServer::start(|_| Reply::json(200, device_json("abc123"))).await;
    let session = logged_in("first");
    let (state, _nav) = app(&ClientConfig::new(&server.origin), session.clone());

    session.set_tokens("second".into(), "refresh-2".into());
    state.devices.get("abc123").await.unwrap();

    assert_eq!(server.last_request().header("authorization"), Some("Bearer second"));
}

#[tokio::test]
async fn anonymous_requests_carry_no_authorization() {
    let server = StubServer::start(|_| {
        Reply::json(200, json!({ "access_token": "a", "refresh_token": "r", "token_type": "bearer" }))
    })
    .await;
    let (state, _nav) = app(&ClientConfig::new(&server.origin), SessionStore::new());

    state.auth.login("driver@example.com", "correct horse battery").await.unwrap();

    let request = server.last_request();
    assert_eq!(request.path(), "/api/v1/auth/login");
    assert_eq!(request.header("authorization"), None);
    assert_eq!(
        request.json(),
        json!({ "email": "driver@example.com", "password": "correct horse battery" })
    );
}

#[tokio::test]
async fn unauthorized_clears_session_redirects_and_still_fails() {
    let server = StubServer::start(|_| Reply::json(401, json!({ "detail": "Could not validate credentials" }))).await;
    let session = logged_in("expired");
    let (state, nav) = app(&ClientConfig::new(&server.origin), session.clone());

    let err = state.devices.list().await.unwrap_err();

    assert!(err.is_unauthorized());
    assert_eq!(err.status(), Some(401));
    assert_eq!(err.detail().as_deref(), Some("Could not validate credentials"));
    assert_eq!(session.state(), Session::anonymous());
    assert_eq!(nav.visits(), vec![("/login".to_string(), RedirectMode::Reload)]);
    assert!(!state.guard.check().is_granted());
}

#[tokio::test]
async fn unauthorized_redirect_honours_configured_mode() {
    let server = StubServer::start(|_| Reply::status(401)).await;
    let mut config = ClientConfig::new(&server.origin);
    config.redirect_mode = RedirectMode::InApp;
    let (state, nav) = app(&config, logged_in("expired"));

    let _ = state.routes.get("abc123|2024-03-02--10-00-00").await;

    assert_eq!(nav.visits(), vec![("/login".to_string(), RedirectMode::InApp)]);
}

#[tokio::test]
async fn forbidden_and_server_errors_leave_session_alone() {
    for status in [403u16, 500] {
        let server = StubServer::start(move |_| Reply::json(status, json!({ "detail": "nope" }))).await;
        let session = logged_in("tok-123");
        let before = session.state();
        let (state, nav) = app(&ClientConfig::new(&server.origin), session.clone());

        let err = state.devices.status("abc123").await.unwrap_err();

        match err {
            ApiError::Status { status: got, ref body } => {
                assert_eq!(got, status);
                assert_eq!(body, r#"{"detail":"nope"}"#);
            }
            other => panic!("expected status error, got {:?}", other),
        }
        assert_eq!(session.state(), before);
        assert!(nav.visits().is_empty());
    }
}

#[tokio::test]
async fn unreachable_backend_is_a_network_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let origin = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let session = logged_in("tok-123");
    let (state, nav) = app(&ClientConfig::new(&origin), session.clone());

    let err = state.devices.list().await.unwrap_err();

    assert!(err.is_network(), "got {:?}", err);
    assert_eq!(err.status(), None);
    assert!(session.is_authenticated());
    assert!(nav.visits().is_empty());
}

#[tokio::test]
async fn undecodable_success_body_is_a_parse_error() {
    let server = StubServer::start(|_| Reply { status: 200, body: "not json".into() }).await;
    let (state, _nav) = app(&ClientConfig::new(&server.origin), logged_in("tok-123"));

    let err = state.routes.segments("abc123").await.unwrap_err();
    assert!(matches!(err, ApiError::Parse(_)));
}

#[tokio::test]
async fn route_list_sends_pagination_and_filter() {
    let server = StubServer::start(|_| Reply::json(200, route_list_json())).await;
    let (state, _nav) = app(&ClientConfig::new(&server.origin), logged_in("tok-123"));

    let list = state.routes.list(&RouteQuery::page(2, 50).for_device("abc123")).await.unwrap();

    assert_eq!(list.routes[0].fullname, "abc123|2024-03-02--10-00-00");
    let request = server.last_request();
    assert_eq!(request.target, "/api/v1/routes?page=2&page_size=50&device_id=abc123");
}

#[tokio::test]
async fn device_writes_use_expected_methods_and_payloads() {
    let server = StubServer::start(|req| match req.method.as_str() {
        "DELETE" => Reply::status(204),
        _ => Reply::json(200, device_json("abc123")),
    })
    .await;
    let (state, _nav) = app(&ClientConfig::new(&server.origin), logged_in("tok-123"));

    state
        .devices
        .create(&NewDevice { dongle_id: "abc123".into(), alias: Some("Civic".into()), public_key: None })
        .await
        .unwrap();
    state
        .devices
        .update("abc123", &DeviceUpdate { alias: Some("Accord".into()) })
        .await
        .unwrap();
    state.devices.delete("abc123").await.unwrap();

    let requests = server.requests();
    assert_eq!(requests.len(), 3);

    assert_eq!(requests[0].method, "POST");
    assert_eq!(requests[0].path(), "/api/v1/devices");
    assert_eq!(requests[0].json(), json!({ "dongle_id": "abc123", "alias": "Civic" }));

    assert_eq!(requests[1].method, "PUT");
    assert_eq!(requests[1].path(), "/api/v1/devices/abc123");
    assert_eq!(requests[1].json(), json!({ "alias": "Accord" }));

    assert_eq!(requests[2].method, "DELETE");
    assert_eq!(requests[2].path(), "/api/v1/devices/abc123");
}

#[tokio::test]
async fn route_names_are_escaped_in_paths() {
    let server = StubServer::start(|_| Reply::json(200, json!([]))).await;
    let (state, _nav) = app(&ClientConfig::new(&server.origin), logged_in("tok-123"));

    state.routes.events("abc 123").await.unwrap();

    assert_eq!(server.last_request().path(), "/api/v1/routes/abc%20123/events");
}

#[tokio::test]
async fn share_passes_email_as_query() {
    let server = StubServer::start(|_| Reply::json(200, json!({ "message": "shared" }))).await;
    let (state, _nav) = app(&ClientConfig::new(&server.origin), logged_in("tok-123"));

    state.routes.share("r1", "friend@example.com").await.unwrap();

    let request = server.last_request();
    assert_eq!(request.method, "POST");
    assert_eq!(request.target, "/api/v1/routes/r1/share?share_with_email=friend%40example.com");
}

#[tokio::test]
async fn pair_posts_dongle_and_token() {
    let server = StubServer::start(|_| Reply::json(200, device_json("abc123"))).await;
    let (state, _nav) = app(&ClientConfig::new(&server.origin), logged_in("tok-123"));

    let device = state.devices.pair("abc123", "pair-tok").await.unwrap();

    assert!(device.is_paired);
    let request = server.last_request();
    assert_eq!(request.method, "POST");
    assert_eq!(request.path(), "/api/v1/devices/abc123/pair");
    assert_eq!(request.json(), json!({ "dongle_id": "abc123", "pairing_token": "pair-tok" }));
}

#[tokio::test]
async fn location_is_returned_as_sent() {
    let location = json!({ "timestamp": "2024-03-02T10:00:00Z", "location": "available" });
    let reply = location.clone();
    let server = StubServer::start(move |_| Reply::json(200, reply.clone())).await;
    let (state, _nav) = app(&ClientConfig::new(&server.origin), logged_in("tok-123"));

    let got = state.devices.location("abc123").await.unwrap();

    assert_eq!(got, location);
    let request = server.last_request();
    assert_eq!(request.method, "GET");
    assert_eq!(request.path(), "/api/v1/devices/abc123/location");
    assert_eq!(request.header("authorization"), Some("Bearer tok-123"));
}
