//! Connect Dashboard - headless entry point
//!
//! Drives the session and API core from a terminal: sign in once, and the
//! persisted session is reused by later invocations.

use std::sync::Arc;

use anyhow::{bail, Context};
use tracing::info;

use connect_dashboard_lib::{
    api::routes::RouteQuery,
    commands,
    config::ClientConfig,
    logging,
    navigation::LogNavigator,
    session::SessionStore,
    storage::SecureStorage,
    AppState,
};

const USAGE: &str = "usage: connect-dashboard <login EMAIL PASSWORD | logout | whoami | overview | routes [DONGLE_ID] | video ROUTE [SEGMENT]>";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();
    info!("Connect Dashboard starting...");

    let config = ClientConfig::from_env().context("reading configuration")?;
    let session = SessionStore::with_persistence(Arc::new(SecureStorage::new()));
    let state = AppState::new(&config, session, Arc::new(LogNavigator))
        .context("building API client")?;

    commands::restore_session(&state);

    let args: Vec<String> = std::env::args().skip(1).collect();
    let args: Vec<&str> = args.iter().map(String::as_str).collect();

    match args.as_slice() {
        ["login", email, password] => {
            let session = commands::sign_in(&state, email, password).await?;
            println!("{}", serde_json::to_string_pretty(&session)?);
        }
        ["logout"] => {
            commands::sign_out(&state).await;
            println!("logged out");
        }
        ["whoami"] => {
            if state.guard.check().is_granted() {
                let user = state.auth.me().await?;
                state.session.update_user(user.clone());
                println!("{}", serde_json::to_string_pretty(&user)?);
            } else {
                println!("not logged in");
            }
        }
        ["overview"] => {
            if state.guard.check().is_granted() {
                let overview = commands::load_overview(&state).await?;
                println!("{}", serde_json::to_string_pretty(&overview)?);
            } else {
                println!("not logged in");
            }
        }
        ["routes", rest @ ..] => {
            let query = route_query(rest)?;
            let routes = state.routes.list(&query).await?;
            println!("{}", serde_json::to_string_pretty(&routes)?);
        }
        ["video", route] => println!("{}", state.routes.video_url(route, None)),
        ["video", route, segment] => {
            let segment: u32 = segment.parse().context("segment must be a number")?;
            println!("{}", state.routes.video_url(route, Some(segment)));
        }
        _ => bail!(USAGE),
    }

    Ok(())
}

/// Route listing arguments: none, or a single dongle ID to filter by
fn route_query(args: &[&str]) -> anyhow::Result<RouteQuery> {
    match args {
        [] => Ok(RouteQuery::default()),
        [dongle_id] => Ok(RouteQuery::default().for_device(*dongle_id)),
        _ => bail!(USAGE),
    }
}
