//! Resource APIs
//!
//! One typed call per backend operation. Each call is a thin pass-through to
//! [`ApiClient`](crate::client::ApiClient): fixed method, path, and payload.

pub mod auth;
pub mod devices;
pub mod routes;

pub use auth::AuthApi;
pub use devices::DeviceApi;
pub use routes::RouteApi;
