//! Backend Models
//!
//! Transient copies of backend-owned entities. Unknown fields are ignored so
//! the dashboard keeps working when the API grows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Authenticated user as returned by `/auth/me`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default = "default_role")]
    pub role: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

fn default_role() -> String {
    "user".to_string()
}

/// Credentials pair issued by login and refresh
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub id: String,
    pub dongle_id: String,
    #[serde(default)]
    pub alias: Option<String>,
    #[serde(default)]
    pub is_paired: bool,
    #[serde(default)]
    pub serial: Option<String>,
    #[serde(default)]
    pub last_seen: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Latest health report of a device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceStatus {
    pub battery_percent: Option<i32>,
    pub temperature_celsius: Option<f64>,
    pub memory_usage_mb: Option<i64>,
    pub storage_used_gb: Option<f64>,
    pub storage_total_gb: Option<f64>,
    pub network_type: Option<String>,
    pub openpilot_version: Option<String>,
    pub is_online: bool,
    pub timestamp: DateTime<Utc>,
}

/// Last known location. The backend shape is not fixed yet, so it stays opaque.
pub type DeviceLocation = serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub id: String,
    pub device_id: String,
    pub fullname: String,
    pub start_time: DateTime<Utc>,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub duration_seconds: Option<i64>,
    #[serde(default)]
    pub distance_meters: Option<f64>,
    #[serde(default)]
    pub upload_complete: bool,
    #[serde(default)]
    pub processed: bool,
    #[serde(default)]
    pub has_video: bool,
    pub created_at: DateTime<Utc>,
}

/// One page of routes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteList {
    pub routes: Vec<Route>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteSegment {
    pub id: String,
    pub segment_number: u32,
    pub canonical_name: String,
    #[serde(default)]
    pub duration_seconds: Option<i64>,
    #[serde(default)]
    pub distance_meters: Option<f64>,
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub upload_complete: bool,
    #[serde(default)]
    pub has_video: bool,
    #[serde(default)]
    pub has_log: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteEvent {
    pub id: String,
    pub event_type: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}
