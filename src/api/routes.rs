//! Route endpoints under `/routes`, plus builders for media URLs that the
//! player and thumbnail views load directly.

use serde::Serialize;

use crate::client::{ApiClient, ApiError};
use crate::models::{Route, RouteEvent, RouteList, RouteSegment};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PAGE_SIZE: u32 = 20;

#[derive(Clone)]
pub struct RouteApi {
    client: ApiClient,
}

/// Query for one page of routes
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteQuery {
    pub page: u32,
    pub page_size: u32,
    /// Only routes recorded by this dongle
    #[serde(rename = "device_id", skip_serializing_if = "Option::is_none")]
    pub dongle_id: Option<String>,
}

impl Default for RouteQuery {
    fn default() -> Self {
        Self { page: DEFAULT_PAGE, page_size: DEFAULT_PAGE_SIZE, dongle_id: None }
    }
}

impl RouteQuery {
    pub fn page(page: u32, page_size: u32) -> Self {
        Self { page, page_size, dongle_id: None }
    }

    pub fn for_device(mut self, dongle_id: impl Into<String>) -> Self {
        self.dongle_id = Some(dongle_id.into());
        self
    }
}

#[derive(Serialize)]
struct ShareQuery<'a> {
    share_with_email: &'a str,
}

impl RouteApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, query: &RouteQuery) -> Result<RouteList, ApiError> {
        self.client.get_with_query(&["routes"], query).await
    }

    pub async fn get(&self, route_name: &str) -> Result<Route, ApiError> {
        self.client.get(&["routes", route_name]).await
    }

    pub async fn delete(&self, route_name: &str) -> Result<(), ApiError> {
        self.client.delete(&["routes", route_name]).await
    }

    pub async fn segments(&self, route_name: &str) -> Result<Vec<RouteSegment>, ApiError> {
        self.client.get(&["routes", route_name, "segments"]).await
    }

    pub async fn events(&self, route_name: &str) -> Result<Vec<RouteEvent>, ApiError> {
        self.client.get(&["routes", route_name, "events"]).await
    }

    /// Give another account read access to a route
    pub async fn share(&self, route_name: &str, email: &str) -> Result<serde_json::Value, ApiError> {
        let request = self.client
            .request(reqwest::Method::POST, &["routes", route_name, "share"])
            .query(&ShareQuery { share_with_email: email });
        self.client.fetch(request).await
    }

    /// Video stream URL. No request is made.
    pub fn video_url(&self, route_name: &str, segment: Option<u32>) -> String {
        self.media_url(route_name, "video", segment)
    }

    pub fn thumbnail_url(&self, route_name: &str, segment: Option<u32>) -> String {
        self.media_url(route_name, "thumbnail", segment)
    }

    /// Raw log download URL
    pub fn log_url(&self, route_name: &str, segment: Option<u32>) -> String {
        self.media_url(route_name, "log", segment)
    }

    fn media_url(&self, route_name: &str, kind: &str, segment: Option<u32>) -> String {
        let mut url = self.client.endpoint(&["routes", route_name, kind]);
        if let Some(segment) = segment {
            url.query_pairs_mut().append_pair("segment", &segment.to_string());
        }
        url.into()
    }
}
