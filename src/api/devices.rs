//! Device endpoints under `/devices`.

use serde::Serialize;

use crate::client::{ApiClient, ApiError};
use crate::models::{Device, DeviceLocation, DeviceStatus};

#[derive(Clone)]
pub struct DeviceApi {
    client: ApiClient,
}

/// Payload for registering a device with the account
#[derive(Debug, Clone, Default, Serialize)]
pub struct NewDevice {
    pub dongle_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_key: Option<String>,
}

/// Editable device fields
#[derive(Debug, Clone, Default, Serialize)]
pub struct DeviceUpdate {
    pub alias: Option<String>,
}

#[derive(Serialize)]
struct PairRequest<'a> {
    dongle_id: &'a str,
    pairing_token: &'a str,
}

impl DeviceApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Vec<Device>, ApiError> {
        self.client.get(&["devices"]).await
    }

    pub async fn get(&self, dongle_id: &str) -> Result<Device, ApiError> {
        self.client.get(&["devices", dongle_id]).await
    }

    pub async fn create(&self, device: &NewDevice) -> Result<Device, ApiError> {
        self.client.post(&["devices"], device).await
    }

    pub async fn update(&self, dongle_id: &str, update: &DeviceUpdate) -> Result<Device, ApiError> {
        self.client.put(&["devices", dongle_id], update).await
    }

    pub async fn delete(&self, dongle_id: &str) -> Result<(), ApiError> {
        self.client.delete(&["devices", dongle_id]).await
    }

    /// Latest status report
    pub async fn status(&self, dongle_id: &str) -> Result<DeviceStatus, ApiError> {
        self.client.get(&["devices", dongle_id, "status"]).await
    }

    /// Last known location
    pub async fn location(&self, dongle_id: &str) -> Result<DeviceLocation, ApiError> {
        self.client.get(&["devices", dongle_id, "location"]).await
    }

    /// Claim a device using the token it displays during pairing
    pub async fn pair(&self, dongle_id: &str, pairing_token: &str) -> Result<Device, ApiError> {
        self.client
            .post(&["devices", dongle_id, "pair"], &PairRequest { dongle_id, pairing_token })
            .await
    }
}
