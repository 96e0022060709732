//! SiCepat shipment tracking client.

use crate::error::{decode, ApiError};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument};
use urlencoding::encode;

const SICEPAT_URL: &str = "https://content-main-api-production.sicepat.com";

#[derive(Debug, Clone, Deserialize)]
pub struct TrackingResponse {
    pub sicepat: Tracking,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Tracking {
    pub status: TrackingStatus,
    pub result: Option<Waybill>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrackingStatus {
    pub code: i32,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Waybill {
    pub waybill_number: String,
    pub service: Option<String>,
    pub sender: Option<String>,
    pub sender_address: Option<String>,
    pub receiver_name: Option<String>,
    pub receiver_address: Option<String>,
    pub send_date: Option<String>,
    #[serde(rename = "POD_receiver")]
    pub pod_receiver: Option<String>,
    #[serde(rename = "POD_receiver_time")]
    pub pod_receiver_time: Option<String>,
    #[serde(default)]
    pub track_history: Vec<TrackEvent>,
    pub last_status: Option<LastStatus>,
}

impl Waybill {
    /// A shipment counts as delivered once a proof-of-delivery time exists.
    pub fn delivered(&self) -> bool {
        self.pod_receiver_time
            .as_deref()
            .is_some_and(|t| !t.trim().is_empty())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrackEvent {
    pub date_time: String,
    pub status: Option<String>,
    pub city: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LastStatus {
    pub date_time: String,
    pub status: Option<String>,
    pub city: Option<String>,
    pub receiver_name: Option<String>,
}

#[derive(Clone)]
pub struct SiCepatClient {
    client: Client,
    base_url: String,
}

impl SiCepatClient {
    pub fn new(timeout: Duration) -> Result<Self, ApiError> {
        Self::with_base_url(SICEPAT_URL, timeout)
    }

    pub fn with_base_url(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            base_url: base_url.into(),
        })
    }

    /// Look up a waybill (AWB) number.
    #[instrument(skip(self))]
    pub async fn check_awb(&self, waybill: &str) -> Result<Tracking, ApiError> {
        let response = self
            .client
            .get(format!("{}/public/check-awb/{}", self.base_url, encode(waybill)))
            .send()
            .await?;

        let tracking: TrackingResponse = decode(response).await?;
        debug!("Tracking status {}", tracking.sicepat.status.code);
        Ok(tracking.sicepat)
    }
}
