//! random.dog client.

use crate::error::{decode, ApiError};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::instrument;

const RANDOM_DOG_URL: &str = "https://random.dog";

#[derive(Debug, Clone, Deserialize)]
pub struct DogMedia {
    #[serde(rename = "fileSizeBytes", default)]
    pub file_size_bytes: u64,
    pub url: Option<String>,
}

#[derive(Clone)]
pub struct DogClient {
    client: Client,
    base_url: String,
}

impl DogClient {
    pub fn new(timeout: Duration) -> Result<Self, ApiError> {
        Self::with_base_url(RANDOM_DOG_URL, timeout)
    }

    pub fn with_base_url(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            base_url: base_url.into(),
        })
    }

    /// Fetch a random dog picture or clip.
    #[instrument(skip(self))]
    pub async fn random(&self) -> Result<DogMedia, ApiError> {
        let response = self
            .client
            .get(format!("{}/woof.json", self.base_url))
            .send()
            .await?;

        decode(response).await
    }
}
