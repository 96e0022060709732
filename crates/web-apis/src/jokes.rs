//! Dad joke and Chuck Norris joke services.

use crate::error::{decode, ApiError};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument};

const DAD_JOKE_URL: &str = "https://icanhazdadjoke.com";
const CHUCK_NORRIS_URL: &str = "https://api.chucknorris.io";
const USER_AGENT: &str = "https://github.com/dwifuady/DBot";

#[derive(Debug, Clone, Deserialize)]
pub struct DadJoke {
    pub id: Option<String>,
    pub joke: Option<String>,
    pub status: Option<u16>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChuckNorrisJoke {
    pub id: Option<String>,
    pub value: Option<String>,
    pub url: Option<String>,
}

/// icanhazdadjoke.com client.
#[derive(Clone)]
pub struct DadJokeClient {
    client: Client,
    base_url: String,
}

impl DadJokeClient {
    pub fn new(timeout: Duration) -> Result<Self, ApiError> {
        Self::with_base_url(DAD_JOKE_URL, timeout)
    }

    pub fn with_base_url(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            base_url: base_url.into(),
        })
    }

    /// Fetch a random joke.
    #[instrument(skip(self))]
    pub async fn random(&self) -> Result<DadJoke, ApiError> {
        let response = self
            .client
            .get(format!("{}/", self.base_url))
            .header("Accept", "application/json")
            .header("User-Agent", USER_AGENT)
            .send()
            .await?;

        let joke: DadJoke = decode(response).await?;
        debug!("Dad joke {:?}", joke.id);
        Ok(joke)
    }
}

/// api.chucknorris.io client.
#[derive(Clone)]
pub struct ChuckNorrisClient {
    client: Client,
    base_url: String,
}

impl ChuckNorrisClient {
    pub fn new(timeout: Duration) -> Result<Self, ApiError> {
        Self::with_base_url(CHUCK_NORRIS_URL, timeout)
    }

    pub fn with_base_url(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            base_url: base_url.into(),
        })
    }

    /// Fetch a random fact.
    #[instrument(skip(self))]
    pub async fn random(&self) -> Result<ChuckNorrisJoke, ApiError> {
        let response = self
            .client
            .get(format!("{}/jokes/random", self.base_url))
            .send()
            .await?;

        decode(response).await
    }
}
