//! Joke commands.

use async_trait::async_trait;
use dbot_core::{Command, CommandError, Request, Response};
use tracing::warn;
use web_apis::{ChuckNorrisClient, DadJokeClient};

const NO_JOKES: &str = "no jokes for now";

fn joke_or_apology(joke: Option<String>) -> Response {
    match joke.filter(|j| !j.trim().is_empty()) {
        Some(joke) => Response::text(joke),
        None => Response::failure(NO_JOKES),
    }
}

pub struct DadJokeCommand {
    client: DadJokeClient,
}

impl DadJokeCommand {
    pub fn new(client: DadJokeClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Command for DadJokeCommand {
    fn name(&self) -> &str {
        "dad-joke"
    }

    fn accepted_commands(&self) -> &[&'static str] {
        &["DADJOKE"]
    }

    async fn execute(&self, _request: &Request) -> Result<Response, CommandError> {
        match self.client.random().await {
            Ok(joke) => Ok(joke_or_apology(joke.joke)),
            Err(e) => {
                warn!("icanhazdadjoke request failed: {}", e);
                Ok(Response::failure(NO_JOKES))
            }
        }
    }
}

pub struct ChuckNorrisCommand {
    client: ChuckNorrisClient,
}

impl ChuckNorrisCommand {
    pub fn new(client: ChuckNorrisClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Command for ChuckNorrisCommand {
    fn name(&self) -> &str {
        "chuck-norris"
    }

    fn accepted_commands(&self) -> &[&'static str] {
        &["CHUCK", "CHUCKNORRIS"]
    }

    async fn execute(&self, _request: &Request) -> Result<Response, CommandError> {
        match self.client.random().await {
            Ok(joke) => Ok(joke_or_apology(joke.value)),
            Err(e) => {
                warn!("chucknorris.io request failed: {}", e);
                Ok(Response::failure(NO_JOKES))
            }
        }
    }
}
