//! Dog command - a random dog picture or clip.

use async_trait::async_trait;
use dbot_core::{Command, CommandError, Request, Response};
use tracing::warn;
use web_apis::DogClient;

const NO_DOG: &str = "No dog found :(";

pub struct DogCommand {
    client: DogClient,
}

impl DogCommand {
    pub fn new(client: DogClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Command for DogCommand {
    fn name(&self) -> &str {
        "dog"
    }

    fn accepted_commands(&self) -> &[&'static str] {
        &["DOG", "WOOF"]
    }

    async fn execute(&self, _request: &Request) -> Result<Response, CommandError> {
        match self.client.random().await {
            Ok(dog) => match dog.url.filter(|url| !url.trim().is_empty()) {
                Some(url) => Ok(Response::file(url)),
                None => Ok(Response::failure(NO_DOG)),
            },
            Err(e) => {
                warn!("random.dog request failed: {}", e);
                Ok(Response::failure(NO_DOG))
            }
        }
    }
}
