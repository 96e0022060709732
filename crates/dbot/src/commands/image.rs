//! Image generation through OpenAI.

use async_trait::async_trait;
use dbot_core::{Command, CommandError, Request, Response, MEDIA_DELIVERY_FAILURE_MESSAGE};
use openai_client::OpenAiClient;
use std::sync::Arc;
use tracing::warn;

const IMAGE_SIZE: &str = "512x512";

pub struct ImageCommand {
    client: Arc<OpenAiClient>,
}

impl ImageCommand {
    pub fn new(client: Arc<OpenAiClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Command for ImageCommand {
    fn name(&self) -> &str {
        "image"
    }

    fn accepted_commands(&self) -> &[&'static str] {
        &["IMAGINE", "DALLE"]
    }

    async fn execute(&self, request: &Request) -> Result<Response, CommandError> {
        let prompt = request.args.trim();
        if prompt.is_empty() {
            return Ok(Response::failure("Tell me what to draw, e.g. IMAGINE a cat in space"));
        }

        match self.client.generate_image(prompt, 1, IMAGE_SIZE).await {
            Ok(urls) => match urls.into_iter().next() {
                Some(url) => Ok(Response::image(url)),
                None => Ok(Response::failure(MEDIA_DELIVERY_FAILURE_MESSAGE)),
            },
            Err(e) => {
                warn!("Image generation failed: {}", e);
                Ok(Response::failure(MEDIA_DELIVERY_FAILURE_MESSAGE))
            }
        }
    }
}
