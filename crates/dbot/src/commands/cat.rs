//! Cat command - a random cat picture, optionally saying something.

use async_trait::async_trait;
use dbot_core::{Command, CommandError, Request, Response};

const CATAAS_URL: &str = "https://cataas.com";

pub struct CatCommand {
    base_url: String,
}

impl CatCommand {
    pub fn new() -> Self {
        Self::with_base_url(CATAAS_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

impl Default for CatCommand {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Command for CatCommand {
    fn name(&self) -> &str {
        "cat"
    }

    fn accepted_commands(&self) -> &[&'static str] {
        &["CAT:", "KUCING:", "CAT", "KUCING"]
    }

    async fn execute(&self, request: &Request) -> Result<Response, CommandError> {
        let says = request.args.trim();
        if says.is_empty() {
            return Ok(Response::image(format!("{}/cat", self.base_url)));
        }

        Ok(Response::image(format!(
            "{}/cat/says/{}",
            self.base_url,
            urlencoding::encode(says)
        )))
    }
}
