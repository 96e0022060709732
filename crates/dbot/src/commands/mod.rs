//! Bot command handlers.

mod assistant;
mod cat;
mod dog;
mod hello;
mod image;
mod jokes;
mod sicepat;

pub use assistant::{build_messages, AssistantCommand, PromptStyle};
pub use cat::CatCommand;
pub use dog::DogCommand;
pub use hello::HelloCommand;
pub use image::ImageCommand;
pub use jokes::{ChuckNorrisCommand, DadJokeCommand};
pub use sicepat::{describe as describe_waybill, SiCepatCommand};

use crate::config::Config;
use crate::error::AppResult;
use dbot_core::CommandRegistry;
use openai_client::OpenAiClient;
use secrecy::ExposeSecret;
use std::sync::Arc;
use tracing::{info, warn};
use web_apis::{ChuckNorrisClient, DadJokeClient, DogClient, SiCepatClient};

/// Build the registry of every command the configuration allows.
pub fn build_registry(config: &Config) -> AppResult<CommandRegistry> {
    let http_timeout = config.commands.http_timeout;

    let mut registry = CommandRegistry::new()
        .with(Arc::new(HelloCommand))
        .with(Arc::new(CatCommand::new()))
        .with(Arc::new(DogCommand::new(DogClient::new(http_timeout)?)))
        .with(Arc::new(DadJokeCommand::new(DadJokeClient::new(http_timeout)?)))
        .with(Arc::new(ChuckNorrisCommand::new(ChuckNorrisClient::new(http_timeout)?)))
        .with(Arc::new(SiCepatCommand::new(SiCepatClient::new(http_timeout)?)));

    match config
        .openai
        .api_key
        .as_ref()
        .map(|key| key.expose_secret().trim())
        .filter(|key| !key.is_empty())
    {
        Some(api_key) => {
            let openai = Arc::new(
                OpenAiClient::new(
                    api_key,
                    &config.openai.base_url,
                    &config.openai.model,
                    config.openai.timeout,
                )?
                .with_image_model(&config.openai.image_model),
            );
            registry.register(Arc::new(AssistantCommand::new(
                openai.clone(),
                config.openai.temperature,
                config.openai.max_tokens,
            )));
            registry.register(Arc::new(ImageCommand::new(openai)));
            info!("OpenAI commands enabled - Model: {}", config.openai.model);
        }
        None => warn!("OPENAI__API_KEY not set - assistant and image commands disabled"),
    }

    Ok(registry)
}
