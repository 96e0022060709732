//! Application error types.

use thiserror::Error;

/// Main application error type.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] anyhow::Error),

    #[error("Telegram error: {0}")]
    Telegram(#[from] telegram_client::TelegramError),

    #[error("Discord error: {0}")]
    Discord(#[from] serenity::Error),

    #[error("OpenAI error: {0}")]
    OpenAi(#[from] openai_client::OpenAiError),

    #[error("Web API error: {0}")]
    WebApi(#[from] web_apis::ApiError),

    #[error("Media error: {0}")]
    Media(#[from] dbot_core::MediaError),

    #[error("Conversation error: {0}")]
    Conversation(#[from] conversation_store::ConversationError),

    #[error("Core error: {0}")]
    Core(#[from] dbot_core::CoreError),
}

/// Result type alias for application errors.
pub type AppResult<T> = Result<T, AppError>;
