//! Telegram client errors.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TelegramError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Telegram API error [{code}]: {description}")]
    Api { code: i32, description: String },

    #[error("Send failed: {0}")]
    SendFailed(String),
}
