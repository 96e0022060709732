//! Core error types.

use conversation_store::ConversationError;
use thiserror::Error;

/// Raw text could not be turned into a request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Message is empty")]
    EmptyInput,
}

/// Failure raised by a command handler.
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("{service} API error: {message}")]
    ExternalApi { service: String, message: String },

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),
}

impl CommandError {
    pub fn external(service: impl Into<String>, error: impl std::fmt::Display) -> Self {
        Self::ExternalApi {
            service: service.into(),
            message: error.to_string(),
        }
    }
}

/// Failure reported by a chat platform adapter.
#[derive(Error, Debug)]
pub enum PlatformError {
    #[error("Send failed: {0}")]
    Send(String),

    #[error("Upload failed: {0}")]
    Upload(String),
}

/// Media could not be fetched for re-upload.
#[derive(Error, Debug)]
pub enum MediaError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Media source returned status {0}")]
    Status(u16),

    #[error("Unsupported content type: {0}")]
    UnsupportedContentType(String),

    #[error("Missing source URL")]
    MissingSource,
}

/// Errors that escape the message pipeline.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Conversation error: {0}")]
    Conversation(#[from] ConversationError),

    #[error("Platform error: {0}")]
    Platform(#[from] PlatformError),
}
