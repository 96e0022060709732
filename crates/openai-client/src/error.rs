//! OpenAI client errors.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum OpenAiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Rate limit exceeded")]
    RateLimit,

    #[error("Authentication failed")]
    Unauthorized,

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Empty response from AI service")]
    EmptyResponse,
}

impl OpenAiError {
    /// Upstream HTTP status, when the service answered at all.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            OpenAiError::RateLimit => Some(429),
            OpenAiError::Unauthorized => Some(401),
            OpenAiError::Api { status, .. } => Some(*status),
            OpenAiError::Http(e) => e.status().map(|s| s.as_u16()),
            OpenAiError::Json(_) | OpenAiError::EmptyResponse => None,
        }
    }
}
