//! Chat platform seam.

use crate::error::PlatformError;
use async_trait::async_trait;

/// A text message received from a chat platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub chat_id: String,
    pub message_id: String,
    pub text: String,
    /// Display name of the author, for logs.
    pub sender: Option<String>,
    /// The message this one replies to, if any.
    pub replied_to: Option<RepliedMessage>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepliedMessage {
    pub message_id: String,
    pub text: String,
}

impl InboundMessage {
    pub fn new(
        chat_id: impl Into<String>,
        message_id: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            chat_id: chat_id.into(),
            message_id: message_id.into(),
            text: text.into(),
            sender: None,
            replied_to: None,
        }
    }

    pub fn from_sender(mut self, sender: impl Into<String>) -> Self {
        self.sender = Some(sender.into());
        self
    }

    pub fn replying_to(mut self, message_id: impl Into<String>, text: impl Into<String>) -> Self {
        self.replied_to = Some(RepliedMessage {
            message_id: message_id.into(),
            text: text.into(),
        });
        self
    }
}

/// Downloaded media ready for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaUpload {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub content_type: String,
}

/// Outbound side of a chat platform. Every send is a reply to `reply_to`
/// and returns the platform id of the sent message.
#[async_trait]
pub trait ChatPlatform: Send + Sync {
    /// Provider name, also the channel prefix (e.g. `telegram`).
    fn name(&self) -> &str;

    /// Maximum characters per text message.
    fn message_limit(&self) -> usize;

    async fn send_text(
        &self,
        chat_id: &str,
        text: &str,
        reply_to: &str,
    ) -> Result<String, PlatformError>;

    async fn send_photo(
        &self,
        chat_id: &str,
        media: MediaUpload,
        caption: Option<&str>,
        reply_to: &str,
    ) -> Result<String, PlatformError>;

    async fn send_file(
        &self,
        chat_id: &str,
        media: MediaUpload,
        caption: Option<&str>,
        reply_to: &str,
    ) -> Result<String, PlatformError>;

    /// Conversation store channel key for a chat.
    fn channel(&self, chat_id: &str) -> String {
        format!("{}:{}", self.name(), chat_id)
    }
}
