//! Telegram adapter: long-polling receive loop and Bot API sends.

use async_trait::async_trait;
use dbot_core::{ChatPlatform, InboundMessage, MediaUpload, MessageProcessor, PlatformError};
use std::sync::Arc;
use std::time::Duration;
use telegram_client::{IncomingText, InputFile, TelegramClient, TelegramError, UpdateReceiver};
use tokio::task::JoinSet;
use tokio_stream::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

pub const PROVIDER: &str = "telegram";

/// Telegram's maximum text message length.
pub const MESSAGE_LIMIT: usize = 4096;

/// Outbound Telegram sends.
#[derive(Clone)]
pub struct TelegramPlatform {
    client: TelegramClient,
}

impl TelegramPlatform {
    pub fn new(client: TelegramClient) -> Self {
        Self { client }
    }
}

fn parse_id(value: &str) -> Result<i64, PlatformError> {
    value
        .parse()
        .map_err(|_| PlatformError::Send(format!("invalid Telegram id '{}'", value)))
}

fn input_file(media: MediaUpload) -> InputFile {
    InputFile {
        bytes: media.bytes,
        file_name: media.file_name,
        mime_type: media.content_type,
    }
}

#[async_trait]
impl ChatPlatform for TelegramPlatform {
    fn name(&self) -> &str {
        PROVIDER
    }

    fn message_limit(&self) -> usize {
        MESSAGE_LIMIT
    }

    async fn send_text(
        &self,
        chat_id: &str,
        text: &str,
        reply_to: &str,
    ) -> Result<String, PlatformError> {
        let sent = self
            .client
            .send_message(parse_id(chat_id)?, text, Some(parse_id(reply_to)?))
            .await
            .map_err(|e| PlatformError::Send(e.to_string()))?;
        Ok(sent.message_id.to_string())
    }

    async fn send_photo(
        &self,
        chat_id: &str,
        media: MediaUpload,
        caption: Option<&str>,
        reply_to: &str,
    ) -> Result<String, PlatformError> {
        let sent = self
            .client
            .send_photo(
                parse_id(chat_id)?,
                input_file(media),
                caption,
                Some(parse_id(reply_to)?),
            )
            .await
            .map_err(|e| PlatformError::Upload(e.to_string()))?;
        Ok(sent.message_id.to_string())
    }

    async fn send_file(
        &self,
        chat_id: &str,
        media: MediaUpload,
        caption: Option<&str>,
        reply_to: &str,
    ) -> Result<String, PlatformError> {
        let sent = self
            .client
            .send_document(
                parse_id(chat_id)?,
                input_file(media),
                caption,
                Some(parse_id(reply_to)?),
            )
            .await
            .map_err(|e| PlatformError::Upload(e.to_string()))?;
        Ok(sent.message_id.to_string())
    }
}

/// Convert a received Telegram message.
pub fn inbound(incoming: IncomingText) -> InboundMessage {
    let mut message = InboundMessage::new(
        incoming.chat_id.to_string(),
        incoming.message_id.to_string(),
        incoming.text,
    );
    message.sender = incoming.sender;
    if let Some(replied) = incoming.reply_to {
        message = message.replying_to(replied.message_id.to_string(), replied.text);
    }
    message
}

/// Receive updates until `cancel` fires, handling each message on its own task.
pub async fn run(
    client: TelegramClient,
    poll_timeout: Duration,
    processor: MessageProcessor,
    cancel: CancellationToken,
) -> Result<(), TelegramError> {
    let me = client.get_me().await?;
    info!(
        "[{}] {} is connected!",
        PROVIDER,
        me.username.as_deref().unwrap_or(&me.first_name)
    );

    let platform = Arc::new(TelegramPlatform::new(client.clone()));
    let stream = UpdateReceiver::new(client, poll_timeout).stream();
    tokio::pin!(stream);

    let mut tasks = JoinSet::new();

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                info!("[{}] Stopping receive loop", PROVIDER);
                break;
            }
            Some(_) = tasks.join_next(), if !tasks.is_empty() => {}
            next = stream.next() => {
                let Some(incoming) = next else { break };
                let message = inbound(incoming);
                let processor = processor.clone();
                let platform = platform.clone();
                tasks.spawn(async move {
                    if let Err(e) = processor.process(platform.as_ref(), &message).await {
                        error!("[{}] Failed handling message {}: {}", PROVIDER, message.message_id, e);
                    }
                });
            }
        }
    }

    // Best-effort drain; the caller bounds how long this may take.
    while tasks.join_next().await.is_some() {}
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use telegram_client::RepliedText;

    #[test]
    fn test_inbound_conversion() {
        let message = inbound(IncomingText {
            chat_id: -100123,
            message_id: 55,
            text: "how are you".into(),
            sender: Some("ana".into()),
            reply_to: Some(RepliedText {
                message_id: 54,
                text: "Hi! How can I help?".into(),
            }),
        });

        assert_eq!(message.chat_id, "-100123");
        assert_eq!(message.message_id, "55");
        assert_eq!(message.sender.as_deref(), Some("ana"));
        let replied = message.replied_to.unwrap();
        assert_eq!(replied.message_id, "54");
        assert_eq!(replied.text, "Hi! How can I help?");
    }

    #[test]
    fn test_parse_id_rejects_non_numeric() {
        assert_eq!(parse_id("-42").unwrap(), -42);
        assert!(parse_id("abc").is_err());
    }
}
