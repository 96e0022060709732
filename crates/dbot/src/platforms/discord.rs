//! Discord adapter: gateway event handler and channel sends.

use async_trait::async_trait;
use dbot_core::{ChatPlatform, InboundMessage, MediaUpload, MessageProcessor, PlatformError};
use serenity::all::{ChannelId, MessageId};
use serenity::builder::{CreateAttachment, CreateMessage};
use serenity::http::Http;
use serenity::model::channel::Message as DiscordMessage;
use serenity::model::gateway::Ready;
use serenity::prelude::*;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

pub const PROVIDER: &str = "discord";

/// Discord's maximum message length.
pub const MESSAGE_LIMIT: usize = 2000;

/// Outbound Discord sends.
#[derive(Clone)]
pub struct DiscordPlatform {
    http: Arc<Http>,
}

impl DiscordPlatform {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }

    async fn send(
        &self,
        chat_id: &str,
        reply_to: &str,
        builder: CreateMessage,
    ) -> Result<String, serenity::Error> {
        let channel = ChannelId::new(parse_id(chat_id)?);
        let builder = builder.reference_message((channel, MessageId::new(parse_id(reply_to)?)));
        let sent = channel.send_message(&*self.http, builder).await?;
        Ok(sent.id.to_string())
    }

    async fn upload(
        &self,
        chat_id: &str,
        media: MediaUpload,
        caption: Option<&str>,
        reply_to: &str,
    ) -> Result<String, PlatformError> {
        let mut builder =
            CreateMessage::new().add_file(CreateAttachment::bytes(media.bytes, media.file_name));
        if let Some(caption) = caption {
            builder = builder.content(caption);
        }
        self.send(chat_id, reply_to, builder)
            .await
            .map_err(|e| PlatformError::Upload(e.to_string()))
    }
}

fn parse_id(value: &str) -> Result<u64, serenity::Error> {
    value
        .parse::<u64>()
        .ok()
        .filter(|id| *id != 0)
        .ok_or_else(|| serenity::Error::Other("invalid Discord snowflake"))
}

#[async_trait]
impl ChatPlatform for DiscordPlatform {
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
        self.send(chat_id, reply_to, CreateMessage::new().content(text))
            .await
            .map_err(|e| PlatformError::Send(e.to_string()))
    }

    async fn send_photo(
        &self,
        chat_id: &str,
        media: MediaUpload,
        caption: Option<&str>,
        reply_to: &str,
    ) -> Result<String, PlatformError> {
        self.upload(chat_id, media, caption, reply_to).await
    }

    async fn send_file(
        &self,
        chat_id: &str,
        media: MediaUpload,
        caption: Option<&str>,
        reply_to: &str,
    ) -> Result<String, PlatformError> {
        self.upload(chat_id, media, caption, reply_to).await
    }
}

struct Handler {
    processor: MessageProcessor,
}

impl Handler {
    /// Text of the message `msg` replies to, fetching it when the gateway
    /// did not include it.
    async fn replied_to(ctx: &Context, msg: &DiscordMessage) -> Option<(String, String)> {
        if let Some(referenced) = &msg.referenced_message {
            return Some((referenced.id.to_string(), referenced.content.clone()));
        }

        let reference = msg.message_reference.as_ref()?;
        let message_id = reference.message_id?;
        match msg.channel_id.message(ctx, message_id).await {
            Ok(referenced) => Some((referenced.id.to_string(), referenced.content)),
            Err(e) => {
                warn!("[{}] Could not fetch replied message {}: {}", PROVIDER, message_id, e);
                None
            }
        }
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn message(&self, ctx: Context, msg: DiscordMessage) {
        // Never respond to bots, including ourselves.
        if msg.author.bot {
            return;
        }

        let mut inbound = InboundMessage::new(
            msg.channel_id.to_string(),
            msg.id.to_string(),
            msg.content.as_str(),
        )
        .from_sender(msg.author.name.as_str());

        if let Some((message_id, text)) = Self::replied_to(&ctx, &msg).await {
            inbound = inbound.replying_to(message_id, text);
        }

        debug!("[{}] Message {} in channel {}", PROVIDER, inbound.message_id, inbound.chat_id);

        let platform = DiscordPlatform::new(ctx.http.clone());
        if let Err(e) = self.processor.process(&platform, &inbound).await {
            error!("[{}] Failed handling message {}: {}", PROVIDER, inbound.message_id, e);
        }
    }

    async fn ready(&self, _: Context, ready: Ready) {
        info!("[{}] {} is connected!", PROVIDER, ready.user.name);
    }
}

/// Run the gateway client until `cancel` fires.
pub async fn run(
    token: &str,
    processor: MessageProcessor,
    cancel: CancellationToken,
) -> Result<(), serenity::Error> {
    let intents = GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT
        | GatewayIntents::GUILDS;

    let mut client = Client::builder(token, intents)
        .event_handler(Handler { processor })
        .await?;

    let shard_manager = client.shard_manager.clone();
    tokio::spawn(async move {
        cancel.cancelled().await;
        info!("[{}] Shutting down shards", PROVIDER);
        shard_manager.shutdown_all().await;
    });

    client.start().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("1081234567890123456").unwrap(), 1081234567890123456);
        assert!(parse_id("0").is_err());
        assert!(parse_id("general").is_err());
    }
}
