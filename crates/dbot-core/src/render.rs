//! Response rendering onto a chat platform.

use crate::error::{MediaError, PlatformError};
use crate::platform::{ChatPlatform, InboundMessage, MediaUpload};
use crate::response::{MediaResponse, Response};
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

/// Sent when any image or file cannot be fetched or uploaded.
pub const MEDIA_DELIVERY_FAILURE_MESSAGE: &str = "Error generating your image, please try again later.";

/// Minimum characters reserved for the `(i/n) ` prefix of multi-part replies.
pub const CHUNK_PREFIX_HEADROOM: usize = 8;

/// A message the renderer sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub message_id: String,
    /// Text of the chunk without its part prefix.
    pub text: String,
}

/// Split `text` into `⌈len/limit⌉` chunks of at most `limit` characters.
pub fn split_message(text: &str, limit: usize) -> Vec<String> {
    let limit = limit.max(1);
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= limit {
        return vec![text.to_string()];
    }
    chars
        .chunks(limit)
        .map(|chunk| chunk.iter().collect())
        .collect()
}

/// Characters taken by the widest `(i/n) ` prefix for `total` chunks.
fn prefix_width(total: usize) -> usize {
    4 + 2 * total.to_string().len()
}

/// Split `text` so that each chunk still fits `limit` once its `(i/n) `
/// prefix is added. Text within the limit is returned whole.
pub fn split_with_prefix_room(text: &str, limit: usize) -> Vec<String> {
    if text.chars().count() <= limit {
        return vec![text.to_string()];
    }

    let mut headroom = CHUNK_PREFIX_HEADROOM;
    loop {
        let chunks = split_message(text, limit.saturating_sub(headroom));
        let needed = prefix_width(chunks.len());
        if needed <= headroom {
            return chunks;
        }
        headroom = needed;
    }
}

/// File extension for a media content type.
pub fn extension_for(content_type: &str) -> &'static str {
    match content_type {
        "image/jpeg" | "image/jpg" => ".jpg",
        "image/png" => ".png",
        "video/mp4" => ".mp4",
        _ => "",
    }
}

/// Maps responses to platform send calls.
#[derive(Clone)]
pub struct ResponseRenderer {
    client: Client,
}

impl ResponseRenderer {
    /// Create a renderer whose media downloads time out after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, MediaError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    /// Send `response` as replies to `inbound`, in order.
    #[instrument(skip_all, fields(platform = %platform.name(), chat = %inbound.chat_id))]
    pub async fn render(
        &self,
        platform: &dyn ChatPlatform,
        inbound: &InboundMessage,
        response: &Response,
    ) -> Result<Vec<SentMessage>, PlatformError> {
        match response {
            Response::Text(text) => {
                self.send_text(platform, inbound, &text.message).await
            }
            Response::Image(media) => self.send_media(platform, inbound, media, true).await,
            Response::File(media) => self.send_media(platform, inbound, media, false).await,
        }
    }

    async fn send_text(
        &self,
        platform: &dyn ChatPlatform,
        inbound: &InboundMessage,
        text: &str,
    ) -> Result<Vec<SentMessage>, PlatformError> {
        if text.is_empty() {
            debug!("Skipping empty text response");
            return Ok(Vec::new());
        }

        let chunks = split_with_prefix_room(text, platform.message_limit());

        let total = chunks.len();
        let mut sent = Vec::with_capacity(total);
        for (i, chunk) in chunks.into_iter().enumerate() {
            let outgoing = if total > 1 {
                format!("({}/{}) {}", i + 1, total, chunk)
            } else {
                chunk.clone()
            };
            let message_id = platform
                .send_text(&inbound.chat_id, &outgoing, &inbound.message_id)
                .await?;
            sent.push(SentMessage {
                message_id,
                text: chunk,
            });
        }

        Ok(sent)
    }

    async fn send_media(
        &self,
        platform: &dyn ChatPlatform,
        inbound: &InboundMessage,
        media: &MediaResponse,
        as_photo: bool,
    ) -> Result<Vec<SentMessage>, PlatformError> {
        let caption = media.caption.as_deref().filter(|c| !c.trim().is_empty());

        let upload = match self.fetch_media(&media.source_url).await {
            Ok(upload) => upload,
            Err(e) => {
                warn!(url = %media.source_url, error = %e, "Failed fetching media");
                return self.send_text(platform, inbound, MEDIA_DELIVERY_FAILURE_MESSAGE).await;
            }
        };

        let result = if as_photo && upload.content_type.starts_with("image/") {
            platform
                .send_photo(&inbound.chat_id, upload, caption, &inbound.message_id)
                .await
        } else {
            platform
                .send_file(&inbound.chat_id, upload, caption, &inbound.message_id)
                .await
        };

        match result {
            Ok(message_id) => Ok(vec![SentMessage {
                message_id,
                text: caption.unwrap_or_default().to_string(),
            }]),
            Err(e) => {
                warn!(error = %e, "Failed sending media");
                self.send_text(platform, inbound, MEDIA_DELIVERY_FAILURE_MESSAGE).await
            }
        }
    }

    /// Download media, accepting only image and video content.
    #[instrument(skip(self))]
    pub async fn fetch_media(&self, url: &str) -> Result<MediaUpload, MediaError> {
        if url.trim().is_empty() {
            return Err(MediaError::MissingSource);
        }

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(MediaError::Status(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(';').next())
            .map(|value| value.trim().to_ascii_lowercase())
            .unwrap_or_default();

        if !(content_type.starts_with("image/") || content_type.starts_with("video/")) {
            return Err(MediaError::UnsupportedContentType(content_type));
        }

        let bytes = response.bytes().await?.to_vec();
        let file_name = format!("{}{}", Uuid::new_v4(), extension_for(&content_type));
        debug!("Fetched {} ({} bytes)", file_name, bytes.len());

        Ok(MediaUpload {
            bytes,
            file_name,
            content_type,
        })
    }
}
