//! Update receiver with long polling.

use crate::client::TelegramClient;
use crate::types::*;
use std::time::Duration;
use tokio::time::sleep;
use tokio_stream::Stream;
use tracing::{debug, error};

/// Update receiver that long-polls `getUpdates`.
pub struct UpdateReceiver {
    client: TelegramClient,
    poll_timeout: Duration,
}

impl UpdateReceiver {
    /// Create a new update receiver.
    pub fn new(client: TelegramClient, poll_timeout: Duration) -> Self {
        Self {
            client,
            poll_timeout,
        }
    }

    /// Start receiving text messages as an async stream.
    ///
    /// The offset advances past every update, including skipped non-text ones,
    /// so nothing is delivered twice.
    pub fn stream(self) -> impl Stream<Item = IncomingText> {
        async_stream::stream! {
            let mut offset = 0i64;
            loop {
                match self.client.get_updates(offset, self.poll_timeout).await {
                    Ok(updates) => {
                        for update in updates {
                            offset = offset.max(update.update_id + 1);
                            if let Some(text) = IncomingText::from_update(&update) {
                                debug!("Received: {} from chat {}",
                                    text.text.chars().take(50).collect::<String>(),
                                    text.chat_id
                                );
                                yield text;
                            }
                        }
                    }
                    Err(e) => {
                        error!("Telegram API error: {}", e);
                        // Back off on error
                        sleep(Duration::from_secs(5)).await;
                    }
                }
            }
        }
    }
}
