//! End-to-end handling of one inbound message.

use crate::dispatcher::Dispatcher;
use crate::error::{CoreError, ParseError};
use crate::platform::{ChatPlatform, InboundMessage};
use crate::registry::CommandRegistry;
use crate::render::{ResponseRenderer, SentMessage};
use crate::request::Request;
use crate::resolver::{ThreadKind, ThreadResolver};
use conversation_store::ConversationStore;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// What happened to an inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Empty text or no matching command; nothing was sent.
    Ignored,
    Handled {
        command: String,
        kind: ThreadKind,
        sent: Vec<SentMessage>,
    },
}

/// Parse, resolve, dispatch, render and persist.
#[derive(Clone)]
pub struct MessageProcessor {
    resolver: ThreadResolver,
    dispatcher: Dispatcher,
    renderer: ResponseRenderer,
}

impl MessageProcessor {
    pub fn new(
        registry: Arc<CommandRegistry>,
        store: ConversationStore,
        renderer: ResponseRenderer,
    ) -> Self {
        Self {
            resolver: ThreadResolver::new(registry.clone(), store),
            dispatcher: Dispatcher::new(registry),
            renderer,
        }
    }

    /// Set the per-command timeout.
    pub fn with_command_timeout(mut self, timeout: Duration) -> Self {
        self.dispatcher = self.dispatcher.with_timeout(timeout);
        self
    }

    pub fn store(&self) -> &ConversationStore {
        self.resolver.store()
    }

    /// Handle one inbound message.
    ///
    /// Conversation store failures are returned after the reply was sent.
    pub async fn process(
        &self,
        platform: &dyn ChatPlatform,
        inbound: &InboundMessage,
    ) -> Result<Outcome, CoreError> {
        let request = match Request::parse(&inbound.text) {
            Ok(request) => request,
            Err(ParseError::EmptyInput) => {
                debug!("Ignoring empty message {}", inbound.message_id);
                return Ok(Outcome::Ignored);
            }
        };

        let channel = platform.channel(&inbound.chat_id);
        let Some(turn) = self.resolver.resolve(&channel, request, inbound).await? else {
            return Ok(Outcome::Ignored);
        };

        info!(
            "[{}] Received a '{}' message from {} in chat {}",
            platform.name(),
            inbound.text,
            inbound.sender.as_deref().unwrap_or("unknown"),
            inbound.chat_id
        );

        let Some(response) = self.dispatcher.dispatch(&turn.request).await else {
            return Ok(Outcome::Ignored);
        };

        let sent = self.renderer.render(platform, inbound, &response).await?;

        if response.supports_conversation() && turn.is_tracked() {
            for message in &sent {
                self.resolver
                    .record_reply(&turn, &inbound.message_id, &message.message_id, &message.text)
                    .await?;
            }
        }

        Ok(Outcome::Handled {
            command: turn.request.command,
            kind: turn.kind,
            sent,
        })
    }
}
