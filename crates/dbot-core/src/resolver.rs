//! Thread resolution: new invocations, argument-only follow-ups and
//! continuing conversations.

use crate::platform::InboundMessage;
use crate::registry::CommandRegistry;
use crate::request::{Request, RequestMessage, Sender};
use conversation_store::{
    ConversationError, ConversationRecord, ConversationStore, NewConversationRecord,
};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// How an inbound message relates to earlier ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreadKind {
    /// Starts a thread rooted at the inbound message.
    New,
    /// A bare keyword replying to a message whose text becomes the argument.
    ArgumentOnly,
    /// Continues a stored thread under its original command.
    Continuation,
}

/// A request ready for dispatch.
#[derive(Debug, Clone)]
pub struct ResolvedTurn {
    pub request: Request,
    pub kind: ThreadKind,
    pub channel: String,
    /// `original_message_id` shared by every record of the thread.
    pub thread_root: String,
}

impl ResolvedTurn {
    /// Whether turns of this exchange are persisted.
    pub fn is_tracked(&self) -> bool {
        self.kind != ThreadKind::ArgumentOnly
    }
}

/// Resolves inbound messages against the registry and conversation store.
#[derive(Clone)]
pub struct ThreadResolver {
    registry: Arc<CommandRegistry>,
    store: ConversationStore,
}

impl ThreadResolver {
    pub fn new(registry: Arc<CommandRegistry>, store: ConversationStore) -> Self {
        Self { registry, store }
    }

    pub fn store(&self) -> &ConversationStore {
        &self.store
    }

    /// Resolve `request` parsed from `inbound`.
    ///
    /// Returns `None` when the resolved command is not registered; nothing is
    /// persisted in that case. For new threads and continuations the user's
    /// turn is appended and the request carries the whole thread as its chain.
    /// If that append fails the request keeps its parsed chain.
    #[instrument(skip(self, request, inbound), fields(message_id = %inbound.message_id))]
    pub async fn resolve(
        &self,
        channel: &str,
        request: Request,
        inbound: &InboundMessage,
    ) -> Result<Option<ResolvedTurn>, ConversationError> {
        let mut kind = ThreadKind::New;
        let mut thread_root = inbound.message_id.clone();
        let mut request = request;

        if let Some(replied) = &inbound.replied_to {
            let bare = inbound.text.trim();
            if !bare.contains(char::is_whitespace) && self.registry.is_keyword(bare) {
                debug!("Argument-only follow-up to {}", replied.message_id);
                kind = ThreadKind::ArgumentOnly;
                request = request.with_args(replied.text.as_str());
            } else if let Some(previous) = self
                .store
                .find_by_message_id(channel, &replied.message_id)
                .await?
            {
                kind = ThreadKind::Continuation;
                thread_root = previous.original_message_id.clone();
                request = continue_under(request, &previous, bare);
            } else {
                debug!("No stored thread for {}, starting a new one", replied.message_id);
            }
        }

        if !self.registry.is_keyword(&request.command) {
            return Ok(None);
        }

        let mut turn = ResolvedTurn {
            request,
            kind,
            channel: channel.to_string(),
            thread_root,
        };

        if turn.is_tracked() {
            let parent_id = inbound.replied_to.as_ref().map(|r| r.message_id.clone());
            match self.persist_user_turn(&turn, parent_id).await {
                Ok(chain) => {
                    debug!("Thread {} has {} turns", turn.thread_root, chain.len());
                    turn.request = turn.request.with_messages(chain);
                }
                Err(e) => warn!(
                    thread = %turn.thread_root,
                    error = %e,
                    "Failed persisting user turn, answering without history"
                ),
            }
        }

        Ok(Some(turn))
    }

    async fn persist_user_turn(
        &self,
        turn: &ResolvedTurn,
        parent_id: Option<String>,
    ) -> Result<Vec<RequestMessage>, ConversationError> {
        self.store
            .append(NewConversationRecord::user(
                turn.channel.as_str(),
                turn.request.command.as_str(),
                turn.request.args.as_str(),
                turn.thread_root.as_str(),
                parent_id,
            ))
            .await?;

        self.chain(&turn.channel, &turn.thread_root).await
    }

    /// Rebuild the ordered chain of a thread.
    pub async fn chain(
        &self,
        channel: &str,
        thread_root: &str,
    ) -> Result<Vec<RequestMessage>, ConversationError> {
        let records = self
            .store
            .find_all_by_original_message_id(channel, thread_root)
            .await?;

        Ok(records
            .into_iter()
            .zip(1u32..)
            .map(|(record, sequence)| {
                let sender = if record.is_from_bot {
                    Sender::Bot
                } else {
                    Sender::User
                };
                RequestMessage::new(sender, record.message, sequence, record.initial_command)
            })
            .collect())
    }

    /// Persist a bot reply sent as `sent_message_id` in answer to the inbound
    /// message.
    pub async fn record_reply(
        &self,
        turn: &ResolvedTurn,
        inbound_message_id: &str,
        sent_message_id: &str,
        text: &str,
    ) -> Result<ConversationRecord, ConversationError> {
        self.store
            .append(NewConversationRecord::bot(
                turn.channel.as_str(),
                turn.request.command.as_str(),
                text,
                sent_message_id,
                inbound_message_id,
                turn.thread_root.as_str(),
            ))
            .await
    }
}

/// Re-target a reply at the command its thread started with. When the typed
/// leading token is not that command, the whole message is the argument.
fn continue_under(request: Request, previous: &ConversationRecord, text: &str) -> Request {
    let initial = previous.initial_command.trim();
    if initial.is_empty() || initial.eq_ignore_ascii_case(&request.command) {
        return request;
    }
    request.with_command(initial).with_args(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Command;
    use crate::error::CommandError;
    use crate::response::Response;
    use async_trait::async_trait;

    struct Keywords(&'static [&'static str]);

    #[async_trait]
    impl Command for Keywords {
        fn name(&self) -> &str {
            "keywords"
        }

        fn accepted_commands(&self) -> &[&'static str] {
            self.0
        }

        async fn execute(&self, _request: &Request) -> Result<Response, CommandError> {
            Ok(Response::text(""))
        }
    }

    const CHANNEL: &str = "telegram:42";

    fn resolver() -> ThreadResolver {
        let registry = CommandRegistry::new()
            .with(Arc::new(Keywords(&["AI", "BOT"])))
            .with(Arc::new(Keywords(&["TL", "TRANSLATE"])));
        ThreadResolver::new(Arc::new(registry), ConversationStore::new(100))
    }

    async fn resolve(
        resolver: &ThreadResolver,
        inbound: InboundMessage,
    ) -> Option<ResolvedTurn> {
        let request = Request::parse(&inbound.text).unwrap();
        resolver.resolve(CHANNEL, request, &inbound).await.unwrap()
    }

    #[tokio::test]
    async fn test_new_thread_is_persisted() {
        let resolver = resolver();
        let turn = resolve(&resolver, InboundMessage::new("42", "10", "ai hello"))
            .await
            .unwrap();

        assert_eq!(turn.kind, ThreadKind::New);
        assert_eq!(turn.thread_root, "10");
        assert_eq!(turn.request.messages.len(), 1);
        assert_eq!(turn.request.messages[0].text, "hello");

        let stored = resolver.store().find_by_message_id(CHANNEL, "10").await.unwrap().unwrap();
        assert_eq!(stored.initial_command, "AI");
        assert!(stored.parent_id.is_none());
    }

    #[tokio::test]
    async fn test_unknown_command_is_ignored_and_not_persisted() {
        let resolver = resolver();
        assert!(resolve(&resolver, InboundMessage::new("42", "10", "good morning"))
            .await
            .is_none());
        assert!(resolver.store().is_empty().await);
    }

    #[tokio::test]
    async fn test_argument_only_follow_up() {
        let resolver = resolver();
        let inbound = InboundMessage::new("42", "11", "tl").replying_to("7", "Selamat pagi semua");
        let turn = resolve(&resolver, inbound).await.unwrap();

        assert_eq!(turn.kind, ThreadKind::ArgumentOnly);
        assert_eq!(turn.request.command, "TL");
        assert_eq!(turn.request.args, "Selamat pagi semua");
        assert_eq!(turn.request.full_args, "");
        assert_eq!(turn.request.messages.len(), 1);
        assert!(!turn.is_tracked());
        assert!(resolver.store().is_empty().await);
    }

    #[tokio::test]
    async fn test_continuation_keeps_initial_command() {
        let resolver = resolver();
        let first = resolve(&resolver, InboundMessage::new("42", "10", "ai hello"))
            .await
            .unwrap();
        resolver
            .record_reply(&first, "10", "11", "Hi! How can I help?")
            .await
            .unwrap();

        let inbound =
            InboundMessage::new("42", "12", "how are you").replying_to("11", "Hi! How can I help?");
        let turn = resolve(&resolver, inbound).await.unwrap();

        assert_eq!(turn.kind, ThreadKind::Continuation);
        assert_eq!(turn.request.command, "AI");
        assert_eq!(turn.request.args, "how are you");
        assert_eq!(turn.thread_root, "10");

        let texts: Vec<_> = turn
            .request
            .messages
            .iter()
            .map(|m| (m.sender, m.text.as_str(), m.sequence))
            .collect();
        assert_eq!(
            texts,
            vec![
                (Sender::User, "hello", 1),
                (Sender::Bot, "Hi! How can I help?", 2),
                (Sender::User, "how are you", 3),
            ]
        );
    }

    #[tokio::test]
    async fn test_continuation_with_same_command_keeps_parsed_args() {
        let resolver = resolver();
        let first = resolve(&resolver, InboundMessage::new("42", "10", "bot hello"))
            .await
            .unwrap();
        resolver.record_reply(&first, "10", "11", "Hello!").await.unwrap();

        let inbound = InboundMessage::new("42", "12", "BOT tell me more").replying_to("11", "Hello!");
        let turn = resolve(&resolver, inbound).await.unwrap();
        assert_eq!(turn.request.command, "BOT");
        assert_eq!(turn.request.args, "tell me more");
    }

    #[tokio::test]
    async fn test_reply_without_stored_thread_starts_new_one() {
        let resolver = resolver();
        let inbound = InboundMessage::new("42", "20", "ai what is this?").replying_to("5", "a photo");
        let turn = resolve(&resolver, inbound).await.unwrap();

        assert_eq!(turn.kind, ThreadKind::New);
        assert_eq!(turn.thread_root, "20");
        let stored = resolver.store().find_by_message_id(CHANNEL, "20").await.unwrap().unwrap();
        assert_eq!(stored.parent_id.as_deref(), Some("5"));
    }

    #[tokio::test]
    async fn test_full_store_still_resolves_with_parsed_chain() {
        let registry = CommandRegistry::new().with(Arc::new(Keywords(&["AI"])));
        let resolver = ThreadResolver::new(Arc::new(registry), ConversationStore::new(1));

        resolve(&resolver, InboundMessage::new("42", "10", "ai first"))
            .await
            .unwrap();
        let turn = resolve(&resolver, InboundMessage::new("42", "11", "ai second"))
            .await
            .unwrap();

        assert_eq!(turn.kind, ThreadKind::New);
        assert_eq!(
            turn.request.messages,
            vec![RequestMessage::new(Sender::User, "second", 1, "AI")]
        );
        assert_eq!(resolver.store().len().await, 1);
    }

    #[tokio::test]
    async fn test_free_text_reply_to_untracked_message_is_ignored() {
        let resolver = resolver();
        let inbound = InboundMessage::new("42", "20", "nice one").replying_to("5", "a joke");
        assert!(resolve(&resolver, inbound).await.is_none());
    }
}
