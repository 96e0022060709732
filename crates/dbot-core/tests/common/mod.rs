//! Common test utilities for integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use conversation_store::ConversationStore;
use dbot_core::*;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// One call made against the fake platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    Text {
        id: String,
        text: String,
        reply_to: String,
    },
    Photo {
        id: String,
        file_name: String,
        caption: Option<String>,
    },
    File {
        id: String,
        file_name: String,
    },
}

/// A chat platform that records what it was asked to send.
pub struct RecordingPlatform {
    limit: usize,
    next_id: AtomicU64,
    pub sent: Mutex<Vec<Sent>>,
}

impl RecordingPlatform {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            next_id: AtomicU64::new(1000),
            sent: Mutex::new(Vec::new()),
        }
    }

    fn next_id(&self) -> String {
        self.next_id.fetch_add(1, Ordering::SeqCst).to_string()
    }

    pub async fn texts(&self) -> Vec<String> {
        self.sent
            .lock()
            .await
            .iter()
            .filter_map(|s| match s {
                Sent::Text { text, .. } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl ChatPlatform for RecordingPlatform {
    fn name(&self) -> &str {
        "test"
    }

    fn message_limit(&self) -> usize {
        self.limit
    }

    async fn send_text(
        &self,
        _chat_id: &str,
        text: &str,
        reply_to: &str,
    ) -> Result<String, PlatformError> {
        let id = self.next_id();
        self.sent.lock().await.push(Sent::Text {
            id: id.clone(),
            text: text.to_string(),
            reply_to: reply_to.to_string(),
        });
        Ok(id)
    }

    async fn send_photo(
        &self,
        _chat_id: &str,
        media: MediaUpload,
        caption: Option<&str>,
        _reply_to: &str,
    ) -> Result<String, PlatformError> {
        let id = self.next_id();
        self.sent.lock().await.push(Sent::Photo {
            id: id.clone(),
            file_name: media.file_name,
            caption: caption.map(str::to_string),
        });
        Ok(id)
    }

    async fn send_file(
        &self,
        _chat_id: &str,
        media: MediaUpload,
        _caption: Option<&str>,
        _reply_to: &str,
    ) -> Result<String, PlatformError> {
        let id = self.next_id();
        self.sent.lock().await.push(Sent::File {
            id: id.clone(),
            file_name: media.file_name,
        });
        Ok(id)
    }
}

/// Conversational command that reports the chain it was given.
pub struct ChainEcho {
    pub seen: Mutex<Vec<Vec<RequestMessage>>>,
}

impl ChainEcho {
    pub fn new() -> Self {
        Self {
            seen: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl Command for ChainEcho {
    fn name(&self) -> &str {
        "chain-echo"
    }

    fn accepted_commands(&self) -> &[&'static str] {
        &["AI", "BOT"]
    }

    fn supports_conversation(&self) -> bool {
        true
    }

    async fn execute(&self, request: &Request) -> Result<Response, CommandError> {
        self.seen.lock().await.push(request.messages.clone());
        Ok(Response::text(format!(
            "turn {}: {}",
            request.messages.len(),
            request.latest_user_text()
        )))
    }
}

/// Returns a fixed response for its keywords.
pub struct Fixed {
    pub keywords: &'static [&'static str],
    pub response: Response,
}

#[async_trait]
impl Command for Fixed {
    fn name(&self) -> &str {
        "fixed"
    }

    fn accepted_commands(&self) -> &[&'static str] {
        self.keywords
    }

    async fn execute(&self, _request: &Request) -> Result<Response, CommandError> {
        Ok(self.response.clone())
    }
}

/// Echoes its arguments.
pub struct Echo;

#[async_trait]
impl Command for Echo {
    fn name(&self) -> &str {
        "echo"
    }

    fn accepted_commands(&self) -> &[&'static str] {
        &["ECHO", "TL"]
    }

    async fn execute(&self, request: &Request) -> Result<Response, CommandError> {
        Ok(Response::text(request.args.clone()))
    }
}

/// Conversational command whose upstream is always down.
pub struct Unavailable;

#[async_trait]
impl Command for Unavailable {
    fn name(&self) -> &str {
        "unavailable"
    }

    fn accepted_commands(&self) -> &[&'static str] {
        &["AI"]
    }

    fn supports_conversation(&self) -> bool {
        true
    }

    async fn execute(&self, _request: &Request) -> Result<Response, CommandError> {
        Ok(Response::failure("Sorry, I can't answer that right now (error 429)."))
    }
}

pub fn processor(commands: Vec<Arc<dyn Command>>) -> MessageProcessor {
    processor_with_store(commands, ConversationStore::new(10_000))
}

pub fn processor_with_store(
    commands: Vec<Arc<dyn Command>>,
    store: ConversationStore,
) -> MessageProcessor {
    let mut registry = CommandRegistry::new();
    for command in commands {
        registry.register(command);
    }
    MessageProcessor::new(
        Arc::new(registry),
        store,
        ResponseRenderer::new(Duration::from_secs(5)).unwrap(),
    )
}
