//! Common test utilities for integration tests.

#![allow(dead_code)]

use dbot::commands::AssistantCommand;
use dbot_core::{Command, CommandRegistry, Dispatcher, Request, Response};
use openai_client::OpenAiClient;
use std::sync::Arc;
use std::time::Duration;
use wiremock::MockServer;

pub const TIMEOUT: Duration = Duration::from_secs(5);

/// Create an OpenAI client configured for a mock server.
pub fn test_openai_client(mock_server: &MockServer) -> Arc<OpenAiClient> {
    Arc::new(
        OpenAiClient::new("test-api-key", mock_server.uri(), "test-model", TIMEOUT).unwrap(),
    )
}

/// Assistant that gives up after the first failed attempt.
pub fn test_assistant(mock_server: &MockServer) -> AssistantCommand {
    AssistantCommand::new(test_openai_client(mock_server), 0.5, 256).with_max_retries(0)
}

pub fn chat_completion(content: &str) -> serde_json::Value {
    serde_json::json!({
        "id": "chatcmpl-123",
        "object": "chat.completion",
        "created": 1677652288,
        "model": "test-model",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }]
    })
}

/// Dispatch `raw` through a registry holding only `command`.
pub async fn dispatch(command: Arc<dyn Command>, raw: &str) -> Option<Response> {
    let registry = CommandRegistry::new().with(command);
    Dispatcher::new(Arc::new(registry))
        .dispatch(&Request::parse(raw).unwrap())
        .await
}
