//! OpenAI client for chat completions and image generation.

mod client;
mod error;
mod types;

pub use client::OpenAiClient;
pub use error::OpenAiError;
pub use types::*;

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn create_test_client(mock_server: &MockServer) -> OpenAiClient {
        OpenAiClient::new(
            "test-api-key",
            mock_server.uri(),
            "test-model",
            Duration::from_secs(30),
        )
        .unwrap()
    }

    fn chat_body(content: &str) -> serde_json::Value {
        serde_json::json!({
            "id": "chatcmpl-123",
            "object": "chat.completion",
            "created": 1677652288,
            "model": "test-model",
            "choices": [{
                "index": 0,
                "message": {
                    "role": "assistant",
                    "content": content
                },
                "finish_reason": "stop"
            }],
            "usage": {
                "prompt_tokens": 10,
                "completion_tokens": 15,
                "total_tokens": 25
            }
        })
    }

    #[tokio::test]
    async fn test_chat_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("Authorization", "Bearer test-api-key"))
            .and(body_partial_json(serde_json::json!({
                "model": "test-model",
                "messages": [
                    {"role": "system", "content": "Be nice"},
                    {"role": "user", "content": "Hello"}
                ],
                "temperature": 0.5
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(chat_body("Hello! How can I help you?")))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server).await;
        let messages = vec![Message::system("Be nice"), Message::user("Hello")];
        let options = ChatOptions {
            temperature: Some(0.5),
            ..Default::default()
        };

        let result = client.chat(messages, &options).await;
        assert_eq!(result.unwrap(), "Hello! How can I help you?");
    }

    #[tokio::test]
    async fn test_chat_empty_response() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "chatcmpl-123",
                "choices": [],
                "usage": null
            })))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server).await;
        let result = client.chat(vec![Message::user("Hello")], &ChatOptions::default()).await;
        assert!(matches!(result, Err(OpenAiError::EmptyResponse)));
    }

    #[tokio::test]
    async fn test_chat_rate_limit() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server).await;
        let result = client.chat(vec![Message::user("Hello")], &ChatOptions::default()).await;

        let err = result.unwrap_err();
        assert!(matches!(err, OpenAiError::RateLimit));
        assert_eq!(err.status_code(), Some(429));
    }

    #[tokio::test]
    async fn test_chat_api_error_keeps_status() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server).await;
        let err = client
            .chat(vec![Message::user("Hello")], &ChatOptions::default())
            .await
            .unwrap_err();

        assert_eq!(err.status_code(), Some(503));
        assert!(err.to_string().contains("overloaded"));
    }

    #[tokio::test]
    async fn test_chat_with_retry_does_not_retry_unauthorized() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server).await;
        let result = client
            .chat_with_retry(vec![Message::user("Hello")], &ChatOptions::default(), Some(3))
            .await;

        assert!(matches!(result, Err(OpenAiError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_chat_with_retry_gives_up_after_max_retries() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(500))
            .expect(3)
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server).await;
        let result = client
            .chat_with_retry(vec![Message::user("Hello")], &ChatOptions::default(), Some(2))
            .await;

        assert!(matches!(result, Err(OpenAiError::Api { status: 500, .. })));
    }

    #[tokio::test]
    async fn test_generate_image() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/images/generations"))
            .and(body_partial_json(serde_json::json!({
                "model": "dall-e-2",
                "prompt": "a cat in space",
                "n": 1,
                "size": "512x512"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "created": 1677652288,
                "data": [{"url": "https://images.example/cat.png"}]
            })))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server).await;
        let urls = client.generate_image("a cat in space", 1, "512x512").await.unwrap();
        assert_eq!(urls, vec!["https://images.example/cat.png".to_string()]);
    }

    #[tokio::test]
    async fn test_generate_image_without_urls() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/images/generations"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "created": 1677652288,
                "data": []
            })))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server).await;
        let result = client.generate_image("nothing", 1, "256x256").await;
        assert!(matches!(result, Err(OpenAiError::EmptyResponse)));
    }

    #[test]
    fn test_message_constructors() {
        let system = Message::system("You are a helpful assistant");
        assert_eq!(system.role, Role::System);
        assert_eq!(system.content, "You are a helpful assistant");

        assert_eq!(Message::user("Hello").role, Role::User);
        assert_eq!(Message::assistant("Hi there!").role, Role::Assistant);
    }

    #[test]
    fn test_role_serialization() {
        let json = serde_json::to_string(&Message::assistant("hi")).unwrap();
        assert_eq!(json, r#"{"role":"assistant","content":"hi"}"#);
    }
}
