//! Telegram Bot API HTTP client.

use crate::error::TelegramError;
use crate::types::*;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Extra time granted to a long-poll request beyond the server-side timeout.
const POLL_GRACE: Duration = Duration::from_secs(10);

/// Telegram Bot API client.
#[derive(Clone)]
pub struct TelegramClient {
    client: Client,
    base_url: String,
    token: SecretString,
}

impl TelegramClient {
    /// Create a new Telegram client.
    pub fn new(
        base_url: impl Into<String>,
        token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, TelegramError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: SecretString::new(token.into()),
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.base_url, self.token.expose_secret(), method)
    }

    /// Check if the bot token is accepted.
    pub async fn health_check(&self) -> bool {
        self.get_me().await.is_ok()
    }

    /// Get the bot's own account.
    #[instrument(skip(self))]
    pub async fn get_me(&self) -> Result<User, TelegramError> {
        let response = self.client.get(self.method_url("getMe")).send().await?;
        Self::handle_response(response).await
    }

    /// Long-poll for updates after `offset`.
    #[instrument(skip(self))]
    pub async fn get_updates(
        &self,
        offset: i64,
        timeout: Duration,
    ) -> Result<Vec<Update>, TelegramError> {
        let request = GetUpdatesRequest {
            offset,
            timeout: timeout.as_secs(),
            allowed_updates: vec!["message".into()],
        };

        let response = self
            .client
            .post(self.method_url("getUpdates"))
            .timeout(timeout + POLL_GRACE)
            .json(&request)
            .send()
            .await?;

        let updates: Vec<Update> = Self::handle_response(response).await?;
        debug!("Received {} updates", updates.len());
        Ok(updates)
    }

    /// Send a text message, optionally as a reply.
    #[instrument(skip(self, text), fields(len = text.len()))]
    pub async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        reply_to: Option<i64>,
    ) -> Result<Message, TelegramError> {
        let request = SendMessageRequest {
            chat_id,
            text: text.to_string(),
            reply_parameters: reply_to.map(ReplyParameters::to),
        };

        let response = self
            .client
            .post(self.method_url("sendMessage"))
            .json(&request)
            .send()
            .await?;

        Self::handle_send(response).await
    }

    /// Upload a photo.
    #[instrument(skip(self, photo, caption), fields(file = %photo.file_name))]
    pub async fn send_photo(
        &self,
        chat_id: i64,
        photo: InputFile,
        caption: Option<&str>,
        reply_to: Option<i64>,
    ) -> Result<Message, TelegramError> {
        let form = Self::upload_form(chat_id, "photo", photo, caption, reply_to)?;
        let response = self
            .client
            .post(self.method_url("sendPhoto"))
            .multipart(form)
            .send()
            .await?;

        Self::handle_send(response).await
    }

    /// Upload a document (any file type, including videos).
    #[instrument(skip(self, document, caption), fields(file = %document.file_name))]
    pub async fn send_document(
        &self,
        chat_id: i64,
        document: InputFile,
        caption: Option<&str>,
        reply_to: Option<i64>,
    ) -> Result<Message, TelegramError> {
        let form = Self::upload_form(chat_id, "document", document, caption, reply_to)?;
        let response = self
            .client
            .post(self.method_url("sendDocument"))
            .multipart(form)
            .send()
            .await?;

        Self::handle_send(response).await
    }

    fn upload_form(
        chat_id: i64,
        field: &'static str,
        file: InputFile,
        caption: Option<&str>,
        reply_to: Option<i64>,
    ) -> Result<Form, TelegramError> {
        let part = Part::bytes(file.bytes)
            .file_name(file.file_name)
            .mime_str(&file.mime_type)?;

        let mut form = Form::new().text("chat_id", chat_id.to_string()).part(field, part);

        if let Some(caption) = caption.filter(|c| !c.is_empty()) {
            form = form.text("caption", caption.to_string());
        }
        if let Some(message_id) = reply_to {
            form = form.text(
                "reply_parameters",
                serde_json::to_string(&ReplyParameters::to(message_id))?,
            );
        }

        Ok(form)
    }

    async fn handle_send(response: reqwest::Response) -> Result<Message, TelegramError> {
        match Self::handle_response::<Message>(response).await {
            Ok(message) => Ok(message),
            Err(TelegramError::Api { code, description }) => {
                warn!("Send failed [{}]: {}", code, description);
                Err(TelegramError::SendFailed(description))
            }
            Err(e) => Err(e),
        }
    }

    /// Unwrap the `{ok, result}` envelope.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, TelegramError> {
        let status = response.status();
        let body = response.text().await?;

        let envelope: ApiResponse<T> = match serde_json::from_str(&body) {
            Ok(envelope) => envelope,
            Err(_) if !status.is_success() => {
                return Err(TelegramError::Api {
                    code: i32::from(status.as_u16()),
                    description: body,
                })
            }
            Err(e) => return Err(e.into()),
        };

        match envelope.result {
            Some(result) if envelope.ok => Ok(result),
            _ => Err(TelegramError::Api {
                code: envelope.error_code.unwrap_or_else(|| i32::from(status.as_u16())),
                description: envelope
                    .description
                    .unwrap_or_else(|| "Unknown error".into()),
            }),
        }
    }
}
