//! LLM assistant - conversational chat completions.

use async_trait::async_trait;
use dbot_core::{Command, CommandError, Request, RequestMessage, Response, Sender};
use openai_client::{ChatOptions, Message, OpenAiClient};
use std::sync::Arc;
use tracing::{info, instrument, warn};

const HELPFUL_ASSISTANT: &str = "You are a helpful assistant.";

/// Prompt family selected by the command keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptStyle {
    Assistant,
    Translate,
    WhatDoYouThink,
    CodeReview,
    CodeExplain,
    ChatReview,
    Eli5,
    Jarvis,
    Grumpy,
}

impl PromptStyle {
    pub const KEYWORDS: &'static [&'static str] = &[
        "AI",
        "BOT",
        "ASK",
        "TRANSLATE",
        "TL",
        "WDYT",
        "REVIEW",
        "CR",
        "EXPLAIN",
        "CHATREVIEW",
        "ELI5",
        "JARVIS",
        "GRUMPY",
    ];

    pub fn from_keyword(keyword: &str) -> Option<Self> {
        let style = match keyword.to_ascii_uppercase().as_str() {
            "AI" | "BOT" | "ASK" => Self::Assistant,
            "TRANSLATE" | "TL" => Self::Translate,
            "WDYT" => Self::WhatDoYouThink,
            "REVIEW" | "CR" => Self::CodeReview,
            "EXPLAIN" => Self::CodeExplain,
            "CHATREVIEW" => Self::ChatReview,
            "ELI5" => Self::Eli5,
            "JARVIS" => Self::Jarvis,
            "GRUMPY" => Self::Grumpy,
            _ => return None,
        };
        Some(style)
    }

    fn system_prompt(self) -> &'static str {
        match self {
            Self::Translate => {
                "You are a translator between English and Indonesian. \
                 If the text is in English, translate it to Indonesian; otherwise translate it to English. \
                 Reply with the translation only."
            }
            Self::CodeReview | Self::CodeExplain => {
                "You are a senior software engineer who gives clear, practical answers."
            }
            Self::Jarvis => {
                "You are J.A.R.V.I.S., Tony Stark's witty and loyal AI assistant. \
                 Address the user as sir and keep answers short."
            }
            Self::Grumpy => {
                "You are a grumpy old man. You answer correctly, \
                 but you complain about everything while doing it."
            }
            Self::Assistant | Self::WhatDoYouThink | Self::ChatReview | Self::Eli5 => {
                HELPFUL_ASSISTANT
            }
        }
    }

    /// Rewrite the first user turn of a thread.
    fn first_turn(self, text: &str) -> String {
        match self {
            Self::WhatDoYouThink => format!("What do you think about this: '{}'", text),
            Self::CodeReview => format!("Review this code and suggest improvements:\n{}", text),
            Self::CodeExplain => format!("Explain what this code does:\n{}", text),
            Self::ChatReview => format!(
                "Summarize this chat conversation and point out anything important:\n{}",
                text
            ),
            Self::Eli5 => format!("Explain like I'm five: {}", text),
            Self::Assistant | Self::Translate | Self::Jarvis | Self::Grumpy => text.to_string(),
        }
    }
}

/// Build role-tagged prompt messages from a conversation chain.
pub fn build_messages(style: PromptStyle, chain: &[RequestMessage]) -> Vec<Message> {
    let mut messages = Vec::with_capacity(chain.len() + 1);
    messages.push(Message::system(style.system_prompt()));

    let mut first_user_turn = true;
    for turn in chain {
        match turn.sender {
            Sender::Bot => messages.push(Message::assistant(turn.text.as_str())),
            Sender::User if first_user_turn => {
                first_user_turn = false;
                messages.push(Message::user(style.first_turn(&turn.text)));
            }
            Sender::User => messages.push(Message::user(turn.text.as_str())),
        }
    }

    messages
}

pub struct AssistantCommand {
    client: Arc<OpenAiClient>,
    options: ChatOptions,
    max_retries: Option<u32>,
}

impl AssistantCommand {
    pub fn new(client: Arc<OpenAiClient>, temperature: f32, max_tokens: u32) -> Self {
        Self {
            client,
            options: ChatOptions {
                temperature: Some(temperature),
                max_tokens: Some(max_tokens),
                top_p: Some(0.3),
                frequency_penalty: Some(0.5),
                presence_penalty: Some(0.0),
            },
            max_retries: None,
        }
    }

    /// Override the retry count of the chat client.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }
}

#[async_trait]
impl Command for AssistantCommand {
    fn name(&self) -> &str {
        "assistant"
    }

    fn accepted_commands(&self) -> &[&'static str] {
        PromptStyle::KEYWORDS
    }

    fn supports_conversation(&self) -> bool {
        true
    }

    #[instrument(skip(self, request), fields(command = %request.command, turns = request.messages.len()))]
    async fn execute(&self, request: &Request) -> Result<Response, CommandError> {
        let style = PromptStyle::from_keyword(&request.command).ok_or_else(|| {
            CommandError::InvalidArguments(format!("unknown prompt style {}", request.command))
        })?;

        if request.latest_user_text().trim().is_empty() {
            return Ok(Response::failure(format!(
                "Ask me something, e.g. {} what is the capital of Indonesia?",
                request.command
            )));
        }

        let seed;
        let chain = if request.messages.is_empty() {
            seed = [RequestMessage::new(
                Sender::User,
                request.args.as_str(),
                1,
                request.command.as_str(),
            )];
            &seed[..]
        } else {
            &request.messages[..]
        };

        let messages = build_messages(style, chain);
        info!("Asking {} with {} messages", self.client.model(), messages.len());

        match self
            .client
            .chat_with_retry(messages, &self.options, self.max_retries)
            .await
        {
            Ok(answer) => Ok(Response::text(answer)),
            Err(e) => {
                warn!("Chat completion failed: {}", e);
                let code = e
                    .status_code()
                    .map(|status| format!("error {}", status))
                    .unwrap_or_else(|| "no response".into());
                Ok(Response::failure(format!(
                    "Sorry, I can't answer that right now ({}).",
                    code
                )))
            }
        }
    }
}
