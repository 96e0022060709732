//! Parsed requests and the conversation chain handed to commands.

use crate::error::ParseError;
use serde::{Deserialize, Serialize};

/// Who wrote a turn of a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sender {
    User,
    Bot,
}

/// One turn of a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestMessage {
    pub sender: Sender,
    pub text: String,
    /// 1-based position in the chain.
    pub sequence: u32,
    pub initial_command: String,
}

impl RequestMessage {
    pub fn new(
        sender: Sender,
        text: impl Into<String>,
        sequence: u32,
        initial_command: impl Into<String>,
    ) -> Self {
        Self {
            sender,
            text: text.into(),
            sequence,
            initial_command: initial_command.into(),
        }
    }
}

/// A command invocation.
///
/// Requests are values: resolution steps return a new request instead of
/// mutating the one they were given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// Full raw text of the inbound message.
    pub message: String,
    /// Upper-cased command keyword.
    pub command: String,
    /// Text after the command token, possibly substituted.
    pub args: String,
    /// Text after the command token as typed.
    pub full_args: String,
    /// Conversation chain, ordered by `sequence` starting at 1.
    pub messages: Vec<RequestMessage>,
}

fn is_command_delimiter(c: char) -> bool {
    c.is_whitespace() || c == ',' || c == ':'
}

impl Request {
    /// Parse raw chat text.
    ///
    /// The leading token up to the first whitespace, `,` or `:` is the
    /// command; everything after the first whitespace character is the
    /// argument text.
    pub fn parse(raw: &str) -> Result<Self, ParseError> {
        let text = raw.trim_start();
        if text.is_empty() {
            return Err(ParseError::EmptyInput);
        }

        let command_end = text.find(is_command_delimiter).unwrap_or(text.len());
        let command = text[..command_end].to_uppercase();

        let args = text
            .char_indices()
            .find(|(_, c)| c.is_whitespace())
            .map(|(i, c)| &text[i + c.len_utf8()..])
            .unwrap_or_default()
            .to_string();

        Ok(Self {
            message: raw.to_string(),
            messages: vec![RequestMessage::new(Sender::User, args.as_str(), 1, command.as_str())],
            command,
            full_args: args.clone(),
            args,
        })
    }

    /// Replace the argument text, reseeding the chain with it.
    /// `full_args` keeps what was typed.
    pub fn with_args(self, args: impl Into<String>) -> Self {
        let args = args.into();
        Self {
            messages: vec![RequestMessage::new(
                Sender::User,
                args.as_str(),
                1,
                self.command.as_str(),
            )],
            args,
            ..self
        }
    }

    /// Resolve under a different command keyword.
    pub fn with_command(self, command: &str) -> Self {
        Self {
            command: command.to_uppercase(),
            ..self
        }
    }

    /// Replace the conversation chain.
    pub fn with_messages(self, messages: Vec<RequestMessage>) -> Self {
        Self { messages, ..self }
    }

    /// The most recent user turn, falling back to `args`.
    pub fn latest_user_text(&self) -> &str {
        self.messages
            .iter()
            .rev()
            .find(|m| m.sender == Sender::User)
            .map(|m| m.text.as_str())
            .unwrap_or(&self.args)
    }
}

impl std::str::FromStr for Request {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
