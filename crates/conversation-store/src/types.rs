//! Conversation record types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A persisted turn of a conversation thread.
///
/// Records are created once and never updated. `message_id` is the platform
/// id the record answers to, `original_message_id` is the thread root shared
/// by every record of the same exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationRecord {
    /// Store-assigned, strictly increasing identifier.
    pub id: u64,
    /// Platform-qualified chat the record belongs to (e.g. `telegram:42`).
    pub channel: String,
    pub initial_command: String,
    pub message: String,
    pub message_id: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub parent_id: Option<String>,
    pub original_message_id: String,
    pub is_from_bot: bool,
    pub created_at: DateTime<Utc>,
}

/// A record that has not been appended yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewConversationRecord {
    pub channel: String,
    pub initial_command: String,
    pub message: String,
    pub message_id: String,
    pub parent_id: Option<String>,
    pub original_message_id: String,
    pub is_from_bot: bool,
}

impl NewConversationRecord {
    /// A user turn.
    pub fn user(
        channel: impl Into<String>,
        initial_command: impl Into<String>,
        message: impl Into<String>,
        thread_root: impl Into<String>,
        parent_id: Option<String>,
    ) -> Self {
        let thread_root = thread_root.into();
        Self {
            channel: channel.into(),
            initial_command: initial_command.into(),
            message: message.into(),
            message_id: thread_root.clone(),
            parent_id,
            original_message_id: thread_root,
            is_from_bot: false,
        }
    }

    /// A bot reply sent as `message_id` in answer to `parent_id`.
    pub fn bot(
        channel: impl Into<String>,
        initial_command: impl Into<String>,
        message: impl Into<String>,
        message_id: impl Into<String>,
        parent_id: impl Into<String>,
        thread_root: impl Into<String>,
    ) -> Self {
        Self {
            channel: channel.into(),
            initial_command: initial_command.into(),
            message: message.into(),
            message_id: message_id.into(),
            parent_id: Some(parent_id.into()),
            original_message_id: thread_root.into(),
            is_from_bot: true,
        }
    }

    pub(crate) fn into_record(self, id: u64) -> ConversationRecord {
        ConversationRecord {
            id,
            channel: self.channel,
            initial_command: self.initial_command,
            message: self.message,
            message_id: self.message_id,
            parent_id: self.parent_id,
            original_message_id: self.original_message_id,
            is_from_bot: self.is_from_bot,
            created_at: Utc::now(),
        }
    }
}
