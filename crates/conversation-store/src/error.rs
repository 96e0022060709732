//! Conversation storage errors.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConversationError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Journal I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Conversation store is full ({0} records)")]
    CapacityExceeded(usize),

    #[error("Corrupt journal at line {line}: {source}")]
    CorruptJournal {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}
