//! Append-only conversation store with thread indexes.

use crate::error::ConversationError;
use crate::types::*;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument};

type ChannelKey = (String, String);

#[derive(Default)]
struct Inner {
    records: Vec<ConversationRecord>,
    /// First record answering to a message id.
    by_message_id: HashMap<ChannelKey, usize>,
    /// Positions of every record of a thread, in append order.
    by_thread: HashMap<ChannelKey, Vec<usize>>,
    journal: Option<File>,
}

impl Inner {
    fn index(&mut self, record: ConversationRecord) {
        let position = self.records.len();
        self.by_message_id
            .entry((record.channel.clone(), record.message_id.clone()))
            .or_insert(position);
        self.by_thread
            .entry((record.channel.clone(), record.original_message_id.clone()))
            .or_default()
            .push(position);
        self.records.push(record);
    }

    fn next_id(&self) -> u64 {
        self.records.last().map(|r| r.id + 1).unwrap_or(1)
    }
}

/// Append-only log of conversation records.
///
/// Appends take the write lock for the whole id assignment, journal write and
/// index update, so readers observe a record either completely or not at all.
#[derive(Clone)]
pub struct ConversationStore {
    inner: Arc<RwLock<Inner>>,
    max_records: usize,
}

impl ConversationStore {
    /// Create an in-memory store.
    pub fn new(max_records: usize) -> Self {
        info!("In-memory conversation store initialized (max_records={})", max_records);
        Self {
            inner: Arc::new(RwLock::new(Inner::default())),
            max_records,
        }
    }

    /// Open a store backed by a JSON-lines journal, replaying existing records.
    pub async fn open(
        path: impl AsRef<Path>,
        max_records: usize,
    ) -> Result<Self, ConversationError> {
        let path = path.as_ref();
        let mut inner = Inner::default();

        if tokio::fs::try_exists(path).await? {
            let contents = tokio::fs::read_to_string(path).await?;
            for (line_no, line) in contents.lines().enumerate() {
                if line.trim().is_empty() {
                    continue;
                }
                let record: ConversationRecord = serde_json::from_str(line).map_err(|source| {
                    ConversationError::CorruptJournal {
                        line: line_no + 1,
                        source,
                    }
                })?;
                inner.index(record);
            }
        }

        inner.journal = Some(
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .await?,
        );

        info!(
            "Conversation store opened from {} ({} records, max_records={})",
            path.display(),
            inner.records.len(),
            max_records
        );

        Ok(Self {
            inner: Arc::new(RwLock::new(inner)),
            max_records,
        })
    }

    /// Append a record, assigning its id.
    #[instrument(skip(self, record), fields(channel = %record.channel, message_id = %record.message_id))]
    pub async fn append(
        &self,
        record: NewConversationRecord,
    ) -> Result<ConversationRecord, ConversationError> {
        let mut inner = self.inner.write().await;

        if inner.records.len() >= self.max_records {
            return Err(ConversationError::CapacityExceeded(self.max_records));
        }

        let record = record.into_record(inner.next_id());

        if let Some(journal) = inner.journal.as_mut() {
            let mut line = serde_json::to_vec(&record)?;
            line.push(b'\n');
            journal.write_all(&line).await?;
            journal.flush().await?;
        }

        inner.index(record.clone());

        debug!(
            "Appended record {} (thread {}, from_bot={})",
            record.id, record.original_message_id, record.is_from_bot
        );

        Ok(record)
    }

    /// Find the first record answering to a platform message id.
    #[instrument(skip(self))]
    pub async fn find_by_message_id(
        &self,
        channel: &str,
        message_id: &str,
    ) -> Result<Option<ConversationRecord>, ConversationError> {
        let inner = self.inner.read().await;
        Ok(inner
            .by_message_id
            .get(&(channel.to_string(), message_id.to_string()))
            .map(|&position| inner.records[position].clone()))
    }

    /// All records of a thread, ordered by id.
    #[instrument(skip(self))]
    pub async fn find_all_by_original_message_id(
        &self,
        channel: &str,
        original_message_id: &str,
    ) -> Result<Vec<ConversationRecord>, ConversationError> {
        let inner = self.inner.read().await;
        Ok(inner
            .by_thread
            .get(&(channel.to_string(), original_message_id.to_string()))
            .map(|positions| {
                positions
                    .iter()
                    .map(|&position| inner.records[position].clone())
                    .collect()
            })
            .unwrap_or_default())
    }

    /// Total number of stored records.
    pub async fn len(&self) -> usize {
        self.inner.read().await.records.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Number of distinct threads.
    pub async fn thread_count(&self) -> usize {
        self.inner.read().await.by_thread.len()
    }

    /// Health check: the store accepts appends while below capacity.
    pub async fn health_check(&self) -> bool {
        self.len().await < self.max_records
    }
}
