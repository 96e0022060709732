//! Append-only conversation storage.
//!
//! Every turn of a threaded exchange (user messages and the bot replies that
//! opt into conversation support) is kept as a [`ConversationRecord`]. Records
//! are looked up by the platform message they answer to and grouped by the
//! thread root they share.

mod error;
mod store;
mod types;

pub use error::ConversationError;
pub use store::ConversationStore;
pub use types::*;

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn user_turn(root: &str, text: &str) -> NewConversationRecord {
        NewConversationRecord::user("telegram:1", "AI", text, root, None)
    }

    #[test]
    fn test_new_user_record_uses_thread_root_as_message_id() {
        let record = NewConversationRecord::user("telegram:1", "AI", "hello", "100", Some("99".into()));
        assert_eq!(record.message_id, "100");
        assert_eq!(record.original_message_id, "100");
        assert_eq!(record.parent_id, Some("99".into()));
        assert!(!record.is_from_bot);
    }

    #[test]
    fn test_new_bot_record() {
        let record = NewConversationRecord::bot("telegram:1", "AI", "hi!", "101", "100", "100");
        assert_eq!(record.message_id, "101");
        assert_eq!(record.parent_id, Some("100".into()));
        assert_eq!(record.original_message_id, "100");
        assert!(record.is_from_bot);
    }

    #[test]
    fn test_record_serialization_skips_missing_parent() {
        let record = user_turn("100", "hello").into_record(1);
        let json = serde_json::to_string(&record).unwrap();

        assert!(json.contains("\"initial_command\":\"AI\""));
        assert!(json.contains("\"created_at\""));
        assert!(!json.contains("parent_id"));

        let back: ConversationRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }

    #[tokio::test]
    async fn test_append_assigns_increasing_ids() {
        let store = ConversationStore::new(100);

        let first = store.append(user_turn("100", "one")).await.unwrap();
        let second = store.append(user_turn("200", "two")).await.unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(store.len().await, 2);
        assert_eq!(store.thread_count().await, 2);
    }

    #[tokio::test]
    async fn test_find_by_message_id() {
        let store = ConversationStore::new(100);
        store.append(user_turn("100", "hello")).await.unwrap();
        store
            .append(NewConversationRecord::bot("telegram:1", "AI", "hi!", "101", "100", "100"))
            .await
            .unwrap();

        let found = store.find_by_message_id("telegram:1", "101").await.unwrap().unwrap();
        assert!(found.is_from_bot);
        assert_eq!(found.original_message_id, "100");
        assert_eq!(found.initial_command, "AI");

        assert!(store.find_by_message_id("telegram:1", "555").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_by_message_id_returns_first_match() {
        let store = ConversationStore::new(100);
        store.append(user_turn("100", "first")).await.unwrap();
        store.append(user_turn("100", "second")).await.unwrap();

        let found = store.find_by_message_id("telegram:1", "100").await.unwrap().unwrap();
        assert_eq!(found.message, "first");
    }

    #[tokio::test]
    async fn test_lookups_are_scoped_by_channel() {
        let store = ConversationStore::new(100);
        store.append(user_turn("100", "telegram chat 1")).await.unwrap();
        store
            .append(NewConversationRecord::user("telegram:2", "AI", "telegram chat 2", "100", None))
            .await
            .unwrap();

        let chain = store
            .find_all_by_original_message_id("telegram:2", "100")
            .await
            .unwrap();
        assert_eq!(chain.len(), 1);
        assert_eq!(chain[0].message, "telegram chat 2");
    }

    #[tokio::test]
    async fn test_thread_is_ordered_by_id() {
        let store = ConversationStore::new(100);
        store.append(user_turn("100", "hello")).await.unwrap();
        store.append(user_turn("900", "unrelated")).await.unwrap();
        store
            .append(NewConversationRecord::bot("telegram:1", "AI", "hi!", "101", "100", "100"))
            .await
            .unwrap();
        store
            .append(NewConversationRecord::user("telegram:1", "AI", "how are you", "100", Some("101".into())))
            .await
            .unwrap();

        let chain = store
            .find_all_by_original_message_id("telegram:1", "100")
            .await
            .unwrap();

        let texts: Vec<_> = chain.iter().map(|r| r.message.as_str()).collect();
        assert_eq!(texts, vec!["hello", "hi!", "how are you"]);
        assert!(chain.windows(2).all(|w| w[0].id < w[1].id));
    }

    #[tokio::test]
    async fn test_unknown_thread_is_empty() {
        let store = ConversationStore::new(100);
        let chain = store
            .find_all_by_original_message_id("telegram:1", "nope")
            .await
            .unwrap();
        assert!(chain.is_empty());
    }

    #[tokio::test]
    async fn test_capacity_exceeded() {
        let store = ConversationStore::new(2);
        store.append(user_turn("1", "a")).await.unwrap();
        store.append(user_turn("2", "b")).await.unwrap();

        let result = store.append(user_turn("3", "c")).await;
        assert!(matches!(result, Err(ConversationError::CapacityExceeded(2))));
        assert_eq!(store.len().await, 2);
        assert!(!store.health_check().await);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_appends_get_unique_ids() {
        let store = ConversationStore::new(10_000);

        let mut handles = Vec::new();
        for task in 0..8 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                let mut ids = Vec::new();
                for i in 0..100 {
                    let record = store
                        .append(user_turn("100", &format!("task {} message {}", task, i)))
                        .await
                        .unwrap();
                    ids.push(record.id);
                }
                ids
            }));
        }

        let mut all_ids = HashSet::new();
        for handle in handles {
            for id in handle.await.unwrap() {
                assert!(all_ids.insert(id), "duplicate id {}", id);
            }
        }
        assert_eq!(all_ids.len(), 800);

        let chain = store
            .find_all_by_original_message_id("telegram:1", "100")
            .await
            .unwrap();
        assert_eq!(chain.len(), 800);
        assert!(chain.windows(2).all(|w| w[0].id < w[1].id));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_readers_never_see_partial_threads() {
        let store = ConversationStore::new(10_000);

        let writer = {
            let store = store.clone();
            tokio::spawn(async move {
                for i in 0..500 {
                    store.append(user_turn("100", &format!("m{}", i))).await.unwrap();
                }
            })
        };

        let reader = {
            let store = store.clone();
            tokio::spawn(async move {
                for _ in 0..500 {
                    let chain = store
                        .find_all_by_original_message_id("telegram:1", "100")
                        .await
                        .unwrap();
                    // Visible records are always a gap-free prefix of the thread.
                    for (expected, record) in (1u64..).zip(chain.iter()) {
                        assert_eq!(record.id, expected);
                    }
                    tokio::task::yield_now().await;
                }
            })
        };

        writer.await.unwrap();
        reader.await.unwrap();
    }

    #[tokio::test]
    async fn test_journal_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("conversations.jsonl");

        {
            let store = ConversationStore::open(&path, 100).await.unwrap();
            store.append(user_turn("100", "hello")).await.unwrap();
            store
                .append(NewConversationRecord::bot("telegram:1", "AI", "hi!", "101", "100", "100"))
                .await
                .unwrap();
        }

        let reopened = ConversationStore::open(&path, 100).await.unwrap();
        assert_eq!(reopened.len().await, 2);

        let found = reopened.find_by_message_id("telegram:1", "101").await.unwrap().unwrap();
        assert_eq!(found.message, "hi!");

        let next = reopened.append(user_turn("100", "again")).await.unwrap();
        assert_eq!(next.id, 3);
    }

    #[tokio::test]
    async fn test_corrupt_journal_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("conversations.jsonl");
        tokio::fs::write(&path, "{not json}\n").await.unwrap();

        let result = ConversationStore::open(&path, 100).await;
        assert!(matches!(
            result,
            Err(ConversationError::CorruptJournal { line: 1, .. })
        ));
    }
}
