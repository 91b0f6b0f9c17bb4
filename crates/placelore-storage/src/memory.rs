use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::RwLock;

use placelore_core::models::content::ContentRecord;
use placelore_core::place::PlaceKey;

use crate::error::StorageError;
use crate::store::{BoxFuture, ContentStore, CreateOutcome};

/// Append-only in-process content store.
///
/// Same lookup semantics as the MongoDB store (first match wins, `create`
/// never deduplicates) without the unique index.
#[derive(Debug, Default)]
pub struct MemoryContentStore {
    records: RwLock<Vec<ContentRecord>>,
    next_id: AtomicU64,
}

impl MemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records, duplicates included.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// All records stored under a normalized key, oldest first.
    pub async fn records_for(&self, key: &str) -> Vec<ContentRecord> {
        self.records
            .read()
            .await
            .iter()
            .filter(|r| r.place == key)
            .cloned()
            .collect()
    }

    fn new_record(&self, place: &PlaceKey, content: &str) -> ContentRecord {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let now = jiff::Timestamp::now();
        ContentRecord {
            id: format!("{id:024x}"),
            place: place.key().to_string(),
            content: content.to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}

impl ContentStore for MemoryContentStore {
    fn backend(&self) -> &str {
        "memory"
    }

    fn find_by_place<'a>(
        &'a self,
        place: &'a PlaceKey,
    ) -> BoxFuture<'a, Result<Option<ContentRecord>, StorageError>> {
        Box::pin(async move {
            let records = self.records.read().await;
            Ok(records.iter().find(|r| r.place == place.key()).cloned())
        })
    }

    fn create<'a>(
        &'a self,
        place: &'a PlaceKey,
        content: &'a str,
    ) -> BoxFuture<'a, Result<ContentRecord, StorageError>> {
        Box::pin(async move {
            let record = self.new_record(place, content);
            self.records.write().await.push(record.clone());
            Ok(record)
        })
    }

    fn create_if_absent<'a>(
        &'a self,
        place: &'a PlaceKey,
        content: &'a str,
    ) -> BoxFuture<'a, Result<CreateOutcome, StorageError>> {
        Box::pin(async move {
            let mut records = self.records.write().await;
            if let Some(existing) = records.iter().find(|r| r.place == place.key()) {
                return Ok(CreateOutcome::Existing(existing.clone()));
            }

            let record = self.new_record(place, content);
            records.push(record.clone());
            Ok(CreateOutcome::Created(record))
        })
    }

    fn ping(&self) -> BoxFuture<'_, Result<(), StorageError>> {
        Box::pin(async { Ok(()) })
    }
}
