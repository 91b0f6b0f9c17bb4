use std::future::Future;
use std::pin::Pin;

use placelore_core::models::content::ContentRecord;
use placelore_core::place::PlaceKey;

use crate::error::StorageError;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Result of a write-if-absent operation.
#[derive(Debug, Clone, PartialEq)]
pub enum CreateOutcome {
    /// No record existed; this one was just written.
    Created(ContentRecord),
    /// A record for the place was already stored and is returned untouched.
    Existing(ContentRecord),
}

impl CreateOutcome {
    pub fn record(&self) -> &ContentRecord {
        match self {
            CreateOutcome::Created(record) | CreateOutcome::Existing(record) => record,
        }
    }

    pub fn into_record(self) -> ContentRecord {
        match self {
            CreateOutcome::Created(record) | CreateOutcome::Existing(record) => record,
        }
    }

    pub fn was_created(&self) -> bool {
        matches!(self, CreateOutcome::Created(_))
    }
}

/// Persistent association from normalized place name to generated content.
///
/// Methods return boxed futures for dyn compatibility, so the service can
/// hold an `Arc<dyn ContentStore>` regardless of the backend.
pub trait ContentStore: Send + Sync {
    /// Human-readable backend name, used in logs.
    fn backend(&self) -> &str;

    /// Return the first record whose `place` equals the normalized key.
    fn find_by_place<'a>(
        &'a self,
        place: &'a PlaceKey,
    ) -> BoxFuture<'a, Result<Option<ContentRecord>, StorageError>>;

    /// Append a new record. Performs no duplicate check of its own.
    fn create<'a>(
        &'a self,
        place: &'a PlaceKey,
        content: &'a str,
    ) -> BoxFuture<'a, Result<ContentRecord, StorageError>>;

    /// Write a record only if none exists for the place yet.
    fn create_if_absent<'a>(
        &'a self,
        place: &'a PlaceKey,
        content: &'a str,
    ) -> BoxFuture<'a, Result<CreateOutcome, StorageError>>;

    /// Round-trip to the backend to confirm it is reachable.
    fn ping(&self) -> BoxFuture<'_, Result<(), StorageError>>;
}
