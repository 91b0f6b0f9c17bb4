//! MongoDB-backed content store.
//!
//! Documents are stored with camelCase fields (`place`, `content`,
//! `createdAt`, `updatedAt`); unknown fields such as `__v` are ignored on
//! read.

use std::fmt;

use mongodb::bson::{self, doc, oid::ObjectId};
use mongodb::error::{ErrorKind, WriteError, WriteFailure};
use mongodb::options::IndexOptions;
use mongodb::{Client, Collection, IndexModel};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use placelore_core::models::content::ContentRecord;
use placelore_core::place::PlaceKey;

use crate::error::StorageError;
use crate::store::{BoxFuture, ContentStore, CreateOutcome};

pub const DEFAULT_DATABASE: &str = "placelore";
pub const DEFAULT_COLLECTION: &str = "chats";

/// Server error code for a unique index violation.
const DUPLICATE_KEY: i32 = 11000;

/// Connection settings for [`MongoContentStore`].
#[derive(Clone)]
pub struct MongoConfig {
    pub url: String,
    pub database: String,
    pub collection: String,
}

impl fmt::Debug for MongoConfig {
    // The URL usually embeds credentials.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MongoConfig")
            .field("url", &"<redacted>")
            .field("database", &self.database)
            .field("collection", &self.collection)
            .finish()
    }
}

impl MongoConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            database: DEFAULT_DATABASE.to_string(),
            collection: DEFAULT_COLLECTION.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContentDocument {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    id: Option<ObjectId>,
    place: String,
    content: String,
    created_at: bson::DateTime,
    updated_at: bson::DateTime,
}

impl ContentDocument {
    fn into_record(self) -> Result<ContentRecord, StorageError> {
        Ok(ContentRecord {
            id: self.id.map(|id| id.to_hex()).unwrap_or_default(),
            place: self.place,
            content: self.content,
            created_at: to_timestamp(self.created_at)?,
            updated_at: to_timestamp(self.updated_at)?,
        })
    }
}

fn to_timestamp(value: bson::DateTime) -> Result<jiff::Timestamp, StorageError> {
    jiff::Timestamp::from_millisecond(value.timestamp_millis())
        .map_err(|e| StorageError::Timestamp(e.to_string()))
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(WriteError {
            code: DUPLICATE_KEY,
            ..
        }))
    )
}

/// Content store backed by a single MongoDB collection.
///
/// Constructed once by the process entry point and shared through an
/// `Arc`; call [`MongoContentStore::shutdown`] on exit.
pub struct MongoContentStore {
    client: Client,
    collection: Collection<ContentDocument>,
}

impl MongoContentStore {
    /// Connect and verify the server answers a `ping`.
    ///
    /// The driver connects lazily, so without the ping a bad URL would only
    /// surface on the first request.
    pub async fn connect(config: &MongoConfig) -> Result<Self, StorageError> {
        let client = Client::with_uri_str(&config.url)
            .await
            .map_err(|e| StorageError::Connect(e.to_string()))?;

        let database = client.database(&config.database);
        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| StorageError::Connect(e.to_string()))?;

        info!(
            database = %config.database,
            collection = %config.collection,
            "connected to content store"
        );

        Ok(Self {
            collection: database.collection(&config.collection),
            client,
        })
    }

    /// Create the unique index on `place`.
    ///
    /// Fails on collections that already hold duplicate places; the store
    /// still works in that case, `create_if_absent` just loses its
    /// race-proofing.
    pub async fn ensure_indexes(&self) -> Result<(), StorageError> {
        let index = IndexModel::builder()
            .keys(doc! { "place": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();

        self.collection
            .create_index(index)
            .await
            .map_err(|e| StorageError::Index(e.to_string()))?;

        info!("unique place index ready");
        Ok(())
    }

    /// Close connection pools and end server sessions.
    pub async fn shutdown(&self) {
        self.client.clone().shutdown().await;
        info!("content store connection closed");
    }

    async fn find(&self, place: &PlaceKey) -> Result<Option<ContentRecord>, StorageError> {
        let found = self
            .collection
            .find_one(doc! { "place": place.key() })
            .sort(doc! { "_id": 1 })
            .await
            .map_err(|e| StorageError::Query(e.to_string()))?;

        found.map(ContentDocument::into_record).transpose()
    }

    async fn insert(&self, place: &PlaceKey, content: &str) -> Result<ContentRecord, StorageError> {
        let now = bson::DateTime::now();
        let mut document = ContentDocument {
            id: None,
            place: place.key().to_string(),
            content: content.to_string(),
            created_at: now,
            updated_at: now,
        };

        let result = self.collection.insert_one(&document).await.map_err(|e| {
            if is_duplicate_key(&e) {
                StorageError::DuplicatePlace {
                    place: place.key().to_string(),
                }
            } else {
                StorageError::Insert(e.to_string())
            }
        })?;

        document.id = result.inserted_id.as_object_id();
        debug!(place = %place, id = ?document.id, "content record inserted");
        document.into_record()
    }

    async fn insert_if_absent(
        &self,
        place: &PlaceKey,
        content: &str,
    ) -> Result<CreateOutcome, StorageError> {
        if let Some(existing) = self.find(place).await? {
            return Ok(CreateOutcome::Existing(existing));
        }

        match self.insert(place, content).await {
            Ok(record) => Ok(CreateOutcome::Created(record)),
            Err(StorageError::DuplicatePlace { .. }) => {
                // Another writer got there between our find and insert.
                let existing = self.find(place).await?.ok_or_else(|| {
                    StorageError::Query(format!("record for {place} missing after duplicate key"))
                })?;
                Ok(CreateOutcome::Existing(existing))
            }
            Err(e) => Err(e),
        }
    }
}

impl ContentStore for MongoContentStore {
    fn backend(&self) -> &str {
        "mongodb"
    }

    fn find_by_place<'a>(
        &'a self,
        place: &'a PlaceKey,
    ) -> BoxFuture<'a, Result<Option<ContentRecord>, StorageError>> {
        Box::pin(self.find(place))
    }

    fn create<'a>(
        &'a self,
        place: &'a PlaceKey,
        content: &'a str,
    ) -> BoxFuture<'a, Result<ContentRecord, StorageError>> {
        Box::pin(self.insert(place, content))
    }

    fn create_if_absent<'a>(
        &'a self,
        place: &'a PlaceKey,
        content: &'a str,
    ) -> BoxFuture<'a, Result<CreateOutcome, StorageError>> {
        Box::pin(self.insert_if_absent(place, content))
    }

    fn ping(&self) -> BoxFuture<'_, Result<(), StorageError>> {
        Box::pin(async move {
            self.client
                .database("admin")
                .run_command(doc! { "ping": 1 })
                .await
                .map_err(|e| StorageError::Query(e.to_string()))?;
            Ok(())
        })
    }
}
