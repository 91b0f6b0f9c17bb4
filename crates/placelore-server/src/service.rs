//! Lookup-or-generate flow.
//!
//! validate → lookup → (single-flight) → re-check → generate → persist.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use placelore_core::models::content::ContentRecord;
use placelore_core::place::PlaceKey;
use placelore_generate::generator::Generator;
use placelore_storage::store::{ContentStore, CreateOutcome};

use crate::error::ServiceError;
use crate::single_flight::InFlight;

/// Where the returned content came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentSource {
    /// Already in the store.
    Stored,
    /// Generated by this request and stored.
    Generated,
    /// Generated by this request, but storing it failed.
    Unpersisted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Content {
    /// Normalized place key.
    pub place: String,
    pub text: String,
    pub source: ContentSource,
}

impl Content {
    fn stored(record: ContentRecord) -> Self {
        Self {
            place: record.place,
            text: record.content,
            source: ContentSource::Stored,
        }
    }
}

pub struct ContentService {
    store: Arc<dyn ContentStore>,
    generator: Arc<dyn Generator>,
    in_flight: InFlight,
    serve_unpersisted: bool,
}

impl ContentService {
    pub fn new(store: Arc<dyn ContentStore>, generator: Arc<dyn Generator>) -> Self {
        Self {
            store,
            generator,
            in_flight: InFlight::new(),
            serve_unpersisted: false,
        }
    }

    /// When enabled, generated text is returned even if it could not be
    /// stored. Off by default: content is only served once it is durable.
    pub fn serve_unpersisted(mut self, enabled: bool) -> Self {
        self.serve_unpersisted = enabled;
        self
    }

    pub fn store(&self) -> &dyn ContentStore {
        self.store.as_ref()
    }

    /// Number of places with a generation in progress or queued.
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Stored content for a place, if any. Never calls the generator.
    pub async fn lookup(&self, raw_place: &str) -> Result<Option<ContentRecord>, ServiceError> {
        let place = PlaceKey::parse(raw_place)?;
        let record = self.store.find_by_place(&place).await?;
        debug!(place = %place, hit = record.is_some(), "content lookup");
        Ok(record)
    }

    /// Stored content for a place, generating and storing it on a miss.
    ///
    /// Concurrent calls for one place share a single generation. A failed
    /// generation is not shared: each waiter then tries the upstream itself.
    pub async fn generate(&self, raw_place: &str) -> Result<Content, ServiceError> {
        let place = PlaceKey::parse(raw_place)?;

        if let Some(record) = self.store.find_by_place(&place).await? {
            debug!(place = %place, "content already stored");
            return Ok(Content::stored(record));
        }

        let _slot = self.in_flight.acquire(place.key()).await;

        // Whoever held the slot before us may have stored it already.
        if let Some(record) = self.store.find_by_place(&place).await? {
            debug!(place = %place, "content stored while waiting");
            return Ok(Content::stored(record));
        }

        let generated = self.generator.generate(place.display()).await?;

        match self.store.create_if_absent(&place, &generated.text).await {
            Ok(CreateOutcome::Created(record)) => {
                info!(
                    place = %place,
                    generation_id = %generated.id,
                    record_id = %record.id,
                    "generated content stored"
                );
                Ok(Content {
                    place: record.place,
                    text: record.content,
                    source: ContentSource::Generated,
                })
            }
            Ok(CreateOutcome::Existing(record)) => {
                warn!(
                    place = %place,
                    generation_id = %generated.id,
                    "place stored by another writer, discarding generated text"
                );
                Ok(Content::stored(record))
            }
            Err(e) if self.serve_unpersisted => {
                warn!(
                    place = %place,
                    generation_id = %generated.id,
                    error = %e,
                    "failed to store generated content, serving it anyway"
                );
                Ok(Content {
                    place: place.key().to_string(),
                    text: generated.text,
                    source: ContentSource::Unpersisted,
                })
            }
            Err(e) => {
                error!(
                    place = %place,
                    generation_id = %generated.id,
                    error = %e,
                    "failed to store generated content, discarding it"
                );
                Err(e.into())
            }
        }
    }
}
