use serde::{Deserialize, Serialize};

/// Generated description of a place, as persisted in the content store.
///
/// `place` is always the normalized key (see [`crate::place::PlaceKey`]).
/// Records are written once and never updated by PlaceLore itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentRecord {
    pub id: String,
    pub place: String,
    pub content: String,
    pub created_at: jiff::Timestamp,
    pub updated_at: jiff::Timestamp,
}
