//! Place-name conventions.
//!
//! Every lookup and every write goes through [`PlaceKey`], so "Paris",
//! " paris " and "PARIS" all address the same stored record.

use std::fmt;

use crate::error::CoreError;

/// A validated place name.
///
/// Holds the normalized lookup key (trimmed, lowercased) alongside the
/// trimmed form the user typed, which reads better inside a prompt.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlaceKey {
    key: String,
    display: String,
}

impl PlaceKey {
    /// Validate and normalize a raw place name.
    ///
    /// Fails with [`CoreError::EmptyPlace`] when nothing is left after
    /// trimming.
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        let display = raw.trim();
        if display.is_empty() {
            return Err(CoreError::EmptyPlace);
        }

        Ok(Self {
            key: normalize(display),
            display: display.to_string(),
        })
    }

    /// The normalized key used for storage lookups.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The trimmed place name as entered.
    pub fn display(&self) -> &str {
        &self.display
    }
}

impl fmt::Display for PlaceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)
    }
}

/// Normalize a place name into its storage key.
pub fn normalize(raw: &str) -> String {
    raw.trim().to_lowercase()
}
