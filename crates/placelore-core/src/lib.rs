//! placelore-core
//!
//! Pure domain types and place-key conventions. No database or HTTP
//! dependency: this is the shared vocabulary of the PlaceLore system.

pub mod error;
pub mod models;
pub mod place;
