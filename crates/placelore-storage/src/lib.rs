//! placelore-storage
//!
//! The content store: a place-keyed collection of generated documents.
//! MongoDB in production, an in-memory store for tests and local runs.

pub mod error;
pub mod memory;
pub mod mongo;
pub mod store;
