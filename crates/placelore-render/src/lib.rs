//! placelore-render
//!
//! Segments generated markdown-ish text into display blocks.

pub mod blocks;
pub mod sections;
