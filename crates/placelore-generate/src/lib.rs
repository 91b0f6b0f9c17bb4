//! placelore-generate
//!
//! Generative-text invocation: prompt construction, the Workers AI chat
//! endpoint client, and response parsing.

pub mod chat;
pub mod client;
pub mod error;
pub mod generator;
