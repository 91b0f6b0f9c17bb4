//! Chat-style request bodies for the generation endpoint.

use serde::{Deserialize, Serialize};

pub const SYSTEM_PROMPT: &str = "You are a friendly assistant";

/// A single message in a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

/// Role of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// Body posted to `/ai/run/{model}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
}

impl ChatRequest {
    /// The fixed two-message conversation asking for a place's history.
    pub fn history(place: &str, max_tokens: u32) -> Self {
        Self {
            messages: vec![
                ChatMessage {
                    role: ChatRole::System,
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: ChatRole::User,
                    content: history_prompt(place),
                },
            ],
            max_tokens,
        }
    }
}

pub fn history_prompt(place: &str) -> String {
    format!(
        "Generate the history of {place}, include historical places, culture, events, and geography with proper headings."
    )
}
