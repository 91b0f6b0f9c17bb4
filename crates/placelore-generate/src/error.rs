use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("missing configuration: {}", .missing.join(", "))]
    Configuration { missing: Vec<&'static str> },

    #[error("upstream error: {status} - {reason}")]
    Upstream { status: u16, reason: String },

    #[error("invalid response format: {0}")]
    Format(String),

    #[error("request to generation service failed: {0}")]
    Transport(String),
}
