//! Text generation seam.

use thiserror::Error;

/// Generation errors.
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("Text generation is not configured: {0}")]
    NotConfigured(String),

    #[error("Generation service rejected credentials (status {0})")]
    Unauthorized(u16),

    #[error("Generation request failed: {status} - {body}")]
    Upstream { status: u16, body: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Malformed generation response: {0}")]
    MalformedResponse(String),
}

pub type GenerationResult<T> = Result<T, GenerationError>;

/// A backend that completes a system + user prompt pair.
pub trait TextGenerator: Send + Sync {
    fn complete(&self, system: &str, user: &str) -> GenerationResult<String>;
}
