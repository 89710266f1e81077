//! Error Types for Local Advisor

use agent_core::AgentError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AdvisorError>;

#[derive(Error, Debug)]
pub enum AdvisorError {
    #[error(transparent)]
    Agent(#[from] AgentError),

    #[error("Image search failed with HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AdvisorError {
    /// Convert to a user-friendly message
    pub fn user_message(&self) -> String {
        match self {
            Self::Agent(err) => err.user_message(),
            Self::Status { .. } | Self::Network(_) => "The photo service is unavailable.".into(),
            _ => "An unexpected error occurred.".into(),
        }
    }
}
