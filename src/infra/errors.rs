// src/infra/errors.rs — Error types for Townhall

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TownhallError {
    // Gateway errors
    #[error("Provider '{provider}' error: {message}")]
    Provider {
        provider: String,
        message: String,
        retriable: bool,
    },

    #[error("Rate limited by '{provider}', retry after {retry_after_ms}ms")]
    RateLimited {
        provider: String,
        retry_after_ms: u64,
    },

    // Credential errors — rejected locally, before any network call
    #[error("No API credential configured. Set OPENAI_API_KEY or run `townhall login`.")]
    MissingCredential,

    #[error("Invalid API credential: {0}")]
    InvalidCredential(String),

    // Input validation
    #[error("Nothing to submit: the question is empty")]
    EmptySubmission,

    #[error("A turn is already in flight; wait for the current reply")]
    TurnInFlight,

    #[error("Unknown chat '{id}'")]
    UnknownChat { id: String },

    // Infra
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TownhallError {
    pub fn is_retriable(&self) -> bool {
        matches!(
            self,
            TownhallError::Provider {
                retriable: true,
                ..
            } | TownhallError::RateLimited { .. }
        )
    }
}
