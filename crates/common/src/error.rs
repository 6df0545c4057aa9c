use thiserror::Error;

use crate::status::ClaimStatus;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Claim not found: {0}")]
    NotFound(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Invalid transition from {from} to {to}")]
    InvalidTransition { from: ClaimStatus, to: ClaimStatus },

    #[error("Missing prerequisite: {0}")]
    MissingPrerequisite(String),

    #[error("Claim is in terminal state {0}")]
    TerminalState(ClaimStatus),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("JSON serialization error: {0}")]
    JsonSerialization(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Stable machine-readable code reported in error envelopes
    pub fn code(&self) -> &'static str {
        match self {
            Error::NotFound(_) => "NotFound",
            Error::Forbidden(_) => "Forbidden",
            Error::InvalidTransition { .. } => "InvalidTransition",
            Error::MissingPrerequisite(_) => "MissingPrerequisite",
            Error::TerminalState(_) => "TerminalState",
            Error::Validation(_) => "ValidationError",
            Error::Storage(_) | Error::JsonSerialization(_) | Error::Other(_) => "InternalError",
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
