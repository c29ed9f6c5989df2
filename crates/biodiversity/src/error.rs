//! Error types for the species data providers.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BiodiversityError {
    /// The provider answered with a non-success status.
    #[error("{provider} returned HTTP {status}")]
    Status { provider: &'static str, status: u16 },

    /// The request could not be sent or the body could not be read.
    #[error("transport error: {0}")]
    Transport(String),

    /// The response body was not the expected JSON.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Local species file could not be read or written.
    #[error("species store error: {0}")]
    Store(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl BiodiversityError {
    pub fn status(provider: &'static str, status: u16) -> Self {
        Self::Status { provider, status }
    }

    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }
}

impl From<reqwest::Error> for BiodiversityError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::InvalidResponse(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, BiodiversityError>;
