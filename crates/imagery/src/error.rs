//! Error types for imagery retrieval.

use habitat_common::HabitatError;
use thiserror::Error;

/// Errors that can occur while requesting or decoding one image.
#[derive(Error, Debug)]
pub enum ImageryError {
    /// The provider answered with a non-success status.
    #[error("provider returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The request could not be sent or the response body could not be read.
    #[error("transport error: {0}")]
    Transport(String),

    /// The payload is not a decodable raster with at least three channels.
    #[error("decode error: {0}")]
    Decode(String),

    /// Fetcher or source configuration is unusable.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Common(#[from] HabitatError),
}

impl ImageryError {
    /// Create a Status error, truncating long bodies for logging.
    pub fn status(status: u16, body: impl Into<String>) -> Self {
        let mut body = body.into();
        if body.len() > MAX_BODY_CHARS {
            let cut = (0..=MAX_BODY_CHARS)
                .rev()
                .find(|i| body.is_char_boundary(*i))
                .unwrap_or(0);
            body.truncate(cut);
            body.push_str("...");
        }
        Self::Status { status, body }
    }

    /// Create a Decode error.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Create an InvalidConfig error.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// HTTP status code, when the provider answered at all.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            ImageryError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

const MAX_BODY_CHARS: usize = 256;

impl From<reqwest::Error> for ImageryError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

impl From<image::ImageError> for ImageryError {
    fn from(err: image::ImageError) -> Self {
        Self::Decode(err.to_string())
    }
}

/// Result type for imagery operations.
pub type Result<T> = std::result::Result<T, ImageryError>;
