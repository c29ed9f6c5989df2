//! Error types for vegetation index computation.

use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum VegetationError {
    /// A mapped band points past the grid's channels.
    #[error("{band} channel {index} out of range for a {channels}-channel image")]
    ChannelOutOfRange {
        band: &'static str,
        index: usize,
        channels: usize,
    },

    #[error("NIR and red bands map to the same channel {0}")]
    SameChannel(usize),

    #[error("epsilon must be finite and > 0, got {0}")]
    InvalidEpsilon(f64),
}

pub type Result<T> = std::result::Result<T, VegetationError>;
