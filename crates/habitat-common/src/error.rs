//! Error types shared by the habitat-watch crates.

use chrono::NaiveDate;
use thiserror::Error;

/// Result type alias using HabitatError.
pub type HabitatResult<T> = Result<T, HabitatError>;

/// Validation and data errors for the shared domain types.
#[derive(Debug, Error)]
pub enum HabitatError {
    // === Input validation ===
    #[error("Invalid coordinate (lat={lat}, lon={lon}): {message}")]
    InvalidCoordinate { lat: f64, lon: f64, message: String },

    #[error("Invalid coordinate string: {0}. Expected 'lat,lon'")]
    InvalidCoordinateFormat(String),

    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    #[error("Invalid date: {0}. Expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Invalid revisit cadence: {0} days (must be at least 1)")]
    InvalidCadence(i64),

    // === Data ===
    #[error("Invalid pixel grid: {0}")]
    InvalidRaster(String),
}

impl HabitatError {
    pub fn invalid_coordinate(lat: f64, lon: f64, message: impl Into<String>) -> Self {
        Self::InvalidCoordinate {
            lat,
            lon,
            message: message.into(),
        }
    }

    pub fn invalid_raster(message: impl Into<String>) -> Self {
        Self::InvalidRaster(message.into())
    }

    /// Whether this error comes from rejecting caller-supplied input.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            HabitatError::InvalidCoordinate { .. }
                | HabitatError::InvalidCoordinateFormat(_)
                | HabitatError::InvalidDateRange { .. }
                | HabitatError::InvalidDate(_)
                | HabitatError::InvalidCadence(_)
        )
    }
}
