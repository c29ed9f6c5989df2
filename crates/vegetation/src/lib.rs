//! Vegetation index computation.

pub mod error;
pub mod grid;
pub mod ndvi;

pub use error::{Result, VegetationError};
pub use grid::{IndexSummary, NdviGrid};
pub use ndvi::{normalized_difference, BandMapping, NdviCalculator, DEFAULT_EPSILON};
