//! Common types and utilities shared across the habitat-watch crates and services.

pub mod coord;
pub mod error;
pub mod raster;
pub mod time;

pub use coord::Coordinate;
pub use error::{HabitatError, HabitatResult};
pub use raster::PixelGrid;
pub use time::{parse_date, DateRange, RevisitSchedule, DATE_FORMAT, DEFAULT_REVISIT_DAYS};
