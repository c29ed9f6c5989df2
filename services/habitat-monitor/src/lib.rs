//! Habitat monitor service library.
//!
//! Resolves a species and one of its observed locations, walks the imagery
//! provider over the monitoring window and writes an image plus an NDVI
//! raster for every date that could be retrieved.

pub mod config;
pub mod output;
pub mod pipeline;
