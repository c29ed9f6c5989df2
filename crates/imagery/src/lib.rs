//! Satellite imagery retrieval.
//!
//! [`ImageryFetcher`] walks a [`DateRange`](habitat_common::DateRange) at the
//! sensor's revisit cadence, asks an [`ImagerySource`] for one image per step
//! and yields the decoded samples lazily. Failed steps are logged and skipped.

pub mod decode;
pub mod error;
pub mod fetcher;
pub mod source;

pub use decode::decode_image;
pub use error::{ImageryError, Result};
pub use fetcher::{FetcherConfig, ImageSample, ImageryFetcher, DEFAULT_WINDOW_DEGREES};
pub use source::{HttpImagerySource, HttpSourceConfig, ImageryRequest, ImagerySource};
