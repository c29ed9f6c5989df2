//! Species data providers.
//!
//! - [`occurrence`]: scientific name to observed coordinates
//! - [`redlist`]: paginated endangered-species registry and habitat lookup
//! - [`store`]: local JSON file holding the fetched registry records

pub mod error;
pub mod occurrence;
pub mod redlist;
pub mod store;

pub use error::{BiodiversityError, Result};
pub use occurrence::{OccurrenceClient, OccurrenceConfig};
pub use redlist::{RedListClient, RedListConfig, SpeciesRecord};
pub use store::SpeciesStore;
