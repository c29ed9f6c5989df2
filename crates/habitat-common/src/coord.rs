//! Geographic coordinates for occurrence locations.

use serde::{Deserialize, Serialize};

use crate::error::{HabitatError, HabitatResult};

/// A WGS84 latitude/longitude pair in decimal degrees.
///
/// Only constructed through [`Coordinate::new`], so every instance is finite
/// and within `[-90, 90]` x `[-180, 180]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCoordinate", into = "RawCoordinate")]
pub struct Coordinate {
    lat: f64,
    lon: f64,
}

#[derive(Serialize, Deserialize)]
struct RawCoordinate {
    lat: f64,
    lon: f64,
}

impl Coordinate {
    /// Create a coordinate, rejecting non-finite or out-of-range values.
    pub fn new(lat: f64, lon: f64) -> HabitatResult<Self> {
        if !lat.is_finite() || !lon.is_finite() {
            return Err(HabitatError::invalid_coordinate(lat, lon, "not a finite number"));
        }
        if !(-90.0..=90.0).contains(&lat) {
            return Err(HabitatError::invalid_coordinate(
                lat,
                lon,
                "latitude outside [-90, 90]",
            ));
        }
        if !(-180.0..=180.0).contains(&lon) {
            return Err(HabitatError::invalid_coordinate(
                lat,
                lon,
                "longitude outside [-180, 180]",
            ));
        }
        Ok(Self { lat, lon })
    }

    /// Parse a "lat,lon" string such as `"7.51,134.58"`.
    pub fn from_pair_string(s: &str) -> HabitatResult<Self> {
        let (lat, lon) = s
            .split_once(',')
            .ok_or_else(|| HabitatError::InvalidCoordinateFormat(s.to_string()))?;

        let lat: f64 = lat
            .trim()
            .parse()
            .map_err(|_| HabitatError::InvalidCoordinateFormat(s.to_string()))?;
        let lon: f64 = lon
            .trim()
            .parse()
            .map_err(|_| HabitatError::InvalidCoordinateFormat(s.to_string()))?;

        Self::new(lat, lon)
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lon(&self) -> f64 {
        self.lon
    }
}

impl TryFrom<RawCoordinate> for Coordinate {
    type Error = HabitatError;

    fn try_from(raw: RawCoordinate) -> Result<Self, Self::Error> {
        Coordinate::new(raw.lat, raw.lon)
    }
}

impl From<Coordinate> for RawCoordinate {
    fn from(c: Coordinate) -> Self {
        RawCoordinate {
            lat: c.lat,
            lon: c.lon,
        }
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.5},{:.5}", self.lat, self.lon)
    }
}
