//! Common test fixtures for habitat-watch tests.
//!
//! This module provides pre-defined dates and locations that represent
//! the scenarios exercised across the suite.

use chrono::NaiveDate;

/// Reference monitoring window: the first quarter of 2023.
pub mod window {
    pub const START: &str = "2023-01-01";
    pub const END: &str = "2023-03-31";

    /// Revisit dates of the window at the 16-day cadence.
    pub const REVISIT_DATES: [&str; 6] = [
        "2023-01-01",
        "2023-01-17",
        "2023-02-02",
        "2023-02-18",
        "2023-03-06",
        "2023-03-22",
    ];
}

/// Common locations for testing, as (lat, lon).
pub mod location {
    /// Angaur island, Palau
    pub const ANGAUR: (f64, f64) = (6.9061, 134.1372);

    /// Sundarbans mangrove forest
    pub const SUNDARBANS: (f64, f64) = (21.9497, 89.1833);

    /// Latitude outside the valid range
    pub const INVALID_LAT: (f64, f64) = (91.0, 10.0);
}

/// Parse a fixture date string.
pub fn fixture_date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("fixture dates are valid")
}

/// All revisit dates of the reference window as `NaiveDate`s.
pub fn reference_revisit_dates() -> Vec<NaiveDate> {
    window::REVISIT_DATES.iter().map(|s| fixture_date(s)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_dates_are_sixteen_days_apart() {
        let dates = reference_revisit_dates();
        for pair in dates.windows(2) {
            assert_eq!((pair[1] - pair[0]).num_days(), 16);
        }
    }
}
