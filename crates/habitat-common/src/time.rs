//! Date ranges and satellite revisit schedules.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{HabitatError, HabitatResult};

/// Revisit cycle of the Landsat 8 sensor, in days.
pub const DEFAULT_REVISIT_DAYS: i64 = 16;

/// Date format used by the providers and in output filenames.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a `YYYY-MM-DD` calendar date.
pub fn parse_date(s: &str) -> HabitatResult<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
        .map_err(|_| HabitatError::InvalidDate(s.to_string()))
}

/// An inclusive range of calendar dates with `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Create a range, rejecting `start > end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> HabitatResult<Self> {
        if start > end {
            return Err(HabitatError::InvalidDateRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Parse a range from two `YYYY-MM-DD` strings.
    pub fn parse(start: &str, end: &str) -> HabitatResult<Self> {
        Self::new(parse_date(start)?, parse_date(end)?)
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of days between start and end (0 for a single-day range).
    pub fn span_days(&self) -> i64 {
        (self.end - self.start).num_days()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Lazily walk the range at a fixed cadence, starting at `start`.
    pub fn revisits(&self, cadence_days: i64) -> HabitatResult<RevisitSchedule> {
        RevisitSchedule::new(*self, cadence_days)
    }
}

/// Iterator over the revisit dates of a [`DateRange`].
///
/// Yields `start, start + cadence, ...` while the date is `<= end`.
#[derive(Debug, Clone)]
pub struct RevisitSchedule {
    cursor: NaiveDate,
    end: NaiveDate,
    cadence: Duration,
    remaining: usize,
}

impl RevisitSchedule {
    pub fn new(range: DateRange, cadence_days: i64) -> HabitatResult<Self> {
        if cadence_days < 1 {
            return Err(HabitatError::InvalidCadence(cadence_days));
        }
        let remaining = (range.span_days() / cadence_days + 1) as usize;
        Ok(Self {
            cursor: range.start,
            end: range.end,
            cadence: Duration::days(cadence_days),
            remaining,
        })
    }

    /// Total number of steps `floor((end - start) / cadence) + 1` still to be yielded.
    pub fn step_count(&self) -> usize {
        self.remaining
    }
}

impl Iterator for RevisitSchedule {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<NaiveDate> {
        if self.remaining == 0 || self.cursor > self.end {
            return None;
        }
        let date = self.cursor;
        self.remaining -= 1;
        // Overflow only at the far end of chrono's calendar; treat it as the end of the walk.
        match date.checked_add_signed(self.cadence) {
            Some(next) => self.cursor = next,
            None => self.remaining = 0,
        }
        Some(date)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for RevisitSchedule {}
