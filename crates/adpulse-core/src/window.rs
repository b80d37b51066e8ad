//! Calendar windows compared by the aggregator.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// An immutable span of calendar days. Both `start` and `end` are included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PeriodWindow {
    start: NaiveDate,
    end: NaiveDate,
}

impl PeriodWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, CoreError> {
        if end < start {
            return Err(CoreError::InvalidWindow { start, end });
        }
        Ok(Self { start, end })
    }

    /// Parse a pair of `YYYY-MM-DD` strings.
    pub fn parse(start: &str, end: &str) -> Result<Self, CoreError> {
        Self::new(parse_date(start)?, parse_date(end)?)
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of calendar days covered, counting both ends.
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, CoreError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| CoreError::InvalidDate(raw.to_string()))
}

/// `date` moved back by `days`, or `None` past the calendar's lower bound.
fn days_before(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    date.checked_sub_signed(Duration::try_days(days)?)
}

/// The `days`-long window ending on `today`, e.g. the dashboard's "last 30 days".
pub fn trailing_window(today: NaiveDate, days: u32) -> Result<PeriodWindow, CoreError> {
    if days == 0 {
        return Err(CoreError::EmptyWindow);
    }
    let start = days_before(today, i64::from(days) - 1).ok_or(CoreError::DateOutOfRange)?;
    PeriodWindow::new(start, today)
}

/// The window of the same length that ends the day before `current` starts.
///
/// Fails only when that window would start before the earliest
/// representable date.
pub fn derive_previous_window(current: &PeriodWindow) -> Result<PeriodWindow, CoreError> {
    let end = days_before(current.start, 1).ok_or(CoreError::DateOutOfRange)?;
    let start = days_before(end, current.days() - 1).ok_or(CoreError::DateOutOfRange)?;
    Ok(PeriodWindow { start, end })
}
