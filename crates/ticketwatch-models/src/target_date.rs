use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

const MONTH_ABBREVS: [&str; 12] = [
    "JAN", "FEB", "MAR", "APR", "MAY", "JUN", "JUL", "AUG", "SEP", "OCT", "NOV", "DEC",
];

const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TargetDateError {
    #[error("Invalid date format '{0}'. Use YYYYMMDD (e.g., 20260109)")]
    Format(String),
    #[error("'{0}' is not a real calendar date")]
    NotACalendarDate(String),
}

/// A show date in the `YYYYMMDD` form the booking site uses in its URLs.
///
/// Construction guarantees exactly eight ASCII digits that name a real day,
/// so everything downstream (URL building, month lookups) is infallible.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TargetDate {
    raw: String,
    date: NaiveDate,
}

impl TargetDate {
    pub fn parse(input: &str) -> Result<Self, TargetDateError> {
        let raw = input.trim();
        if raw.len() != 8 || !raw.bytes().all(|b| b.is_ascii_digit()) {
            return Err(TargetDateError::Format(raw.to_string()));
        }
        let date = NaiveDate::parse_from_str(raw, "%Y%m%d")
            .map_err(|_| TargetDateError::NotACalendarDate(raw.to_string()))?;
        Ok(Self {
            raw: raw.to_string(),
            date,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Two-digit, zero-padded day as it appears in the raw value ("09").
    pub fn day_padded(&self) -> &str {
        &self.raw[6..8]
    }

    pub fn day(&self) -> u32 {
        self.date.day()
    }

    pub fn year(&self) -> i32 {
        self.date.year()
    }

    /// Upper-case three letter English month ("JAN").
    pub fn month_abbrev(&self) -> &'static str {
        MONTH_ABBREVS[self.date.month0() as usize]
    }

    /// Human form used in messages and listings, e.g. "Jan 9, 2026".
    pub fn display_long(&self) -> String {
        format!(
            "{} {}, {}",
            MONTH_NAMES[self.date.month0() as usize],
            self.day(),
            self.year()
        )
    }
}

impl TryFrom<String> for TargetDate {
    type Error = TargetDateError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<TargetDate> for String {
    fn from(value: TargetDate) -> Self {
        value.raw
    }
}

impl fmt::Display for TargetDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
