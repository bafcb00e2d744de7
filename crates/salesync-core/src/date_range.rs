use std::fmt;
use std::str::FromStr;

use chrono::{Days, NaiveDate, NaiveDateTime};
use thiserror::Error;

/// Why a run could not work out which days to extract.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeError {
    #[error("extraction mode '{0}' is not recognised")]
    UnknownMode(String),

    #[error("invalid custom dates (start: {start:?}, end: {end:?})")]
    InvalidDates {
        start: Option<String>,
        end: Option<String>,
    },

    #[error("no previous day exists for {0}")]
    OutOfRange(NaiveDate),
}

/// How the extraction window is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionMode {
    /// Yesterday only.
    Daily,
    /// Explicit `startDate`/`endDate` from the run configuration.
    Custom,
}

impl FromStr for ExtractionMode {
    type Err = RangeError;

    /// Case-insensitive; the Portuguese names used by older config files are
    /// accepted as aliases.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" | "diario" => Ok(Self::Daily),
            "custom" | "personalizado" => Ok(Self::Custom),
            _ => Err(RangeError::UnknownMode(s.to_string())),
        }
    }
}

/// Inclusive range of work dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}

/// Compute the range a run should extract.
///
/// `Daily` yields `[today - 1, today - 1]`; `Custom` parses both bounds. A
/// custom range whose start is after its end is returned as-is and simply
/// matches no rows.
///
/// # Errors
///
/// - [`RangeError::UnknownMode`] for any mode other than daily/custom.
/// - [`RangeError::InvalidDates`] when a custom bound is missing or unparsable.
/// - [`RangeError::OutOfRange`] if `today` has no previous day.
pub fn resolve_date_range(
    mode: &str,
    start_date: Option<&str>,
    end_date: Option<&str>,
    today: NaiveDate,
) -> Result<DateRange, RangeError> {
    match mode.parse::<ExtractionMode>()? {
        ExtractionMode::Daily => {
            let yesterday = today
                .checked_sub_days(Days::new(1))
                .ok_or(RangeError::OutOfRange(today))?;
            Ok(DateRange {
                start: yesterday,
                end: yesterday,
            })
        }
        ExtractionMode::Custom => {
            match (start_date.and_then(parse_date), end_date.and_then(parse_date)) {
                (Some(start), Some(end)) => Ok(DateRange { start, end }),
                _ => Err(RangeError::InvalidDates {
                    start: start_date.map(str::to_string),
                    end: end_date.map(str::to_string),
                }),
            }
        }
    }
}

/// Lenient date parsing: ISO dates, ISO date-times (time discarded) and
/// `dd/mm/yyyy`.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|dt| dt.date())
        })
        .or_else(|| {
            NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f")
                .ok()
                .map(|dt| dt.date())
        })
        .or_else(|| NaiveDate::parse_from_str(s, "%d/%m/%Y").ok())
}
