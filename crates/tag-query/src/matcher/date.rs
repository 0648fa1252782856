//! Date range matching.
//!
//! Every date term denotes a half-open range of instants `[bottom, top)`:
//! `2024-06` is all of June 2024, `3 days ago` is the day-long window ending
//! two days before now. Qualifiers then compare against the range edges.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;

use super::FieldMatcher;
use crate::error::TermError;
use crate::fields::Qualifier;

const SECOND_MS: i64 = 1_000;
const MINUTE_MS: i64 = 60 * SECOND_MS;
const HOUR_MS: i64 = 60 * MINUTE_MS;
const DAY_MS: i64 = 24 * HOUR_MS;
const WEEK_MS: i64 = 7 * DAY_MS;
const MONTH_MS: i64 = 30 * DAY_MS;
const YEAR_MS: i64 = 365 * DAY_MS;

static RELATIVE_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([0-9]+) (second|minute|hour|day|week|month|year)s? ago")
        .expect("relative date pattern is valid")
});

static TIME_ZONE_OFFSET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([+-])([0-9]{2}):([0-9]{2})$").expect("offset pattern is valid")
});

/// Components of an absolute date, consumed left to right.
static COMPONENTS: LazyLock<[Regex; 6]> = LazyLock::new(|| {
    [
        r"^([0-9]{4})",
        r"^-([0-9]{2})",
        r"^-([0-9]{2})",
        r"^(?:\s+|T|t)([0-9]{2})",
        r"^:([0-9]{2})",
        r"^:([0-9]{2})",
    ]
    .map(|pattern| Regex::new(pattern).expect("date component pattern is valid"))
});

/// A half-open range of instants, in Unix milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    /// First instant inside the range.
    pub bottom: i64,
    /// First instant after the range.
    pub top: i64,
}

impl DateRange {
    /// Parses a date term, trying the relative form first.
    ///
    /// # Errors
    ///
    /// Returns a [`TermError`] when the term is neither form.
    pub fn parse(term: &str, now: DateTime<Utc>) -> Result<Self, TermError> {
        if RELATIVE_DATE.is_match(term) {
            Self::parse_relative(term, now)
        } else {
            Self::parse_absolute(term)
        }
    }

    /// Parses `N <unit>s ago`, where a month is 30 days and a year 365.
    fn parse_relative(term: &str, now: DateTime<Utc>) -> Result<Self, TermError> {
        let caps = RELATIVE_DATE
            .captures(term)
            .ok_or_else(|| TermError::invalid_date(term))?;

        let out_of_range = || TermError::DateOutOfRange {
            value: term.to_string(),
        };

        let amount: i64 = caps[1].parse().map_err(|_| out_of_range())?;
        let scale = match &caps[2] {
            "second" => SECOND_MS,
            "minute" => MINUTE_MS,
            "hour" => HOUR_MS,
            "day" => DAY_MS,
            "week" => WEEK_MS,
            "month" => MONTH_MS,
            _ => YEAR_MS,
        };

        let now = now.timestamp_millis();
        let span = amount.checked_mul(scale).ok_or_else(out_of_range)?;
        let bottom = now.checked_sub(span).ok_or_else(out_of_range)?;

        Ok(Self {
            bottom,
            top: bottom + scale,
        })
    }

    /// Parses `YYYY[-MM[-DD[(T| )hh[:mm[:ss]]]]]` with an optional `Z` or
    /// `±HH:MM` suffix. The range spans one unit of the last component given.
    fn parse_absolute(term: &str) -> Result<Self, TermError> {
        let invalid = || TermError::invalid_date(term);

        let mut offset = (0i64, 0i64);
        let mut rest = term;
        if let Some(caps) = TIME_ZONE_OFFSET.captures(rest) {
            let sign = if &caps[1] == "-" { -1 } else { 1 };
            let hours: i64 = caps[2].parse().map_err(|_| invalid())?;
            let minutes: i64 = caps[3].parse().map_err(|_| invalid())?;
            offset = (sign * hours, sign * minutes);
            rest = &rest[..rest.len() - caps[0].len()];
        } else if let Some(stripped) = rest.strip_suffix(['Z', 'z']) {
            rest = stripped;
        }

        // year, zero-based month, day, hour, minute, second
        let mut parts: [i64; 6] = [0, 0, 1, 0, 0, 0];
        let mut parsed = 0;
        for (index, component) in COMPONENTS.iter().enumerate() {
            if rest.is_empty() {
                break;
            }
            let caps = component.captures(rest).ok_or_else(invalid)?;
            let value: i64 = caps[1].parse().map_err(|_| invalid())?;
            parts[index] = if index == 1 { value - 1 } else { value };
            rest = &rest[caps[0].len()..];
            parsed = index + 1;
        }

        if !rest.is_empty() || parsed == 0 {
            return Err(invalid());
        }

        parts[3] -= offset.0;
        parts[4] -= offset.1;

        let bottom = utc_millis(&parts).ok_or_else(invalid)?;
        parts[parsed - 1] += 1;
        let top = utc_millis(&parts).ok_or_else(invalid)?;

        Ok(Self { bottom, top })
    }
}

/// Converts possibly out-of-range calendar components into Unix milliseconds,
/// carrying overflow into the next larger unit.
fn utc_millis(parts: &[i64; 6]) -> Option<i64> {
    let months = parts[0].checked_mul(12)?.checked_add(parts[1])?;
    let year = i32::try_from(months.div_euclid(12)).ok()?;
    let month = u32::try_from(months.rem_euclid(12) + 1).ok()?;
    let first_of_month = NaiveDate::from_ymd_opt(year, month, 1)?
        .and_hms_opt(0, 0, 0)?
        .and_utc()
        .timestamp_millis();

    let offset_ms = (parts[2] - 1) * DAY_MS
        + parts[3] * HOUR_MS
        + parts[4] * MINUTE_MS
        + parts[5] * SECOND_MS;
    first_of_month.checked_add(offset_ms)
}

/// Parses a document's date attribute into Unix milliseconds.
///
/// Accepts RFC 3339 and the common ISO 8601 variants without an offset,
/// which are taken as UTC.
pub(crate) fn parse_instant(value: &str) -> Option<i64> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.timestamp_millis());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Some(dt.and_utc().timestamp_millis());
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp_millis())
}

/// Matches date fields against a range and qualifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateMatcher {
    range: DateRange,
    qualifier: Qualifier,
}

impl DateMatcher {
    /// Creates a matcher for an already-computed range.
    pub fn new(range: DateRange, qualifier: Qualifier) -> Self {
        Self { range, qualifier }
    }

    /// Parses a date term measured from `now`.
    ///
    /// # Errors
    ///
    /// Returns a [`TermError`] when the term is not a valid date.
    pub fn parse(term: &str, qualifier: Qualifier, now: DateTime<Utc>) -> Result<Self, TermError> {
        let range = DateRange::parse(term, now)?;
        tracing::trace!(term, bottom = range.bottom, top = range.top, %qualifier, "date range");
        Ok(Self::new(range, qualifier))
    }

    /// The range this matcher compares against.
    pub fn range(&self) -> DateRange {
        self.range
    }

    /// Tests an instant in Unix milliseconds.
    pub fn matches_instant(&self, t: i64) -> bool {
        let DateRange { bottom, top } = self.range;
        match self.qualifier {
            Qualifier::Lte => t < top,
            Qualifier::Gte => t >= bottom,
            Qualifier::Lt => t < bottom,
            Qualifier::Gt => t >= top,
            Qualifier::Eq => bottom <= t && t < top,
        }
    }
}

impl FieldMatcher for DateMatcher {
    fn matches(&self, value: &str, _field: &str, _document_id: i64) -> bool {
        parse_instant(value).is_some_and(|t| self.matches_instant(t))
    }
}
