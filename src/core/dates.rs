//! Conversion between the two textual date forms used by the API and the tables.
//!
//! * ISO form, `YYYY-MM-DD`, is what date pickers produce and what the API stores.
//! * Localized form, `DD/MM/YYYY` read day-first, is what tables display and what
//!   free-text cells send back.
//!
//! Both converters are best-effort: malformed input yields `None` ("no date") and
//! never an error, so a bad cell cannot break a listing.
//!
//! Validation is range-only: year above 1900, month 1 to 12, day 1 to 31. A value such
//! as `31/02/2024` is accepted here; use [`CalendarDate::to_naive_date`] to check
//! that it is a real calendar day.

use chrono::{Datelike, NaiveDate};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::OnceLock;

/// Placeholder rendered in place of a missing value.
pub const NOT_AVAILABLE: &str = "N/A";

const MIN_YEAR_EXCLUSIVE: u16 = 1900;
const MAX_MONTH: u8 = 12;
const MAX_DAY: u8 = 31;

fn iso_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^([0-9]{4})-([0-9]{2})-([0-9]{2})$").unwrap())
}

fn localized_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^([0-9]{1,2})/([0-9]{1,2})/([0-9]{4})$").unwrap())
}

/// A range-validated calendar date.
///
/// Field order gives chronological `Ord`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CalendarDate {
    year: u16,
    month: u8,
    day: u8,
}

impl CalendarDate {
    pub fn new(year: u16, month: u8, day: u8) -> Option<Self> {
        let valid = year > MIN_YEAR_EXCLUSIVE
            && year <= 9999
            && (1..=MAX_MONTH).contains(&month)
            && (1..=MAX_DAY).contains(&day);
        valid.then_some(Self { year, month, day })
    }

    pub fn year(&self) -> u16 {
        self.year
    }

    pub fn month(&self) -> u8 {
        self.month
    }

    pub fn day(&self) -> u8 {
        self.day
    }

    /// Accepts either textual form, ISO first.
    pub fn parse(text: &str) -> Option<Self> {
        parse_iso(text).or_else(|| parse_localized(text))
    }

    pub fn to_iso_string(&self) -> String {
        format!("{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }

    pub fn to_localized_string(&self) -> String {
        format!("{:02}/{:02}/{:04}", self.day, self.month, self.year)
    }

    /// `None` when the value passes the range checks but is not a real day
    /// (for example the 31st of February).
    pub fn to_naive_date(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year.into(), self.month.into(), self.day.into())
    }

    pub fn from_naive_date(date: NaiveDate) -> Option<Self> {
        let year = u16::try_from(date.year()).ok()?;
        Self::new(year, date.month() as u8, date.day() as u8)
    }
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_iso_string())
    }
}

impl Serialize for CalendarDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CalendarDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        parse_iso(&text).ok_or_else(|| {
            serde::de::Error::custom(format!("expected a YYYY-MM-DD date, got '{}'", text))
        })
    }
}

/// Decides which of two slash-separated fields is the day, returning `(day, month)`.
///
/// 1. `a > 12`: `a` can only be a day.
/// 2. `b > 12`: `b` can only be a day, so the text was written month-first.
/// 3. Both at most 12: day-first is assumed.
///
/// Case 3 is lossy. `03/04/2024` always becomes the 3rd of April even if the writer
/// meant March 4th; the intent cannot be recovered from the text.
pub fn resolve_day_month(a: u8, b: u8) -> (u8, u8) {
    if a > MAX_MONTH {
        (a, b)
    } else if b > MAX_MONTH {
        (b, a)
    } else {
        (a, b)
    }
}

/// Parses `YYYY-MM-DD`, or an ISO timestamp cut at its first `T`.
pub fn parse_iso(text: &str) -> Option<CalendarDate> {
    let date_part = text.trim().split('T').next()?;
    let caps = iso_pattern().captures(date_part)?;
    let year = caps[1].parse().ok()?;
    let month = caps[2].parse().ok()?;
    let day = caps[3].parse().ok()?;
    CalendarDate::new(year, month, day)
}

/// Parses `D/M/YYYY` or `DD/MM/YYYY`, applying [`resolve_day_month`].
pub fn parse_localized(text: &str) -> Option<CalendarDate> {
    let caps = localized_pattern().captures(text.trim())?;
    let a = caps[1].parse().ok()?;
    let b = caps[2].parse().ok()?;
    let year = caps[3].parse().ok()?;
    let (day, month) = resolve_day_month(a, b);
    CalendarDate::new(year, month, day)
}

fn looks_localized(text: &str) -> bool {
    localized_pattern().is_match(text)
}

/// ISO text to `DD/MM/YYYY` for display.
///
/// Empty text, [`NOT_AVAILABLE`] and text that already has the localized shape are
/// returned unchanged, which makes the conversion idempotent. `None` means the
/// input was not a usable date.
pub fn to_localized(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed == NOT_AVAILABLE || looks_localized(trimmed) {
        return Some(text.to_string());
    }
    parse_iso(trimmed).map(|date| date.to_localized_string())
}

/// [`to_localized`] for display surfaces, where "no date" renders blank.
pub fn to_localized_or_blank(text: &str) -> String {
    to_localized(text).unwrap_or_default()
}

/// Localized text to `YYYY-MM-DD`, the value a date picker expects.
///
/// Text that is already valid ISO is normalized and returned as well.
pub fn to_iso(text: &str) -> Option<String> {
    parse_localized(text)
        .or_else(|| parse_iso(text))
        .map(|date| date.to_iso_string())
}

/// Lenient `Option<CalendarDate>` field codec for API records.
///
/// Writes ISO text or `null`. Reads ISO, timestamps or localized text; anything
/// else (including `""` and `"N/A"`) becomes `None`.
pub mod lenient {
    use super::CalendarDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<CalendarDate>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(date) => serializer.collect_str(date),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<CalendarDate>, D::Error> {
        let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
        Ok(raw
            .as_ref()
            .and_then(|value| value.as_str())
            .and_then(CalendarDate::parse))
    }
}
