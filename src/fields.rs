//! Pure field parsers for text fragments pulled out of event pages. No I/O.

use crate::error::{Result, ScraperError};
use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;

/// Builds the event timestamp from the site's fixed date/time text layout.
///
/// The date string ends in "DD.MM." and the time string starts with "HH.MM",
/// e.g. "Tue 16.08." and "19.30". The site never prints a year, so the
/// configured festival year supplies it. This is the single place that
/// depends on those character offsets; if the site layout changes, only this
/// function needs to follow.
pub fn event_datetime(date: &str, time: &str, festival_year: i32) -> Result<NaiveDateTime> {
    let len = date.len();
    let month: u32 = len
        .checked_sub(3)
        .and_then(|start| date.get(start..len - 1))
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| ScraperError::Unparseable {
            field: "event date",
            text: date.to_string(),
        })?;
    let day: u32 = len
        .checked_sub(6)
        .and_then(|start| date.get(start..len - 4))
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| ScraperError::Unparseable {
            field: "event date",
            text: date.to_string(),
        })?;

    let hour: u32 = time
        .get(0..2)
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| ScraperError::Unparseable {
            field: "event time",
            text: time.to_string(),
        })?;
    let minute: u32 = time
        .get(3..5)
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| ScraperError::Unparseable {
            field: "event time",
            text: time.to_string(),
        })?;

    NaiveDate::from_ymd_opt(festival_year, month, day)
        .and_then(|d| d.and_hms_opt(hour, minute, 0))
        .ok_or_else(|| ScraperError::Unparseable {
            field: "event datetime",
            text: format!("{date} {time}"),
        })
}

/// Parses a composer's birth/death years from the free text following their
/// name, e.g. "1685–1750" or "*1952".
///
/// Exactly one year means the composer is still active (or the death year is
/// unknown). Zero or more than two integers means the bolded header was not a
/// composer entry at all; the extractor uses that as its disambiguation
/// signal.
pub fn composer_years(text: &str) -> Option<(i32, Option<i32>)> {
    let year_re = Regex::new(r"\d+").unwrap();
    let years: Vec<i32> = year_re
        .find_iter(text)
        .filter_map(|m| m.as_str().parse().ok())
        .collect();

    match years[..] {
        [birth] => Some((birth, None)),
        [birth, death] => Some((birth, Some(death))),
        _ => None,
    }
}

/// Cleans a performer or composer display name: embedded newlines/tabs are
/// dropped and a single trailing colon is stripped.
pub fn clean_name(name: &str) -> String {
    let cleaned = name.replace(['\n', '\t'], "");
    match cleaned.strip_suffix(':') {
        Some(stripped) => stripped.to_string(),
        None => cleaned,
    }
}

/// Extracts every integer substring of a price text fragment. Each becomes
/// one ticket observation's price.
pub fn extract_prices(text: &str) -> Vec<i64> {
    let price_re = Regex::new(r"\d+").unwrap();
    price_re
        .find_iter(text)
        .filter_map(|m| m.as_str().parse().ok())
        .collect()
}
