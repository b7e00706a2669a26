//! Pattern-based temporal intent extraction.
//!
//! Recognizes the date phrases the query router can answer directly:
//! absolute dates ("on May 3, 2025", "for 2025-05-03"), relative offsets
//! ("last 3 days"), "today"/"yesterday", and "this/last week|month|year".
//! Pattern families are tried in a fixed order and the first match wins.
//! This is deliberately not NLP — just anchored patterns over the
//! lowercased query.
//!
//! Relative offsets approximate a month as 30 days and a year as 365
//! days. Period phrases use explicit calendar arithmetic instead: weeks
//! are Monday-aligned 7-day spans, months run first-to-last calendar day,
//! years run Jan 1 to Dec 31.

use std::sync::LazyLock;

use chrono::{Datelike, Days, NaiveDate};
use regex::Regex;

/// A resolved temporal intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateIntent {
    /// A single date ("YYYY-MM-DD"), or the raw phrase for absolute
    /// wordy dates, matched textually against stored values.
    Single(String),
    /// An inclusive date range, both bounds "YYYY-MM-DD".
    Range { start: String, end: String },
}

static WORDY_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:on|for|date|day of)\s+(\w+\s+\d{1,2}(?:st|nd|rd|th)?(?:\s*,\s*\d{4})?)")
        .expect("wordy date regex is valid")
});
static ISO_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:on|for|date|day of)\s+(\d{4}-\d{2}-\d{2})").expect("iso date regex is valid")
});
static RELATIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:last|past|previous)\s+(\d+)\s+(day|week|month|year)s?")
        .expect("relative date regex is valid")
});
static THIS_PERIOD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"this (week|month|year)").expect("this-period regex is valid"));
static LAST_PERIOD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"last (week|month|year)").expect("last-period regex is valid"));

/// Extract a temporal intent from `query`, if any pattern family
/// matches. `today` is injected so callers (and tests) control the
/// reference date.
pub fn extract_date_intent(query: &str, today: NaiveDate) -> Option<DateIntent> {
    let query = query.to_lowercase();

    if let Some(caps) = WORDY_DATE.captures(&query) {
        return Some(DateIntent::Single(caps[1].to_string()));
    }
    if let Some(caps) = ISO_DATE.captures(&query) {
        return Some(DateIntent::Single(caps[1].to_string()));
    }
    if let Some(caps) = RELATIVE.captures(&query) {
        // Overflowing offsets ("last 99999999999 years") have no
        // sensible resolution; treat them as non-temporal.
        let amount: u64 = caps[1].parse().ok()?;
        return relative_offset(today, amount, &caps[2]);
    }
    if query.contains("today") {
        return Some(DateIntent::Single(format_date(today)));
    }
    if query.contains("yesterday") {
        return Some(DateIntent::Single(format_date(today - Days::new(1))));
    }
    if let Some(caps) = THIS_PERIOD.captures(&query) {
        return Some(period_range(today, &caps[1], Period::This));
    }
    if let Some(caps) = LAST_PERIOD.captures(&query) {
        return Some(period_range(today, &caps[1], Period::Last));
    }

    None
}

enum Period {
    This,
    Last,
}

fn relative_offset(today: NaiveDate, amount: u64, unit: &str) -> Option<DateIntent> {
    let days = match unit {
        "day" => amount,
        "week" => amount.checked_mul(7)?,
        "month" => amount.checked_mul(30)?,
        "year" => amount.checked_mul(365)?,
        _ => 0,
    };
    let date = today.checked_sub_days(Days::new(days))?;
    Some(DateIntent::Single(format_date(date)))
}

fn period_range(today: NaiveDate, unit: &str, period: Period) -> DateIntent {
    let (start, end) = match unit {
        "week" => {
            let monday = today - Days::new(u64::from(today.weekday().num_days_from_monday()));
            let start = match period {
                Period::This => monday,
                Period::Last => monday - Days::new(7),
            };
            (start, start + Days::new(6))
        }
        "month" => match period {
            Period::This => (first_of_month(today), last_of_month(today)),
            Period::Last => {
                let end = first_of_month(today) - Days::new(1);
                (first_of_month(end), end)
            }
        },
        // "year"
        _ => {
            let year = match period {
                Period::This => today.year(),
                Period::Last => today.year() - 1,
            };
            (
                NaiveDate::from_ymd_opt(year, 1, 1).unwrap_or(today),
                NaiveDate::from_ymd_opt(year, 12, 31).unwrap_or(today),
            )
        }
    };

    DateIntent::Range {
        start: format_date(start),
        end: format_date(end),
    }
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

fn last_of_month(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .map(|next| next - Days::new(1))
        .unwrap_or(date)
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
