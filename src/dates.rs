use chrono::{Datelike, NaiveDate};
use regex::Regex;
use serde::Deserialize;

/// Month-name table used when a date is written out in words.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateLocale {
    #[default]
    Nl,
    En,
}

/// Numeric date formats tried in order. Four-digit years come first so that
/// `%y` never swallows half of a four-digit year.
pub const NUMERIC_FORMATS: &[&str] = &[
    "%d-%m-%Y",
    "%d/%m/%Y",
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%d-%m-%y",
    "%d/%m/%y",
];

const NL_MONTHS: &[(&str, u32)] = &[
    ("januari", 1),
    ("februari", 2),
    ("maart", 3),
    ("mrt", 3),
    ("april", 4),
    ("mei", 5),
    ("juni", 6),
    ("juli", 7),
    ("augustus", 8),
    ("september", 9),
    ("oktober", 10),
    ("november", 11),
    ("december", 12),
];

const EN_MONTHS: &[(&str, u32)] = &[
    ("january", 1),
    ("february", 2),
    ("march", 3),
    ("april", 4),
    ("may", 5),
    ("june", 6),
    ("july", 7),
    ("august", 8),
    ("september", 9),
    ("october", 10),
    ("november", 11),
    ("december", 12),
];

/// Parse a free-text date token against the fixed format list.
///
/// The input may carry surrounding words; whitespace is collapsed and the
/// first date-like token is tried on its own when the whole string does not
/// parse. Returns `None` when nothing matches; never an error.
pub fn normalize(text: &str, locale: DateLocale) -> Option<NaiveDate> {
    let collapsed = collapse_whitespace(text);
    if collapsed.is_empty() {
        return None;
    }

    if let Some(date) = parse_numeric(&collapsed) {
        return Some(date);
    }

    if let Some((start, end)) = date_token(&collapsed)
        && let Some(date) = parse_numeric(collapsed[start..end].trim())
    {
        return Some(date);
    }

    parse_month_name(&collapsed, locale)
}

/// Byte range of the first date-like token in `text`, if any.
///
/// Shared with the free-text strategy, which must remove the matched
/// substring before splitting the remainder into fields.
pub fn date_token(text: &str) -> Option<(usize, usize)> {
    let re = Regex::new(r"\b\d{4}-\d{2}-\d{2}\b|\b\d{1,2}[-/]\d{1,2}[-/]\d{2,4}\b")
        .expect("date token regex must compile");
    re.find(text).map(|m| (m.start(), m.end()))
}

/// True when the text contains a date-like token at all. Used by the field
/// heuristics, which only need shape, not a parsed value.
pub fn looks_like_date(text: &str) -> bool {
    date_token(text).is_some()
}

fn parse_numeric(text: &str) -> Option<NaiveDate> {
    for format in NUMERIC_FORMATS {
        // chrono's %Y accepts a two-digit year as year 25; reject that so
        // the %y formats further down get their turn.
        if let Ok(date) = NaiveDate::parse_from_str(text, format)
            && date.year() >= 1900
        {
            return Some(date);
        }
    }
    None
}

fn parse_month_name(text: &str, locale: DateLocale) -> Option<NaiveDate> {
    let re = Regex::new(r"(?i)\b(\d{1,2})\.?\s+([[:alpha:]]+)\.?\s+(\d{2,4})\b")
        .expect("month name regex must compile");
    let caps = re.captures(text)?;

    let day = caps.get(1)?.as_str().parse::<u32>().ok()?;
    let month = month_number(caps.get(2)?.as_str(), locale)?;
    let year = expand_year(caps.get(3)?.as_str().parse::<i32>().ok()?);

    NaiveDate::from_ymd_opt(year, month, day)
}

fn month_number(word: &str, locale: DateLocale) -> Option<u32> {
    let word = word.to_lowercase();
    if word.len() < 3 {
        return None;
    }

    let table = match locale {
        DateLocale::Nl => NL_MONTHS,
        DateLocale::En => EN_MONTHS,
    };

    table
        .iter()
        .find(|(name, _)| *name == word || name.starts_with(&word))
        .map(|(_, number)| *number)
}

fn expand_year(year: i32) -> i32 {
    // Same pivot chrono uses for %y.
    if year >= 100 {
        year
    } else if year < 69 {
        2000 + year
    } else {
        1900 + year
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
