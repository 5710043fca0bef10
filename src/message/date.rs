//! Natural language date expressions used in `MFC after:` lines
//!
//! Parsing is delegated to `interim` (US dialect, so `next friday` is the
//! coming Friday). Committers also spell counts out (`two weeks`, `a
//! month`), which are rewritten as numbers first.

use chrono::{DateTime, NaiveDate, Utc};
use interim::{Dialect, parse_date_string};
use regex::{Captures, Regex};
use std::sync::LazyLock;
use tracing::trace;

static NUMBER_WORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(a|an|one|two|three|four|five|six|seven|eight|nine|ten|eleven|twelve)\b")
        .expect("number word regex")
});

fn word_value(word: &str) -> &'static str {
    match word {
        "two" => "2",
        "three" => "3",
        "four" => "4",
        "five" => "5",
        "six" => "6",
        "seven" => "7",
        "eight" => "8",
        "nine" => "9",
        "ten" => "10",
        "eleven" => "11",
        "twelve" => "12",
        _ => "1",
    }
}

fn normalize(text: &str) -> String {
    let text = text.trim().trim_end_matches('.').to_ascii_lowercase();
    NUMBER_WORD
        .replace_all(&text, |caps: &Captures<'_>| word_value(&caps[1]))
        .into_owned()
}

/// Resolve a date expression against `anchor`.
///
/// Returns `None` when the expression does not parse or names an invalid
/// calendar date.
pub fn parse_date_expression(text: &str, anchor: DateTime<Utc>) -> Option<NaiveDate> {
    let text = normalize(text);
    match parse_date_string(&text, anchor, Dialect::Us) {
        Ok(date) => Some(date.date_naive()),
        Err(e) => {
            trace!(expression = %text, error = ?e, "unparsed date expression");
            None
        }
    }
}
