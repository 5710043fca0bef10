//! Commit message directives
//!
//! Commit messages carry a few loosely formatted, line oriented directives:
//! - `MFC after: <date expression>` - earliest date the commit may be merged
//! - `X-MFC-With: r1, r2 ...` - commits that must be merged together with it
//! - `(cherry picked from commit <hash>)` - provenance footer on branch commits
//!
//! Matching is case-insensitive and tolerant of surrounding whitespace.
//! A malformed directive never aborts parsing of the rest of the message.

mod date;

pub use date::parse_date_expression;

use crate::types::{CommitId, IdScheme, ParseWarning};
use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

static MFC_AFTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*mfc\s+after\s*:(.*)$").expect("mfc after regex"));

static MFC_WITH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*x-mfc-with\s*:(.*)$").expect("mfc with regex"));

static X_MFC_ANY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*x-mfc[^:]*:").expect("x-mfc regex"));

static CHERRY_PICK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)^\s*\(cherry picked from commit ([0-9a-f]{7,64})\)\s*$")
        .expect("cherry-pick regex")
});

static NOTE_REVISION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"revision=(\d+)").expect("note revision regex"));

static TOKEN_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[,\s]+").expect("token separator regex"));

/// Whether `line` is an `MFC after:` directive
pub fn is_mfc_after_line(line: &str) -> bool {
    MFC_AFTER.is_match(line)
}

/// Parse the `MFC after:` directive.
///
/// The first directive line that resolves to a date wins; relative
/// expressions are anchored at `reference`. Directive lines that cannot be
/// resolved are returned as warnings.
pub fn parse_mfc_after(
    message: &str,
    reference: DateTime<Utc>,
) -> (Option<NaiveDate>, Vec<ParseWarning>) {
    let mut warnings = Vec::new();
    for line in message.lines() {
        let Some(caps) = MFC_AFTER.captures(line) else {
            continue;
        };
        match parse_date_expression(&caps[1], reference) {
            Some(date) => return (Some(date), warnings),
            None => warnings.push(ParseWarning::new(line, "failed to parse MFC line")),
        }
    }
    (None, warnings)
}

/// Parse `X-MFC-With:` directives into the set of co-required commits.
///
/// Tokens are separated by commas and/or whitespace. Under the revision
/// scheme an optional leading `r` is stripped and the rest must be an
/// integer; under the hash scheme tokens are kept as hash prefixes. Tokens
/// that do not parse are ignored.
pub fn parse_co_required(message: &str, scheme: IdScheme) -> BTreeSet<CommitId> {
    let mut required = BTreeSet::new();
    for line in message.lines() {
        let Some(caps) = MFC_WITH.captures(line) else {
            continue;
        };
        required.extend(
            TOKEN_SEPARATOR
                .split(caps[1].trim())
                .filter_map(|token| scheme.parse_id(token)),
        );
    }
    required
}

/// Find the `(cherry picked from commit H)` footer and return `H`
pub fn parse_cherry_pick_source(message: &str) -> Option<CommitId> {
    CHERRY_PICK
        .captures(message)
        .map(|caps| CommitId::Hash(caps[1].to_ascii_lowercase()))
}

/// Subversion revision recorded in a commit note (`revision=N`)
pub fn parse_note_revision(note: &str) -> Option<u64> {
    NOTE_REVISION
        .captures(note)
        .and_then(|caps| caps[1].parse().ok())
}

/// Remove `MFC after:` lines so they are not carried into a merge commit
pub fn strip_directive_lines(message: &str) -> String {
    let mut stripped = String::with_capacity(message.len());
    for line in message.split_inclusive('\n') {
        if !is_mfc_after_line(line.trim_end_matches(['\r', '\n'])) {
            stripped.push_str(line);
        }
    }
    stripped
}

/// All `X-MFC*:` lines of a message, joined by newlines
///
/// Returns `None` when the message has no such lines.
pub fn extract_mfc_notes(message: &str) -> Option<String> {
    let notes: Vec<&str> = message
        .lines()
        .filter(|line| X_MFC_ANY.is_match(line))
        .map(str::trim)
        .collect();
    (!notes.is_empty()).then(|| notes.join("\n"))
}
