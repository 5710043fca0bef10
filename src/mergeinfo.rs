//! Merge metadata (`svn:mergeinfo`) parsing
//!
//! The property text has one `path:ranges` entry per line, where `ranges`
//! is a comma separated list of `N` or `N-M` tokens. A trailing `*` marks a
//! non-inheritable range: it applies to the target directory only, so it
//! does not count as merged for the branch as a whole.

use crate::error::{Error, Result};
use crate::ranges::RevisionRange;
use crate::types::ParseWarning;
use serde::{Deserialize, Serialize};
use std::collections::btree_map::{self, BTreeMap};
use std::fmt;
use std::str::FromStr;
use tracing::warn;

const NON_INHERITABLE_MARKER: char = '*';

/// A range token from merge metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct MergeInfoRange {
    /// Revisions covered
    pub range: RevisionRange,
    /// False for `N*` / `N-M*` tokens
    pub inheritable: bool,
}

impl fmt::Display for MergeInfoRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.range)?;
        if !self.inheritable {
            write!(f, "{NON_INHERITABLE_MARKER}")?;
        }
        Ok(())
    }
}

impl FromStr for MergeInfoRange {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let (body, inheritable) = s
            .strip_suffix(NON_INHERITABLE_MARKER)
            .map_or((s, true), |body| (body, false));
        Ok(Self {
            range: body.parse()?,
            inheritable,
        })
    }
}

impl From<MergeInfoRange> for String {
    fn from(range: MergeInfoRange) -> Self {
        range.to_string()
    }
}

impl TryFrom<String> for MergeInfoRange {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

/// Merge metadata of one branch: source path -> merged ranges
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MergeInfo(BTreeMap<String, Vec<MergeInfoRange>>);

impl MergeInfo {
    /// Empty metadata
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether no source paths are recorded
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Record ranges merged from `path`, replacing earlier ones
    pub fn insert(&mut self, path: impl Into<String>, ranges: Vec<MergeInfoRange>) {
        self.0.insert(path.into(), ranges);
    }

    /// Ranges merged from `path`
    pub fn get(&self, path: &str) -> Option<&[MergeInfoRange]> {
        self.0.get(path).map(Vec::as_slice)
    }

    /// Source paths with recorded ranges
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Iterate over `(path, ranges)` entries in path order
    pub fn iter(&self) -> btree_map::Iter<'_, String, Vec<MergeInfoRange>> {
        self.0.iter()
    }

    /// Inheritable ranges merged from `path`
    ///
    /// Ranges are returned as recorded rather than expanded; a single entry
    /// may span billions of revisions.
    pub fn merged_ranges(&self, path: &str) -> Vec<RevisionRange> {
        self.get(path)
            .unwrap_or_default()
            .iter()
            .filter(|r| r.inheritable)
            .map(|r| r.range)
            .collect()
    }

    /// Whether `revision` is merged from `path` by an inheritable range
    pub fn contains(&self, path: &str, revision: u64) -> bool {
        self.get(path)
            .unwrap_or_default()
            .iter()
            .any(|r| r.inheritable && r.range.contains(revision))
    }
}

impl fmt::Display for MergeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (path, ranges) in &self.0 {
            if !first {
                writeln!(f)?;
            }
            first = false;
            let tokens: Vec<String> = ranges.iter().map(ToString::to_string).collect();
            write!(f, "{path}:{}", tokens.join(","))?;
        }
        Ok(())
    }
}

/// Parse merge metadata text.
///
/// Blank lines are skipped. A line without a `:` separator or a token that
/// is not a valid range produces a [`ParseWarning`] and is left out; the
/// rest of the text is still parsed.
pub fn parse_mergeinfo(text: &str) -> (MergeInfo, Vec<ParseWarning>) {
    let mut info = MergeInfo::new();
    let mut warnings = Vec::new();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        // Paths may contain ':'; range lists never do
        let Some((path, merged)) = line.rsplit_once(':') else {
            warnings.push(ParseWarning::new(line, "mergeinfo line has no path separator"));
            continue;
        };

        let mut ranges = Vec::new();
        for token in merged.split(',') {
            let token = token.trim();
            if token.is_empty() {
                continue;
            }
            match token.parse::<MergeInfoRange>() {
                Ok(range) => ranges.push(range),
                Err(e) => warnings.push(ParseWarning::new(line, format!("skipped token {token:?}: {e}"))),
            }
        }
        info.0.entry(path.trim().to_string()).or_default().extend(ranges);
    }

    for warning in &warnings {
        warn!(%warning, "malformed mergeinfo");
    }

    (info, warnings)
}
