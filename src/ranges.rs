//! Compact range encoding of revision sets
//!
//! Sorted revision lists are grouped into runs of consecutive numbers.
//! The same grouping backs three projections: the generic range list used
//! for merge metadata, `svn merge` arguments, and commit message labels.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

/// Closed revision range `start..=end`; a singleton has `start == end`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct RevisionRange {
    /// First revision (inclusive)
    pub start: u64,
    /// Last revision (inclusive)
    pub end: u64,
}

impl RevisionRange {
    /// Create a range, rejecting `start > end`
    pub fn new(start: u64, end: u64) -> Result<Self> {
        if start > end {
            return Err(Error::MalformedRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Range holding a single revision
    pub const fn single(revision: u64) -> Self {
        Self {
            start: revision,
            end: revision,
        }
    }

    /// Whether the range covers exactly one revision
    pub const fn is_single(&self) -> bool {
        self.start == self.end
    }

    /// Revisions covered by the range
    pub const fn revisions(&self) -> RangeInclusive<u64> {
        self.start..=self.end
    }

    /// Whether `revision` falls inside the range
    pub const fn contains(&self, revision: u64) -> bool {
        self.start <= revision && revision <= self.end
    }

    /// `svn merge` argument for this range.
    ///
    /// Subversion ranges are start-exclusive, so a span starts one revision
    /// before its first member.
    pub fn merge_arg(&self) -> String {
        if self.is_single() {
            format!("-c r{}", self.start)
        } else {
            format!("-r {}:{}", self.start.saturating_sub(1), self.end)
        }
    }

    /// Human readable label: `r5` or `r5-r9`
    pub fn label(&self) -> String {
        if self.is_single() {
            format!("r{}", self.start)
        } else {
            format!("r{}-r{}", self.start, self.end)
        }
    }
}

impl fmt::Display for RevisionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_single() {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

impl FromStr for RevisionRange {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let parse = |part: &str| {
            part.trim()
                .parse::<u64>()
                .map_err(|_| Error::InvalidInput(format!("bad revision in range: {s:?}")))
        };
        match s.split_once('-') {
            Some((start, end)) => Self::new(parse(start)?, parse(end)?),
            None => Ok(Self::single(parse(s)?)),
        }
    }
}

impl From<RevisionRange> for String {
    fn from(range: RevisionRange) -> Self {
        range.to_string()
    }
}

impl TryFrom<String> for RevisionRange {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

fn ensure_strictly_increasing(revisions: &[u64]) -> Result<()> {
    if let Some(pair) = revisions.windows(2).find(|pair| pair[0] >= pair[1]) {
        return Err(Error::InvalidInput(format!(
            "revisions must be strictly increasing, got {} before {}",
            pair[0], pair[1]
        )));
    }
    Ok(())
}

/// Group a strictly increasing revision list into canonical ranges.
///
/// `[1, 2, 3, 5, 7, 8, 9]` becomes `[1-3, 5, 7-9]`. Duplicates or
/// out-of-order input fail with [`Error::InvalidInput`].
pub fn encode(revisions: &[u64]) -> Result<Vec<RevisionRange>> {
    ensure_strictly_increasing(revisions)?;

    let mut ranges: Vec<RevisionRange> = Vec::new();
    for &revision in revisions {
        match ranges.last_mut() {
            Some(last) if last.end.checked_add(1) == Some(revision) => last.end = revision,
            _ => ranges.push(RevisionRange::single(revision)),
        }
    }
    Ok(ranges)
}

/// Expand ranges back into the set of revisions they cover
pub fn decode(ranges: &[RevisionRange]) -> Result<BTreeSet<u64>> {
    let mut revisions = BTreeSet::new();
    for range in ranges {
        if range.start > range.end {
            return Err(Error::MalformedRange {
                start: range.start,
                end: range.end,
            });
        }
        revisions.extend(range.revisions());
    }
    Ok(revisions)
}

/// `svn merge` arguments for a strictly increasing revision list
///
/// `[5]` gives `["-c r5"]`, `[5, 6, 7]` gives `["-r 4:7"]`.
pub fn merge_command_args(revisions: &[u64]) -> Result<Vec<String>> {
    Ok(encode(revisions)?.iter().map(RevisionRange::merge_arg).collect())
}

/// Commit message label for a strictly increasing revision list
///
/// `[100, 101, 102, 110]` gives `"r100-r102, r110"`.
pub fn range_label(revisions: &[u64]) -> Result<String> {
    Ok(encode(revisions)?
        .iter()
        .map(RevisionRange::label)
        .collect::<Vec<_>>()
        .join(", "))
}
