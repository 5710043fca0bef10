//! Core types for mfc-tracker

use crate::mergeinfo::MergeInfo;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Number of hash characters shown in labels and listings
pub const SHORT_HASH_LEN: usize = 12;

/// Minimum length of a hash prefix accepted as a commit reference
pub const MIN_HASH_PREFIX_LEN: usize = 4;

/// How commits are identified by the backing VCS
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdScheme {
    /// Monotonically increasing integer revisions (Subversion)
    Revision,
    /// Content-addressed hashes (Git)
    Hash,
}

impl IdScheme {
    /// Parse a user- or message-supplied identifier under this scheme.
    ///
    /// Revisions accept an optional leading `r`. Hashes must be hex and at
    /// least [`MIN_HASH_PREFIX_LEN`] characters long; they are lowercased and
    /// may be prefixes of a full hash.
    pub fn parse_id(self, text: &str) -> Option<CommitId> {
        let text = text.trim();
        match self {
            Self::Revision => {
                let digits = text
                    .strip_prefix('r')
                    .or_else(|| text.strip_prefix('R'))
                    .unwrap_or(text);
                digits.parse::<u64>().ok().map(CommitId::Revision)
            }
            Self::Hash => {
                if text.len() >= MIN_HASH_PREFIX_LEN
                    && text.chars().all(|c| c.is_ascii_hexdigit())
                {
                    Some(CommitId::Hash(text.to_ascii_lowercase()))
                } else {
                    None
                }
            }
        }
    }
}

impl fmt::Display for IdScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Revision => write!(f, "revision"),
            Self::Hash => write!(f, "hash"),
        }
    }
}

/// Commit identifier: a revision number or a (possibly abbreviated) hash
///
/// Ordering is total: revisions sort numerically and before all hashes,
/// hashes sort lexically.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CommitId {
    /// Subversion-style revision number
    Revision(u64),
    /// Git-style hex hash
    Hash(String),
}

impl CommitId {
    /// Revision number, if this is a numeric identifier
    pub const fn revision(&self) -> Option<u64> {
        match self {
            Self::Revision(rev) => Some(*rev),
            Self::Hash(_) => None,
        }
    }

    /// Hash string, if this is a hash identifier
    pub fn hash(&self) -> Option<&str> {
        match self {
            Self::Revision(_) => None,
            Self::Hash(hash) => Some(hash),
        }
    }

    /// Scheme this identifier belongs to
    pub const fn scheme(&self) -> IdScheme {
        match self {
            Self::Revision(_) => IdScheme::Revision,
            Self::Hash(_) => IdScheme::Hash,
        }
    }

    /// Compact rendering for labels: `r123` or an abbreviated hash
    pub fn short(&self) -> String {
        match self {
            Self::Revision(rev) => format!("r{rev}"),
            Self::Hash(hash) => hash.chars().take(SHORT_HASH_LEN).collect(),
        }
    }

    /// Whether `self` (a full id) is referenced by `reference` (full id or hash prefix)
    pub fn matches(&self, reference: &Self) -> bool {
        match (self, reference) {
            (Self::Revision(a), Self::Revision(b)) => a == b,
            (Self::Hash(full), Self::Hash(prefix)) => full.starts_with(prefix.as_str()),
            _ => false,
        }
    }
}

impl fmt::Display for CommitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Revision(rev) => write!(f, "r{rev}"),
            Self::Hash(hash) => write!(f, "{hash}"),
        }
    }
}

/// A line that matched a directive prefix but could not be interpreted
///
/// Warnings are reported and skipped; they never abort parsing of the
/// remaining lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseWarning {
    /// The offending line, trimmed
    pub line: String,
    /// Why the line was rejected
    pub reason: String,
}

impl ParseWarning {
    /// Create a warning for `line`
    pub fn new(line: &str, reason: impl Into<String>) -> Self {
        Self {
            line: line.trim().to_string(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: '{}'", self.reason, self.line)
    }
}

/// A path touched by a commit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Change {
    /// Operation letter as reported by the VCS (A, M, D, R, ...)
    pub operation: String,
    /// Repository path
    pub path: String,
}

impl Change {
    /// Create a change entry
    pub fn new(operation: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            path: path.into(),
        }
    }
}

/// A raw log entry produced by a VCS adapter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    /// Commit identifier
    pub id: CommitId,
    /// Author name
    pub author: String,
    /// Commit timestamp
    pub date: DateTime<Utc>,
    /// Full commit message
    pub message: String,
    /// Paths touched by the commit
    pub changes: Vec<Change>,
    /// Attached note text (git notes), if any
    pub note: Option<String>,
}

/// A commit imported from a branch's history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    /// Commit identifier
    pub id: CommitId,
    /// Author name
    pub author: String,
    /// Commit timestamp
    pub date: DateTime<Utc>,
    /// Full commit message
    pub message: String,
    /// Path of the branch the commit was first committed to
    pub branch: String,
    /// Date after which the commit may be merged (from `MFC after:`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mfc_after: Option<NaiveDate>,
    /// Paths touched by the commit, limited to the originating branch
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub changes: Vec<Change>,
    /// Subversion revision recorded in a note on a hash-identified commit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub svn_revision: Option<u64>,
}

impl Commit {
    /// Create a commit with no derived metadata
    pub fn new(
        id: CommitId,
        author: impl Into<String>,
        date: DateTime<Utc>,
        message: impl Into<String>,
        branch: impl Into<String>,
    ) -> Self {
        Self {
            id,
            author: author.into(),
            date,
            message: message.into(),
            branch: branch.into(),
            mfc_after: None,
            changes: Vec::new(),
            svn_revision: None,
        }
    }

    /// First line of the message
    pub fn summary(&self) -> &str {
        let msg = self.message.trim();
        msg.split_once('\n').map_or(msg, |(first, _)| first)
    }

    /// Message without its first line, trimmed
    pub fn body(&self) -> &str {
        let msg = self.message.trim();
        msg.split_once('\n').map_or("", |(_, rest)| rest.trim())
    }

    /// Whether this commit corresponds to the given numeric revision
    ///
    /// Matches the native revision, or the Subversion revision recorded for a
    /// hash-identified commit.
    pub fn has_revision(&self, revision: u64) -> bool {
        self.id.revision() == Some(revision) || self.svn_revision == Some(revision)
    }

    /// Order commits as they appear in history.
    ///
    /// Revisions compare numerically; hashes carry no order of their own so
    /// they compare by timestamp, then hash.
    pub fn history_cmp(&self, other: &Self) -> Ordering {
        match (&self.id, &other.id) {
            (CommitId::Revision(a), CommitId::Revision(b)) => a.cmp(b),
            _ => self
                .date
                .cmp(&other.date)
                .then_with(|| self.id.cmp(&other.id)),
        }
    }
}

/// A maintenance branch or the trunk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branch {
    /// Unique short name (e.g. `STABLE-12`)
    pub name: String,
    /// Unique VCS path (e.g. `/stable/12`) or ref name
    pub path: String,
    /// Whether this is the trunk
    #[serde(default)]
    pub is_trunk: bool,
    /// Trunk position at which the branch diverged
    pub branch_point: CommitId,
    /// Timestamp of the branch point, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch_point_date: Option<DateTime<Utc>>,
    /// Last imported position (import watermark)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_imported: Option<CommitId>,
    /// Merge metadata reported for this branch: other path -> merged ranges
    #[serde(default)]
    pub mergeinfo: MergeInfo,
}

impl Branch {
    /// Create a maintenance branch record
    pub fn new(name: impl Into<String>, path: impl Into<String>, branch_point: CommitId) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            is_trunk: false,
            branch_point,
            branch_point_date: None,
            last_imported: None,
            mergeinfo: MergeInfo::default(),
        }
    }

    /// Create a trunk branch record
    pub fn trunk(name: impl Into<String>, path: impl Into<String>, branch_point: CommitId) -> Self {
        Self {
            is_trunk: true,
            ..Self::new(name, path, branch_point)
        }
    }

    /// Whether moving the watermark to `next` would move it backwards.
    ///
    /// Only numeric watermarks are comparable; hash watermarks always advance.
    pub fn would_regress(&self, next: &CommitId) -> bool {
        match (&self.last_imported, next) {
            (Some(CommitId::Revision(current)), CommitId::Revision(next)) => next < current,
            _ => false,
        }
    }
}
