//! Commit queries for the status view
//!
//! Filter expressions are whitespace or comma separated terms, any of which
//! may match:
//! - `r123` / `123` - one revision
//! - `r100-r120` - inclusive revision span
//! - `gonzo` - commits by an author
//! - `gonzo@sys/kern` - commits by an author touching a path under trunk
//! - `@sys/kern` - commits touching a path under trunk
//!
//! Under the hash scheme a term of 7+ hex digits selects a hash prefix.

use crate::error::{Error, Result};
use crate::store::Repository;
use crate::types::{Branch, Commit, CommitId, IdScheme};
use chrono::NaiveDate;
use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

static REVISION_TERM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[rR]?(\d+)(?:-[rR]?(\d+))?$").expect("revision term regex"));

static HASH_TERM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9a-fA-F]{7,64}$").expect("hash term regex"));

/// One term of a filter expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterTerm {
    /// Revisions in `start..=end`
    Revisions(u64, u64),
    /// Hash prefix
    Hash(String),
    /// Author, optionally restricted to a path prefix
    Author {
        /// Author name
        author: String,
        /// Path below trunk, with a leading `/`
        path: Option<String>,
    },
    /// Path below trunk, with a leading `/`
    Path(String),
}

fn normalize_subpath(path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    }
}

impl FilterTerm {
    fn parse(term: &str, scheme: IdScheme) -> Result<Self> {
        if scheme == IdScheme::Revision
            && let Some(caps) = REVISION_TERM.captures(term)
        {
            let start: u64 = caps[1]
                .parse()
                .map_err(|e| Error::InvalidInput(format!("{term}: {e}")))?;
            let end = match caps.get(2) {
                Some(end) => end
                    .as_str()
                    .parse()
                    .map_err(|e| Error::InvalidInput(format!("{term}: {e}")))?,
                None => start,
            };
            if start > end {
                return Err(Error::MalformedRange { start, end });
            }
            return Ok(Self::Revisions(start, end));
        }
        if scheme == IdScheme::Hash && HASH_TERM.is_match(term) {
            return Ok(Self::Hash(term.to_ascii_lowercase()));
        }

        let (author, path) = term.split_once('@').unwrap_or((term, ""));
        let path = (!path.is_empty()).then(|| normalize_subpath(path));
        match (author.is_empty(), path) {
            (true, Some(path)) => Ok(Self::Path(path)),
            (true, None) => Err(Error::InvalidInput(format!("empty filter term {term:?}"))),
            (false, path) => Ok(Self::Author {
                author: author.to_string(),
                path,
            }),
        }
    }

    fn matches(&self, commit: &Commit, trunk_path: &str) -> bool {
        // Subversion paths are absolute under the trunk path; git paths are
        // relative to the work tree
        let touches = |sub: &str| {
            let prefix = if trunk_path.starts_with('/') {
                format!("{}{sub}", trunk_path.trim_end_matches('/'))
            } else {
                sub.trim_start_matches('/').to_string()
            };
            commit.changes.iter().any(|c| c.path.starts_with(&prefix))
        };
        match self {
            Self::Revisions(start, end) => commit
                .id
                .revision()
                .or(commit.svn_revision)
                .is_some_and(|rev| (*start..=*end).contains(&rev)),
            Self::Hash(prefix) => commit.id.hash().is_some_and(|h| h.starts_with(prefix.as_str())),
            Self::Author { author, path } => {
                commit.author == *author && path.as_deref().is_none_or(touches)
            }
            Self::Path(path) => touches(path),
        }
    }
}

/// OR-combination of filter terms; empty matches everything
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitFilter {
    terms: Vec<FilterTerm>,
}

impl CommitFilter {
    /// Parse a filter expression
    pub fn parse(text: &str, scheme: IdScheme) -> Result<Self> {
        let terms = text
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|t| !t.is_empty())
            .map(|t| FilterTerm::parse(t, scheme))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { terms })
    }

    /// Parsed terms
    pub fn terms(&self) -> &[FilterTerm] {
        &self.terms
    }

    /// Whether `commit` matches any term
    pub fn matches(&self, commit: &Commit, trunk_path: &str) -> bool {
        self.terms.is_empty() || self.terms.iter().any(|t| t.matches(commit, trunk_path))
    }
}

/// Where a trunk commit stands with respect to a branch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MfcState {
    /// Already merged into the branch
    Done,
    /// `MFC after` date has passed
    Ready,
    /// `MFC after` date is still in the future
    Waiting,
    /// No `MFC after` directive
    Other,
}

impl MfcState {
    /// Classify `commit` for `branch_path` as of `today`
    pub fn of(repo: &dyn Repository, commit: &Commit, branch_path: &str, today: NaiveDate) -> Self {
        if repo.is_merged(&commit.id, branch_path) {
            return Self::Done;
        }
        match commit.mfc_after {
            Some(after) if after <= today => Self::Ready,
            Some(_) => Self::Waiting,
            None => Self::Other,
        }
    }
}

impl fmt::Display for MfcState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Done => "done",
            Self::Ready => "ready",
            Self::Waiting => "waiting",
            Self::Other => "other",
        };
        f.write_str(name)
    }
}

impl FromStr for MfcState {
    type Err = Error;

    /// Parse a state filter; `done` is not selectable
    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "ready" => Ok(Self::Ready),
            "waiting" => Ok(Self::Waiting),
            "other" => Ok(Self::Other),
            _ => Err(Error::InvalidInput(format!(
                "unknown state {s:?} (expected ready, waiting or other)"
            ))),
        }
    }
}

/// A trunk commit with its state for one branch
#[derive(Debug, Clone, Copy)]
pub struct PendingCommit<'a> {
    /// The trunk commit
    pub commit: &'a Commit,
    /// Its state for the queried branch
    pub state: MfcState,
}

/// Trunk commits made after `branch` diverged, newest first.
///
/// Commits are kept when they match `filter` and, if `states` is non-empty,
/// when their state is one of `states` (which never selects merged ones).
/// Commits in `hidden` (an operator's never-MFC list) are left out.
pub fn pending_commits<'a>(
    repo: &'a dyn Repository,
    branch: &Branch,
    filter: &CommitFilter,
    states: &[MfcState],
    hidden: &[CommitId],
    today: NaiveDate,
) -> Result<Vec<PendingCommit<'a>>> {
    let trunk = repo.trunk().ok_or(Error::NoTrunk)?;

    let mut pending: Vec<PendingCommit<'a>> = repo
        .commits_on(&trunk.path)
        .into_iter()
        .filter(|c| after_branch_point(c, branch))
        .filter(|c| filter.matches(c, &trunk.path))
        .filter(|c| !hidden.contains(&c.id))
        .map(|commit| PendingCommit {
            commit,
            state: MfcState::of(repo, commit, &branch.path, today),
        })
        .filter(|p| states.is_empty() || (p.state != MfcState::Done && states.contains(&p.state)))
        .collect();
    pending.reverse();
    Ok(pending)
}

fn after_branch_point(commit: &Commit, branch: &Branch) -> bool {
    if branch.is_trunk {
        return true;
    }
    match (&commit.id, &branch.branch_point) {
        (CommitId::Revision(rev), CommitId::Revision(point)) => rev > point,
        _ => branch.branch_point_date.is_none_or(|date| commit.date > date),
    }
}
