//! Import and reconcile job
//!
//! Pulls new history for each branch from a [`LogSource`], stores it, and
//! then brings the merged relation up to date. Meant to run periodically
//! under the [`ImportLock`](crate::store::ImportLock).
//!
//! Per branch the job fetches everything it needs first (log and merge
//! metadata) and only then mutates the store, so a failed fetch leaves the
//! branch exactly as it was. The watermark advances only once the branch's
//! commits are stored and its merges reconciled; after a failed pass the
//! next run fetches the same entries again.

use crate::error::{Error, Result};
use crate::mergeinfo::{MergeInfo, parse_mergeinfo};
use crate::message::{parse_co_required, parse_mfc_after, parse_note_revision};
use crate::store::Repository;
use crate::tracking::{reconcile_from_cherry_picks, reconcile_from_mergeinfo};
use crate::types::{Branch, Commit, CommitId, IdScheme, LogEntry, ParseWarning};
use crate::vcs::LogSource;
use std::fmt;
use tracing::{debug, error, info, warn};

/// Options for an import run
#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    /// Only import this branch (by name)
    pub branch: Option<String>,
    /// Start here instead of at each branch's watermark
    pub start: Option<CommitId>,
    /// Maximum number of log entries fetched per branch
    pub limit: Option<usize>,
}

/// A declared dependency that matched no imported commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownDependency {
    /// Commit declaring the dependency
    pub commit: CommitId,
    /// Declared identifier
    pub dependency: CommitId,
}

impl fmt::Display for UnknownDependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} has {} in X-MFC-With list but it does not exist",
            self.commit.short(),
            self.dependency.short()
        )
    }
}

/// Outcome for one successfully imported branch
#[derive(Debug, Clone, Default)]
pub struct BranchImport {
    /// Branch name
    pub branch: String,
    /// Number of commits stored
    pub imported: usize,
    /// Commits that were not in the store before this run
    pub stored: Vec<CommitId>,
    /// New watermark, if anything was imported and reconciliation succeeded
    pub last_imported: Option<CommitId>,
    /// Dependencies that could not be linked
    pub unknown_dependencies: Vec<UnknownDependency>,
    /// Unparseable directives and merge metadata
    pub warnings: Vec<ParseWarning>,
    /// Merges newly recorded by reconciliation
    pub merged: usize,
}

/// A branch the job could not process
#[derive(Debug, Clone)]
pub struct BranchFailure {
    /// Branch name
    pub branch: String,
    /// What went wrong
    pub error: String,
}

/// Result of an import run
#[derive(Debug, Clone, Default)]
pub struct ImportReport {
    /// Branches that were imported
    pub branches: Vec<BranchImport>,
    /// Branches that failed; their state is unchanged
    pub failures: Vec<BranchFailure>,
}

impl ImportReport {
    /// Total commits stored across all branches
    pub fn imported(&self) -> usize {
        self.branches.iter().map(|b| b.imported).sum()
    }

    /// Commits stored for the first time, across all branches
    pub fn stored(&self) -> impl Iterator<Item = &CommitId> {
        self.branches.iter().flat_map(|b| &b.stored)
    }

    /// Whether any branch failed
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

struct Fetched {
    entries: Vec<LogEntry>,
    mergeinfo: Option<String>,
}

/// Import new commits and reconcile merge state.
///
/// Branches are processed trunk first. A branch whose fetch, storage, or
/// reconciliation fails is reported in [`ImportReport::failures`]; the
/// others proceed.
#[allow(clippy::future_not_send)]
pub async fn import_commits(
    repo: &mut dyn Repository,
    source: &dyn LogSource,
    options: &ImportOptions,
) -> Result<ImportReport> {
    if source.scheme() != repo.scheme() {
        return Err(Error::InvalidInput(format!(
            "log source uses {} identifiers but the store uses {}",
            source.scheme(),
            repo.scheme()
        )));
    }

    let branches: Vec<Branch> = match &options.branch {
        Some(name) => vec![
            repo.branch(name)
                .cloned()
                .ok_or_else(|| Error::BranchNotFound(name.clone()))?,
        ],
        None => repo.branches().into_iter().cloned().collect(),
    };

    let mut report = ImportReport::default();
    for branch in &branches {
        let start = start_position(branch, options.start.as_ref());
        info!(branch = %branch.name, start = %start, "importing commits");

        let fetched = match fetch(source, branch, &start, options.limit).await {
            Ok(fetched) => fetched,
            Err(e) => {
                error!(branch = %branch.name, error = %e, "fetch failed");
                report.failures.push(BranchFailure {
                    branch: branch.name.clone(),
                    error: e.to_string(),
                });
                continue;
            }
        };

        match store_branch(repo, branch, fetched, options.start.is_some()) {
            Ok(imported) => report.branches.push(imported),
            Err(e) => {
                error!(branch = %branch.name, error = %e, "import failed");
                report.failures.push(BranchFailure {
                    branch: branch.name.clone(),
                    error: e.to_string(),
                });
            }
        }
    }

    for imported in &mut report.branches {
        let Some(branch) = repo.branch(&imported.branch).cloned() else {
            continue;
        };
        let outcome = match reconcile(repo, &branch) {
            Ok(merged) => {
                advance_watermark(repo, &branch, imported.last_imported.as_ref()).map(|()| merged)
            }
            Err(e) => Err(e),
        };
        match outcome {
            Ok(merged) => imported.merged = merged,
            Err(e) => {
                error!(branch = %branch.name, error = %e, "reconcile failed, watermark kept");
                imported.last_imported = None;
                report.failures.push(BranchFailure {
                    branch: branch.name.clone(),
                    error: e.to_string(),
                });
            }
        }
    }

    Ok(report)
}

/// Where the log for `branch` should start
fn start_position(branch: &Branch, start: Option<&CommitId>) -> CommitId {
    let requested = start.or(branch.last_imported.as_ref());
    match (requested, &branch.branch_point) {
        // Never go behind the first commit of the branch
        (Some(CommitId::Revision(rev)), CommitId::Revision(point)) => {
            CommitId::Revision((*rev).max(*point))
        }
        (Some(requested), _) => requested.clone(),
        (None, point) => point.clone(),
    }
}

async fn fetch(
    source: &dyn LogSource,
    branch: &Branch,
    start: &CommitId,
    limit: Option<usize>,
) -> Result<Fetched> {
    let entries = source.log(&branch.path, Some(start), limit).await?;
    let mergeinfo = source.merge_info(&branch.path).await?;
    debug!(branch = %branch.name, entries = entries.len(), "fetched log");
    Ok(Fetched { entries, mergeinfo })
}

fn is_new(repo: &dyn Repository, branch: &Branch, id: &CommitId) -> bool {
    match (id, &branch.last_imported) {
        (CommitId::Revision(rev), Some(CommitId::Revision(last))) => rev > last,
        (CommitId::Revision(_), _) => true,
        // Hashes carry no order; anything already stored was seen before
        (CommitId::Hash(_), _) => repo.commit(id).is_none(),
    }
}

fn build_commit(entry: LogEntry, branch: &Branch, warnings: &mut Vec<ParseWarning>) -> Commit {
    let (mfc_after, mfc_warnings) = parse_mfc_after(&entry.message, entry.date);
    for warning in mfc_warnings {
        warn!(commit = %entry.id, %warning, "unparseable directive");
        warnings.push(warning);
    }

    let changes = match entry.id.scheme() {
        IdScheme::Revision => entry
            .changes
            .into_iter()
            .filter(|c| c.path.starts_with(&branch.path))
            .collect(),
        IdScheme::Hash => entry.changes,
    };

    let mut commit = Commit::new(entry.id, entry.author, entry.date, entry.message, &branch.path);
    commit.mfc_after = mfc_after;
    commit.changes = changes;
    commit.svn_revision = entry.note.as_deref().and_then(parse_note_revision);
    commit
}

fn store_branch(
    repo: &mut dyn Repository,
    branch: &Branch,
    fetched: Fetched,
    rewound: bool,
) -> Result<BranchImport> {
    let scheme = repo.scheme();
    let mut result = BranchImport {
        branch: branch.name.clone(),
        ..BranchImport::default()
    };
    // Entries after a hash watermark are all beyond it, even when an
    // earlier failed pass already stored them
    let frontier = if rewound {
        None
    } else {
        fetched.entries.last().map(|entry| entry.id.clone())
    };

    let known: &dyn Repository = &*repo;
    let commits: Vec<Commit> = fetched
        .entries
        .into_iter()
        .filter(|entry| is_new(known, branch, &entry.id))
        .map(|entry| build_commit(entry, branch, &mut result.warnings))
        .collect();
    result.stored = commits
        .iter()
        .filter(|c| known.commit(&c.id).is_none())
        .map(|c| c.id.clone())
        .collect();

    let last = match scheme {
        IdScheme::Revision => commits.iter().map(|c| c.id.clone()).max(),
        IdScheme::Hash => frontier.or_else(|| commits.last().map(|c| c.id.clone())),
    };
    let dependencies: Vec<(CommitId, Vec<CommitId>)> = if branch.is_trunk {
        commits
            .iter()
            .map(|c| (c.id.clone(), parse_co_required(&c.message, scheme)))
            .filter(|(_, deps)| !deps.is_empty())
            .map(|(id, deps)| (id, deps.into_iter().collect()))
            .collect()
    } else {
        Vec::new()
    };

    result.imported = repo.insert_commits(commits)?;

    for (id, declared) in dependencies {
        let mut known = Vec::new();
        for dependency in declared {
            match repo.resolve(&dependency) {
                Some(commit) => known.push(commit.id.clone()),
                None => {
                    warn!(commit = %id, dependency = %dependency, "unknown X-MFC-With commit");
                    result.unknown_dependencies.push(UnknownDependency {
                        commit: id.clone(),
                        dependency,
                    });
                }
            }
        }
        repo.link_co_required(&id, &known)?;
    }

    let mut updated = branch.clone();
    if let Some(text) = &fetched.mergeinfo {
        let (mergeinfo, warnings) = parse_mergeinfo(text);
        updated.mergeinfo = mergeinfo;
        result.warnings.extend(warnings);
    } else {
        updated.mergeinfo = MergeInfo::new();
    }
    repo.save_branch(updated)?;

    result.last_imported = last;
    info!(
        branch = %branch.name,
        imported = result.imported,
        last = ?result.last_imported.as_ref().map(ToString::to_string),
        "imported commits"
    );
    Ok(result)
}

fn advance_watermark(
    repo: &mut dyn Repository,
    branch: &Branch,
    last: Option<&CommitId>,
) -> Result<()> {
    let Some(last) = last else {
        return Ok(());
    };
    let mut updated = branch.clone();
    updated.last_imported = Some(last.clone());
    repo.save_branch(updated)?;
    debug!(branch = %branch.name, watermark = %last, "advanced watermark");
    Ok(())
}

fn reconcile(repo: &mut dyn Repository, branch: &Branch) -> Result<usize> {
    let mut merged = reconcile_from_mergeinfo(repo, &branch.path)?;
    if repo.scheme() == IdScheme::Hash && !branch.is_trunk {
        let commits: Vec<Commit> = repo.commits_on(&branch.path).into_iter().cloned().collect();
        merged += reconcile_from_cherry_picks(repo, &branch.path, &commits)?;
    }
    Ok(merged)
}
