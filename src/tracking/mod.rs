//! Merge state tracking
//!
//! Keeps the "which trunk commits are merged into which branch" relation in
//! step with what the VCS itself reports:
//! - merge metadata (`svn:mergeinfo`) recorded on the branch
//! - `(cherry picked from commit H)` footers on branch commits
//!
//! Both passes only ever add merges. Each pass is computed in full before
//! anything is recorded, so a failure leaves the branch untouched and the
//! next scheduled pass starts from the same state.

mod storage;

pub use storage::{
    BASKET_FILE, PROFILES_FILE, STORE_FILE, basket_path, load_basket, load_profiles, load_store,
    profiles_path, save_basket, save_profiles, save_store, store_path,
};

use crate::error::{Error, Result};
use crate::message::parse_cherry_pick_source;
use crate::ranges::RevisionRange;
use crate::store::Repository;
use crate::types::{Commit, CommitId};
use tracing::{debug, info};

/// Record merges reported by `branch_path`'s merge metadata.
///
/// Every known branch path other than the branch's own is looked up in its
/// metadata. An imported commit counts as merged when its revision (or the
/// Subversion revision recorded for a hash-identified commit) falls inside
/// one of the inheritable ranges found there. Returns the number of newly recorded merges;
/// with unchanged metadata a second call returns zero.
pub fn reconcile_from_mergeinfo(repo: &mut dyn Repository, branch_path: &str) -> Result<usize> {
    let branch = repo
        .branch_by_path(branch_path)
        .ok_or_else(|| Error::Reconcile {
            branch: branch_path.to_string(),
            reason: "unknown branch".to_string(),
        })?;

    let ranges: Vec<RevisionRange> = repo
        .branches()
        .iter()
        .filter(|other| other.path != branch.path)
        .flat_map(|other| branch.mergeinfo.merged_ranges(&other.path))
        .collect();
    if ranges.is_empty() {
        return Ok(0);
    }

    let already = repo.merged_into(branch_path);
    let discovered: Vec<CommitId> = repo
        .branches()
        .iter()
        .filter(|other| other.path != branch_path)
        .flat_map(|other| repo.commits_on(&other.path))
        .filter(|commit| commit_revisions(commit).any(|rev| ranges.iter().any(|r| r.contains(rev))))
        .map(|commit| commit.id.clone())
        .filter(|id| !already.contains(id))
        .collect();

    record(repo, branch_path, &discovered, "mergeinfo")
}

/// Record merges evidenced by cherry-pick footers on `branch_commits`.
///
/// A footer whose hash resolves to a known commit marks that commit as
/// merged into `branch_path`. Footers naming unknown hashes are skipped.
pub fn reconcile_from_cherry_picks(
    repo: &mut dyn Repository,
    branch_path: &str,
    branch_commits: &[Commit],
) -> Result<usize> {
    if repo.branch_by_path(branch_path).is_none() {
        return Err(Error::Reconcile {
            branch: branch_path.to_string(),
            reason: "unknown branch".to_string(),
        });
    }

    let already = repo.merged_into(branch_path);
    let mut discovered = Vec::new();
    for commit in branch_commits {
        let Some(source) = parse_cherry_pick_source(&commit.message) else {
            continue;
        };
        match repo.resolve(&source) {
            Some(original) if original.branch != branch_path => {
                if !already.contains(&original.id) && !discovered.contains(&original.id) {
                    discovered.push(original.id.clone());
                }
            }
            Some(_) => {}
            None => debug!(commit = %commit.id, source = %source, "cherry-pick source not imported"),
        }
    }

    record(repo, branch_path, &discovered, "cherry-pick")
}

/// Whether `id` is recorded as merged into `branch_path`
pub fn is_merged(repo: &dyn Repository, id: &CommitId, branch_path: &str) -> bool {
    repo.is_merged(id, branch_path)
}

fn commit_revisions(commit: &Commit) -> impl Iterator<Item = u64> {
    commit.id.revision().into_iter().chain(commit.svn_revision)
}

fn record(
    repo: &mut dyn Repository,
    branch_path: &str,
    discovered: &[CommitId],
    source: &str,
) -> Result<usize> {
    if discovered.is_empty() {
        debug!(branch = %branch_path, source, "no new merges");
        return Ok(0);
    }
    let added = repo
        .record_merges(branch_path, discovered)
        .map_err(|e| Error::Reconcile {
            branch: branch_path.to_string(),
            reason: e.to_string(),
        })?;
    info!(branch = %branch_path, source, added, "recorded merges");
    Ok(added)
}
