//! Merge planning - pure functions for creating merge plans
//!
//! No I/O happens here: the repository and basket are passed in, so the
//! whole plan can be unit tested against an in-memory store.

use super::{build_command, build_message};
use crate::basket::Basket;
use crate::dependency::{MissingDependencyAlert, compute_missing_alerts};
use crate::error::{Error, Result};
use crate::store::Repository;
use crate::types::{Commit, CommitId};
use std::collections::BTreeMap;
use tracing::debug;

/// Options for merge planning
#[derive(Debug, Clone, Default)]
pub struct MergePlanOptions {
    /// Person performing the merge; commits by anyone else are credited
    pub operator: Option<String>,
    /// One summary line per commit instead of full messages
    pub summarized: bool,
}

/// Merge plan - the functional core output
///
/// Everything the operator needs to perform one MFC: the command to run,
/// the commit message to use, and any dependency problems to fix first.
#[derive(Debug, Clone)]
pub struct MergePlan {
    /// Path of the branch being merged into
    pub target_branch: String,
    /// Candidates in history order
    pub commits: Vec<CommitId>,
    /// VCS command (absent for an empty basket)
    pub command: Option<String>,
    /// Synthesized commit message (absent for an empty basket)
    pub message: Option<String>,
    /// Missing dependency alerts keyed by declaring commit
    pub alerts: BTreeMap<CommitId, MissingDependencyAlert>,
}

impl MergePlan {
    /// Check if the plan has anything to merge
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commits.is_empty()
    }

    /// Whether dependency problems were found
    #[must_use]
    pub fn has_alerts(&self) -> bool {
        !self.alerts.is_empty()
    }
}

/// Create a merge plan for `basket` (PURE - no I/O)
///
/// # Errors
/// - `NoTrunk` when no trunk branch is configured
/// - `BranchNotFound` when the basket has no known target branch
/// - `CommitNotFound` when a staged identifier is not imported
pub fn create_merge_plan(
    repo: &dyn Repository,
    basket: &Basket,
    options: &MergePlanOptions,
) -> Result<MergePlan> {
    let trunk = repo.trunk().ok_or(Error::NoTrunk)?;
    let target_path = basket
        .target_branch
        .as_deref()
        .ok_or_else(|| Error::BranchNotFound("basket has no target branch".to_string()))?;
    let target = repo
        .branch_by_path(target_path)
        .ok_or_else(|| Error::BranchNotFound(target_path.to_string()))?;

    let mut candidates: Vec<&Commit> = basket
        .ids
        .iter()
        .map(|id| {
            repo.resolve(id)
                .ok_or_else(|| Error::CommitNotFound(id.to_string()))
        })
        .collect::<Result<_>>()?;
    candidates.sort_by(|a, b| a.history_cmp(b));
    candidates.dedup_by(|a, b| a.id == b.id);

    let command = build_command(&candidates, &trunk.path, &target.path)?;
    let message = build_message(&candidates, options.operator.as_deref(), options.summarized)?;
    let alerts = compute_missing_alerts(repo, &candidates, &target.path, repo.scheme());

    debug!(
        target = %target.path,
        commits = candidates.len(),
        alerts = alerts.len(),
        "created merge plan"
    );

    Ok(MergePlan {
        target_branch: target.path.clone(),
        commits: candidates.iter().map(|c| c.id.clone()).collect(),
        command,
        message,
        alerts,
    })
}
