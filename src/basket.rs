//! Operator basket: commits staged for one merge into one branch

use crate::store::Repository;
use crate::types::CommitId;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Ordered set of candidate trunk commits staged for a target branch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Basket {
    /// Path of the branch the commits are destined for
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_branch: Option<String>,
    /// Staged identifiers, in insertion order
    #[serde(default)]
    pub ids: Vec<CommitId>,
}

impl Basket {
    /// Empty basket with no target
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty basket aimed at `branch_path`
    pub fn for_branch(branch_path: impl Into<String>) -> Self {
        Self {
            target_branch: Some(branch_path.into()),
            ids: Vec::new(),
        }
    }

    /// Whether nothing is staged
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Number of staged commits
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether `id` is staged
    pub fn contains(&self, id: &CommitId) -> bool {
        self.ids.contains(id)
    }

    /// Stage `id`. Returns false if it was already staged.
    pub fn add(&mut self, id: CommitId) -> bool {
        if self.contains(&id) {
            return false;
        }
        self.ids.push(id);
        true
    }

    /// Unstage `id`. Returns false if it was not staged.
    pub fn remove(&mut self, id: &CommitId) -> bool {
        let before = self.ids.len();
        self.ids.retain(|staged| staged != id);
        self.ids.len() != before
    }

    /// Unstage everything; the target branch is kept
    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Staged identifiers in identifier order
    pub fn sorted_ids(&self) -> Vec<CommitId> {
        let mut ids = self.ids.clone();
        ids.sort();
        ids
    }

    /// Stage the known co-required commits of `of`, or of every staged
    /// commit when `of` is `None`.
    ///
    /// Dependencies are staged even when already merged into the target so
    /// the operator sees the full set. Only direct links are followed, once.
    /// Returns the newly staged ids.
    pub fn add_dependencies(&mut self, repo: &dyn Repository, of: Option<&CommitId>) -> Vec<CommitId> {
        let sources = match of {
            Some(id) => vec![id.clone()],
            None => self.ids.clone(),
        };
        let mut added = Vec::new();
        for id in sources {
            for required in repo.co_required(&id) {
                if self.add(required.clone()) {
                    debug!(commit = %id, dependency = %required, "staged dependency");
                    added.push(required);
                }
            }
        }
        added
    }
}
