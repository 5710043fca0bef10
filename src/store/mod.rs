//! Persistence boundary for branches, commits and their relations
//!
//! The tracker only needs create/get/filter/save over branches and commits
//! plus the `merged_to` and `co_required` relations. [`Repository`] is that
//! capability; [`MemoryStore`] implements it and is what gets saved to disk.

mod lock;
mod memory;

pub use lock::ImportLock;
pub use memory::{MemoryStore, STORE_VERSION, StoreSnapshot};

use crate::error::Result;
use crate::types::{Branch, Commit, CommitId, IdScheme};
use std::collections::BTreeSet;

/// Repository of branches, commits, and merge relations
pub trait Repository {
    /// Identifier scheme of the tracked VCS
    fn scheme(&self) -> IdScheme;

    /// All branches: trunk first, then newest branch point first
    fn branches(&self) -> Vec<&Branch>;

    /// Look up a branch by name
    fn branch(&self, name: &str) -> Option<&Branch>;

    /// Look up a branch by VCS path
    fn branch_by_path(&self, path: &str) -> Option<&Branch>;

    /// The trunk branch, if configured
    fn trunk(&self) -> Option<&Branch> {
        self.branches().into_iter().find(|b| b.is_trunk)
    }

    /// Register a new branch.
    ///
    /// Rejects duplicate names or paths, a second trunk, and a branch point
    /// beyond the trunk's last imported revision.
    fn create_branch(&mut self, branch: Branch) -> Result<()>;

    /// Replace a branch record (matched by name).
    ///
    /// Rejects a watermark that moves backwards.
    fn save_branch(&mut self, branch: Branch) -> Result<()>;

    /// Remove a branch and its merge records
    fn delete_branch(&mut self, name: &str) -> Result<Branch>;

    /// Look up a commit by its exact identifier
    fn commit(&self, id: &CommitId) -> Option<&Commit>;

    /// Resolve a reference (exact id or unambiguous hash prefix) to a commit
    fn resolve(&self, reference: &CommitId) -> Option<&Commit>;

    /// Commits that originated on `branch_path`, oldest first
    fn commits_on(&self, branch_path: &str) -> Vec<&Commit>;

    /// Store commits; already known identifiers are overwritten.
    ///
    /// Returns how many identifiers were new.
    fn insert_commits(&mut self, commits: Vec<Commit>) -> Result<usize>;

    /// Whether `id` is recorded as merged into `branch_path`
    fn is_merged(&self, id: &CommitId, branch_path: &str) -> bool;

    /// All commits recorded as merged into `branch_path`
    fn merged_into(&self, branch_path: &str) -> BTreeSet<CommitId>;

    /// Record commits as merged into `branch_path`.
    ///
    /// All-or-nothing: if the branch or any commit is unknown nothing is
    /// recorded. Returns how many merges were new.
    fn record_merges(&mut self, branch_path: &str, ids: &[CommitId]) -> Result<usize>;

    /// Declare that `id` must be merged together with `requires`
    fn link_co_required(&mut self, id: &CommitId, requires: &[CommitId]) -> Result<()>;

    /// Commits linked as co-required by `id`
    fn co_required(&self, id: &CommitId) -> Vec<CommitId>;
}
