//! Store wrapper that can refuse to record merges

use mfc_tracker::error::{Error, Result};
use mfc_tracker::store::{MemoryStore, Repository};
use mfc_tracker::types::{Branch, Commit, CommitId, IdScheme};
use std::collections::BTreeSet;

/// [`MemoryStore`] whose `record_merges` fails while guarded
pub struct GuardedStore {
    pub inner: MemoryStore,
    reject_merges: bool,
}

impl GuardedStore {
    pub fn new(inner: MemoryStore) -> Self {
        Self {
            inner,
            reject_merges: false,
        }
    }

    /// Make `record_merges` fail until called again with `false`
    pub fn reject_merges(&mut self, reject: bool) {
        self.reject_merges = reject;
    }
}

impl Repository for GuardedStore {
    fn scheme(&self) -> IdScheme {
        self.inner.scheme()
    }

    fn branches(&self) -> Vec<&Branch> {
        self.inner.branches()
    }

    fn branch(&self, name: &str) -> Option<&Branch> {
        self.inner.branch(name)
    }

    fn branch_by_path(&self, path: &str) -> Option<&Branch> {
        self.inner.branch_by_path(path)
    }

    fn create_branch(&mut self, branch: Branch) -> Result<()> {
        self.inner.create_branch(branch)
    }

    fn save_branch(&mut self, branch: Branch) -> Result<()> {
        self.inner.save_branch(branch)
    }

    fn delete_branch(&mut self, name: &str) -> Result<Branch> {
        self.inner.delete_branch(name)
    }

    fn commit(&self, id: &CommitId) -> Option<&Commit> {
        self.inner.commit(id)
    }

    fn resolve(&self, reference: &CommitId) -> Option<&Commit> {
        self.inner.resolve(reference)
    }

    fn commits_on(&self, branch_path: &str) -> Vec<&Commit> {
        self.inner.commits_on(branch_path)
    }

    fn insert_commits(&mut self, commits: Vec<Commit>) -> Result<usize> {
        self.inner.insert_commits(commits)
    }

    fn is_merged(&self, id: &CommitId, branch_path: &str) -> bool {
        self.inner.is_merged(id, branch_path)
    }

    fn merged_into(&self, branch_path: &str) -> BTreeSet<CommitId> {
        self.inner.merged_into(branch_path)
    }

    fn record_merges(&mut self, branch_path: &str, ids: &[CommitId]) -> Result<usize> {
        if self.reject_merges {
            return Err(Error::Store(format!("{branch_path} is read-only")));
        }
        self.inner.record_merges(branch_path, ids)
    }

    fn link_co_required(&mut self, id: &CommitId, requires: &[CommitId]) -> Result<()> {
        self.inner.link_co_required(id, requires)
    }

    fn co_required(&self, id: &CommitId) -> Vec<CommitId> {
        self.inner.co_required(id)
    }
}
