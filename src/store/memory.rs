//! In-memory [`Repository`] with a serializable snapshot

use super::Repository;
use crate::error::{Error, Result};
use crate::types::{Branch, Commit, CommitId, IdScheme};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use tracing::debug;

/// Snapshot format version
pub const STORE_VERSION: u32 = 1;

/// In-memory store of branches, commits, and merge relations
#[derive(Debug, Clone)]
pub struct MemoryStore {
    scheme: IdScheme,
    branches: Vec<Branch>,
    commits: BTreeMap<CommitId, Commit>,
    merged: HashMap<String, HashSet<CommitId>>,
    co_required: BTreeMap<CommitId, BTreeSet<CommitId>>,
}

/// On-disk form of a [`MemoryStore`]
///
/// Collections are written in a stable order so that saved files diff
/// cleanly between runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSnapshot {
    /// Format version
    pub version: u32,
    /// Identifier scheme of the tracked VCS
    pub scheme: IdScheme,
    /// Registered branches
    #[serde(default)]
    pub branches: Vec<Branch>,
    /// Imported commits, ordered by identifier
    #[serde(default)]
    pub commits: Vec<Commit>,
    /// Branch path -> commits merged into it
    #[serde(default)]
    pub merged: BTreeMap<String, Vec<CommitId>>,
    /// Co-required links
    #[serde(default)]
    pub co_required: Vec<CoRequired>,
}

/// One commit's co-required set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoRequired {
    /// Declaring commit
    pub commit: CommitId,
    /// Commits it must be merged with
    pub requires: Vec<CommitId>,
}

impl MemoryStore {
    /// Empty store for a VCS using `scheme`
    pub fn new(scheme: IdScheme) -> Self {
        Self {
            scheme,
            branches: Vec::new(),
            commits: BTreeMap::new(),
            merged: HashMap::new(),
            co_required: BTreeMap::new(),
        }
    }

    /// Number of stored commits
    pub fn commit_count(&self) -> usize {
        self.commits.len()
    }

    /// Capture the store contents for saving
    pub fn snapshot(&self) -> StoreSnapshot {
        let mut merged = BTreeMap::new();
        for (path, ids) in &self.merged {
            let mut ids: Vec<CommitId> = ids.iter().cloned().collect();
            ids.sort();
            merged.insert(path.clone(), ids);
        }
        StoreSnapshot {
            version: STORE_VERSION,
            scheme: self.scheme,
            branches: self.branches.clone(),
            commits: self.commits.values().cloned().collect(),
            merged,
            co_required: self
                .co_required
                .iter()
                .map(|(commit, requires)| CoRequired {
                    commit: commit.clone(),
                    requires: requires.iter().cloned().collect(),
                })
                .collect(),
        }
    }

    /// Rebuild a store from a snapshot.
    ///
    /// Relations that point at unknown branches or commits are dropped.
    pub fn from_snapshot(snapshot: StoreSnapshot) -> Result<Self> {
        if snapshot.version != STORE_VERSION {
            return Err(Error::Store(format!(
                "unsupported store version {} (expected {STORE_VERSION})",
                snapshot.version
            )));
        }

        let mut store = Self::new(snapshot.scheme);
        for branch in snapshot.branches {
            store.create_branch(branch)?;
        }
        for commit in snapshot.commits {
            if commit.id.scheme() != store.scheme {
                return Err(Error::Store(format!(
                    "commit {} does not use the {} scheme",
                    commit.id, store.scheme
                )));
            }
            store.commits.insert(commit.id.clone(), commit);
        }
        for (path, ids) in snapshot.merged {
            if store.branch_by_path(&path).is_none() {
                debug!(branch = %path, "dropping merges for unknown branch");
                continue;
            }
            let known: HashSet<CommitId> = ids
                .into_iter()
                .filter(|id| store.commits.contains_key(id))
                .collect();
            store.merged.insert(path, known);
        }
        for link in snapshot.co_required {
            if !store.commits.contains_key(&link.commit) {
                continue;
            }
            let requires: BTreeSet<CommitId> = link
                .requires
                .into_iter()
                .filter(|id| store.commits.contains_key(id))
                .collect();
            if !requires.is_empty() {
                store.co_required.insert(link.commit, requires);
            }
        }
        Ok(store)
    }

    fn branch_index(&self, name: &str) -> Option<usize> {
        self.branches.iter().position(|b| b.name == name)
    }

    fn ensure_scheme(&self, id: &CommitId) -> Result<()> {
        if id.scheme() == self.scheme {
            Ok(())
        } else {
            Err(Error::InvalidInput(format!(
                "{id} is not a {} identifier",
                self.scheme
            )))
        }
    }
}

impl Repository for MemoryStore {
    fn scheme(&self) -> IdScheme {
        self.scheme
    }

    fn branches(&self) -> Vec<&Branch> {
        let mut branches: Vec<&Branch> = self.branches.iter().collect();
        branches.sort_by(|a, b| {
            b.is_trunk
                .cmp(&a.is_trunk)
                .then_with(|| b.branch_point.cmp(&a.branch_point))
                .then_with(|| b.name.cmp(&a.name))
        });
        branches
    }

    fn branch(&self, name: &str) -> Option<&Branch> {
        self.branches.iter().find(|b| b.name == name)
    }

    fn branch_by_path(&self, path: &str) -> Option<&Branch> {
        self.branches.iter().find(|b| b.path == path)
    }

    fn create_branch(&mut self, branch: Branch) -> Result<()> {
        self.ensure_scheme(&branch.branch_point)?;
        if self.branch(&branch.name).is_some() {
            return Err(Error::BranchExists(branch.name));
        }
        if self.branch_by_path(&branch.path).is_some() {
            return Err(Error::BranchExists(branch.path));
        }
        if let Some(trunk) = self.trunk() {
            if branch.is_trunk {
                return Err(Error::TrunkExists(trunk.name.clone()));
            }
            if let (Some(CommitId::Revision(imported)), CommitId::Revision(point)) =
                (&trunk.last_imported, &branch.branch_point)
                && point > imported
            {
                return Err(Error::BranchPoint(format!(
                    "r{point} is past the last imported trunk revision r{imported}"
                )));
            }
        }

        debug!(name = %branch.name, path = %branch.path, trunk = branch.is_trunk, "created branch");
        self.branches.push(branch);
        Ok(())
    }

    fn save_branch(&mut self, branch: Branch) -> Result<()> {
        let index = self
            .branch_index(&branch.name)
            .ok_or_else(|| Error::BranchNotFound(branch.name.clone()))?;

        let existing = &self.branches[index];
        if let Some(next) = &branch.last_imported
            && existing.would_regress(next)
        {
            return Err(Error::WatermarkRegression {
                branch: existing.path.clone(),
                current: existing
                    .last_imported
                    .as_ref()
                    .map(ToString::to_string)
                    .unwrap_or_default(),
                requested: next.to_string(),
            });
        }
        if existing.last_imported.is_some() && branch.last_imported.is_none() {
            return Err(Error::WatermarkRegression {
                branch: existing.path.clone(),
                current: existing
                    .last_imported
                    .as_ref()
                    .map(ToString::to_string)
                    .unwrap_or_default(),
                requested: "none".to_string(),
            });
        }
        if branch.is_trunk
            && let Some(trunk) = self.trunk()
            && trunk.name != branch.name
        {
            return Err(Error::TrunkExists(trunk.name.clone()));
        }
        if branch.path != existing.path && self.branch_by_path(&branch.path).is_some() {
            return Err(Error::BranchExists(branch.path));
        }

        self.branches[index] = branch;
        Ok(())
    }

    fn delete_branch(&mut self, name: &str) -> Result<Branch> {
        let index = self
            .branch_index(name)
            .ok_or_else(|| Error::BranchNotFound(name.to_string()))?;
        let branch = self.branches.remove(index);
        self.merged.remove(&branch.path);
        debug!(name = %branch.name, "deleted branch");
        Ok(branch)
    }

    fn commit(&self, id: &CommitId) -> Option<&Commit> {
        self.commits.get(id)
    }

    fn resolve(&self, reference: &CommitId) -> Option<&Commit> {
        if let Some(commit) = self.commits.get(reference) {
            return Some(commit);
        }
        let CommitId::Hash(_) = reference else {
            return None;
        };

        // Hashes sharing a prefix are contiguous in key order
        let mut candidates = self
            .commits
            .range(reference.clone()..)
            .take_while(|(id, _)| id.matches(reference))
            .map(|(_, commit)| commit);
        let first = candidates.next()?;
        candidates.next().is_none().then_some(first)
    }

    fn commits_on(&self, branch_path: &str) -> Vec<&Commit> {
        let mut commits: Vec<&Commit> = self
            .commits
            .values()
            .filter(|c| c.branch == branch_path)
            .collect();
        commits.sort_by(|a, b| a.history_cmp(b));
        commits
    }

    fn insert_commits(&mut self, commits: Vec<Commit>) -> Result<usize> {
        for commit in &commits {
            self.ensure_scheme(&commit.id)?;
        }
        let mut inserted = 0;
        for commit in commits {
            if self.commits.insert(commit.id.clone(), commit).is_none() {
                inserted += 1;
            }
        }
        Ok(inserted)
    }

    fn is_merged(&self, id: &CommitId, branch_path: &str) -> bool {
        self.merged
            .get(branch_path)
            .is_some_and(|ids| ids.contains(id))
    }

    fn merged_into(&self, branch_path: &str) -> BTreeSet<CommitId> {
        self.merged
            .get(branch_path)
            .map(|ids| ids.iter().cloned().collect())
            .unwrap_or_default()
    }

    fn record_merges(&mut self, branch_path: &str, ids: &[CommitId]) -> Result<usize> {
        if self.branch_by_path(branch_path).is_none() {
            return Err(Error::BranchNotFound(branch_path.to_string()));
        }
        if let Some(unknown) = ids.iter().find(|id| !self.commits.contains_key(id)) {
            return Err(Error::CommitNotFound(unknown.to_string()));
        }

        let merged = self.merged.entry(branch_path.to_string()).or_default();
        let added = ids
            .iter()
            .filter(|id| merged.insert((*id).clone()))
            .count();
        Ok(added)
    }

    fn link_co_required(&mut self, id: &CommitId, requires: &[CommitId]) -> Result<()> {
        if !self.commits.contains_key(id) {
            return Err(Error::CommitNotFound(id.to_string()));
        }
        if let Some(unknown) = requires.iter().find(|r| !self.commits.contains_key(r)) {
            return Err(Error::CommitNotFound(unknown.to_string()));
        }
        if requires.is_empty() {
            return Ok(());
        }
        self.co_required
            .entry(id.clone())
            .or_default()
            .extend(requires.iter().cloned());
        Ok(())
    }

    fn co_required(&self, id: &CommitId) -> Vec<CommitId> {
        self.co_required
            .get(id)
            .map(|ids| ids.iter().cloned().collect())
            .unwrap_or_default()
    }
}
