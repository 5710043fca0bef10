//! Shared test fixtures

#![allow(dead_code)]

mod guarded_store;
mod mock_log_source;

#[allow(unused_imports)]
pub use guarded_store::GuardedStore;
#[allow(unused_imports)]
pub use mock_log_source::{LogCall, MockLogSource};

use chrono::{DateTime, TimeZone, Utc};
use mfc_tracker::store::{MemoryStore, Repository};
use mfc_tracker::types::{Branch, Change, Commit, CommitId, IdScheme, LogEntry};

/// Trunk path used by the Subversion fixtures
pub const TRUNK: &str = "/head";

/// Maintenance branch path used by the Subversion fixtures
pub const STABLE: &str = "/stable/11";

/// Midnight UTC on the given day
pub fn date(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).unwrap()
}

/// Subversion log entry touching `paths`, committed in January 2017
pub fn svn_entry(rev: u64, author: &str, message: &str, paths: &[&str]) -> LogEntry {
    LogEntry {
        id: CommitId::Revision(rev),
        author: author.to_string(),
        date: date(2017, 1, u32::try_from(rev.clamp(1, 28)).unwrap()),
        message: message.to_string(),
        changes: paths.iter().map(|p| Change::new("M", *p)).collect(),
        note: None,
    }
}

/// Git log entry committed on `day` of January 2017
pub fn git_entry(hash: &str, author: &str, day: u32, message: &str) -> LogEntry {
    LogEntry {
        id: CommitId::Hash(hash.to_string()),
        author: author.to_string(),
        date: date(2017, 1, day),
        message: message.to_string(),
        changes: vec![Change::new("M", "sys/kern/kern_exec.c")],
        note: None,
    }
}

/// Trunk commit for direct store setup
pub fn trunk_commit(rev: u64, author: &str, message: &str) -> Commit {
    Commit::new(
        CommitId::Revision(rev),
        author,
        date(2017, 1, 1),
        message,
        TRUNK,
    )
}

/// Revision store with trunk `HEAD` and branch `STABLE-11` (branched at r1)
/// and the given trunk commits
pub fn svn_store(trunk_commits: Vec<Commit>) -> MemoryStore {
    let mut store = MemoryStore::new(IdScheme::Revision);
    store
        .create_branch(Branch::trunk("HEAD", TRUNK, CommitId::Revision(1)))
        .unwrap();
    store
        .create_branch(Branch::new("STABLE-11", STABLE, CommitId::Revision(1)))
        .unwrap();
    store.insert_commits(trunk_commits).unwrap();
    store
}

/// Revision ids for `revs`
pub fn revs(revs: &[u64]) -> Vec<CommitId> {
    revs.iter().copied().map(CommitId::Revision).collect()
}
