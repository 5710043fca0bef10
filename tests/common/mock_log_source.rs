//! Mock VCS log source for testing

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mfc_tracker::error::{Error, Result};
use mfc_tracker::types::{CommitId, IdScheme, LogEntry};
use mfc_tracker::vcs::LogSource;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

/// Call record for `log`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogCall {
    pub path: String,
    pub start: Option<CommitId>,
    pub limit: Option<usize>,
}

/// Canned log source
///
/// Entries and merge metadata are registered per branch path. `log`
/// follows the adapters' semantics: revisions from `start` inclusive,
/// hashes strictly after `start`, oldest entries first, truncated to
/// `limit`.
pub struct MockLogSource {
    scheme: IdScheme,
    logs: Mutex<HashMap<String, Vec<LogEntry>>>,
    mergeinfo: Mutex<HashMap<String, String>>,
    branch_points: Mutex<HashMap<String, (CommitId, DateTime<Utc>)>>,
    // Call tracking
    log_calls: Mutex<Vec<LogCall>>,
    // Error injection
    failing_paths: Mutex<HashSet<String>>,
}

impl MockLogSource {
    /// Empty source for `scheme`
    pub fn new(scheme: IdScheme) -> Self {
        Self {
            scheme,
            logs: Mutex::new(HashMap::new()),
            mergeinfo: Mutex::new(HashMap::new()),
            branch_points: Mutex::new(HashMap::new()),
            log_calls: Mutex::new(Vec::new()),
            failing_paths: Mutex::new(HashSet::new()),
        }
    }

    /// Append entries to the history of `path`
    pub fn push_entries(&self, path: &str, entries: Vec<LogEntry>) {
        self.logs
            .lock()
            .unwrap()
            .entry(path.to_string())
            .or_default()
            .extend(entries);
    }

    /// Set the merge metadata text of `path`
    pub fn set_mergeinfo(&self, path: &str, text: &str) {
        self.mergeinfo
            .lock()
            .unwrap()
            .insert(path.to_string(), text.to_string());
    }

    /// Set the branch point reported for `path`
    pub fn set_branch_point(&self, path: &str, id: CommitId, date: DateTime<Utc>) {
        self.branch_points
            .lock()
            .unwrap()
            .insert(path.to_string(), (id, date));
    }

    /// Make every query for `path` fail
    pub fn fail_path(&self, path: &str) {
        self.failing_paths.lock().unwrap().insert(path.to_string());
    }

    /// Stop failing queries for `path`
    pub fn heal_path(&self, path: &str) {
        self.failing_paths.lock().unwrap().remove(path);
    }

    /// Recorded `log` calls
    pub fn log_calls(&self) -> Vec<LogCall> {
        self.log_calls.lock().unwrap().clone()
    }

    fn check(&self, path: &str) -> Result<()> {
        if self.failing_paths.lock().unwrap().contains(path) {
            return Err(Error::Vcs(format!("mock failure for {path}")));
        }
        Ok(())
    }
}

#[async_trait]
impl LogSource for MockLogSource {
    fn scheme(&self) -> IdScheme {
        self.scheme
    }

    async fn log(
        &self,
        path: &str,
        start: Option<&CommitId>,
        limit: Option<usize>,
    ) -> Result<Vec<LogEntry>> {
        self.log_calls.lock().unwrap().push(LogCall {
            path: path.to_string(),
            start: start.cloned(),
            limit,
        });
        self.check(path)?;

        let entries = self
            .logs
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .unwrap_or_default();
        let mut selected: Vec<LogEntry> = match start {
            Some(CommitId::Revision(first)) => entries
                .into_iter()
                .filter(|e| e.id.revision().is_some_and(|rev| rev >= *first))
                .collect(),
            Some(start @ CommitId::Hash(_)) => match entries.iter().position(|e| e.id == *start) {
                Some(index) => entries.into_iter().skip(index + 1).collect(),
                None => entries,
            },
            None => entries,
        };
        if let Some(limit) = limit {
            selected.truncate(limit);
        }
        Ok(selected)
    }

    async fn merge_info(&self, path: &str) -> Result<Option<String>> {
        self.check(path)?;
        Ok(self.mergeinfo.lock().unwrap().get(path).cloned())
    }

    async fn branch_point(
        &self,
        path: &str,
        _trunk_path: &str,
    ) -> Result<(CommitId, DateTime<Utc>)> {
        self.check(path)?;
        self.branch_points
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| Error::Vcs(format!("{path} has no history")))
    }
}
