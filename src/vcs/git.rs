//! Git adapter driving the `git` command line client

use super::{LogSource, run_checked};
use crate::error::{Error, Result};
use crate::types::{Change, CommitId, IdScheme, LogEntry};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::PathBuf;

const RECORD: char = '\x1e';
const FIELD: char = '\x1f';
const LOG_FORMAT: &str = "--format=%x1e%H%x1f%an%x1f%aI%x1f%N%x1f%B%x1f";

/// Log source backed by a local git clone
#[derive(Debug, Clone)]
pub struct GitLogSource {
    work_tree: PathBuf,
}

impl GitLogSource {
    /// Adapter for the clone at `work_tree`
    pub fn new(work_tree: impl Into<PathBuf>) -> Self {
        Self {
            work_tree: work_tree.into(),
        }
    }

    async fn git(&self, args: &[&str]) -> Result<String> {
        let dir = self.work_tree.to_string_lossy().into_owned();
        let mut full = vec!["-C", dir.as_str()];
        full.extend_from_slice(args);
        run_checked("git", &full).await
    }
}

#[async_trait]
impl LogSource for GitLogSource {
    fn scheme(&self) -> IdScheme {
        IdScheme::Hash
    }

    async fn log(
        &self,
        path: &str,
        start: Option<&CommitId>,
        limit: Option<usize>,
    ) -> Result<Vec<LogEntry>> {
        let range = match start {
            Some(CommitId::Hash(hash)) => format!("{hash}..{path}"),
            Some(other) => {
                return Err(Error::InvalidInput(format!("{other} is not a git commit")));
            }
            None => path.to_string(),
        };
        let output = self
            .git(&[
                "log",
                "--reverse",
                "--notes",
                "--name-status",
                LOG_FORMAT,
                range.as_str(),
                "--",
            ])
            .await?;

        let mut entries = parse_git_log(&output)?;
        if let Some(limit) = limit {
            entries.truncate(limit);
        }
        Ok(entries)
    }

    async fn merge_info(&self, _path: &str) -> Result<Option<String>> {
        Ok(None)
    }

    async fn branch_point(
        &self,
        path: &str,
        trunk_path: &str,
    ) -> Result<(CommitId, DateTime<Utc>)> {
        let base = self.git(&["merge-base", trunk_path, path]).await?;
        let base = base.trim();
        let date = self.git(&["show", "-s", "--format=%cI", base]).await?;
        let date = DateTime::parse_from_rfc3339(date.trim())
            .map_err(|e| Error::Vcs(format!("bad commit date for {base}: {e}")))?
            .with_timezone(&Utc);
        Ok((CommitId::Hash(base.to_ascii_lowercase()), date))
    }
}

/// Parse `git log` output produced with the adapter's record format
pub fn parse_git_log(output: &str) -> Result<Vec<LogEntry>> {
    output
        .split(RECORD)
        .filter(|record| !record.trim().is_empty())
        .map(parse_record)
        .collect()
}

fn parse_record(record: &str) -> Result<LogEntry> {
    let fields: Vec<&str> = record.splitn(6, FIELD).collect();
    let [hash, author, date, note, body, status] = fields.as_slice() else {
        return Err(Error::Vcs(format!(
            "truncated git log record: {:?}",
            record.chars().take(60).collect::<String>()
        )));
    };

    let date = DateTime::parse_from_rfc3339(date.trim())
        .map_err(|e| Error::Vcs(format!("bad date for {hash}: {e}")))?
        .with_timezone(&Utc);

    let changes = status
        .lines()
        .filter_map(|line| {
            let mut parts = line.split('\t');
            let operation = parts.next()?.chars().next()?;
            let path = parts.last()?;
            Some(Change::new(operation.to_string(), path))
        })
        .collect();

    let note = note.trim();
    Ok(LogEntry {
        id: CommitId::Hash(hash.trim().to_ascii_lowercase()),
        author: (*author).to_string(),
        date,
        message: body.trim_end().to_string(),
        changes,
        note: (!note.is_empty()).then(|| note.to_string()),
    })
}
