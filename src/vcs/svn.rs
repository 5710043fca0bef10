//! Subversion adapter driving the `svn` command line client

use super::{LogSource, run, run_checked};
use crate::error::{Error, Result};
use crate::types::{Change, CommitId, IdScheme, LogEntry};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use regex::Regex;
use std::sync::LazyLock;

const SEPARATOR: &str =
    "------------------------------------------------------------------------";

static HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^r(\d+) \| (.*?) \| (\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2} [+-]\d{4})(?: \([^)]*\))? \| (\d+) lines?$",
    )
    .expect("svn log header regex")
});

static CHANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s+([AMDR])\s+(\S.*?)(?: \(from .*\))?$").expect("svn changed path regex")
});

/// Property not found (reported as a warning with a failing exit status)
const PROPERTY_NOT_FOUND: &str = "W200017";

/// Log source backed by a Subversion repository URL
#[derive(Debug, Clone)]
pub struct SvnLogSource {
    base_url: String,
}

impl SvnLogSource {
    /// Adapter for the repository at `base_url` (e.g. `svn://svn.freebsd.org/base`)
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[async_trait]
impl LogSource for SvnLogSource {
    fn scheme(&self) -> IdScheme {
        IdScheme::Revision
    }

    async fn log(
        &self,
        path: &str,
        start: Option<&CommitId>,
        limit: Option<usize>,
    ) -> Result<Vec<LogEntry>> {
        let start = start.and_then(CommitId::revision).unwrap_or(1).max(1);
        let range = format!("{start}:HEAD");
        let url = self.url(path);
        let limit = limit.map(|l| l.to_string());

        let mut args = vec!["log", "-v", "--non-interactive", "-r", range.as_str()];
        if let Some(limit) = &limit {
            args.extend(["-l", limit.as_str()]);
        }
        args.push(url.as_str());

        let output = run_checked("svn", &args).await?;
        parse_svn_log(&output)
    }

    async fn merge_info(&self, path: &str) -> Result<Option<String>> {
        let url = self.url(path);
        let output = run("svn", &["propget", "svn:mergeinfo", "--non-interactive", url.as_str()]).await?;
        let stderr = String::from_utf8_lossy(&output.stderr);
        if !output.status.success() {
            if stderr.contains(PROPERTY_NOT_FOUND) {
                return Ok(None);
            }
            return Err(Error::Vcs(format!("svn propget failed: {}", stderr.trim())));
        }
        let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
        Ok((!text.is_empty()).then_some(text))
    }

    async fn branch_point(
        &self,
        path: &str,
        _trunk_path: &str,
    ) -> Result<(CommitId, DateTime<Utc>)> {
        let url = self.url(path);
        let output = run_checked(
            "svn",
            &[
                "log",
                "-v",
                "--non-interactive",
                "--stop-on-copy",
                "-r",
                "1:HEAD",
                "-l",
                "1",
                url.as_str(),
            ],
        )
        .await?;
        let first = parse_svn_log(&output)?
            .into_iter()
            .next()
            .ok_or_else(|| Error::Vcs(format!("no history for {path}")))?;
        Ok((first.id, first.date))
    }
}

/// Parse `svn log -v` output into entries, in output order
pub fn parse_svn_log(output: &str) -> Result<Vec<LogEntry>> {
    let lines: Vec<&str> = output.lines().collect();
    let mut entries = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];
        i += 1;
        if line.is_empty() || line == SEPARATOR {
            continue;
        }

        let caps = HEADER
            .captures(line)
            .ok_or_else(|| Error::Vcs(format!("unexpected svn log line: {line:?}")))?;
        let revision: u64 = caps[1]
            .parse()
            .map_err(|e| Error::Vcs(format!("bad revision in {line:?}: {e}")))?;
        let date = DateTime::parse_from_str(&caps[3], "%Y-%m-%d %H:%M:%S %z")
            .map_err(|e| Error::Vcs(format!("bad date in {line:?}: {e}")))?
            .with_timezone(&Utc);
        let message_lines: usize = caps[4]
            .parse()
            .map_err(|e| Error::Vcs(format!("bad line count in {line:?}: {e}")))?;

        let mut changes = Vec::new();
        if lines.get(i) == Some(&"Changed paths:") {
            i += 1;
            while let Some(change) = lines.get(i).and_then(|l| CHANGE.captures(l)) {
                changes.push(Change::new(&change[1], &change[2]));
                i += 1;
            }
        }
        // Blank line between the header block and the message
        if lines.get(i).is_some_and(|l| l.is_empty()) {
            i += 1;
        }

        let end = (i + message_lines).min(lines.len());
        let message = lines[i..end].join("\n");
        i = end;

        entries.push(LogEntry {
            id: CommitId::Revision(revision),
            author: caps[2].to_string(),
            date,
            message,
            changes,
            note: None,
        });
    }

    Ok(entries)
}
