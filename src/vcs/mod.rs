//! Version control adapters
//!
//! The tracker never talks to a VCS itself; a [`LogSource`] hands it
//! already materialized log entries and merge metadata. Two adapters drive
//! the command line clients: [`SvnLogSource`] and [`GitLogSource`].

mod git;
mod svn;

pub use git::{GitLogSource, parse_git_log};
pub use svn::{SvnLogSource, parse_svn_log};

use crate::error::{Error, Result};
use crate::types::{CommitId, IdScheme, LogEntry};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::process::Output;
use tokio::process::Command;
use tracing::debug;

/// Source of commit history for branches
#[async_trait]
pub trait LogSource: Send + Sync {
    /// Identifier scheme of this VCS
    fn scheme(&self) -> IdScheme;

    /// Log entries of `path`, oldest first.
    ///
    /// With the revision scheme the log starts at `start` inclusive; with
    /// the hash scheme it holds the commits reachable from `path` but not
    /// from `start`. At most `limit` entries (the oldest ones) are returned.
    async fn log(
        &self,
        path: &str,
        start: Option<&CommitId>,
        limit: Option<usize>,
    ) -> Result<Vec<LogEntry>>;

    /// Raw merge metadata text for `path`, if the VCS keeps any
    async fn merge_info(&self, path: &str) -> Result<Option<String>>;

    /// Where `path` diverged from `trunk_path`, and when
    async fn branch_point(&self, path: &str, trunk_path: &str)
    -> Result<(CommitId, DateTime<Utc>)>;
}

/// Run a VCS client and capture its output, whatever the exit status
pub(crate) async fn run(program: &str, args: &[&str]) -> Result<Output> {
    debug!(program, ?args, "running vcs client");
    Command::new(program)
        .args(args)
        .env("LC_ALL", "C")
        .output()
        .await
        .map_err(|e| Error::Vcs(format!("failed to run {program}: {e}")))
}

/// Run a VCS client and return its stdout, failing on a non-zero exit
pub(crate) async fn run_checked(program: &str, args: &[&str]) -> Result<String> {
    let output = run(program, args).await?;
    if !output.status.success() {
        return Err(Error::Vcs(format!(
            "{program} {} failed: {}",
            args.first().unwrap_or(&""),
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
