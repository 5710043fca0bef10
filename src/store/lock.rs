//! Exclusive lock around import runs and state writes
//!
//! Import jobs must not overlap: two concurrent runs would race on the
//! watermarks and on the saved store. The lock is an advisory `flock(2)`
//! on a file in the state directory; the OS drops it if the process dies.

use crate::error::{Error, Result};
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::debug;

/// Lock file name inside the state directory
pub const LOCK_FILE: &str = "import.lock";

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Held import lock, released on drop
#[derive(Debug)]
pub struct ImportLock {
    _file: File,
}

impl ImportLock {
    /// Take the lock in `state_dir`, waiting up to `timeout`.
    ///
    /// Polls without blocking the runtime thread while another process
    /// holds the lock.
    pub async fn acquire(state_dir: &Path, timeout: Duration) -> Result<Self> {
        fs::create_dir_all(state_dir)?;
        let lock_path = state_dir.join(LOCK_FILE);
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&lock_path)?;

        let start = Instant::now();
        loop {
            match file.try_lock_exclusive() {
                Ok(()) => {
                    debug!(path = %lock_path.display(), "acquired import lock");
                    return Ok(Self { _file: file });
                }
                Err(_) if start.elapsed() >= timeout => {
                    return Err(Error::Lock(format!(
                        "another import holds {} (waited {}ms)",
                        lock_path.display(),
                        timeout.as_millis()
                    )));
                }
                Err(_) => tokio::time::sleep(POLL_INTERVAL).await,
            }
        }
    }
}
