//! Error types for mfc-tracker

use thiserror::Error;

/// Errors returned by mfc-tracker operations
#[derive(Debug, Error)]
pub enum Error {
    /// Caller passed input that breaks a function contract (e.g. unsorted revisions)
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A revision range whose start is past its end
    #[error("malformed range: {start}-{end}")]
    MalformedRange {
        /// First revision of the range
        start: u64,
        /// Last revision of the range
        end: u64,
    },

    /// Branch lookup by name or path failed
    #[error("branch not found: {0}")]
    BranchNotFound(String),

    /// A branch with the same name or path is already registered
    #[error("branch already exists: {0}")]
    BranchExists(String),

    /// A second trunk was requested
    #[error("trunk branch already exists: {0}")]
    TrunkExists(String),

    /// No branch is flagged as trunk
    #[error("no trunk branch configured")]
    NoTrunk,

    /// Commit lookup failed
    #[error("commit not found: {0}")]
    CommitNotFound(String),

    /// Branch point is not acceptable for the trunk's current state
    #[error("invalid branch point: {0}")]
    BranchPoint(String),

    /// An update would move a branch's import watermark backwards
    #[error("import watermark for {branch} would regress from {current} to {requested}")]
    WatermarkRegression {
        /// Branch path
        branch: String,
        /// Current watermark
        current: String,
        /// Rejected watermark
        requested: String,
    },

    /// Merge-metadata reconciliation failed; no merges were recorded for the branch
    #[error("reconcile failed for {branch}: {reason}")]
    Reconcile {
        /// Branch path
        branch: String,
        /// Failure description
        reason: String,
    },

    /// VCS client invocation or output parsing failed
    #[error("vcs error: {0}")]
    Vcs(String),

    /// Store consistency or persistence error
    #[error("store error: {0}")]
    Store(String),

    /// Basket persistence error
    #[error("basket error: {0}")]
    Basket(String),

    /// Operator profile persistence error
    #[error("profile error: {0}")]
    Profile(String),

    /// Configuration error
    #[error("config error: {0}")]
    Config(String),

    /// Could not take the import lock
    #[error("lock error: {0}")]
    Lock(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type alias for mfc-tracker operations
pub type Result<T> = std::result::Result<T, Error>;
