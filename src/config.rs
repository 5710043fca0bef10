//! Configuration file and environment overrides
//!
//! `config.toml` lives under the user config directory unless a path is
//! given explicitly. Every key is optional:
//!
//! ```toml
//! vcs = "svn"
//! repository = "svn://svn.freebsd.org/base"
//! state_dir = "/var/db/mfc-tracker"
//! operator = "gonzo"
//! revision_url = "https://svnweb.freebsd.org/changeset/base/{id}"
//! log_limit = 500
//! ```

use crate::error::{Error, Result};
use crate::types::{CommitId, IdScheme};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Application directory name under the config and data directories
const APP_DIR: &str = "mfc-tracker";

/// Filename for configuration
pub const CONFIG_FILE: &str = "config.toml";

/// Placeholder replaced by a commit identifier in `revision_url`
const ID_PLACEHOLDER: &str = "{id}";

/// Backing version control system
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VcsKind {
    /// Subversion, revision numbers
    #[default]
    Svn,
    /// Git, commit hashes
    Git,
}

impl VcsKind {
    /// Identifier scheme used by this VCS
    pub const fn scheme(self) -> IdScheme {
        match self {
            Self::Svn => IdScheme::Revision,
            Self::Git => IdScheme::Hash,
        }
    }
}

/// Tracker configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Backing VCS
    pub vcs: VcsKind,
    /// Subversion base URL or git work tree
    pub repository: Option<String>,
    /// Where the store, basket, and lock live
    pub state_dir: Option<PathBuf>,
    /// Operator identity used to credit authors in merge messages
    pub operator: Option<String>,
    /// Commit link template containing `{id}`
    pub revision_url: Option<String>,
    /// Default per-branch import limit
    pub log_limit: Option<usize>,
}

impl Config {
    /// Default config file location
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
    }

    /// Parse configuration text
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| Error::Config(e.to_string()))
    }

    /// Load configuration and apply `MFCT_*` environment overrides.
    ///
    /// An explicit `path` must exist; the default location may be absent.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::read(path)?,
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::read(&path)?,
                _ => Self::default(),
            },
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    fn read(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read {}: {e}", path.display())))?;
        let config = Self::from_toml(&text)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Apply overrides from an environment lookup
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(repository) = lookup("MFCT_REPOSITORY") {
            self.repository = Some(repository);
        }
        if let Some(operator) = lookup("MFCT_OPERATOR") {
            self.operator = Some(operator);
        }
        if let Some(state_dir) = lookup("MFCT_STATE_DIR") {
            self.state_dir = Some(PathBuf::from(state_dir));
        }
    }

    /// Identifier scheme of the configured VCS
    pub const fn scheme(&self) -> IdScheme {
        self.vcs.scheme()
    }

    /// Configured repository location
    pub fn repository(&self) -> Result<&str> {
        self.repository
            .as_deref()
            .ok_or_else(|| Error::Config("no repository configured (set `repository` or MFCT_REPOSITORY)".to_string()))
    }

    /// State directory, defaulting to the user data directory
    pub fn state_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.state_dir {
            return Ok(dir.clone());
        }
        dirs::data_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or_else(|| Error::Config("no state directory could be determined".to_string()))
    }

    /// Operator identity, defaulting to `$USER`
    pub fn operator(&self) -> Option<String> {
        self.operator
            .clone()
            .or_else(|| std::env::var("USER").ok())
            .filter(|op| !op.is_empty())
    }

    /// Link for a commit, when a template is configured
    pub fn revision_link(&self, id: &CommitId) -> Option<String> {
        let raw = match id {
            CommitId::Revision(rev) => rev.to_string(),
            CommitId::Hash(hash) => hash.clone(),
        };
        self.revision_url
            .as_deref()
            .map(|template| template.replace(ID_PLACEHOLDER, &raw))
    }
}
