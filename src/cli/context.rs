//! Shared command context for CLI commands
//!
//! Extracts the setup every command needs: resolving the state directory,
//! loading the store, and building the VCS adapter on demand.

use crate::cli::style::Stylize;
use mfc_tracker::basket::Basket;
use mfc_tracker::config::{Config, VcsKind};
use mfc_tracker::error::{Error, Result};
use mfc_tracker::profile::Profiles;
use mfc_tracker::store::{ImportLock, MemoryStore, Repository};
use mfc_tracker::tracking::{
    load_basket, load_profiles, load_store, save_basket, save_profiles, save_store,
};
use mfc_tracker::types::{Branch, CommitId};
use mfc_tracker::vcs::{GitLogSource, LogSource, SvnLogSource};
use std::io::IsTerminal;
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

/// How long a command waits for a running import to finish
const LOCK_TIMEOUT: Duration = Duration::from_secs(30);

/// Shared context for CLI commands
///
/// Commands that modify the store must be created with
/// [`CommandContext::exclusive`] so they hold the import lock from before
/// the store is read until after it is saved.
pub struct CommandContext {
    /// Loaded configuration
    pub config: Config,
    /// Directory holding the store, basket, and lock
    pub state_dir: PathBuf,
    /// Tracked branches and commits
    pub store: MemoryStore,
    _lock: Option<ImportLock>,
}

impl CommandContext {
    /// Load the store for read-mostly commands
    pub fn load(config: Config) -> Result<Self> {
        Self::open(config, None)
    }

    /// Take the import lock, then load the store
    pub async fn exclusive(config: Config) -> Result<Self> {
        let state_dir = config.state_dir()?;
        let lock = ImportLock::acquire(&state_dir, LOCK_TIMEOUT).await?;
        Self::open(config, Some(lock))
    }

    fn open(config: Config, lock: Option<ImportLock>) -> Result<Self> {
        let state_dir = config.state_dir()?;
        let store = load_store(&state_dir, config.scheme())?;
        debug!(
            state_dir = %state_dir.display(),
            commits = store.commit_count(),
            locked = lock.is_some(),
            "loaded store"
        );
        Ok(Self {
            config,
            state_dir,
            store,
            _lock: lock,
        })
    }

    /// VCS adapter for the configured repository
    pub fn log_source(&self) -> Result<Box<dyn LogSource>> {
        let repository = self.config.repository()?;
        Ok(match self.config.vcs {
            VcsKind::Svn => Box::new(SvnLogSource::new(repository)),
            VcsKind::Git => Box::new(GitLogSource::new(repository)),
        })
    }

    /// Persist the store
    pub fn save(&self) -> Result<()> {
        save_store(&self.state_dir, &self.store)
    }

    /// Load the operator basket
    pub fn basket(&self) -> Result<Basket> {
        load_basket(&self.state_dir)
    }

    /// Persist the operator basket
    pub fn save_basket(&self, basket: &Basket) -> Result<()> {
        save_basket(&self.state_dir, basket)
    }

    /// Load operator profiles
    pub fn profiles(&self) -> Result<Profiles> {
        load_profiles(&self.state_dir)
    }

    /// Persist operator profiles
    pub fn save_profiles(&self, profiles: &Profiles) -> Result<()> {
        save_profiles(&self.state_dir, profiles)
    }

    /// Operator whose notes and never-MFC list a command works on
    pub fn operator(&self) -> Result<String> {
        self.config.operator().ok_or_else(|| {
            Error::Config("no operator configured (set `operator` or MFCT_OPERATOR)".to_string())
        })
    }

    /// Look up a branch by name
    pub fn branch(&self, name: &str) -> Result<&Branch> {
        self.store
            .branch(name)
            .ok_or_else(|| Error::BranchNotFound(name.to_string()))
    }

    /// Parse `text` and resolve it to the full id of an imported commit
    pub fn resolve(&self, text: &str) -> Result<CommitId> {
        let reference = self
            .config
            .scheme()
            .parse_id(text)
            .ok_or_else(|| Error::InvalidInput(format!("{text:?} is not a commit identifier")))?;
        self.store
            .resolve(&reference)
            .map(|commit| commit.id.clone())
            .ok_or_else(|| Error::CommitNotFound(text.to_string()))
    }

    /// Commit label, hyperlinked when the terminal supports it
    pub fn commit_label(&self, id: &CommitId) -> String {
        let text = id.short();
        match self.config.revision_link(id) {
            Some(url) if supports_hyperlinks::supports_hyperlinks() && std::io::stdout().is_terminal() => {
                terminal_link::Link::new(&text, &url).to_string().accent()
            }
            _ => text.accent(),
        }
    }
}
