//! Persistence for tracker state in the state directory
//!
//! - `store.json`: branches, commits, and merge relations
//! - `basket.toml`: the operator's staged commits
//! - `profiles.toml`: per-operator commit notes and never-MFC lists

use crate::basket::Basket;
use crate::error::{Error, Result};
use crate::profile::Profiles;
use crate::store::{MemoryStore, StoreSnapshot};
use crate::types::IdScheme;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Filename for the commit store
pub const STORE_FILE: &str = "store.json";

/// Filename for the operator basket
pub const BASKET_FILE: &str = "basket.toml";

/// Filename for operator profiles
pub const PROFILES_FILE: &str = "profiles.toml";

/// Get path to the commit store file.
pub fn store_path(state_dir: &Path) -> PathBuf {
    state_dir.join(STORE_FILE)
}

/// Get path to the basket file.
pub fn basket_path(state_dir: &Path) -> PathBuf {
    state_dir.join(BASKET_FILE)
}

/// Get path to the profiles file.
pub fn profiles_path(state_dir: &Path) -> PathBuf {
    state_dir.join(PROFILES_FILE)
}

fn ensure_dir(dir: &Path) -> Result<()> {
    if !dir.exists() {
        fs::create_dir_all(dir)
            .map_err(|e| Error::Store(format!("failed to create {}: {e}", dir.display())))?;
    }
    Ok(())
}

/// Load the commit store.
///
/// Returns an empty store for `scheme` if the file doesn't exist. A saved
/// store for a different scheme is an error: the identifiers would not mean
/// the same thing.
pub fn load_store(state_dir: &Path, scheme: IdScheme) -> Result<MemoryStore> {
    let path = store_path(state_dir);

    if !path.exists() {
        return Ok(MemoryStore::new(scheme));
    }

    let content = fs::read_to_string(&path)
        .map_err(|e| Error::Store(format!("failed to read {}: {e}", path.display())))?;

    let snapshot: StoreSnapshot = serde_json::from_str(&content)
        .map_err(|e| Error::Store(format!("failed to parse {}: {e}", path.display())))?;

    if snapshot.scheme != scheme {
        return Err(Error::Store(format!(
            "{} holds {} identifiers but the repository uses {scheme}",
            path.display(),
            snapshot.scheme
        )));
    }

    let store = MemoryStore::from_snapshot(snapshot)?;
    debug!(path = %path.display(), commits = store.commit_count(), "loaded store");
    Ok(store)
}

/// Save the commit store.
///
/// Writes a sibling temporary file and renames it into place so an
/// interrupted save never leaves a truncated store behind.
pub fn save_store(state_dir: &Path, store: &MemoryStore) -> Result<()> {
    ensure_dir(state_dir)?;
    let path = store_path(state_dir);
    let tmp = path.with_extension("json.tmp");

    let content = serde_json::to_string_pretty(&store.snapshot())?;
    fs::write(&tmp, content)
        .map_err(|e| Error::Store(format!("failed to write {}: {e}", tmp.display())))?;
    fs::rename(&tmp, &path)
        .map_err(|e| Error::Store(format!("failed to replace {}: {e}", path.display())))?;

    debug!(path = %path.display(), "saved store");
    Ok(())
}

/// Load the operator basket.
///
/// Returns an empty basket if the file doesn't exist.
pub fn load_basket(state_dir: &Path) -> Result<Basket> {
    let path = basket_path(state_dir);

    if !path.exists() {
        return Ok(Basket::new());
    }

    let content = fs::read_to_string(&path)
        .map_err(|e| Error::Basket(format!("failed to read {}: {e}", path.display())))?;

    toml::from_str(&content)
        .map_err(|e| Error::Basket(format!("failed to parse {}: {e}", path.display())))
}

/// Save the operator basket.
pub fn save_basket(state_dir: &Path, basket: &Basket) -> Result<()> {
    ensure_dir(state_dir)?;
    let path = basket_path(state_dir);

    let content = toml::to_string_pretty(basket)
        .map_err(|e| Error::Basket(format!("failed to serialize basket: {e}")))?;

    let content_with_header = format!(
        "# mfct basket\n# Auto-generated - manual edits may be overwritten\n\n{content}"
    );

    fs::write(&path, content_with_header)
        .map_err(|e| Error::Basket(format!("failed to write {}: {e}", path.display())))?;

    Ok(())
}

/// Load operator profiles.
///
/// Returns no profiles if the file doesn't exist.
pub fn load_profiles(state_dir: &Path) -> Result<Profiles> {
    let path = profiles_path(state_dir);

    if !path.exists() {
        return Ok(Profiles::new());
    }

    let content = fs::read_to_string(&path)
        .map_err(|e| Error::Profile(format!("failed to read {}: {e}", path.display())))?;

    toml::from_str(&content)
        .map_err(|e| Error::Profile(format!("failed to parse {}: {e}", path.display())))
}

/// Save operator profiles, dropping empty ones.
pub fn save_profiles(state_dir: &Path, profiles: &Profiles) -> Result<()> {
    ensure_dir(state_dir)?;
    let path = profiles_path(state_dir);

    let mut profiles = profiles.clone();
    profiles.prune();
    let content = toml::to_string_pretty(&profiles)
        .map_err(|e| Error::Profile(format!("failed to serialize profiles: {e}")))?;

    let content_with_header = format!(
        "# mfct operator profiles\n# Auto-generated - manual edits may be overwritten\n\n{content}"
    );

    fs::write(&path, content_with_header)
        .map_err(|e| Error::Profile(format!("failed to write {}: {e}", path.display())))?;

    debug!(path = %path.display(), operators = profiles.operators.len(), "saved profiles");
    Ok(())
}
