//! Branch administration

use crate::error::{Error, Result};
use crate::store::Repository;
use crate::types::{Branch, CommitId, IdScheme};
use crate::vcs::LogSource;
use tracing::info;

/// Request to register a branch
#[derive(Debug, Clone, Default)]
pub struct NewBranch {
    /// Unique short name
    pub name: String,
    /// VCS path or ref
    pub path: String,
    /// Trunk position the branch diverged at; queried from the VCS if absent
    pub branch_point: Option<CommitId>,
    /// Register as trunk
    pub trunk: bool,
}

/// Normalize a branch path for `scheme`.
///
/// Subversion paths get exactly one leading `/` and no trailing `/`; git
/// refs are kept as given.
pub fn normalize_path(path: &str, scheme: IdScheme) -> String {
    match scheme {
        IdScheme::Revision => format!("/{}", path.trim().trim_matches('/')),
        IdScheme::Hash => path.trim().to_string(),
    }
}

/// Register a branch.
///
/// The import watermark starts just before the branch point, so the first
/// import picks up the branch point itself.
#[allow(clippy::future_not_send)]
pub async fn add_branch(
    repo: &mut dyn Repository,
    source: &dyn LogSource,
    request: NewBranch,
) -> Result<Branch> {
    let scheme = repo.scheme();
    let name = request.name.trim().to_string();
    if name.is_empty() {
        return Err(Error::InvalidInput("branch name is empty".to_string()));
    }
    let path = normalize_path(&request.path, scheme);
    if path.is_empty() || path == "/" {
        return Err(Error::InvalidInput("branch path is empty".to_string()));
    }
    if request.trunk
        && let Some(trunk) = repo.trunk()
    {
        return Err(Error::TrunkExists(trunk.name.clone()));
    }

    let (branch_point, branch_point_date) = match request.branch_point {
        Some(point) => (point, None),
        None if request.trunk && scheme == IdScheme::Hash => {
            return Err(Error::BranchPoint(
                "a git trunk needs an explicit branch point".to_string(),
            ));
        }
        None => {
            let trunk_path = repo
                .trunk()
                .map_or_else(|| path.clone(), |t| t.path.clone());
            let (point, date) = source
                .branch_point(&path, &trunk_path)
                .await
                .map_err(|e| Error::BranchPoint(format!("failed to query {path}: {e}")))?;
            (point, Some(date))
        }
    };
    if branch_point.scheme() != scheme {
        return Err(Error::InvalidInput(format!(
            "branch point {branch_point} is not a {scheme} identifier"
        )));
    }

    let mut branch = if request.trunk {
        Branch::trunk(name, path, branch_point.clone())
    } else {
        Branch::new(name, path, branch_point.clone())
    };
    branch.branch_point_date = branch_point_date;
    if let CommitId::Revision(point) = branch_point {
        branch.last_imported = Some(CommitId::Revision(point.saturating_sub(1)));
    }

    repo.create_branch(branch.clone())?;
    info!(name = %branch.name, path = %branch.path, branch_point = %branch.branch_point, "branch created");
    Ok(branch)
}

/// Remove a branch and its merge records
pub fn delete_branch(repo: &mut dyn Repository, name: &str) -> Result<Branch> {
    let branch = repo.delete_branch(name)?;
    info!(name = %branch.name, "branch deleted");
    Ok(branch)
}
