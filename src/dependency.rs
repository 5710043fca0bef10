//! Missing dependency detection for a candidate merge
//!
//! A commit may declare (`X-MFC-With:`) that it must ship together with
//! other commits. Before a merge is planned every declared dependency must
//! either be part of the candidate set or already merged into the target
//! branch. Anything else, including identifiers that match no imported
//! commit, is reported so the operator can fix the basket.

use crate::message::parse_co_required;
use crate::store::Repository;
use crate::types::{Commit, CommitId, IdScheme};
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

/// A declared dependency that the candidate merge does not cover
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingDependency {
    /// Identifier as declared, resolved to the full id when known
    pub id: CommitId,
    /// False when the identifier matches no imported commit
    pub known: bool,
}

impl fmt::Display for MissingDependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id.short())?;
        if !self.known {
            write!(f, " (unknown commit)")?;
        }
        Ok(())
    }
}

/// Alert for one candidate commit with uncovered dependencies
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingDependencyAlert {
    /// Candidate commit declaring the dependencies
    pub commit: CommitId,
    /// Uncovered dependencies, in identifier order
    pub missing: Vec<MissingDependency>,
}

impl fmt::Display for MissingDependencyAlert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let noun = if self.missing.len() == 1 {
            "commit is"
        } else {
            "commits are"
        };
        let list: Vec<String> = self.missing.iter().map(ToString::to_string).collect();
        write!(
            f,
            "Following {noun} marked as X-MFC-With by {}: {}",
            self.commit.short(),
            list.join(", ")
        )
    }
}

/// Compute dependency alerts for merging `candidates` into `target_branch`.
///
/// For each candidate the declared dependencies are parsed from its message
/// under `scheme`. A dependency is covered when it resolves to a candidate
/// or to a commit already merged into the target. The result does not
/// depend on the order of `candidates`.
pub fn compute_missing_alerts(
    repo: &dyn Repository,
    candidates: &[&Commit],
    target_branch: &str,
    scheme: IdScheme,
) -> BTreeMap<CommitId, MissingDependencyAlert> {
    let mut alerts = BTreeMap::new();

    for candidate in candidates {
        let mut missing = Vec::new();
        for declared in parse_co_required(&candidate.message, scheme) {
            let covered_by_candidate = candidates.iter().any(|c| c.id.matches(&declared));
            if covered_by_candidate {
                continue;
            }
            match repo.resolve(&declared) {
                Some(known) if repo.is_merged(&known.id, target_branch) => {}
                Some(known) => missing.push(MissingDependency {
                    id: known.id.clone(),
                    known: true,
                }),
                None => missing.push(MissingDependency {
                    id: declared,
                    known: false,
                }),
            }
        }

        if !missing.is_empty() {
            missing.sort_by(|a, b| a.id.cmp(&b.id));
            missing.dedup_by(|a, b| a.id == b.id);
            debug!(commit = %candidate.id, missing = missing.len(), "missing dependencies");
            alerts.insert(
                candidate.id.clone(),
                MissingDependencyAlert {
                    commit: candidate.id.clone(),
                    missing,
                },
            );
        }
    }

    alerts
}
