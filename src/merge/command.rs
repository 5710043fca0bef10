//! VCS command rendering for a merge plan

use crate::error::{Error, Result};
use crate::ranges;
use crate::types::{Commit, CommitId};

/// Numeric revisions of `candidates`, sorted
///
/// Fails if any candidate is hash-identified.
pub(super) fn candidate_revisions(candidates: &[&Commit]) -> Result<Vec<u64>> {
    let mut revisions = candidates
        .iter()
        .map(|c| {
            c.id.revision()
                .ok_or_else(|| Error::InvalidInput(format!("{} is not a revision", c.id)))
        })
        .collect::<Result<Vec<u64>>>()?;
    revisions.sort_unstable();
    revisions.dedup();
    Ok(revisions)
}

/// Render the command that merges `candidates` from trunk into the target.
///
/// Revision-identified candidates become one `svn merge` invocation with
/// the revisions grouped into `-c`/`-r` spans. Hash-identified candidates
/// become a `git cherry-pick -x` invocation, or for several candidates a
/// short script: work branch, cherry-picks, interactive squash, push.
///
/// `candidates` must already be in history order. Returns `None` when
/// there is nothing to merge.
pub fn build_command(
    candidates: &[&Commit],
    trunk_path: &str,
    target_path: &str,
) -> Result<Option<String>> {
    let Some(first) = candidates.first() else {
        return Ok(None);
    };

    let command = match first.id {
        CommitId::Revision(_) => {
            let revisions = candidate_revisions(candidates)?;
            let args = ranges::merge_command_args(&revisions)?;
            format!(
                "svn merge {} ^{trunk_path}/ {}",
                args.join(" "),
                target_path.trim_matches('/')
            )
        }
        CommitId::Hash(_) => {
            let hashes = candidates
                .iter()
                .map(|c| {
                    c.id.hash().ok_or_else(|| {
                        Error::InvalidInput(format!("{} is not a hash", c.id))
                    })
                })
                .collect::<Result<Vec<&str>>>()?;
            cherry_pick_script(&hashes, target_path)
        }
    };
    Ok(Some(command))
}

fn cherry_pick_script(hashes: &[&str], target: &str) -> String {
    if let [hash] = hashes {
        return format!("git checkout {target} && git cherry-pick -x {hash}");
    }

    let work_branch = format!("mfc/{target}");
    let mut lines = vec![format!("git checkout -b {work_branch} {target}")];
    lines.extend(hashes.iter().map(|h| format!("git cherry-pick -x {h}")));
    lines.push(format!("git rebase -i {target}"));
    lines.push(format!("git push origin HEAD:{target}"));
    lines.join("\n")
}
