//! Commit message synthesis for a merge plan

use super::command::candidate_revisions;
use crate::error::Result;
use crate::message::strip_directive_lines;
use crate::ranges;
use crate::types::{Commit, CommitId};

/// Label naming all candidates: `r1-r3, r5` or comma separated short hashes
fn candidates_label(candidates: &[&Commit]) -> Result<String> {
    match candidates.first().map(|c| &c.id) {
        Some(CommitId::Revision(_)) => ranges::range_label(&candidate_revisions(candidates)?),
        _ => Ok(candidates
            .iter()
            .map(|c| c.id.short())
            .collect::<Vec<_>>()
            .join(", ")),
    }
}

fn credit(commit: &Commit, operator: Option<&str>) -> String {
    match operator {
        Some(operator) if operator != commit.author => format!(" by {}", commit.author),
        _ => String::new(),
    }
}

/// Build the merge commit message for `candidates`.
///
/// The header names the candidates (`MFC r5-r7, r9`); a single candidate
/// by someone other than `operator` credits its author. Summarized mode
/// lists one `id: summary` line per candidate. Full mode carries each
/// message with `MFC after:` lines stripped, under a per-commit header when
/// there are several. Hash-identified candidates get one cherry-pick
/// provenance footer each.
///
/// `candidates` must already be in history order. Returns `None` when
/// there are no candidates.
pub fn build_message(
    candidates: &[&Commit],
    operator: Option<&str>,
    summarized: bool,
) -> Result<Option<String>> {
    let Some(first) = candidates.first() else {
        return Ok(None);
    };

    let mut msg = format!("MFC {}", candidates_label(candidates)?);
    if candidates.len() == 1 {
        msg.push_str(&credit(first, operator));
        msg.push(':');
    }
    msg.push('\n');

    for commit in candidates {
        if summarized {
            msg.push_str(&format!("\n{}: {}", commit.id.short(), commit.summary()));
            continue;
        }
        if candidates.len() > 1 {
            msg.push_str(&format!(
                "\n{}{}:",
                commit.id.short(),
                credit(commit, operator)
            ));
        }
        msg.push('\n');
        msg.push_str(&strip_directive_lines(&commit.message));
        msg = format!("{}\n", msg.trim());
    }
    if summarized {
        msg.push('\n');
    }

    let footers: Vec<String> = candidates
        .iter()
        .filter_map(|c| c.id.hash())
        .map(|hash| format!("(cherry picked from commit {hash})"))
        .collect();
    if !footers.is_empty() {
        msg.push('\n');
        for footer in footers {
            msg.push_str(&footer);
            msg.push('\n');
        }
    }

    Ok(Some(msg))
}
