//! Status command - trunk commits and their MFC state for one branch

use crate::cli::context::CommandContext;
use crate::cli::style::Stylize;
use anstream::println;
use chrono::Local;
use mfc_tracker::config::Config;
use mfc_tracker::error::{Error, Result};
use mfc_tracker::filter::{CommitFilter, MfcState, PendingCommit, pending_commits};
use mfc_tracker::profile::Profile;
use mfc_tracker::store::Repository;

/// Options for the status command
#[derive(Debug, Clone, Default)]
pub struct StatusOptions {
    /// Branch name; defaults to the basket's target
    pub branch: Option<String>,
    /// Filter expression
    pub filter: Option<String>,
    /// Only these states
    pub states: Vec<MfcState>,
    /// Show at most this many commits
    pub limit: Option<usize>,
}

/// Run the status command
pub fn run_status(config: Config, options: StatusOptions) -> Result<()> {
    let ctx = CommandContext::load(config)?;
    let basket = ctx.basket()?;

    let branch = match (&options.branch, &basket.target_branch) {
        (Some(name), _) => ctx.branch(name)?,
        (None, Some(path)) => ctx
            .store
            .branch_by_path(path)
            .ok_or_else(|| Error::BranchNotFound(path.clone()))?,
        (None, None) => {
            return Err(Error::InvalidInput(
                "no branch given and the basket has no target".to_string(),
            ));
        }
    };
    let filter = match &options.filter {
        Some(text) => CommitFilter::parse(text, ctx.config.scheme())?,
        None => CommitFilter::default(),
    };

    // Never-MFC commits and notes are the operator's own
    let profiles = ctx.profiles()?;
    let profile = ctx
        .config
        .operator()
        .and_then(|operator| profiles.get(&operator).cloned())
        .unwrap_or_default();

    let today = Local::now().date_naive();
    let pending = pending_commits(
        &ctx.store,
        branch,
        &filter,
        &options.states,
        &profile.never_mfc,
        today,
    )?;
    let merged = pending.iter().filter(|p| p.state == MfcState::Done).count();
    println!(
        "{} {} ({} commit(s), {} merged)",
        branch.name.accent(),
        branch.path.muted(),
        pending.len(),
        merged
    );
    if pending.is_empty() {
        println!("{}", "Nothing matches".muted());
        return Ok(());
    }

    let staged_here = basket.target_branch.as_deref() == Some(branch.path.as_str());
    let shown = options.limit.unwrap_or(pending.len());
    for entry in pending.iter().take(shown) {
        let staged = staged_here && basket.contains(&entry.commit.id);
        print_commit(&ctx, entry, staged, &profile);
    }
    if shown < pending.len() {
        println!("{}", format!("... {} more", pending.len() - shown).muted());
    }
    Ok(())
}

fn print_commit(ctx: &CommandContext, entry: &PendingCommit<'_>, staged: bool, profile: &Profile) {
    let commit = entry.commit;
    let state = format!("{:<7}", entry.state.to_string());
    let state = match entry.state {
        MfcState::Done => state.success(),
        MfcState::Ready => state.accent(),
        MfcState::Waiting => state.warn(),
        MfcState::Other => state.muted(),
    };
    let after = commit
        .mfc_after
        .filter(|_| entry.state == MfcState::Waiting)
        .map(|date| format!(" (after {date})"))
        .unwrap_or_default();
    println!(
        "{} {state} {} {} {}{}",
        if staged { "*" } else { " " },
        ctx.commit_label(&commit.id),
        commit.author.emphasis(),
        commit.summary(),
        after.muted()
    );
    if let Some(note) = profile.note(&commit.id) {
        for line in note.lines() {
            println!("          {}", line.muted());
        }
    }
}
