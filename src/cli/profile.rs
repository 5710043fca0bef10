//! Per-operator commands - commit notes and the never-MFC list

use crate::cli::context::CommandContext;
use crate::cli::style::{Stylize, check};
use anstream::println;
use mfc_tracker::config::Config;
use mfc_tracker::error::Result;
use mfc_tracker::store::Repository;
use std::cmp::Reverse;

/// What `note` should do with the commit's note
#[derive(Debug, Clone)]
pub enum NoteAction {
    /// Print every operator's note
    Show,
    /// Set the operator's note
    Set(String),
    /// Remove the operator's note
    Delete,
}

/// Run `note`
#[allow(clippy::future_not_send)]
pub async fn run_note(config: Config, id: &str, action: NoteAction) -> Result<()> {
    let ctx = CommandContext::exclusive(config).await?;
    let id = ctx.resolve(id)?;
    let mut profiles = ctx.profiles()?;

    match action {
        NoteAction::Show => {
            let notes: Vec<(&str, &str)> = profiles
                .operators
                .iter()
                .filter_map(|(operator, profile)| Some((operator.as_str(), profile.note(&id)?)))
                .collect();
            if notes.is_empty() {
                println!("{}", format!("No notes on {}", id.short()).muted());
            }
            for (operator, text) in notes {
                println!("{} {}", ctx.commit_label(&id), operator.emphasis());
                for line in text.lines() {
                    println!("    {line}");
                }
            }
            return Ok(());
        }
        NoteAction::Set(text) => {
            let operator = ctx.operator()?;
            profiles.entry(&operator).set_note(&id, text);
            println!("{} Noted {}", check(), ctx.commit_label(&id));
        }
        NoteAction::Delete => {
            let operator = ctx.operator()?;
            if !profiles.entry(&operator).remove_note(&id) {
                println!("{}", format!("{operator} has no note on {}", id.short()).muted());
                return Ok(());
            }
            println!("{} Removed note on {}", check(), id.short().accent());
        }
    }
    ctx.save_profiles(&profiles)
}

/// Run `never add`
#[allow(clippy::future_not_send)]
pub async fn run_never_add(config: Config, ids: &[String]) -> Result<()> {
    let ctx = CommandContext::exclusive(config).await?;
    let operator = ctx.operator()?;
    let mut profiles = ctx.profiles()?;
    for text in ids {
        let id = ctx.resolve(text)?;
        if profiles.entry(&operator).add_never_mfc(&id) {
            println!("{} {} will not be merged", check(), ctx.commit_label(&id));
        } else {
            println!("{}", format!("{} is already on the list", id.short()).muted());
        }
    }
    ctx.save_profiles(&profiles)
}

/// Run `never remove`
#[allow(clippy::future_not_send)]
pub async fn run_never_remove(config: Config, ids: &[String]) -> Result<()> {
    let ctx = CommandContext::exclusive(config).await?;
    let operator = ctx.operator()?;
    let mut profiles = ctx.profiles()?;
    for text in ids {
        let id = ctx.resolve(text)?;
        if profiles.entry(&operator).remove_never_mfc(&id) {
            println!("{} Removed {}", check(), id.short().accent());
        } else {
            println!("{}", format!("{} is not on the list", id.short()).muted());
        }
    }
    ctx.save_profiles(&profiles)
}

/// Run `never list` - newest commits first
pub fn run_never_list(config: Config) -> Result<()> {
    let ctx = CommandContext::load(config)?;
    let operator = ctx.operator()?;
    let profiles = ctx.profiles()?;
    let mut ids = profiles
        .get(&operator)
        .map(|profile| profile.never_mfc.clone())
        .unwrap_or_default();
    if ids.is_empty() {
        println!("{}", format!("{operator} has no never-MFC commits").muted());
        return Ok(());
    }

    ids.sort_by_key(|id| Reverse((ctx.store.commit(id).map(|c| c.date), id.clone())));
    for id in &ids {
        let summary = ctx
            .store
            .commit(id)
            .map_or_else(|| "(not imported)".to_string(), |c| c.summary().to_string());
        println!("  {} {}", ctx.commit_label(id), summary);
    }
    Ok(())
}
