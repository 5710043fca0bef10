//! Basket commands - stage commits for the next merge

use crate::cli::context::CommandContext;
use crate::cli::style::{Stylize, check};
use anstream::println;
use dialoguer::Confirm;
use mfc_tracker::basket::Basket;
use mfc_tracker::config::Config;
use mfc_tracker::error::{Error, Result};
use mfc_tracker::store::Repository;

/// Run `basket add`
pub fn run_add(config: Config, branch: Option<&str>, ids: &[String]) -> Result<()> {
    let ctx = CommandContext::load(config)?;
    let mut basket = ctx.basket()?;

    if let Some(name) = branch {
        let path = ctx.branch(name)?.path.clone();
        retarget(&mut basket, &path)?;
    }
    if basket.target_branch.is_none() {
        return Err(Error::InvalidInput(
            "the basket has no target branch (pass --branch)".to_string(),
        ));
    }

    for text in ids {
        let id = ctx.resolve(text)?;
        if basket.add(id.clone()) {
            println!("{} Added {}", check(), ctx.commit_label(&id));
        } else {
            println!("{}", format!("{} is already in the basket", id.short()).muted());
        }
    }
    ctx.save_basket(&basket)
}

fn retarget(basket: &mut Basket, path: &str) -> Result<()> {
    match basket.target_branch.as_deref() {
        Some(current) if current == path => Ok(()),
        Some(current) if !basket.is_empty() => Err(Error::Basket(format!(
            "the basket targets {current}; clear it before switching to {path}"
        ))),
        _ => {
            *basket = Basket::for_branch(path);
            Ok(())
        }
    }
}

/// Run `basket remove`
pub fn run_remove(config: Config, ids: &[String]) -> Result<()> {
    let ctx = CommandContext::load(config)?;
    let mut basket = ctx.basket()?;
    for text in ids {
        let id = ctx.resolve(text)?;
        if basket.remove(&id) {
            println!("{} Removed {}", check(), id.short().accent());
        } else {
            println!("{}", format!("{} is not in the basket", id.short()).muted());
        }
    }
    ctx.save_basket(&basket)
}

/// Run `basket clear`
pub fn run_clear(config: Config, yes: bool) -> Result<()> {
    let ctx = CommandContext::load(config)?;
    let mut basket = ctx.basket()?;
    if basket.is_empty() {
        println!("{}", "Basket is already empty".muted());
        return Ok(());
    }
    if !yes
        && !Confirm::new()
            .with_prompt(format!("Remove {} commit(s) from the basket?", basket.len()))
            .default(true)
            .interact()
            .map_err(|e| Error::Internal(format!("Failed to read confirmation: {e}")))?
    {
        println!("{}", "Aborted".muted());
        return Ok(());
    }
    basket.clear();
    ctx.save_basket(&basket)?;
    println!("{} Basket cleared", check());
    Ok(())
}

/// Run `basket show`
pub fn run_show(config: Config) -> Result<()> {
    let ctx = CommandContext::load(config)?;
    let basket = ctx.basket()?;
    let target = basket.target_branch.as_deref().unwrap_or("(none)");
    println!("{} {}", "Target:".emphasis(), target.accent());
    if basket.is_empty() {
        println!("{}", "Basket is empty".muted());
        return Ok(());
    }
    for id in &basket.ids {
        let summary = ctx
            .store
            .commit(id)
            .map_or_else(|| "(not imported)".to_string(), |c| c.summary().to_string());
        println!("  {} {}", ctx.commit_label(id), summary);
    }
    Ok(())
}

/// Run `basket fix` - stage declared dependencies of one commit, or of
/// every staged commit
pub fn run_fix(config: Config, id: Option<&str>) -> Result<()> {
    let ctx = CommandContext::load(config)?;
    let mut basket = ctx.basket()?;
    let of = id.map(|text| ctx.resolve(text)).transpose()?;
    let added = basket.add_dependencies(&ctx.store, of.as_ref());
    if added.is_empty() {
        println!("{}", "No dependencies to add".muted());
        return Ok(());
    }
    ctx.save_basket(&basket)?;
    for id in &added {
        println!("{} Added dependency {}", check(), ctx.commit_label(id));
    }
    Ok(())
}
