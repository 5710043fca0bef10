//! Branch commands - register, list, and remove tracked branches

use crate::cli::context::CommandContext;
use crate::cli::style::{Stylize, check};
use anstream::println;
use dialoguer::Confirm;
use mfc_tracker::branch::{NewBranch, add_branch, delete_branch};
use mfc_tracker::config::Config;
use mfc_tracker::error::{Error, Result};
use mfc_tracker::store::Repository;

/// Options for `branch add`
#[derive(Debug, Clone, Default)]
pub struct AddOptions {
    /// Unique short name
    pub name: String,
    /// VCS path or ref
    pub path: String,
    /// Explicit branch point; queried from the VCS otherwise
    pub branch_point: Option<String>,
    /// Register as trunk
    pub trunk: bool,
}

/// Run `branch add`
#[allow(clippy::future_not_send)]
pub async fn run_add(config: Config, options: AddOptions) -> Result<()> {
    let mut ctx = CommandContext::exclusive(config).await?;
    let scheme = ctx.config.scheme();
    let branch_point = options
        .branch_point
        .as_deref()
        .map(|text| {
            scheme
                .parse_id(text)
                .ok_or_else(|| Error::InvalidInput(format!("{text:?} is not a {scheme} identifier")))
        })
        .transpose()?;

    let source = ctx.log_source()?;
    let branch = add_branch(
        &mut ctx.store,
        source.as_ref(),
        NewBranch {
            name: options.name,
            path: options.path,
            branch_point,
            trunk: options.trunk,
        },
    )
    .await?;
    ctx.save()?;

    let kind = if branch.is_trunk { "trunk" } else { "branch" };
    println!(
        "{} Added {kind} {} at {} (branch point {})",
        check(),
        branch.name.accent(),
        branch.path.emphasis(),
        branch.branch_point.short()
    );
    Ok(())
}

/// Run `branch list`
pub fn run_list(config: Config) -> Result<()> {
    let ctx = CommandContext::load(config)?;
    let branches = ctx.store.branches();
    if branches.is_empty() {
        println!("{}", "No branches registered".muted());
        println!("{}", "Add the trunk first: mfct branch add --trunk NAME PATH".muted());
        return Ok(());
    }

    let width = branches.iter().map(|b| b.name.len()).max().unwrap_or(0);
    for branch in branches {
        let marker = if branch.is_trunk { "trunk" } else { "" };
        let last = branch
            .last_imported
            .as_ref()
            .map_or_else(|| "never".to_string(), |id| id.short());
        println!(
            "  {}  {}  {}  {}",
            format!("{:<width$}", branch.name).accent(),
            branch.path.emphasis(),
            format!("point {} last {last}", branch.branch_point.short()).muted(),
            marker.success()
        );
    }
    Ok(())
}

/// Run `branch delete`
pub async fn run_delete(config: Config, name: &str, yes: bool) -> Result<()> {
    let mut ctx = CommandContext::exclusive(config).await?;
    let path = ctx.branch(name)?.path.clone();

    if !yes
        && !Confirm::new()
            .with_prompt(format!("Delete branch {name} ({path}) and its merge records?"))
            .default(false)
            .interact()
            .map_err(|e| Error::Internal(format!("Failed to read confirmation: {e}")))?
    {
        println!("{}", "Aborted".muted());
        return Ok(());
    }

    let branch = delete_branch(&mut ctx.store, name)?;
    ctx.save()?;
    println!("{} Deleted branch {}", check(), branch.name.accent());
    Ok(())
}
