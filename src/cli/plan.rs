//! Plan command - render the merge command and message for the basket

use crate::cli::context::CommandContext;
use crate::cli::style::{Stylize, arrow};
use anstream::println;
use mfc_tracker::config::Config;
use mfc_tracker::error::Result;
use mfc_tracker::merge::{MergePlan, MergePlanOptions, create_merge_plan};

/// Run the plan command
pub fn run_plan(config: Config, summarized: bool) -> Result<()> {
    let ctx = CommandContext::load(config)?;
    let basket = ctx.basket()?;
    if basket.is_empty() {
        println!("{}", "Basket is empty, nothing to merge".muted());
        return Ok(());
    }
    let options = MergePlanOptions {
        operator: ctx.config.operator(),
        summarized,
    };
    let plan = create_merge_plan(&ctx.store, &basket, &options)?;
    report_plan(&ctx, &plan);
    Ok(())
}

fn report_plan(ctx: &CommandContext, plan: &MergePlan) {
    println!(
        "{} {} {} ({} commit(s))",
        "Merge".emphasis(),
        arrow(),
        plan.target_branch.accent(),
        plan.commits.len()
    );
    let labels: Vec<String> = plan.commits.iter().map(|id| ctx.commit_label(id)).collect();
    println!("  {}", labels.join(" "));
    println!();

    if plan.has_alerts() {
        for alert in plan.alerts.values() {
            println!("{} {}", "⚠".warn(), alert.to_string().warn());
        }
        println!("{}", "Run 'mfct basket fix' to stage known dependencies.".muted());
        println!();
    }

    if let Some(command) = &plan.command {
        println!("{}", "Command:".emphasis());
        println!("{command}");
        println!();
    }
    if let Some(message) = &plan.message {
        println!("{}", "Message:".emphasis());
        println!("{}", message.trim_end());
    }
}
