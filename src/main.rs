//! mfct - MFC tracker command line

mod cli;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use mfc_tracker::config::Config;
use mfc_tracker::filter::MfcState;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "mfct",
    about = "Track which trunk commits still need to be merged into maintenance branches",
    version
)]
struct Cli {
    /// Config file (default: <config dir>/mfc-tracker/config.toml)
    #[arg(long, global = true, env = "MFCT_CONFIG")]
    config: Option<PathBuf>,

    /// More log output on stderr (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register, list, or remove tracked branches
    Branch {
        #[command(subcommand)]
        action: BranchAction,
    },

    /// Import new commits and reconcile merge state
    Import {
        /// Only import this branch
        #[arg(long)]
        branch: Option<String>,

        /// Start at this revision or hash instead of the last imported one
        #[arg(long)]
        start: Option<String>,

        /// Fetch at most this many log entries per branch
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Show trunk commits and their MFC state for a branch
    Status {
        /// Branch name (default: the basket's target branch)
        branch: Option<String>,

        /// Filter terms: r1-r9, author, author@path, @path
        #[arg(long, short)]
        filter: Option<String>,

        /// Only commits in these states (ready, waiting, other)
        #[arg(long, value_delimiter = ',')]
        state: Vec<MfcState>,

        /// Show at most this many commits
        #[arg(long, short)]
        limit: Option<usize>,
    },

    /// Stage commits for the next merge
    Basket {
        #[command(subcommand)]
        action: BasketAction,
    },

    /// Print the merge command and commit message for the basket
    Plan {
        /// One summary line per commit instead of full messages
        #[arg(long)]
        summarized: bool,
    },

    /// Show, set, or delete your note on a commit
    Note {
        /// Revision or hash prefix
        id: String,

        /// Note text (omit to show every operator's note)
        #[arg(conflicts_with = "delete")]
        text: Option<String>,

        /// Delete your note
        #[arg(long, short)]
        delete: bool,
    },

    /// Manage commits you will never merge
    Never {
        #[command(subcommand)]
        action: NeverAction,
    },
}

#[derive(Subcommand)]
enum NeverAction {
    /// Hide commits from your status view
    Add {
        /// Revisions or hash prefixes
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Show commits again
    Remove {
        /// Revisions or hash prefixes
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// List hidden commits, newest first
    List,
}

#[derive(Subcommand)]
enum BranchAction {
    /// Register a branch (or the trunk)
    Add {
        /// Unique short name
        name: String,

        /// Repository path (svn) or ref (git)
        path: String,

        /// Trunk revision or hash the branch diverged at (default: ask the VCS)
        #[arg(long)]
        branch_point: Option<String>,

        /// Register the trunk
        #[arg(long)]
        trunk: bool,
    },

    /// List tracked branches
    List,

    /// Remove a branch and its merge records
    Delete {
        /// Branch name
        name: String,

        /// Do not ask for confirmation
        #[arg(long, short)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum BasketAction {
    /// Stage commits
    Add {
        /// Target branch name (required for the first commit)
        #[arg(long, short)]
        branch: Option<String>,

        /// Revisions or hash prefixes
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Unstage commits
    Remove {
        /// Revisions or hash prefixes
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Unstage everything
    Clear {
        /// Do not ask for confirmation
        #[arg(long, short)]
        yes: bool,
    },

    /// Show staged commits
    Show,

    /// Stage the declared dependencies of staged commits
    Fix {
        /// Only this commit's dependencies (default: every staged commit)
        id: Option<String>,
    },
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "mfc_tracker=info",
        _ => "mfc_tracker=debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Branch { action } => match action {
            BranchAction::Add {
                name,
                path,
                branch_point,
                trunk,
            } => {
                cli::branch::run_add(
                    config,
                    cli::branch::AddOptions {
                        name,
                        path,
                        branch_point,
                        trunk,
                    },
                )
                .await?;
            }
            BranchAction::List => cli::branch::run_list(config)?,
            BranchAction::Delete { name, yes } => {
                cli::branch::run_delete(config, &name, yes).await?;
            }
        },
        Commands::Import {
            branch,
            start,
            limit,
        } => {
            cli::run_import(
                config,
                cli::ImportArgs {
                    branch,
                    start,
                    limit,
                },
            )
            .await?;
        }
        Commands::Status {
            branch,
            filter,
            state,
            limit,
        } => {
            cli::run_status(
                config,
                cli::StatusOptions {
                    branch,
                    filter,
                    states: state,
                    limit,
                },
            )?;
        }
        Commands::Basket { action } => match action {
            BasketAction::Add { branch, ids } => {
                cli::basket::run_add(config, branch.as_deref(), &ids)?;
            }
            BasketAction::Remove { ids } => cli::basket::run_remove(config, &ids)?,
            BasketAction::Clear { yes } => cli::basket::run_clear(config, yes)?,
            BasketAction::Show => cli::basket::run_show(config)?,
            BasketAction::Fix { id } => cli::basket::run_fix(config, id.as_deref())?,
        },
        Commands::Plan { summarized } => cli::run_plan(config, summarized)?,
        Commands::Note { id, text, delete } => {
            let action = match (text, delete) {
                (_, true) => cli::profile::NoteAction::Delete,
                (Some(text), false) => cli::profile::NoteAction::Set(text),
                (None, false) => cli::profile::NoteAction::Show,
            };
            cli::profile::run_note(config, &id, action).await?;
        }
        Commands::Never { action } => match action {
            NeverAction::Add { ids } => cli::profile::run_never_add(config, &ids).await?,
            NeverAction::Remove { ids } => cli::profile::run_never_remove(config, &ids).await?,
            NeverAction::List => cli::profile::run_never_list(config)?,
        },
    }

    Ok(())
}
