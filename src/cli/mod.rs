//! Command-line interface.

pub mod accounts;
pub mod completions;
pub mod console;
pub mod deploy;
pub mod init;
pub mod inventory;
pub mod output;
pub mod status;

use clap::{Parser, Subcommand};

/// Opsdeck - An operator console for multi-account cloud infrastructure.
#[derive(Parser)]
#[command(
    name = "opsdeck",
    about = "An operator console for multi-account cloud infrastructure",
    version,
    after_help = "See clearly. Ship safely. ☁"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Top-level commands.
#[derive(Subcommand)]
pub enum Command {
    /// Initialize opsdeck in the current directory
    Init {
        /// Overwrite an existing configuration
        #[arg(long)]
        force: bool,
    },

    /// Show configuration and deployment overview
    Status,

    /// Manage configured accounts and sessions
    Accounts {
        #[command(subcommand)]
        action: AccountAction,
    },

    /// Browse resource inventory
    Inventory {
        #[command(subcommand)]
        action: InventoryAction,
    },

    /// Manage pipeline deployments
    Deploy {
        #[command(subcommand)]
        action: DeployAction,
    },

    /// Launch the interactive console
    Console,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Account subcommands.
#[derive(Subcommand)]
pub enum AccountAction {
    /// List configured accounts
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List enabled regions for an account
    Regions {
        /// Account id
        account: String,
    },

    /// Drop cached sessions for an account and re-authenticate
    Reconnect {
        /// Account id
        account: String,
        /// Only this region (all regions if omitted)
        #[arg(long)]
        region: Option<String>,
    },
}

/// Inventory subcommands.
#[derive(Subcommand)]
pub enum InventoryAction {
    /// List compute instances in an account/region
    Instances {
        /// Account id
        #[arg(long)]
        account: String,
        /// Concrete region (wildcards like "all" are rejected)
        #[arg(long)]
        region: String,
        /// Filter by lifecycle state (running, stopped, pending, stopping)
        #[arg(long)]
        state: Option<String>,
        /// Filter by environment tag
        #[arg(long)]
        environment: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List infrastructure stacks in an account/region
    Stacks {
        /// Account id
        #[arg(long)]
        account: String,
        /// Concrete region (wildcards like "all" are rejected)
        #[arg(long)]
        region: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Deployment subcommands.
#[derive(Subcommand)]
pub enum DeployAction {
    /// List tracked deployments, most recent first
    List {
        /// Filter by environment (dev, staging, production)
        #[arg(long)]
        environment: Option<String>,
        /// Filter by status (running, success, failed, pending_approval)
        #[arg(long)]
        status: Option<String>,
        /// Oldest first instead of newest first
        #[arg(long)]
        asc: bool,
        /// Group records by commit for promotion history
        #[arg(long)]
        group_by_commit: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List deployments waiting at the approval gate
    Pending {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show one deployment in full
    Show {
        /// Pipeline id
        pipeline_id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Approve a pending deployment
    Approve {
        /// Pipeline id
        pipeline_id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Reject a pending deployment
    Reject {
        /// Pipeline id
        pipeline_id: String,
        /// Rejection reason (prompted for interactively if omitted)
        #[arg(long)]
        reason: Option<String>,
    },

    /// Trigger a new pipeline execution
    Trigger {
        /// Repository (e.g. org/infra)
        #[arg(long)]
        repo: String,
        /// Branch to deploy
        #[arg(long, default_value = "main")]
        branch: String,
        /// Target environment (dev, staging, production)
        #[arg(long)]
        environment: String,
        /// Pipeline parameter as key=value (repeatable)
        #[arg(long = "param")]
        params: Vec<String>,
        /// Require the approval gate regardless of environment policy
        #[arg(long, conflicts_with = "no_approval")]
        require_approval: bool,
        /// Skip the approval gate regardless of environment policy
        #[arg(long)]
        no_approval: bool,
    },

    /// Record the external completion event for a running deployment
    Complete {
        /// Pipeline id
        pipeline_id: String,
        /// Record a failed completion instead of success
        #[arg(long)]
        failed: bool,
    },
}

/// Execute a command.
pub fn execute(command: Command) -> crate::error::Result<()> {
    use Command::*;

    match command {
        Init { force } => init::execute(force),
        Status => status::execute(),
        Accounts { action } => match action {
            AccountAction::List { json } => accounts::list(json),
            AccountAction::Regions { account } => accounts::regions(&account),
            AccountAction::Reconnect { account, region } => {
                accounts::reconnect(&account, region.as_deref())
            }
        },
        Inventory { action } => match action {
            InventoryAction::Instances {
                account,
                region,
                state,
                environment,
                json,
            } => inventory::instances(
                &account,
                &region,
                state.as_deref(),
                environment.as_deref(),
                json,
            ),
            InventoryAction::Stacks {
                account,
                region,
                json,
            } => inventory::stacks(&account, &region, json),
        },
        Deploy { action } => match action {
            DeployAction::List {
                environment,
                status,
                asc,
                group_by_commit,
                json,
            } => deploy::list(
                environment.as_deref(),
                status.as_deref(),
                asc,
                group_by_commit,
                json,
            ),
            DeployAction::Pending { json } => deploy::pending(json),
            DeployAction::Show { pipeline_id, json } => deploy::show(&pipeline_id, json),
            DeployAction::Approve { pipeline_id, yes } => deploy::approve(&pipeline_id, yes),
            DeployAction::Reject {
                pipeline_id,
                reason,
            } => deploy::reject(&pipeline_id, reason.as_deref()),
            DeployAction::Trigger {
                repo,
                branch,
                environment,
                params,
                require_approval,
                no_approval,
            } => deploy::trigger(
                &repo,
                &branch,
                &environment,
                &params,
                require_approval,
                no_approval,
            ),
            DeployAction::Complete {
                pipeline_id,
                failed,
            } => deploy::complete(&pipeline_id, failed),
        },
        Console => console::execute(),
        Completions { shell } => completions::execute(shell),
    }
}
