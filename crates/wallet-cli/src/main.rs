//! Wallet CLI - Command-line front end for the wallet backend.

mod commands;
mod hooks;
mod output;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use commands::{Context, TransactionArgs};
use std::process::ExitCode;
use tracing::debug;
use wallet_api::{
    AnalyticsParams, BudgetParams, GroupBy, SnapshotFilters, TransactionFilters, TransactionType,
};
use wallet_auth::ClientError;
use wallet_core::{Config, Paths};

/// Wallet CLI - Track income, expenses and balances.
#[derive(Parser)]
#[command(name = "wallet")]
#[command(about = "Wallet CLI for personal finance tracking")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format (text or json)
    #[arg(short, long, default_value = "text", global = true)]
    format: output::OutputFormat,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Backend base URL, including the /api prefix
    #[arg(long, global = true, env = "WALLET_API_URL")]
    api_url: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Login with email and password
    Login,

    /// Create an account and log in
    Register,

    /// Logout and clear session
    Logout,

    /// Show the signed-in user
    Whoami,

    /// Check authentication status
    Status,

    /// Manage transactions
    Transactions {
        #[command(subcommand)]
        command: TransactionCommands,
    },

    /// List currencies, storage accounts, income sources and expense categories
    References,

    /// Manage balance snapshots
    Snapshots {
        #[command(subcommand)]
        command: SnapshotCommands,
    },

    /// Reports
    Analytics {
        #[command(subcommand)]
        command: AnalyticsCommands,
    },

    /// Account settings
    Account {
        #[command(subcommand)]
        command: AccountCommands,
    },
}

#[derive(Subcommand)]
enum TransactionCommands {
    /// List transactions
    List {
        /// Filter by type (income or expense)
        #[arg(long = "type")]
        kind: Option<TransactionType>,
        /// From date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<NaiveDate>,
        /// To date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<NaiveDate>,
        /// Filter by storage account ID
        #[arg(long)]
        account: Option<i64>,
        /// Filter by income source ID
        #[arg(long)]
        source: Option<i64>,
        /// Filter by expense category ID
        #[arg(long)]
        category: Option<i64>,
        /// Maximum number of rows
        #[arg(short, long, default_value = "50")]
        limit: u32,
        /// Rows to skip
        #[arg(long)]
        offset: Option<u32>,
    },
    /// Add a transaction
    Add(TransactionArgs),
    /// Delete a transaction
    Delete {
        /// Transaction ID
        id: i64,
    },
}

#[derive(Subcommand)]
enum SnapshotCommands {
    /// List balance snapshots
    List {
        /// Filter by storage account ID
        #[arg(long)]
        account: Option<i64>,
        #[arg(long)]
        from: Option<NaiveDate>,
        #[arg(long)]
        to: Option<NaiveDate>,
    },
}

/// Date range and grouping shared by the period reports.
#[derive(clap::Args)]
struct RangeArgs {
    /// From date (YYYY-MM-DD)
    #[arg(long)]
    from: NaiveDate,
    /// To date (YYYY-MM-DD)
    #[arg(long)]
    to: NaiveDate,
    /// Grouping period (month, quarter, year)
    #[arg(long, value_parser = parse_group_by)]
    group_by: Option<GroupBy>,
}

impl RangeArgs {
    fn into_params(self) -> AnalyticsParams {
        AnalyticsParams {
            date_from: self.from,
            date_to: self.to,
            group_by: self.group_by,
        }
    }
}

fn parse_group_by(value: &str) -> Result<GroupBy, String> {
    match value.to_ascii_lowercase().as_str() {
        "month" => Ok(GroupBy::Month),
        "quarter" => Ok(GroupBy::Quarter),
        "year" => Ok(GroupBy::Year),
        other => Err(format!("unknown grouping: {other}")),
    }
}

#[derive(Subcommand)]
enum AnalyticsCommands {
    /// Income, expense and profit per period
    Summary(RangeArgs),
    /// Income by source per period
    Income(RangeArgs),
    /// Balances by storage account per period
    Balances(RangeArgs),
    /// Budget template and spending vs budget
    Budget {
        #[arg(long)]
        year: Option<i32>,
        #[arg(long)]
        month: Option<u32>,
    },
}

#[derive(Subcommand)]
enum AccountCommands {
    /// Change the account email
    Email {
        /// New email (prompted if omitted)
        new_email: Option<String>,
    },
    /// Change the account password
    Password,
}

async fn run(ctx: &Context, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Login => commands::login(ctx).await,
        Commands::Register => commands::register(ctx).await,
        Commands::Logout => commands::logout(ctx).await,
        Commands::Whoami => commands::whoami(ctx).await,
        Commands::Status => commands::status(ctx).await,
        Commands::Transactions { command } => match command {
            TransactionCommands::List {
                kind,
                from,
                to,
                account,
                source,
                category,
                limit,
                offset,
            } => {
                let filters = TransactionFilters {
                    kind,
                    date_from: from,
                    date_to: to,
                    income_source_id: source,
                    expense_category_id: category,
                    storage_account_id: account,
                    limit: Some(limit),
                    offset,
                };
                commands::transactions_list(ctx, filters).await
            }
            TransactionCommands::Add(args) => commands::transactions_add(ctx, args).await,
            TransactionCommands::Delete { id } => commands::transactions_delete(ctx, id).await,
        },
        Commands::References => commands::references(ctx).await,
        Commands::Snapshots { command } => match command {
            SnapshotCommands::List { account, from, to } => {
                let filters = SnapshotFilters {
                    storage_account_id: account,
                    date_from: from,
                    date_to: to,
                };
                commands::snapshots_list(ctx, filters).await
            }
        },
        Commands::Analytics { command } => match command {
            AnalyticsCommands::Summary(range) => {
                commands::analytics_summary(ctx, range.into_params()).await
            }
            AnalyticsCommands::Income(range) => {
                commands::analytics_income(ctx, range.into_params()).await
            }
            AnalyticsCommands::Balances(range) => {
                commands::analytics_balances(ctx, range.into_params()).await
            }
            AnalyticsCommands::Budget { year, month } => {
                commands::analytics_budget(ctx, BudgetParams { year, month }).await
            }
        },
        Commands::Account { command } => match command {
            AccountCommands::Email { new_email } => commands::account_email(ctx, new_email).await,
            AccountCommands::Password => commands::account_password(ctx).await,
        },
    }
}

/// Whether the error was already shown through the notification sink or
/// the login redirect.
fn already_reported(error: &anyhow::Error) -> bool {
    matches!(
        error.downcast_ref::<ClientError>(),
        Some(
            ClientError::Api(_)
                | ClientError::Transport(_)
                | ClientError::RefreshFailed(_)
                | ClientError::AuthExpired(_)
        )
    )
}

fn load_config(cli: &Cli, paths: &Paths) -> anyhow::Result<Config> {
    let mut config = Config::load(paths)?;
    if let Some(api_url) = &cli.api_url {
        config.api_url = api_url.clone();
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let format = cli.format;

    let paths = match Paths::new() {
        Ok(paths) => paths,
        Err(e) => {
            output::print_error(&e.to_string(), format);
            return ExitCode::FAILURE;
        }
    };
    let config = match load_config(&cli, &paths) {
        Ok(config) => config,
        Err(e) => {
            output::print_error(&format!("{:#}", e), format);
            return ExitCode::FAILURE;
        }
    };

    wallet_core::init_logging("wallet-cli", &config.log_level, Some(paths.log_file()), false);
    debug!(api_url = %config.api_url, "Starting");

    let ctx = match Context::new(paths, config, format) {
        Ok(ctx) => ctx,
        Err(e) => {
            output::print_error(&format!("{:#}", e), format);
            return ExitCode::FAILURE;
        }
    };

    let result = run(&ctx, cli.command).await;

    if let Err(e) = &result {
        if !already_reported(e) {
            output::print_error(&format!("{:#}", e), format);
        }
    }

    if result.is_err() || ctx.redirect.triggered() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
