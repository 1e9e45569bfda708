use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};

use mtrack::app::AppContext;
use mtrack::cli::{
    handle_bank_command, handle_config_command, handle_export_command, handle_reset_command,
    handle_search_command, handle_summary_command, handle_sync_command,
    handle_transaction_command, BankCommands, SearchArgs, StderrPrompt, SyncCommands,
    TransactionCommands,
};
use mtrack::config::{Settings, TrackerPaths};

#[derive(Parser)]
#[command(
    name = "mtrack",
    version,
    about = "Personal income and expense tracker with Google Drive backup",
    long_about = "m-track records income and expenses by payment mode, shows a \
                  monthly dashboard, and keeps a backup of your data in your own \
                  Google Drive."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Transaction management commands
    #[command(subcommand, alias = "transaction")]
    Txn(TransactionCommands),

    /// Bank management commands
    #[command(subcommand)]
    Bank(BankCommands),

    /// Monthly dashboard
    Summary {
        /// Month to summarize (YYYY-MM), defaults to the current month
        #[arg(short, long)]
        month: Option<String>,
        /// Show all-time totals instead
        #[arg(long, conflicts_with = "month")]
        all: bool,
    },

    /// Search transactions
    Search(SearchArgs),

    /// Export all data as JSON
    Export {
        /// Output file path
        output: PathBuf,
        /// Only transactions on or after this day (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,
        /// Only transactions on or before this day (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,
    },

    /// Google Drive backup commands
    #[command(subcommand)]
    Sync(SyncCommands),

    /// Show current configuration and paths
    Config,

    /// Delete all local data
    Reset {
        /// Skip confirmation
        #[arg(short, long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("m-track - personal income and expense tracker");
        println!();
        println!("Run 'mtrack --help' for usage information.");
        return Ok(());
    };

    // Initialize paths and settings
    let paths = TrackerPaths::new()?;
    let settings = Settings::load_or_create(&paths)?;

    let ctx = AppContext::open(paths, settings, Arc::new(StderrPrompt))?;
    ctx.sync.refresh_status().await;

    match command {
        Commands::Txn(cmd) => handle_transaction_command(&ctx, cmd)?,
        Commands::Bank(cmd) => handle_bank_command(&ctx, cmd)?,
        Commands::Summary { month, all } => handle_summary_command(&ctx, month, all)?,
        Commands::Search(args) => handle_search_command(&ctx, args)?,
        Commands::Export { output, from, to } => {
            handle_export_command(&ctx, &output, from.as_deref(), to.as_deref())?
        }
        Commands::Sync(cmd) => handle_sync_command(&ctx, cmd).await?,
        Commands::Config => handle_config_command(&ctx)?,
        Commands::Reset { force } => handle_reset_command(&ctx, force)?,
    }

    // The process would exit before the debounce elapses; push now instead.
    match ctx.sync.flush().await {
        Ok(true) => log::info!("Backed up changes to Google Drive"),
        Ok(false) => {}
        Err(e) => eprintln!("Warning: changes saved locally but backup failed: {}", e),
    }

    Ok(())
}
