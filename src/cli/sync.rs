//! Sync CLI commands
//!
//! Connects the dataset to Google Drive and moves it back and forth.

use clap::Subcommand;

use crate::app::AppContext;
use crate::display::sync::format_sync_status;
use crate::error::TrackerResult;
use crate::remote::ConsentPrompt;

/// Sync subcommands
#[derive(Subcommand)]
pub enum SyncCommands {
    /// Sign in to Google Drive and back up current data
    Connect,
    /// Sign out of Google Drive
    Disconnect,
    /// Back up current data now
    Push,
    /// Replace local data with the Google Drive backup
    Pull {
        /// Skip confirmation
        #[arg(short, long)]
        force: bool,
    },
    /// Show sync status
    Status,
}

/// Shows the device-flow code on stderr so stdout stays clean
pub struct StderrPrompt;

impl ConsentPrompt for StderrPrompt {
    fn show_code(&self, verification_url: &str, user_code: &str) {
        eprintln!();
        eprintln!("To allow m-track to back up to Google Drive, visit:");
        eprintln!("  {}", verification_url);
        eprintln!("and enter the code: {}", user_code);
        eprintln!();
        eprintln!("Waiting for approval...");
    }
}

/// Handle a sync command
pub async fn handle_sync_command(ctx: &AppContext, cmd: SyncCommands) -> TrackerResult<()> {
    let sync = &ctx.sync;

    match cmd {
        SyncCommands::Connect => {
            sync.connect().await?;
            println!(
                "Connected to Google Drive. Backed up {} transactions.",
                ctx.store.transactions().len()
            );
        }

        SyncCommands::Disconnect => {
            // Always ends disconnected; a failed revoke is only reported.
            match sync.disconnect().await {
                Ok(()) => println!("Disconnected from Google Drive."),
                Err(e) => println!("Disconnected locally, but sign-out failed: {}", e),
            }
        }

        SyncCommands::Push => {
            sync.push_to_remote().await?;
            println!(
                "Backed up {} transactions and {} banks.",
                ctx.store.transactions().len(),
                ctx.store.banks().len()
            );
        }

        SyncCommands::Pull { force } => {
            if !force {
                println!("WARNING: This will replace ALL local data with the Google Drive backup!");
                println!("To proceed, run again with --force flag:");
                println!("  mtrack sync pull --force");
                return Ok(());
            }

            let snapshot = ctx.restore_from_remote().await?;
            if snapshot.is_empty() {
                println!("The Google Drive backup is empty; local data was cleared.");
                return Ok(());
            }
            println!(
                "Restored {} transactions and {} banks from Google Drive.",
                snapshot.transactions.len(),
                snapshot.banks.len()
            );
        }

        SyncCommands::Status => {
            print!("{}", format_sync_status(&sync.status()));
        }
    }

    Ok(())
}
