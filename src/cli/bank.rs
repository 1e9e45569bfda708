//! Bank CLI commands

use clap::Subcommand;

use crate::app::AppContext;
use crate::display::bank::{format_bank_list, format_preset_list};
use crate::error::{TrackerError, TrackerResult};
use crate::models::{find_preset, search_presets};

/// Bank subcommands
#[derive(Subcommand)]
pub enum BankCommands {
    /// Add a bank
    Add {
        /// Bank name, or a preset key/name with --preset
        name: String,
        /// Look the name up in the popular bank list
        #[arg(long)]
        preset: bool,
    },
    /// List popular banks that can be added with --preset
    Presets {
        /// Only show banks whose name contains this text
        search: Option<String>,
    },
    /// List banks
    List,
    /// Delete a bank. Transactions that reference it are kept.
    Delete {
        /// Bank name, ID, or unique ID prefix
        bank: String,
        /// Skip confirmation
        #[arg(short, long)]
        force: bool,
    },
}

/// Handle a bank command
pub fn handle_bank_command(ctx: &AppContext, cmd: BankCommands) -> TrackerResult<()> {
    let store = &ctx.store;

    match cmd {
        BankCommands::Add { name, preset } => {
            let name = if preset {
                find_preset(&name)
                    .map(|p| p.name.to_string())
                    .ok_or_else(|| TrackerError::NotFound {
                        entity_type: "Preset bank",
                        identifier: name.clone(),
                    })?
            } else {
                name
            };
            let bank = store.add_bank(&name)?;
            println!("Added bank: {}", bank.name);
            println!("  ID: {}", bank.id);
        }

        BankCommands::Presets { search } => {
            let presets = search_presets(search.as_deref().unwrap_or(""));
            print!("{}", format_preset_list(&presets, &store.banks()));
        }

        BankCommands::List => {
            print!("{}", format_bank_list(&store.banks(), &store.transactions()));
        }

        BankCommands::Delete { bank, force } => {
            let id = store.resolve_bank_id(&bank)?;
            let in_use = store
                .transactions()
                .iter()
                .filter(|t| t.bank_id.as_ref() == Some(&id))
                .count();

            if !force {
                println!("About to delete bank: {}", store.bank_name(&id));
                if in_use > 0 {
                    println!(
                        "{} transaction(s) reference this bank and will show it as unknown.",
                        in_use
                    );
                }
                println!();
                println!("Use --force to confirm deletion");
                return Ok(());
            }

            let deleted = store.delete_bank(&id)?;
            println!("Deleted bank: {}", deleted.name);
        }
    }

    Ok(())
}
