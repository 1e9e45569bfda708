//! Export, configuration, and reset commands

use std::path::Path;

use crate::app::AppContext;
use crate::error::TrackerResult;
use crate::export::{export_to_file, restrict_to_range};

use super::parse_day;

/// Write the dataset as JSON, optionally only transactions within a date range
pub fn handle_export_command(
    ctx: &AppContext,
    output: &Path,
    from: Option<&str>,
    to: Option<&str>,
) -> TrackerResult<()> {
    let from = from.map(parse_day).transpose()?;
    let to = to.map(parse_day).transpose()?;

    let snapshot = restrict_to_range(ctx.store.snapshot_for_export(), from, to);
    export_to_file(&snapshot, output)?;

    println!(
        "Exported {} transactions and {} banks to {}",
        snapshot.transactions.len(),
        snapshot.banks.len(),
        output.display()
    );
    Ok(())
}

/// Show paths, settings, and whether remote backup is configured
pub fn handle_config_command(ctx: &AppContext) -> TrackerResult<()> {
    let remote = ctx.settings.effective_remote();
    let configured = |v: &Option<String>| if v.is_some() { "set" } else { "not set" };

    println!("m-track Configuration");
    println!("=====================");
    println!("Base directory:  {}", ctx.paths.base_dir().display());
    println!("Data directory:  {}", ctx.paths.data_dir().display());
    println!("Settings file:   {}", ctx.paths.settings_file().display());
    println!("Token cache:     {}", ctx.paths.token_file().display());
    println!();
    println!("Settings:");
    println!("  Currency symbol: {}", ctx.settings.currency_symbol);
    println!("  Date format:     {}", ctx.settings.date_format);
    println!("  Sync debounce:   {}s", ctx.settings.sync.debounce_secs);
    println!();
    println!("Google Drive backup:");
    println!("  Client ID:     {}", configured(&remote.client_id));
    println!("  Client secret: {}", configured(&remote.client_secret));
    println!("  API key:       {}", configured(&remote.api_key));
    Ok(())
}

/// Delete all local data. The remote backup is left alone.
pub fn handle_reset_command(ctx: &AppContext, force: bool) -> TrackerResult<()> {
    if !force {
        println!(
            "WARNING: This will delete {} transactions and {} banks from this device.",
            ctx.store.transactions().len(),
            ctx.store.banks().len()
        );
        println!("The Google Drive backup, if any, is not touched.");
        println!("To proceed, run again with --force flag:");
        println!("  mtrack reset --force");
        return Ok(());
    }

    ctx.store.clear_all()?;
    println!("All local data deleted.");
    Ok(())
}
