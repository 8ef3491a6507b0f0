use tracing::info;

use crate::app::AppContext;
use crate::errors::CliError;

pub fn handle_purge(ctx: &AppContext) -> anyhow::Result<()> {
    let removed = ctx.engine()?.purge_expired().map_err(CliError::from)?;
    info!(removed, "Purged expired pastes");
    if !ctx.quiet() {
        println!("Purged {} expired paste(s)", removed);
    }
    Ok(())
}

pub fn handle_check(ctx: &AppContext) -> anyhow::Result<()> {
    match ctx.engine()?.check() {
        Ok(()) => {
            if !ctx.quiet() {
                println!("Integrity check: OK");
                println!("- sqlite integrity: OK");
                println!("- format version: OK");
                println!("- passphrase flags: OK");
                println!("- submitter addresses: OK");
            }
            Ok(())
        }
        Err(err) => {
            eprintln!("Integrity check: FAILED");
            eprintln!("- error: {}", err);
            eprintln!("Hint: Restore the store from a backup before serving pastes again.");
            Err(CliError::from(err).into())
        }
    }
}
