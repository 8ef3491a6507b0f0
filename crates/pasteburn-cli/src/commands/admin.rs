use chrono::Utc;
use tracing::debug;

use pasteburn_core::{master_key_hash, Status};

use crate::app::AppContext;
use crate::cli::DeleteArgs;
use crate::errors::CliError;

use super::parse_paste_id;

pub fn handle_delete(ctx: &AppContext, args: &DeleteArgs) -> anyhow::Result<()> {
    let short_id = parse_paste_id(&args.id)?;
    let engine = ctx.engine()?;
    let result = engine.admin_delete(&args.key_hash, &short_id);
    debug!(status = %Status::of_admin_delete(&result), "Admin delete finished");
    let removed = result.map_err(CliError::from)?;

    if !ctx.quiet() {
        if removed {
            println!("Deleted paste {}", short_id);
        } else {
            println!("No paste {} (already gone)", short_id);
        }
    }
    Ok(())
}

/// Print the credential accepted by `delete` during the current UTC hour.
pub fn handle_admin_key(ctx: &AppContext) -> anyhow::Result<()> {
    let config = ctx.config()?;
    let master_key = config.master_key().ok_or_else(|| {
        CliError::invalid_input(
            "No master key configured\nHint: Set security.master_key in the config file.",
        )
    })?;
    println!("{}", master_key_hash(&master_key, Utc::now()));
    Ok(())
}
