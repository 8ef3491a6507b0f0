use std::path::PathBuf;

use tracing::info;

use pasteburn_core::{PasteStore, ServerKey, SqlitePasteStore};

use crate::app::resolve_config_path;
use crate::cli::{Cli, InitArgs};
use crate::config::{default_store_path, write_config, PasteburnConfig};
use crate::errors::CliError;

pub fn handle_init(cli: &Cli, args: &InitArgs) -> anyhow::Result<()> {
    let config_path = resolve_config_path(cli)?;
    if config_path.exists() && !args.force {
        return Err(CliError::invalid_input(format!(
            "Config already exists at {}\nHint: Pass --force to replace it. Existing pastes become unreadable.",
            config_path.display()
        ))
        .into());
    }

    let host = args.host.trim();
    if host.is_empty() {
        return Err(CliError::invalid_input("Host cannot be empty").into());
    }

    let store_path = match args.store.as_deref().map(str::trim) {
        Some(path) if !path.is_empty() => PathBuf::from(path),
        _ => default_store_path()?,
    };

    let key = ServerKey::generate();
    let config = PasteburnConfig::new(
        host.to_string(),
        store_path,
        &key,
        args.master_key.clone(),
        args.captcha,
    );

    // Create the store before the config so a failed init leaves nothing
    // pointing at a missing database.
    let store_config = config.store_config();
    let store = SqlitePasteStore::connect(&store_config).map_err(|e| {
        CliError::Upstream(format!(
            "Cannot create paste store at {}: {}",
            store_config.path.display(),
            e
        ))
    })?;
    store.close();

    write_config(&config_path, &config)?;
    info!(config = %config_path.display(), "Initialized pasteburn");

    if !cli.quiet {
        println!("Initialized pasteburn");
        println!("- config: {}", config_path.display());
        println!("- store: {}", store_config.path.display());
        println!("- recipient: {}", key.public_key());
        if config.master_key().is_none() {
            println!("Hint: No master key set; administrative deletes are disabled.");
        }
    }
    Ok(())
}
