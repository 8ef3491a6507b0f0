//! Application context for the Pasteburn CLI.
//!
//! Bundles CLI arguments with a lazily loaded config and engine, so a
//! command that never touches the store never opens it.

use std::sync::Arc;

use once_cell::unsync::OnceCell;
use tracing::debug;

use pasteburn_core::{PasteEngine, PrintableText, SqlitePasteStore};

use crate::cli::Cli;
use crate::config::PasteburnConfig;
use crate::errors::CliError;

use super::resolver::load_config;

pub struct AppContext<'a> {
    cli: &'a Cli,
    config: OnceCell<PasteburnConfig>,
    engine: OnceCell<PasteEngine>,
}

impl<'a> AppContext<'a> {
    pub fn new(cli: &'a Cli) -> Self {
        Self {
            cli,
            config: OnceCell::new(),
            engine: OnceCell::new(),
        }
    }

    pub fn quiet(&self) -> bool {
        self.cli.quiet
    }

    /// Get the config, loading it lazily if needed.
    pub fn config(&self) -> anyhow::Result<&PasteburnConfig> {
        self.config.get_or_try_init(|| load_config(self.cli))
    }

    /// Get the engine, connecting to the store on first use.
    ///
    /// A store that cannot be opened is fatal for the command.
    pub fn engine(&self) -> anyhow::Result<&PasteEngine> {
        self.engine.get_or_try_init(|| {
            let config = self.config()?;
            let store_config = config.store_config();
            debug!(path = %store_config.path.display(), "Opening paste store");
            let store = SqlitePasteStore::connect(&store_config).map_err(|e| {
                CliError::Upstream(format!(
                    "Cannot open paste store at {}: {}",
                    store_config.path.display(),
                    e
                ))
            })?;

            let engine_config = config.engine_config();
            let detect_abuse = engine_config.detect_abuse;
            let mut engine =
                PasteEngine::new(Arc::new(store), config.server_key()?, engine_config)
                    .map_err(CliError::from)?;
            if detect_abuse {
                engine = engine.with_validator(PrintableText);
            }
            Ok(engine)
        })
    }
}

impl Drop for AppContext<'_> {
    fn drop(&mut self) {
        if let Some(engine) = self.engine.get() {
            engine.close();
        }
    }
}
