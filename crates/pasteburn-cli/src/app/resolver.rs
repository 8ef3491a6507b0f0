//! Path resolution for the config file.

use std::path::{Path, PathBuf};

use crate::cli::Cli;
use crate::config::{default_config_path, read_config, PasteburnConfig};
use crate::errors::CliError;

/// Resolve the config file path from `--config`/`PASTEBURN_CONFIG`, or the
/// XDG default.
pub fn resolve_config_path(cli: &Cli) -> anyhow::Result<PathBuf> {
    match cli.config.as_deref().map(str::trim) {
        Some(value) if !value.is_empty() => Ok(PathBuf::from(value)),
        _ => default_config_path(),
    }
}

/// Load the config, failing with a not-found error that suggests `init`.
pub fn load_config(cli: &Cli) -> anyhow::Result<PasteburnConfig> {
    let path = resolve_config_path(cli)?;
    if !path.exists() {
        return Err(CliError::not_found(
            format!("No config found at {}", path.display()),
            missing_config_message(&path),
        )
        .into());
    }
    read_config(&path)
}

/// Hint shown when the config file is missing.
fn missing_config_message(config_path: &Path) -> String {
    format!(
        "Run:\n  pasteburn init\n\nOr point at an existing config:\n  PASTEBURN_CONFIG={} pasteburn <command>",
        config_path.display()
    )
}
