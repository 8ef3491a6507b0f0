//! Command handlers, one module per command group.

mod admin;
mod init;
mod maintenance;
mod misc;
mod paste;

pub use admin::{handle_admin_key, handle_delete};
pub use init::handle_init;
pub use maintenance::{handle_check, handle_purge};
pub use misc::handle_completions;
pub use paste::{handle_confirm, handle_get, handle_put};

use pasteburn_core::identity::is_well_formed;

use crate::errors::CliError;

/// Pull a paste id out of a bare id or a paste URL.
pub(crate) fn parse_paste_id(input: &str) -> Result<String, CliError> {
    let trimmed = input.trim().trim_end_matches('/');
    let last = trimmed.rsplit('/').next().unwrap_or(trimmed);
    let id = last.split(['?', '#']).next().unwrap_or(last);
    if !is_well_formed(id) {
        return Err(CliError::invalid_input(format!(
            "Invalid paste id: {}",
            input.trim()
        )));
    }
    Ok(id.to_string())
}
