//! Application-level utilities for the Pasteburn CLI.
//!
//! This module provides:
//! - Config path resolution
//! - A lazily built engine shared by command handlers

mod context;
mod resolver;

pub use context::AppContext;
pub use resolver::resolve_config_path;
