//! Output formatting helpers for the CLI.

mod json;

pub use json::{disclosure_json, ingest_json};
