//! Tracing subscriber setup.
//!
//! Logs go to stderr so paste content on stdout stays clean. `RUST_LOG`
//! overrides the level picked from `-q`/`-v`.

use std::io;

use tracing_subscriber::{fmt, prelude::*, registry, EnvFilter};

use crate::constants::LOG_ENV;

fn default_directives(verbose: u8, quiet: bool) -> String {
    let level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, _) => "debug",
    };
    format!("{level},r2d2=warn")
}

pub fn init(verbose: u8, quiet: bool) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_directives(verbose, quiet)));

    let stderr_layer = fmt::layer()
        .with_timer(fmt::time::ChronoUtc::new(
            "%Y-%m-%d %H:%M:%S%.3f".to_string(),
        ))
        .with_level(true)
        .with_target(verbose > 1)
        .with_ansi(false)
        .with_writer(io::stderr);

    registry().with(filter).with(stderr_layer).try_init()?;
    Ok(())
}
