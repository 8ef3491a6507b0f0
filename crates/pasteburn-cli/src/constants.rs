//! Constants used throughout the CLI.

/// Exit codes for the CLI.
///
/// These follow common Unix conventions:
/// - 0: Success
/// - 1: General error (used by anyhow for unhandled errors)
/// - 2: Misuse of shell command (reserved by shells)
/// - 3+: Application-specific errors
pub mod exit_codes {
    /// Paste or config not found (also expired, held, or burned pastes).
    pub const NOT_FOUND: i32 = 3;

    /// Invalid user input or arguments.
    pub const INVALID_INPUT: i32 = 4;

    /// Wrong passphrase or master key, or content refused.
    pub const AUTH_FAILED: i32 = 5;

    /// Integrity check failed.
    pub const INTEGRITY_FAILED: i32 = 6;

    /// Store unreachable or misconfigured.
    pub const UPSTREAM_FAILED: i32 = 7;
}

/// Environment variable overriding the default log filter.
pub const LOG_ENV: &str = "RUST_LOG";
