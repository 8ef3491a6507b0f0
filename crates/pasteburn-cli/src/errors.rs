//! CLI error types for structured error handling.
//!
//! This module provides typed errors that map to specific exit codes,
//! enabling consistent error handling across the CLI.

use std::fmt;

use pasteburn_core::{PasteError, Status};

/// CLI-specific errors with associated exit codes.
#[derive(Debug)]
pub enum CliError {
    /// Paste or config not found
    NotFound { message: String, hint: String },

    /// Wrong passphrase or master key, or refused content
    AuthFailed {
        message: String,
        hint: Option<String>,
    },

    /// Invalid user input
    InvalidInput(String),

    /// Stored data failed verification
    IntegrityFailed(String),

    /// Store unreachable, misconfigured, or failing
    Upstream(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::NotFound { message, hint } => {
                write!(f, "{}\n{}", message, hint)
            }
            CliError::AuthFailed { message, hint } => {
                if let Some(h) = hint {
                    write!(f, "{}\n{}", message, h)
                } else {
                    write!(f, "{}", message)
                }
            }
            CliError::InvalidInput(message)
            | CliError::IntegrityFailed(message)
            | CliError::Upstream(message) => write!(f, "{}", message),
        }
    }
}

impl std::error::Error for CliError {}

impl CliError {
    /// Create a NotFound error with message and hint.
    pub fn not_found(message: impl Into<String>, hint: impl Into<String>) -> Self {
        CliError::NotFound {
            message: message.into(),
            hint: hint.into(),
        }
    }

    /// Create an AuthFailed error with message and hint.
    pub fn auth_failed_with_hint(message: impl Into<String>, hint: impl Into<String>) -> Self {
        CliError::AuthFailed {
            message: message.into(),
            hint: Some(hint.into()),
        }
    }

    /// Create an InvalidInput error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        CliError::InvalidInput(message.into())
    }

    /// Translate an engine error through its status.
    pub fn from_paste(err: PasteError) -> Self {
        if let PasteError::Integrity(_) = err {
            return CliError::IntegrityFailed(err.to_string());
        }
        match Status::from(&err) {
            Status::NotFound => CliError::not_found(
                err.to_string(),
                "Hint: The paste may have expired, been burned, or still await verification.",
            ),
            Status::Forbidden => match err {
                PasteError::AuthFailure => CliError::auth_failed_with_hint(
                    err.to_string(),
                    "Hint: Check the passphrase or the current admin key hash.",
                ),
                _ => CliError::AuthFailed {
                    message: err.to_string(),
                    hint: None,
                },
            },
            Status::BadInput => CliError::InvalidInput(err.to_string()),
            _ => CliError::Upstream(err.to_string()),
        }
    }

    /// Get the exit code for this error.
    pub fn exit_code(&self) -> i32 {
        use super::constants::exit_codes;
        match self {
            CliError::NotFound { .. } => exit_codes::NOT_FOUND,
            CliError::AuthFailed { .. } => exit_codes::AUTH_FAILED,
            CliError::InvalidInput(_) => exit_codes::INVALID_INPUT,
            CliError::IntegrityFailed(_) => exit_codes::INTEGRITY_FAILED,
            CliError::Upstream(_) => exit_codes::UPSTREAM_FAILED,
        }
    }

    /// Print error message to stderr and exit with appropriate code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);
        std::process::exit(self.exit_code())
    }
}

impl From<PasteError> for CliError {
    fn from(err: PasteError) -> Self {
        CliError::from_paste(err)
    }
}
