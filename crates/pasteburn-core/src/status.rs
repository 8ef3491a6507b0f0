//! Abstract request outcomes for adapters.

use std::fmt;

use crate::engine::IngestOutcome;
use crate::error::{PasteError, Result};

/// Outcome an adapter reports for an engine call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Success,
    /// Request taken; used by administrative delete
    Accepted,
    /// Client must complete verification first
    Redirect,
    BadInput,
    Forbidden,
    /// Absent, expired, pending, or already burned
    NotFound,
    UpstreamFailure,
}

impl Status {
    /// Suggested HTTP status code.
    pub fn http_code(self) -> u16 {
        match self {
            Status::Success => 200,
            Status::Accepted => 202,
            Status::Redirect => 302,
            Status::BadInput => 400,
            Status::Forbidden => 403,
            Status::NotFound => 404,
            Status::UpstreamFailure => 502,
        }
    }

    pub fn is_success(self) -> bool {
        matches!(self, Status::Success | Status::Accepted | Status::Redirect)
    }

    /// Status for an administrative delete. Removing nothing still counts
    /// as accepted.
    pub fn of_admin_delete(result: &Result<bool>) -> Self {
        match result {
            Ok(_) => Status::Accepted,
            Err(err) => Status::from(err),
        }
    }

    pub fn of_ingest(result: &Result<IngestOutcome>) -> Self {
        match result {
            Ok(outcome) => Status::from(outcome),
            Err(err) => Status::from(err),
        }
    }
}

impl From<&IngestOutcome> for Status {
    fn from(outcome: &IngestOutcome) -> Self {
        match outcome {
            IngestOutcome::Published { .. } => Status::Success,
            IngestOutcome::VerificationRequired { .. } => Status::Redirect,
        }
    }
}

impl From<&PasteError> for Status {
    fn from(err: &PasteError) -> Self {
        match err {
            PasteError::Validation(_) => Status::BadInput,
            PasteError::AuthFailure | PasteError::Rejected(_) => Status::Forbidden,
            PasteError::NotFound => Status::NotFound,
            PasteError::Conflict(_)
            | PasteError::Connection(_)
            | PasteError::Integrity(_)
            | PasteError::Crypto(_)
            | PasteError::Config(_) => Status::UpstreamFailure,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Status::Success => "success",
            Status::Accepted => "accepted",
            Status::Redirect => "redirect",
            Status::BadInput => "bad input",
            Status::Forbidden => "forbidden",
            Status::NotFound => "not found",
            Status::UpstreamFailure => "upstream failure",
        };
        f.write_str(label)
    }
}
