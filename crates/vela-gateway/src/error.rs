//! # Gateway Error Type
//!
//! Boundary errors: HTTP transport, remote API rejections, and
//! parse-at-boundary failures. These are the class-(d) errors of the
//! checkout flow - all of them leave the in-memory session untouched so the
//! operator can correct and retry without re-entering data.

use thiserror::Error;
use vela_core::{CheckoutIssue, ScheduleError};

/// Errors raised at the remote API boundary.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Transport-level failure (DNS, TLS, timeout, connection reset).
    #[error("http transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// The remote API answered with a non-success status.
    #[error("api rejected the request with status {status}: {message}")]
    Api { status: u16, message: String },

    /// Response body did not decode into the expected shape.
    #[error("failed to decode api response: {0}")]
    Decode(#[from] serde_json::Error),

    /// A loosely-typed field failed conversion into a core type.
    #[error("invalid {field} in api payload: {reason}")]
    Parse { field: String, reason: String },

    /// Remote fee-tier data violated the schedule invariants.
    #[error("fee schedule rejected: {0}")]
    Schedule(#[from] ScheduleError),

    /// The session failed checkout validation; the sale payload was not
    /// built. Carries every issue so the UI can show them all at once.
    #[error("checkout blocked by {} issue(s)", .0.len())]
    Checkout(Vec<CheckoutIssue>),
}

impl GatewayError {
    /// Helper for parse failures with field context.
    pub fn parse(field: impl Into<String>, reason: impl Into<String>) -> Self {
        GatewayError::Parse {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Convenience type alias for Results with GatewayError.
pub type GatewayResult<T> = Result<T, GatewayError>;
