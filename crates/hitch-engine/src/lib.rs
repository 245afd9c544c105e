//! Reconciliation engine for hitch.
//!
//! This crate holds the only real decision logic in the repository: deciding
//! whether the previously applied record still satisfies a declared
//! specification (`decide`), performing the single side-effecting HTTP
//! exchange when it does not (`Reconciler`), and classifying every way a
//! cycle can end. It owns no network resources — the transport is injected
//! by the host.

pub mod diff;
pub mod reconciler;

pub use diff::{changes, decide, ChangeSet, Verdict};
pub use reconciler::{Outcome, Reconciler};

use hitch_transport::TransportError;
use thiserror::Error;

/// Per-cycle failure classification.
///
/// None of these are fatal and none leave a partially updated record: a
/// record is either replaced wholesale on a 200 response or not touched.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Malformed method or URL, caught before any I/O. Recoverable by
    /// correcting the declaration.
    #[error("invalid specification: {0}")]
    Validation(#[from] hitch_spec::SpecError),
    /// Connection-level failure (DNS, refused, timeout). The caller may
    /// retry by re-invoking apply.
    #[error("transport failure: {0}")]
    Transport(String),
    /// Connected, but the response body could not be read.
    #[error("failed to read response body: {0}")]
    BodyRead(String),
    /// Connected and fully read, but the endpoint answered something other
    /// than 200. Carries the full body so the caller can surface the
    /// upstream error verbatim.
    #[error("endpoint returned status {status}: {body}")]
    Status { status: u16, body: String },
}

impl From<TransportError> for EngineError {
    fn from(e: TransportError) -> Self {
        match e {
            TransportError::Connect(cause) => EngineError::Transport(cause),
            TransportError::BodyRead(cause) => EngineError::BodyRead(cause),
        }
    }
}
