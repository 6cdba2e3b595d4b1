//! Parameter store capability consumed by the retriever.

use crate::param::{Parameter, QueryKey, TypeFilter};
use thiserror::Error;

/// One page of a paginated `list_by_path` call.
///
/// An empty page is valid, terminal or not; only a missing token ends the
/// sequence.
#[derive(Debug, Default)]
pub struct Page {
    pub items: Vec<Parameter>,
    /// Opaque cursor for the next page, absent on the last one.
    pub next_token: Option<String>,
}

/// Failure surfaced by a parameter store.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("could not reach the parameter store: {0}")]
    Transport(String),
    /// A request deadline fired; treated as caller cancellation.
    #[error("parameter store request timed out: {0}")]
    Timeout(String),
    #[error("parameter store denied the request ({code}): {message}")]
    AccessDenied { code: String, message: String },
    #[error("throttled by the parameter store: {message}")]
    Throttled { message: String },
    #[error("parameter store fault {status} ({code}): {message}")]
    Service {
        status: u16,
        code: String,
        message: String,
    },
    #[error("could not decode the parameter store response: {0}")]
    Decode(String),
    #[error("parameter store client is not configured: {0}")]
    Config(String),
}

impl StoreError {
    /// Whether a bounded retry of the same page request is worthwhile.
    ///
    /// Denials and decode failures are contract problems, and a timeout is
    /// the caller's deadline; none of those are retried.
    pub fn is_retryable(&self) -> bool {
        match self {
            StoreError::Transport(_) | StoreError::Throttled { .. } => true,
            StoreError::Service { status, .. } => *status >= 500,
            StoreError::Timeout(_)
            | StoreError::AccessDenied { .. }
            | StoreError::Decode(_)
            | StoreError::Config(_) => false,
        }
    }
}

/// Capability to list parameters below a path, one page at a time.
///
/// Authentication and transport belong to the implementation; the retriever
/// only ever sees pages and `StoreError`s.
pub trait ParameterStore {
    fn list_by_path(
        &self,
        prefix: &QueryKey,
        recursive: bool,
        decrypt: bool,
        filter: &TypeFilter,
        token: Option<&str>,
    ) -> Result<Page, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_faults_are_retryable() {
        assert!(StoreError::Transport("connection reset".into()).is_retryable());
        assert!(StoreError::Throttled {
            message: "slow down".into()
        }
        .is_retryable());
        assert!(StoreError::Service {
            status: 503,
            code: "ServiceUnavailable".into(),
            message: "busy".into()
        }
        .is_retryable());
    }

    #[test]
    fn contract_faults_and_timeouts_are_not_retryable() {
        assert!(!StoreError::Timeout("deadline".into()).is_retryable());
        assert!(!StoreError::AccessDenied {
            code: "AccessDeniedException".into(),
            message: "no".into()
        }
        .is_retryable());
        assert!(!StoreError::Service {
            status: 400,
            code: "ValidationException".into(),
            message: "bad path".into()
        }
        .is_retryable());
        assert!(!StoreError::Decode("truncated body".into()).is_retryable());
        assert!(!StoreError::Config("no region".into()).is_retryable());
    }
}
