//! Error taxonomy for bookmark and directory operations.

use std::error::Error;

use thiserror::Error;

use crate::model::FormId;

/// Primary error type for remote bookmark and directory operations.
///
/// The HTTP adapter is responsible for mapping wire-level failures into these
/// kinds; layers above never inspect response bodies or status codes.
#[derive(Debug, Error)]
pub enum BookmarkError {
    /// The form is already scrapped by the current actor.
    #[error("form {form_id} is already scrapped")]
    Conflict {
        /// Form the conflicting add targeted.
        form_id: FormId,
    },
    /// The session is expired or invalid; terminal for the operation.
    #[error("session is not authenticated: {reason}")]
    Unauthenticated {
        /// Human-readable cause reported by the session layer or backend.
        reason: String,
    },
    /// The backend rejected the request for a non-conflict, non-auth reason.
    #[error("backend rejected request with status {status}")]
    Backend {
        /// HTTP status code.
        status: u16,
        /// Message extracted from the error body, when present.
        message: Option<String>,
    },
    /// Transport or decoding failure before a backend verdict was reached.
    #[error("transport failure")]
    Transport {
        /// Underlying failure.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
}

impl BookmarkError {
    /// Wrap an arbitrary transport-level failure.
    pub fn transport(source: impl Error + Send + Sync + 'static) -> Self {
        Self::Transport {
            source: Box::new(source),
        }
    }

    /// Whether this error signals an expired or invalid session.
    #[must_use]
    pub const fn is_unauthenticated(&self) -> bool {
        matches!(self, Self::Unauthenticated { .. })
    }

    /// Whether this error is the typed "already scrapped" conflict.
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}

/// Convenience alias for bookmark operation results.
pub type BookmarkResult<T> = Result<T, BookmarkError>;
