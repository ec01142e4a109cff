//! # Domain Errors
//!
//! `ConsensusError` is what callers of the engine see. `StoreError` is what a
//! persistence adapter reports; the service maps it per operation.

use shared_types::{MatchRequestId, MatchResultId};
use thiserror::Error;

/// Errors surfaced by the consensus engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConsensusError {
    /// Caller may not act on this entity.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Entity missing, or not in a state where it can be addressed.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Kind of entity looked up
        entity: &'static str,
        /// Identifier that was looked up
        id: String,
    },

    /// An active request already holds this team pair.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The requested edge does not exist in the state machine.
    #[error("Invalid state transition: {from} -> {to}")]
    InvalidStateTransition {
        /// Current state
        from: String,
        /// Requested state
        to: String,
    },

    /// A result already exists for this request.
    #[error("Outcome already reported for match {0}")]
    AlreadyReported(MatchRequestId),

    /// The result has left `unverified`.
    #[error("Outcome {result_id} already {state}")]
    AlreadyVerified {
        /// Result that was addressed
        result_id: MatchResultId,
        /// State it is in
        state: String,
    },

    /// The reporter tried to rule on their own report.
    #[error("Reporter cannot verify their own outcome")]
    SelfVerification,

    /// Input rejected before touching state.
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Persistence backend failure.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl ConsensusError {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "unauthorized",
            Self::NotFound { .. } => "not_found",
            Self::Conflict(_) => "conflict",
            Self::InvalidStateTransition { .. } => "invalid_state_transition",
            Self::AlreadyReported(_) => "already_reported",
            Self::AlreadyVerified { .. } => "already_verified",
            Self::SelfVerification => "self_verification",
            Self::ValidationError(_) => "validation_error",
            Self::Storage(_) => "storage_unavailable",
        }
    }

    /// Whether retrying the same call may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Storage(_))
    }

    /// Shorthand for a missing entity.
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Shorthand for a rejected state-machine edge.
    pub fn transition(from: impl ToString, to: impl ToString) -> Self {
        Self::InvalidStateTransition {
            from: from.to_string(),
            to: to.to_string(),
        }
    }
}

/// Errors reported by a `MatchStore` implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Addressed record does not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Kind of record
        entity: &'static str,
        /// Key that was looked up
        id: String,
    },

    /// Conditional insert lost: the pair already has an active request.
    #[error("Active request {existing} already holds this team pair")]
    ActivePairExists {
        /// Request holding the pair
        existing: MatchRequestId,
    },

    /// Conditional update lost: the record is no longer in the expected state.
    #[error("Stale state: expected {expected}, found {actual}")]
    StaleState {
        /// State the caller expected
        expected: String,
        /// State the record is in
        actual: String,
    },

    /// Unique insert lost: the request already has a result.
    #[error("Result {existing} already exists for request {request_id}")]
    DuplicateResult {
        /// Request the result belongs to
        request_id: MatchRequestId,
        /// Result already stored
        existing: MatchResultId,
    },

    /// Backend I/O, encoding or injected failure.
    #[error("Storage backend error: {0}")]
    Backend(String),
}

impl From<StoreError> for ConsensusError {
    /// Fallback mapping. Operations that can lose a conditional write map
    /// those variants themselves before falling back to this.
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { entity, id } => ConsensusError::NotFound { entity, id },
            StoreError::ActivePairExists { existing } => ConsensusError::Conflict(format!(
                "an active match request already exists between these teams ({existing})"
            )),
            StoreError::StaleState { expected, actual } => ConsensusError::Conflict(format!(
                "state changed concurrently: expected {expected}, found {actual}"
            )),
            StoreError::DuplicateResult { request_id, .. } => {
                ConsensusError::AlreadyReported(request_id)
            }
            StoreError::Backend(msg) => ConsensusError::Storage(msg),
        }
    }
}
