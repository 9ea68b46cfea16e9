//! Uniform error taxonomy for tessera data access
//!
//! Every failure crossing the repository contract boundary is a
//! [`DataError`]: a structured error with a stable kind and code,
//! operation and entity context, and the original store-native failure
//! retained as the `source`. Store-native error types never cross the
//! boundary themselves - they survive only as the recorded cause.

use std::sync::Arc;

use tessera_core_types::{RequestId, TraceId};

/// Result type alias using DataError
pub type DataResult<T> = std::result::Result<T, DataError>;

/// Shared, cloneable handle to the original failure.
pub type ErrorCause = Arc<dyn std::error::Error + Send + Sync + 'static>;

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code usable for programmatic
/// handling, testing and log correlation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataErrorKind {
    /// Caller-supplied argument violates a stated precondition.
    /// Surfaced immediately; never retried.
    InvalidArgument,
    /// Failure originating in the backing store. Always carries the
    /// original cause. Retry policy is the caller's responsibility.
    StoreOperation,
    /// Operation was cancelled before completion. Distinct from
    /// `StoreOperation` so callers can treat it as non-retryable.
    Cancelled,
    /// Localization catalog load or lookup-argument failure.
    Localization,
}

impl DataErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            DataErrorKind::InvalidArgument => "ERR_INVALID_ARGUMENT",
            DataErrorKind::StoreOperation => "ERR_STORE_OPERATION",
            DataErrorKind::Cancelled => "ERR_CANCELLED",
            DataErrorKind::Localization => "ERR_LOCALIZATION",
        }
    }
}

/// Sub-classification of store-originated failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreFailure {
    /// Unique, foreign-key or check constraint violated
    ConstraintViolation,
    /// Store unreachable, handle unusable, or I/O failed
    Connectivity,
    /// Row/document could not be encoded or decoded
    Serialization,
    /// Store-side deadline elapsed
    Timeout,
    /// Write conflict, lost update, or identity absent on update
    Conflict,
    /// Anything the adapter could not classify further
    Other,
}

impl StoreFailure {
    /// Get the stable sub-code for this failure class
    pub fn code(&self) -> &'static str {
        match self {
            StoreFailure::ConstraintViolation => "ERR_STORE_CONSTRAINT",
            StoreFailure::Connectivity => "ERR_STORE_CONNECTIVITY",
            StoreFailure::Serialization => "ERR_STORE_SERIALIZATION",
            StoreFailure::Timeout => "ERR_STORE_TIMEOUT",
            StoreFailure::Conflict => "ERR_STORE_CONFLICT",
            StoreFailure::Other => "ERR_STORE_OTHER",
        }
    }
}

/// Canonical structured error type
///
/// Construction is builder-style: start from a kind, attach context.
/// The original failure is attached with [`DataError::with_cause`] and
/// reported through `std::error::Error::source`, so diagnostic detail
/// survives translation.
#[derive(Debug, Clone)]
pub struct DataError {
    kind: DataErrorKind,
    failure: Option<StoreFailure>,
    op: Option<String>,
    entity: Option<String>,
    request_id: Option<RequestId>,
    trace_id: Option<TraceId>,
    message: String,
    cause: Option<ErrorCause>,
}

impl DataError {
    /// Create a new error with the specified kind
    pub fn new(kind: DataErrorKind) -> Self {
        Self {
            kind,
            failure: None,
            op: None,
            entity: None,
            request_id: None,
            trace_id: None,
            message: String::new(),
            cause: None,
        }
    }

    /// Add the repository operation name (`add`, `find_by_id`, ...)
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add the entity-type label
    pub fn with_entity(mut self, entity: impl Into<String>) -> Self {
        self.entity = Some(entity.into());
        self
    }

    /// Add the store-failure sub-classification
    pub fn with_failure(mut self, failure: StoreFailure) -> Self {
        self.failure = Some(failure);
        self
    }

    /// Add request ID context
    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = Some(request_id);
        self
    }

    /// Add trace ID context
    pub fn with_trace_id(mut self, trace_id: TraceId) -> Self {
        self.trace_id = Some(trace_id);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Retain the original failure as the cause
    pub fn with_cause(
        mut self,
        cause: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        self.cause = Some(Arc::new(cause));
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> DataErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Get the store-failure sub-classification, if any
    pub fn failure(&self) -> Option<StoreFailure> {
        self.failure
    }

    /// Get the operation context, if any
    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    /// Get the entity-type label, if any
    pub fn entity(&self) -> Option<&str> {
        self.entity.as_deref()
    }

    /// Get the request ID context, if any
    pub fn request_id(&self) -> Option<RequestId> {
        self.request_id
    }

    /// Get the trace ID context, if any
    pub fn trace_id(&self) -> Option<TraceId> {
        self.trace_id
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the retained original failure, if any
    pub fn cause(&self) -> Option<&ErrorCause> {
        self.cause.as_ref()
    }
}

impl std::fmt::Display for DataError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(failure) = self.failure {
            write!(f, "[{}]", failure.code())?;
        }
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if let Some(entity) = &self.entity {
            write!(f, " on entity '{}'", entity)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for DataError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause
            .as_ref()
            .map(|c| c.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Create an invalid-argument error
pub fn invalid_argument(op: &str, message: impl Into<String>) -> DataError {
    DataError::new(DataErrorKind::InvalidArgument)
        .with_op(op)
        .with_message(message)
}

/// Create a store-operation error retaining the native failure
pub fn store_failure(
    op: &str,
    failure: StoreFailure,
    cause: impl std::error::Error + Send + Sync + 'static,
) -> DataError {
    DataError::new(DataErrorKind::StoreOperation)
        .with_op(op)
        .with_failure(failure)
        .with_message(cause.to_string())
        .with_cause(cause)
}

/// Create a store-operation error with no native cause
/// (e.g. update against an absent identity)
pub fn store_violation(
    op: &str,
    failure: StoreFailure,
    message: impl Into<String>,
) -> DataError {
    DataError::new(DataErrorKind::StoreOperation)
        .with_op(op)
        .with_failure(failure)
        .with_message(message)
}

/// Create a cancellation error
pub fn cancelled(op: &str) -> DataError {
    DataError::new(DataErrorKind::Cancelled)
        .with_op(op)
        .with_message("operation cancelled before completion")
}

/// Create a localization error retaining the reader failure
pub fn localization(
    message: impl Into<String>,
    cause: impl std::error::Error + Send + Sync + 'static,
) -> DataError {
    DataError::new(DataErrorKind::Localization)
        .with_message(message)
        .with_cause(cause)
}
