//! Engine error taxonomy.
//!
//! Every error answers `status()` and `code()` alongside its display
//! message, so callers get the status/code/message envelope the
//! original service contract requires.

use thiserror::Error;

use recordstore_core::schema::SchemaError;
use recordstore_core::storage::StorageError;
use recordstore_core::validation::ValidationError;

use crate::engine::BATCH_LIMIT;

/// Errors produced by engine operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineError {
    #[error("No table schema was provided")]
    MissingTable,
    /// Declared for id-prefix mismatches; no engine path raises it
    /// today (prefix checks live in validation).
    #[error("Prefix provided does not match the table")]
    InvalidIdPrefix,
    #[error("Could not generate unique id")]
    UniqueId,
    #[error("Too many keys for a batch request (max: {})", BATCH_LIMIT)]
    ExceededBatchLimit,
    #[error("No single item could be identified with the provided data")]
    NoSingleItem,
    #[error("No update values have been provided")]
    MissingUpdateValues,
    /// Propagated unchanged from the validator.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// Translated from the backend's native error shape.
    #[error("{code} ({status}): {message}")]
    Backend {
        status: u16,
        code: String,
        message: String,
    },
}

impl EngineError {
    /// HTTP-style status code for this error.
    pub fn status(&self) -> u16 {
        match self {
            EngineError::Validation(_) => 400,
            EngineError::Backend { status, .. } => *status,
            _ => 500,
        }
    }

    /// Machine-readable error code.
    pub fn code(&self) -> &str {
        match self {
            EngineError::MissingTable => "MissingTableException",
            EngineError::InvalidIdPrefix => "InvalidIdPrefixException",
            EngineError::UniqueId => "UniqueIdException",
            EngineError::ExceededBatchLimit => "ExceededBatchLimitException",
            EngineError::NoSingleItem => "NoSingleItemException",
            EngineError::MissingUpdateValues => "MissingUpdateValuesException",
            EngineError::Validation(_) => "ValidationException",
            EngineError::Backend { code, .. } => code,
        }
    }
}

impl From<StorageError> for EngineError {
    fn from(error: StorageError) -> Self {
        let (status, code) = match &error {
            StorageError::TableNotFound(_) => (500, "TableNotFoundException"),
            StorageError::ConditionFailed(_) => (409, "ConditionFailedException"),
            StorageError::QueryFailed(_) => (500, "QueryFailedException"),
            StorageError::Serialization(_) => (500, "SerializationException"),
            StorageError::ConnectionFailed(_) => (503, "ConnectionFailedException"),
        };
        EngineError::Backend {
            status,
            code: code.to_string(),
            message: error.to_string(),
        }
    }
}

/// A stage with no physical table is indistinguishable from an unbound
/// schema as far as the engine is concerned.
impl From<SchemaError> for EngineError {
    fn from(_: SchemaError) -> Self {
        EngineError::MissingTable
    }
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;
