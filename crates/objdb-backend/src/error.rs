use objdb_codec::{CodecError, SchemaResolutionFailure};
use objdb_store::StoreError;
use objdb_types::ObjectId;
use thiserror::Error;

/// Errors surfaced by record store operations.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The identifier range and the free set are both exhausted.
    #[error("no identifier available")]
    NoIdentifierAvailable,

    /// The storage medium failed.
    #[error("storage failure: {0}")]
    Io(#[from] StoreError),

    /// The record cannot be stored (schema or size limits).
    #[error("invalid record: {0}")]
    InvalidRecord(#[from] CodecError),

    /// A stored record could not be decoded.
    #[error("corrupt record {id}: {source}")]
    CorruptRecord { id: ObjectId, source: CodecError },

    /// No record exists under the identifier.
    #[error("object not found: {0}")]
    NotFound(ObjectId),

    /// No backend is registered under the configured name.
    #[error("unknown backend {name:?}; registered: {available}")]
    UnknownBackend { name: String, available: String },

    /// A backend name was registered twice.
    #[error("backend {0:?} already registered")]
    DuplicateBackend(String),

    /// The configuration is invalid.
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<SchemaResolutionFailure> for BackendError {
    fn from(e: SchemaResolutionFailure) -> Self {
        Self::InvalidRecord(CodecError::Schema(e))
    }
}

/// Result alias for record store operations.
pub type BackendResult<T> = Result<T, BackendError>;
