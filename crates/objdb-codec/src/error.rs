use objdb_types::{ClassTag, FieldIndex};
use thiserror::Error;

/// A class or field reference that the schema registry could not resolve.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaResolutionFailure {
    #[error("unknown class {0}")]
    UnknownClass(ClassTag),

    #[error("unknown field {field} in class {class}")]
    UnknownField { class: ClassTag, field: FieldIndex },
}

/// Structural defects in encoded record bytes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CorruptReason {
    #[error("truncated header: {0} bytes")]
    TruncatedHeader(usize),

    #[error("truncated field {position} of {count}")]
    TruncatedField { position: u16, count: u16 },

    #[error("field {0} appears more than once")]
    DuplicateField(FieldIndex),

    #[error("{0} trailing bytes after last field")]
    TrailingBytes(usize),
}

/// Errors produced by record encoding and decoding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("schema resolution failed: {0}")]
    Schema(#[from] SchemaResolutionFailure),

    #[error("corrupt record: {0}")]
    Corrupt(#[from] CorruptReason),

    #[error("value of field {field} is {len} bytes, limit is 65535")]
    ValueTooLong { field: FieldIndex, len: usize },

    #[error("record has {0} fields, limit is 65535")]
    TooManyFields(usize),
}

/// Result alias for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;
