//! Error types for schema registry construction.

use objdb_types::{ClassTag, FieldIndex};
use thiserror::Error;

/// Errors raised while building or loading a schema registry.
///
/// Resolution misses at decode time are not errors of this crate; a registry
/// lookup simply returns `None` and the codec reports the failure.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Two classes share the same tag.
    #[error("duplicate class tag {0}")]
    DuplicateClass(ClassTag),

    /// A class declares the same field index twice.
    #[error("duplicate field index {field} in class {class}")]
    DuplicateField { class: ClassTag, field: FieldIndex },

    /// The schema file is not valid TOML or has the wrong shape.
    #[error("schema parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// I/O error while reading a schema file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for schema operations.
pub type SchemaResult<T> = Result<T, SchemaError>;
