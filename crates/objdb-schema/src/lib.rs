//! Schema registry contract for objdb.
//!
//! The object store never owns schema definitions. It resolves a record's
//! [`ClassTag`](objdb_types::ClassTag) and each
//! [`FieldIndex`](objdb_types::FieldIndex) through a [`SchemaRegistry`]
//! supplied by the embedding application.
//!
//! # Modules
//!
//! - [`types`] -- [`ClassDescriptor`] and [`FieldDescriptor`]
//! - [`traits`] -- the [`SchemaRegistry`] resolution interface
//! - [`memory`] -- [`InMemorySchemaRegistry`] for tests and embedding
//! - [`definition`] -- loading a registry from a TOML schema file
//! - [`error`] -- errors raised while building a registry

pub mod definition;
pub mod error;
pub mod memory;
pub mod traits;
pub mod types;

pub use definition::SchemaDefinition;
pub use error::{SchemaError, SchemaResult};
pub use memory::InMemorySchemaRegistry;
pub use traits::SchemaRegistry;
pub use types::{ClassDescriptor, FieldDescriptor};
