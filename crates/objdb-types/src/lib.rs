//! Foundation types for objdb.
//!
//! Every other objdb crate depends on `objdb-types`.
//!
//! # Key Types
//!
//! - [`ObjectId`] -- small-integer object identifier, `0` is reserved
//! - [`IdRange`] -- validated inclusive `[min_id, max_id]` issuance range
//! - [`ClassTag`] / [`FieldIndex`] -- stable references into an external schema
//! - [`Record`] -- a class tag plus encoded field values keyed by field index

pub mod error;
pub mod id;
pub mod record;

pub use error::TypeError;
pub use id::{IdRange, ObjectId};
pub use record::{ClassTag, FieldIndex, Record};
