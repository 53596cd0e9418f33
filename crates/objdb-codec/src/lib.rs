//! Binary record codec for objdb.
//!
//! A record is stored as:
//!
//! ```text
//! [2 bytes: class tag (u16 LE)]
//! [2 bytes: field count (u16 LE)]
//! repeated field_count times:
//!   [2 bytes: field index (u16 LE)]
//!   [2 bytes: value length (u16 LE)]
//!   [N bytes: value]
//! ```
//!
//! Decoding resolves the class and every field through a
//! [`SchemaRegistry`](objdb_schema::SchemaRegistry) and is all-or-nothing:
//! a record is returned only if every byte was accounted for and every
//! reference resolved.

pub mod codec;
pub mod error;
mod wire;

pub use codec::RecordCodec;
pub use error::{CodecError, CodecResult, CorruptReason, SchemaResolutionFailure};
