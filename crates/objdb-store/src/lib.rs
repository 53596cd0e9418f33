//! Named-blob storage medium for objdb.
//!
//! The object store and the allocation ledger persist everything as named
//! blobs: `id.txt`, `free.dat` and one `<id>.dat` per object. This crate
//! provides the medium they write to.
//!
//! # Storage Backends
//!
//! All backends implement the [`BlobStore`] trait:
//!
//! - [`FsBlobStore`] -- one file per blob under a root directory
//! - [`InMemoryBlobStore`] -- `HashMap`-based store for tests and embedding
//!
//! # Design Rules
//!
//! 1. A write is all-or-nothing: readers see the old blob or the new one.
//! 2. There are no transactions across blobs.
//! 3. The medium never interprets blob contents.
//! 4. All I/O errors are returned to the caller; policy lives above this layer.

pub mod error;
pub mod fs;
pub mod memory;
pub mod names;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use fs::FsBlobStore;
pub use memory::InMemoryBlobStore;
pub use names::validate_blob_name;
pub use traits::BlobStore;
