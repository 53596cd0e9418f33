//! Record store for objdb.
//!
//! [`RecordStore`] maps an [`ObjectId`](objdb_types::ObjectId) to a blob named
//! `<id>.dat`, using the allocation ledger for identifier lifecycle and the
//! record codec for payload shape.
//!
//! # Identifier lifecycle
//!
//! ```text
//! Free -> Allocated -> Live -> Deleted -> Free
//! ```
//!
//! A failed write after allocation, or a delete whose outcome is not a
//! confirmed removal, leaves the identifier outside the free pool. Such
//! leaked identifiers are recovered only by an explicit
//! [`RecordStore::reclaim_leaked`] pass.
//!
//! # Backend selection
//!
//! Applications build a [`BackendRegistry`] (a table of named constructors)
//! and pick a backend from [`StoreConfig::backend`].

pub mod backend;
pub mod config;
pub mod error;
pub mod record_store;

pub use backend::{BackendConstructor, BackendRegistry, ObjectBackend};
pub use config::StoreConfig;
pub use error::{BackendError, BackendResult};
pub use record_store::RecordStore;
