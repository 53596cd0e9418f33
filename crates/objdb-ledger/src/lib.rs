//! Identifier allocation ledger for objdb.
//!
//! The ledger hands out [`ObjectId`](objdb_types::ObjectId)s from a bounded
//! [`IdRange`](objdb_types::IdRange) and recycles released ones. Its state is
//! two blobs on the storage medium:
//!
//! - `id.txt` -- decimal text of the next never-issued identifier
//! - `free.dat` -- `count:u32` followed by `count` released identifiers (`u32`, LE)
//!
//! Both are rewritten synchronously after every mutation. Loading never
//! fails: missing or corrupt files fall back to a fresh ledger.
//!
//! # Allocation order
//!
//! 1. The counter, while it is within the range.
//! 2. Then the smallest released identifier.
//! 3. Otherwise [`LedgerError::Exhausted`].

pub mod error;
pub mod ledger;
pub mod state;

pub use error::{LedgerError, LedgerResult};
pub use ledger::{AllocationLedger, COUNTER_BLOB, FREE_SET_BLOB};
pub use state::AllocationState;
