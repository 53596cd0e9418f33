use objdb_types::{IdRange, ObjectId};

/// Errors produced by ledger operations.
///
/// Persistence failures are not represented here. They are logged and the
/// in-memory state stays authoritative until the medium recovers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("no identifier available in {range}: counter exhausted and free set empty")]
    Exhausted { range: IdRange },

    #[error("identifier {id} is outside {range}")]
    OutOfRange { id: ObjectId, range: IdRange },

    #[error("identifier {id} was never issued (next id is {next_id})")]
    NeverIssued { id: ObjectId, next_id: u64 },
}

/// Result alias for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;
