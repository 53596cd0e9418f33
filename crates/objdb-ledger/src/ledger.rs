use std::collections::BTreeSet;
use std::sync::Arc;

use objdb_store::BlobStore;
use objdb_types::{IdRange, ObjectId};
use tracing::{debug, info, warn};

use crate::error::{LedgerError, LedgerResult};
use crate::state::{
    decode_counter, decode_free_set, encode_counter, encode_free_set, AllocationState,
};

/// Blob holding the decimal next-id counter.
pub const COUNTER_BLOB: &str = "id.txt";

/// Blob holding the released identifiers.
pub const FREE_SET_BLOB: &str = "free.dat";

/// Which ledger blobs still differ from memory.
#[derive(Clone, Copy, Debug, Default)]
struct Dirty {
    counter: bool,
    free_set: bool,
}

/// Issues identifiers from a bounded range and recycles released ones.
///
/// Every mutating call persists the affected blob before returning. A failed
/// write is logged and remembered; the next mutation (or [`flush`]) writes
/// every blob still out of date. Until then the in-memory state is the only
/// source of truth.
///
/// The ledger assumes a single writer. It takes `&mut self` for mutations
/// and performs no locking of its own.
///
/// [`flush`]: AllocationLedger::flush
pub struct AllocationLedger {
    range: IdRange,
    state: AllocationState,
    blobs: Arc<dyn BlobStore>,
    dirty: Dirty,
}

impl AllocationLedger {
    /// Load the ledger for `range` from `blobs`, falling back to a fresh
    /// counter and an empty free set when either blob is missing or corrupt.
    pub fn initialize(range: IdRange, blobs: Arc<dyn BlobStore>) -> Self {
        let next_id = load_counter(range, blobs.as_ref());
        let free_ids = load_free_set(range, blobs.as_ref());

        info!(
            %range,
            capacity = range.count(),
            next_id,
            free = free_ids.len(),
            "allocation ledger initialized"
        );

        Self {
            range,
            state: AllocationState { next_id, free_ids },
            blobs,
            dirty: Dirty::default(),
        }
    }

    /// Issue an identifier.
    ///
    /// The counter is used while it is within range; afterwards the smallest
    /// released identifier is reused.
    pub fn allocate(&mut self) -> LedgerResult<ObjectId> {
        if !self.state.counter_exhausted(self.range) {
            // Bounded by range.max(), which is a u32.
            let id = ObjectId::new(self.state.next_id as u32);
            self.state.next_id += 1;
            self.dirty.counter = true;

            if self.state.free_ids.remove(&id) {
                warn!(%id, "counter issued an id listed as free; dropping it from the free set");
                self.dirty.free_set = true;
            }

            self.persist();
            debug!(%id, source = "counter", "identifier allocated");
            return Ok(id);
        }

        match self.state.free_ids.pop_first() {
            Some(id) => {
                self.dirty.free_set = true;
                self.persist();
                debug!(%id, source = "free_set", "identifier allocated");
                Ok(id)
            }
            None => Err(LedgerError::Exhausted { range: self.range }),
        }
    }

    /// Return an identifier to the free set.
    ///
    /// Returns `Ok(true)` if the identifier was added, `Ok(false)` if it was
    /// already free (the duplicate release is ignored). Identifiers outside
    /// the range or never issued by the counter are rejected.
    pub fn release(&mut self, id: ObjectId) -> LedgerResult<bool> {
        if !self.range.contains(id) {
            return Err(LedgerError::OutOfRange {
                id,
                range: self.range,
            });
        }
        if !self.state.was_issued(id) {
            return Err(LedgerError::NeverIssued {
                id,
                next_id: self.state.next_id,
            });
        }
        if !self.state.free_ids.insert(id) {
            warn!(%id, "duplicate release ignored");
            return Ok(false);
        }

        self.dirty.free_set = true;
        self.persist();
        debug!(%id, "identifier released");
        Ok(true)
    }

    /// Retry writing any blob that failed to persist.
    ///
    /// Returns `true` when the medium matches the in-memory state.
    pub fn flush(&mut self) -> bool {
        self.persist()
    }

    /// Whether every ledger blob has been written since the last mutation.
    pub fn is_persisted(&self) -> bool {
        !self.dirty.counter && !self.dirty.free_set
    }

    pub fn range(&self) -> IdRange {
        self.range
    }

    pub fn state(&self) -> &AllocationState {
        &self.state
    }

    pub fn is_free(&self, id: ObjectId) -> bool {
        self.state.free_ids.contains(&id)
    }

    fn persist(&mut self) -> bool {
        if self.dirty.counter {
            match self
                .blobs
                .write(COUNTER_BLOB, &encode_counter(self.state.next_id))
            {
                Ok(()) => self.dirty.counter = false,
                Err(e) => warn!(
                    blob = COUNTER_BLOB,
                    error = %e,
                    "failed to persist ledger counter; keeping in-memory state"
                ),
            }
        }
        if self.dirty.free_set {
            match self
                .blobs
                .write(FREE_SET_BLOB, &encode_free_set(&self.state.free_ids))
            {
                Ok(()) => self.dirty.free_set = false,
                Err(e) => warn!(
                    blob = FREE_SET_BLOB,
                    error = %e,
                    "failed to persist ledger free set; keeping in-memory state"
                ),
            }
        }
        self.is_persisted()
    }
}

impl std::fmt::Debug for AllocationLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AllocationLedger")
            .field("range", &self.range)
            .field("next_id", &self.state.next_id)
            .field("free", &self.state.free_ids.len())
            .field("persisted", &self.is_persisted())
            .finish()
    }
}

fn load_counter(range: IdRange, blobs: &dyn BlobStore) -> u64 {
    let fresh = AllocationState::fresh(range).next_id;
    let data = match blobs.read(COUNTER_BLOB) {
        Ok(Some(data)) => data,
        Ok(None) => {
            debug!(blob = COUNTER_BLOB, "no persisted counter; starting at range minimum");
            return fresh;
        }
        Err(e) => {
            warn!(blob = COUNTER_BLOB, error = %e, "unreadable counter; starting at range minimum");
            return fresh;
        }
    };

    match decode_counter(&data) {
        Ok(n) if n < fresh => {
            warn!(counter = n, %range, "persisted counter below range; raising to minimum");
            fresh
        }
        Ok(n) if n > range.exhausted_counter() => {
            warn!(counter = n, %range, "persisted counter beyond range; marking counter exhausted");
            range.exhausted_counter()
        }
        Ok(n) => n,
        Err(e) => {
            warn!(blob = COUNTER_BLOB, error = %e, "corrupt counter; starting at range minimum");
            fresh
        }
    }
}

fn load_free_set(range: IdRange, blobs: &dyn BlobStore) -> BTreeSet<ObjectId> {
    let data = match blobs.read(FREE_SET_BLOB) {
        Ok(Some(data)) => data,
        Ok(None) => return BTreeSet::new(),
        Err(e) => {
            warn!(blob = FREE_SET_BLOB, error = %e, "unreadable free set; starting empty");
            return BTreeSet::new();
        }
    };

    let ids = match decode_free_set(&data) {
        Ok(ids) => ids,
        Err(e) => {
            warn!(blob = FREE_SET_BLOB, error = %e, "corrupt free set; starting empty");
            return BTreeSet::new();
        }
    };

    let mut free = BTreeSet::new();
    for id in ids {
        if !range.contains(id) {
            warn!(%id, %range, "dropping out-of-range free id");
        } else if !free.insert(id) {
            warn!(%id, "dropping duplicate free id");
        } else {
            debug!(%id, "loaded free id");
        }
    }
    free
}
