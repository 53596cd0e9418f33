use std::sync::Arc;

use objdb_codec::RecordCodec;
use objdb_ledger::{AllocationLedger, AllocationState};
use objdb_schema::SchemaRegistry;
use objdb_store::BlobStore;
use objdb_types::{IdRange, ObjectId, Record};
use tracing::{debug, error, info, warn};

use crate::error::{BackendError, BackendResult};

/// Durable create/read/delete of records keyed by [`ObjectId`].
///
/// Each record lives in its own blob, `<id>.dat`. Records are never cached:
/// every read decodes from the medium.
///
/// Mutating operations take `&mut self`; callers sharing a store across
/// threads must serialize access themselves.
pub struct RecordStore {
    blobs: Arc<dyn BlobStore>,
    ledger: AllocationLedger,
    codec: RecordCodec,
}

impl RecordStore {
    /// Open a store over `blobs`, loading the allocation ledger from the same
    /// medium.
    pub fn open(
        range: IdRange,
        blobs: Arc<dyn BlobStore>,
        schema: Arc<dyn SchemaRegistry>,
    ) -> Self {
        let ledger = AllocationLedger::initialize(range, blobs.clone());
        Self {
            blobs,
            ledger,
            codec: RecordCodec::new(schema),
        }
    }

    /// Store a new record and return its identifier.
    ///
    /// The record is validated and encoded before an identifier is taken, so
    /// an invalid record never consumes one. If the blob write fails the
    /// identifier is *not* returned to the ledger; it stays leaked until
    /// [`reclaim_leaked`](Self::reclaim_leaked) runs.
    pub fn create(&mut self, record: &Record) -> BackendResult<ObjectId> {
        self.codec.validate(record)?;
        let bytes = self.codec.encode(record)?;

        let id = self.ledger.allocate().map_err(|e| {
            warn!(error = %e, "create refused");
            BackendError::NoIdentifierAvailable
        })?;

        if let Err(e) = self.blobs.write(&id.blob_name(), &bytes) {
            error!(%id, error = %e, "record write failed; identifier leaked until reclaimed");
            return Err(e.into());
        }

        debug!(%id, class = %record.class_tag, len = bytes.len(), "record created");
        Ok(id)
    }

    /// Read a record. Returns `Ok(None)` if no blob exists for `id`.
    pub fn read(&self, id: ObjectId) -> BackendResult<Option<Record>> {
        let Some(bytes) = self.blobs.read(&id.blob_name())? else {
            return Ok(None);
        };
        match self.codec.decode(&bytes) {
            Ok(record) => Ok(Some(record)),
            Err(source) => {
                error!(%id, error = %source, "failed to decode stored record");
                Err(BackendError::CorruptRecord { id, source })
            }
        }
    }

    /// Delete a record and recycle its identifier.
    ///
    /// The identifier is released only after the medium confirms the blob
    /// was removed. A missing blob or a failed delete leaves it unreleased.
    pub fn delete(&mut self, id: ObjectId) -> BackendResult<()> {
        match self.blobs.delete(&id.blob_name()) {
            Ok(true) => {}
            Ok(false) => {
                warn!(%id, "delete of missing record; identifier not released");
                return Err(BackendError::NotFound(id));
            }
            Err(e) => {
                error!(%id, error = %e, "record delete failed; identifier not released");
                return Err(e.into());
            }
        }

        if let Err(e) = self.ledger.release(id) {
            warn!(%id, error = %e, "record deleted but identifier not recyclable");
        }
        debug!(%id, "record deleted");
        Ok(())
    }

    /// Return leaked identifiers to the free set.
    ///
    /// An identifier is leaked when the counter has issued it, it is not
    /// free, and no blob exists for it. The scan completes before anything
    /// is released, so a medium error leaves the ledger untouched. Must not
    /// run while a create is in flight.
    pub fn reclaim_leaked(&mut self) -> BackendResult<Vec<ObjectId>> {
        let start = u64::from(self.ledger.range().min().get());
        let end = self.ledger.state().next_id;

        let mut leaked = Vec::new();
        for raw in start..end {
            // Below next_id, which never exceeds max_id + 1.
            let id = ObjectId::new(raw as u32);
            if self.ledger.is_free(id) {
                continue;
            }
            if !self.blobs.exists(&id.blob_name())? {
                leaked.push(id);
            }
        }

        for &id in &leaked {
            if let Err(e) = self.ledger.release(id) {
                warn!(%id, error = %e, "could not reclaim identifier");
            }
        }
        info!(count = leaked.len(), "reclaimed leaked identifiers");
        Ok(leaked)
    }

    /// Retry persisting ledger state after a failed write.
    ///
    /// Returns `true` when `id.txt` and `free.dat` match memory.
    pub fn flush_ledger(&mut self) -> bool {
        let persisted = self.ledger.flush();
        if !persisted {
            warn!("allocation ledger still not persisted");
        }
        persisted
    }

    /// Snapshot of the allocation ledger.
    pub fn allocation_state(&self) -> AllocationState {
        self.ledger.state().clone()
    }

    pub fn ledger(&self) -> &AllocationLedger {
        &self.ledger
    }
}

impl std::fmt::Debug for RecordStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordStore")
            .field("ledger", &self.ledger)
            .field("codec", &self.codec)
            .finish()
    }
}
