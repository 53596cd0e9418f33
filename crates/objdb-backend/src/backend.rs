//! Backend contract and the name-to-constructor table.

use std::collections::BTreeMap;
use std::sync::Arc;

use objdb_ledger::AllocationState;
use objdb_schema::SchemaRegistry;
use objdb_store::{FsBlobStore, InMemoryBlobStore};
use objdb_types::{ObjectId, Record};
use tracing::info;

use crate::config::StoreConfig;
use crate::error::{BackendError, BackendResult};
use crate::record_store::RecordStore;

/// Operations exposed to the request dispatcher.
///
/// Every backend selectable through [`BackendRegistry`] implements this.
pub trait ObjectBackend: Send + std::fmt::Debug {
    /// Store a record under a freshly allocated identifier.
    fn create(&mut self, record: &Record) -> BackendResult<ObjectId>;

    /// Read a record. `Ok(None)` means no record exists under `id`.
    fn read(&self, id: ObjectId) -> BackendResult<Option<Record>>;

    /// Delete a record and recycle its identifier.
    fn delete(&mut self, id: ObjectId) -> BackendResult<()>;

    /// Snapshot of identifier allocation state.
    fn allocation_state(&self) -> AllocationState;

    /// Recover identifiers leaked by failed writes or deletes.
    fn reclaim_leaked(&mut self) -> BackendResult<Vec<ObjectId>>;

    /// Rewrite allocation state that failed to persist. Returns `true` when
    /// the medium is up to date.
    fn flush_ledger(&mut self) -> bool;
}

impl ObjectBackend for RecordStore {
    fn create(&mut self, record: &Record) -> BackendResult<ObjectId> {
        RecordStore::create(self, record)
    }

    fn read(&self, id: ObjectId) -> BackendResult<Option<Record>> {
        RecordStore::read(self, id)
    }

    fn delete(&mut self, id: ObjectId) -> BackendResult<()> {
        RecordStore::delete(self, id)
    }

    fn allocation_state(&self) -> AllocationState {
        RecordStore::allocation_state(self)
    }

    fn reclaim_leaked(&mut self) -> BackendResult<Vec<ObjectId>> {
        RecordStore::reclaim_leaked(self)
    }

    fn flush_ledger(&mut self) -> bool {
        RecordStore::flush_ledger(self)
    }
}

/// Builds a backend from configuration.
pub type BackendConstructor =
    fn(&StoreConfig, Arc<dyn SchemaRegistry>) -> BackendResult<Box<dyn ObjectBackend>>;

/// Table of backend constructors keyed by configuration name.
///
/// Owned by the application; there is no process-wide registry.
#[derive(Clone, Default)]
pub struct BackendRegistry {
    constructors: BTreeMap<String, BackendConstructor>,
}

impl BackendRegistry {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// A table with the `"filesystem"` and `"memory"` backends.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry
            .constructors
            .insert("filesystem".into(), open_filesystem);
        registry.constructors.insert("memory".into(), open_memory);
        registry
    }

    /// Add a constructor under `name`.
    pub fn register(&mut self, name: &str, constructor: BackendConstructor) -> BackendResult<()> {
        if self.constructors.contains_key(name) {
            return Err(BackendError::DuplicateBackend(name.to_string()));
        }
        self.constructors.insert(name.to_string(), constructor);
        Ok(())
    }

    /// Registered names in ascending order.
    pub fn names(&self) -> Vec<&str> {
        self.constructors.keys().map(String::as_str).collect()
    }

    /// Construct the backend named by `config.backend`.
    pub fn build(
        &self,
        config: &StoreConfig,
        schema: Arc<dyn SchemaRegistry>,
    ) -> BackendResult<Box<dyn ObjectBackend>> {
        let constructor =
            self.constructors
                .get(&config.backend)
                .ok_or_else(|| BackendError::UnknownBackend {
                    name: config.backend.clone(),
                    available: self.names().join(", "),
                })?;
        info!(backend = %config.backend, "opening object backend");
        constructor(config, schema)
    }
}

impl std::fmt::Debug for BackendRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendRegistry")
            .field("names", &self.names())
            .finish()
    }
}

fn open_filesystem(
    config: &StoreConfig,
    schema: Arc<dyn SchemaRegistry>,
) -> BackendResult<Box<dyn ObjectBackend>> {
    let range = config.id_range()?;
    let blobs = Arc::new(FsBlobStore::open(&config.root, config.sync_writes)?);
    Ok(Box::new(RecordStore::open(range, blobs, schema)))
}

fn open_memory(
    config: &StoreConfig,
    schema: Arc<dyn SchemaRegistry>,
) -> BackendResult<Box<dyn ObjectBackend>> {
    let range = config.id_range()?;
    let blobs = Arc::new(InMemoryBlobStore::new());
    Ok(Box::new(RecordStore::open(range, blobs, schema)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use objdb_schema::{ClassDescriptor, InMemorySchemaRegistry};
    use objdb_types::ClassTag;

    fn schema() -> Arc<dyn SchemaRegistry> {
        Arc::new(
            InMemorySchemaRegistry::new()
                .with_class(ClassDescriptor::new(3, "Door").with_field(0, "setOpen")),
        )
    }

    fn config(backend: &str) -> StoreConfig {
        StoreConfig {
            backend: backend.into(),
            min_id: 1,
            max_id: 3,
            ..StoreConfig::default()
        }
    }

    #[test]
    fn builtin_names() {
        let registry = BackendRegistry::with_builtin();
        assert_eq!(registry.names(), vec!["filesystem", "memory"]);
    }

    #[test]
    fn build_memory_backend() {
        let registry = BackendRegistry::with_builtin();
        let mut backend = registry.build(&config("memory"), schema()).unwrap();

        let record = Record::new(ClassTag(3)).with_field(0, vec![1]);
        let id = backend.create(&record).unwrap();
        assert_eq!(backend.read(id).unwrap(), Some(record));
        backend.delete(id).unwrap();
        assert_eq!(backend.read(id).unwrap(), None);
        assert_eq!(backend.allocation_state().next_id, 2);
        assert!(backend.reclaim_leaked().unwrap().is_empty());
        assert!(backend.flush_ledger());
    }

    #[test]
    fn build_filesystem_backend() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = StoreConfig {
            root: dir.path().join("objs"),
            ..config("filesystem")
        };
        let registry = BackendRegistry::with_builtin();
        let mut backend = registry.build(&cfg, schema()).unwrap();
        let id = backend.create(&Record::new(ClassTag(3))).unwrap();

        assert!(dir.path().join("objs").join(id.blob_name()).exists());
        assert!(dir.path().join("objs").join("id.txt").exists());
    }

    #[test]
    fn unknown_backend() {
        let registry = BackendRegistry::with_builtin();
        let err = registry.build(&config("postgres"), schema()).unwrap_err();
        match err {
            BackendError::UnknownBackend { name, available } => {
                assert_eq!(name, "postgres");
                assert_eq!(available, "filesystem, memory");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn invalid_range_surfaces_config_error() {
        let registry = BackendRegistry::with_builtin();
        let cfg = StoreConfig {
            min_id: 5,
            max_id: 1,
            ..config("memory")
        };
        assert!(matches!(
            registry.build(&cfg, schema()),
            Err(BackendError::Config(_))
        ));
    }

    #[test]
    fn register_custom_and_reject_duplicate() {
        fn tiny(
            _config: &StoreConfig,
            schema: Arc<dyn SchemaRegistry>,
        ) -> BackendResult<Box<dyn ObjectBackend>> {
            let range = objdb_types::IdRange::new(7, 7)
                .map_err(|e| BackendError::Config(e.to_string()))?;
            Ok(Box::new(RecordStore::open(
                range,
                Arc::new(InMemoryBlobStore::new()),
                schema,
            )))
        }

        let mut registry = BackendRegistry::new();
        registry.register("tiny", tiny).unwrap();
        assert!(matches!(
            registry.register("tiny", tiny),
            Err(BackendError::DuplicateBackend(_))
        ));

        let mut backend = registry.build(&config("tiny"), schema()).unwrap();
        assert_eq!(
            backend.create(&Record::new(ClassTag(3))).unwrap(),
            ObjectId::new(7)
        );
    }
}
