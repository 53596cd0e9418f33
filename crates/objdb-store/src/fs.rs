use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::StoreResult;
use crate::names::{validate_blob_name, TEMP_SUFFIX};
use crate::traits::BlobStore;

/// Filesystem blob store: one file per blob under a root directory.
///
/// Writes are staged to `<name>.tmp`, flushed, then renamed over the target,
/// so a reader or a restarted process sees either the old blob or the new
/// one. With `sync_writes` enabled the staged file is `fsync`ed before the
/// rename and the root directory after it, so the rename survives power loss.
#[derive(Debug)]
pub struct FsBlobStore {
    root: PathBuf,
    sync_writes: bool,
}

impl FsBlobStore {
    /// Open (or create) a store rooted at `root`.
    ///
    /// Leftover `.tmp` files from an interrupted write are removed.
    pub fn open(root: &Path, sync_writes: bool) -> StoreResult<Self> {
        fs::create_dir_all(root)?;
        let store = Self {
            root: root.to_path_buf(),
            sync_writes,
        };
        store.sweep_staged()?;
        debug!(root = %root.display(), sync_writes, "opened filesystem blob store");
        Ok(store)
    }

    fn path_of(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// `fsync` the root directory so renames and unlinks in it are durable.
    fn sync_root(&self) -> io::Result<()> {
        File::open(&self.root)?.sync_all()
    }

    fn sweep_staged(&self) -> StoreResult<()> {
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else {
                continue;
            };
            if name.ends_with(TEMP_SUFFIX) {
                warn!(file = name, "removing interrupted blob write");
                if let Err(e) = fs::remove_file(entry.path()) {
                    warn!(file = name, error = %e, "failed to remove staged blob");
                }
            }
        }
        Ok(())
    }
}

impl BlobStore for FsBlobStore {
    fn read(&self, name: &str) -> StoreResult<Option<Vec<u8>>> {
        validate_blob_name(name)?;
        match fs::read(self.path_of(name)) {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, name: &str, data: &[u8]) -> StoreResult<()> {
        validate_blob_name(name)?;
        let target = self.path_of(name);
        let staged = self.path_of(&format!("{name}{TEMP_SUFFIX}"));

        let result = (|| -> io::Result<()> {
            let mut file = File::create(&staged)?;
            file.write_all(data)?;
            file.flush()?;
            if self.sync_writes {
                file.sync_all()?;
            }
            fs::rename(&staged, &target)
        })();

        if let Err(e) = result {
            let _ = fs::remove_file(&staged);
            return Err(e.into());
        }
        if self.sync_writes {
            self.sync_root()?;
        }
        debug!(blob = name, len = data.len(), "blob written");
        Ok(())
    }

    fn delete(&self, name: &str) -> StoreResult<bool> {
        validate_blob_name(name)?;
        match fs::remove_file(self.path_of(name)) {
            Ok(()) => {
                if self.sync_writes {
                    self.sync_root()?;
                }
                debug!(blob = name, "blob deleted");
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn exists(&self, name: &str) -> StoreResult<bool> {
        validate_blob_name(name)?;
        Ok(self.path_of(name).try_exists()?)
    }
}
