use std::path::{Path, PathBuf};

use objdb_types::IdRange;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{BackendError, BackendResult};

/// Store configuration, usually read from a TOML file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Name looked up in the [`BackendRegistry`](crate::BackendRegistry).
    pub backend: String,
    /// Storage root for the filesystem backend.
    pub root: PathBuf,
    pub min_id: u32,
    pub max_id: u32,
    /// `fsync` every blob write.
    pub sync_writes: bool,
    /// Optional TOML schema definition.
    pub schema: Option<PathBuf>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: "filesystem".into(),
            root: PathBuf::from("objs"),
            min_id: 1,
            max_id: 1_000_000,
            sync_writes: false,
            schema: None,
        }
    }
}

impl StoreConfig {
    /// Parse from TOML text. Missing keys take their defaults.
    pub fn from_toml_str(text: &str) -> BackendResult<Self> {
        toml::from_str(text).map_err(|e| BackendError::Config(e.to_string()))
    }

    /// Load from a file, or return the defaults if it does not exist.
    pub fn load_or_default(path: &Path) -> BackendResult<Self> {
        match std::fs::read_to_string(path) {
            Ok(text) => {
                debug!(path = %path.display(), "loaded store config");
                Self::from_toml_str(&text)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no store config; using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(BackendError::Config(format!("{}: {e}", path.display()))),
        }
    }

    /// The validated identifier range.
    pub fn id_range(&self) -> BackendResult<IdRange> {
        IdRange::new(self.min_id, self.max_id).map_err(|e| BackendError::Config(e.to_string()))
    }
}
