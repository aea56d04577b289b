use std::fs;
use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Bumped whenever the persisted shape of any store changes. Older payloads
/// are discarded rather than migrated.
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug)]
pub enum StorageError {
    Io(std::io::Error),
    Serde(serde_json::Error),
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::Io(err) => write!(f, "Storage IO error: {}", err),
            StorageError::Serde(err) => write!(f, "Storage encoding error: {}", err),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        StorageError::Io(err)
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serde(err)
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Envelope<T> {
    version: u32,
    data: T,
}

/// File-backed key-value JSON storage, one file per store key. Stands in for
/// the browser's local storage: writes are synchronous on every mutation and
/// there is no transactional grouping across keys.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    dir: PathBuf,
}

impl LocalStorage {
    pub fn from_env() -> Self {
        let dir = std::env::var("VOYAGO_DATA_DIR").unwrap_or_else(|_| ".voyago".to_string());
        Self { dir: PathBuf::from(dir) }
    }

    pub fn at(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn save<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir)?;
        let envelope = Envelope {
            version: SCHEMA_VERSION,
            data: value,
        };
        let json = serde_json::to_string_pretty(&envelope)?;
        fs::write(self.path_for(key), json)?;
        Ok(())
    }

    /// Missing, undecodable, or version-mismatched payloads all read as None.
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let path = self.path_for(key);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return None,
            Err(err) => {
                log::warn!("Failed to read {}: {}", path.display(), err);
                return None;
            }
        };

        let envelope: Envelope<T> = match serde_json::from_str(&raw) {
            Ok(envelope) => envelope,
            Err(err) => {
                log::warn!("Discarding undecodable state for '{}': {}", key, err);
                return None;
            }
        };

        if envelope.version != SCHEMA_VERSION {
            log::warn!(
                "Discarding persisted state for '{}': version {} (expected {})",
                key,
                envelope.version,
                SCHEMA_VERSION
            );
            return None;
        }

        Some(envelope.data)
    }

    pub fn remove(&self, key: &str) {
        let path = self.path_for(key);
        if let Err(err) = fs::remove_file(&path) {
            if err.kind() != std::io::ErrorKind::NotFound {
                log::warn!("Failed to remove {}: {}", path.display(), err);
            }
        }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}
