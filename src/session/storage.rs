//! Durable client-side key/value storage for session state.
//!
//! The layout is flat: one entry per logical value, all under a fixed
//! namespace prefix, every value UTF-8 JSON text. Writes are write-through —
//! the dataset is tiny, so durability wins over throughput.

use crate::error::StorageError;
use ahash::AHashMap;
use bincode::config::standard;
use bincode::serde::{decode_from_slice, encode_to_vec};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Fixed prefix every persisted key lives under.
pub const NAMESPACE: &str = "journey_";

/// Persisted key names (unprefixed).
pub mod keys {
    pub const SCHEMA_VERSION: &str = "schemaVersion";
    pub const JOURNEY_TYPE: &str = "journeyType";
    pub const USER_TYPE: &str = "userType";
    pub const STEP_INDEX: &str = "stepIndex";
    pub const JOURNEY_STEPS: &str = "journeySteps";
    pub const BRANCH_STEP_ID: &str = "branchStepId";
    pub const FORM_DATA: &str = "formData";
    pub const PREFILLED_DATA: &str = "prefilledData";
    pub const BASELINE_DATA: &str = "baselineData";
    pub const CHANGED_FIELDS: &str = "changedFields";

    pub const ALL: &[&str] = &[
        SCHEMA_VERSION,
        JOURNEY_TYPE,
        USER_TYPE,
        STEP_INDEX,
        JOURNEY_STEPS,
        BRANCH_STEP_ID,
        FORM_DATA,
        PREFILLED_DATA,
        BASELINE_DATA,
        CHANGED_FIELDS,
    ];
}

fn namespaced(key: &str) -> String {
    format!("{NAMESPACE}{key}")
}

/// The storage surface the session writes through.
///
/// Keys are passed unprefixed; implementations apply [`NAMESPACE`]. Access is
/// synchronous and local — there is no network boundary at this layer, so no
/// retry logic. Write failures are an implementation concern (logged, never
/// fatal): the layer prefers availability over strict durability.
pub trait SessionStorage {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String);
    fn remove(&mut self, key: &str);

    /// Erases every session entry under the namespace.
    fn clear(&mut self) {
        for key in keys::ALL {
            self.remove(key);
        }
    }
}

/// Volatile storage. Used in tests and by hosts that provide their own
/// durability around the session.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: AHashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl SessionStorage for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(&namespaced(key)).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.entries.insert(namespaced(key), value);
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(&namespaced(key));
    }
}

/// File-backed storage: the whole namespace is held in memory and encoded to
/// a single bincode container on every write.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: AHashMap<String, String>,
}

impl FileStore {
    /// Opens a store at `path`. A missing file is an empty store; an
    /// unreadable or undecodable file is an error the caller decides about.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        let entries = if path.exists() {
            let bytes = fs::read(&path).map_err(|e| StorageError::Open {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
            decode_from_slice(&bytes, standard())
                .map(|(entries, _)| entries)
                .map_err(|e| StorageError::Decode(e.to_string()))?
        } else {
            AHashMap::new()
        };
        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> Result<(), StorageError> {
        let bytes = encode_to_vec(&self.entries, standard())
            .map_err(|e| StorageError::Encode(e.to_string()))?;
        fs::write(&self.path, bytes).map_err(|e| StorageError::Write {
            path: self.path.display().to_string(),
            message: e.to_string(),
        })
    }

    fn persist_or_warn(&self) {
        if let Err(err) = self.persist() {
            warn!(%err, "session write failed, keeping in-memory state");
        }
    }
}

impl SessionStorage for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(&namespaced(key)).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.entries.insert(namespaced(key), value);
        self.persist_or_warn();
    }

    fn remove(&mut self, key: &str) {
        if self.entries.remove(&namespaced(key)).is_some() {
            self.persist_or_warn();
        }
    }
}
