//! Key-value persistence for user preferences
//!
//! The browser prototype kept preferences in localStorage; here the same
//! string-keyed contract is a small trait with a JSON-file implementation
//! and an in-memory one for tests. Persistence is best-effort: the store
//! treats write failures as a logged side-channel problem, never as fatal.

use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::{DashError, Result};

pub const KEY_THEME: &str = "theme";
pub const KEY_ACKS: &str = "acks";
pub const KEY_ENDPOINTS: &str = "settings.endpoints";
pub const KEY_ALERT_NOTES: &str = "alertNotes";
pub const KEY_ALERT_SNOOZE: &str = "alertSnooze";
pub const KEY_DASHBOARD_LAYOUT: &str = "dashboardLayout";

/// String-keyed storage for serialized preference values.
pub trait KvStorage: Send + Sync {
    /// Load a raw value. Missing keys are `None`, not an error.
    fn load(&self, key: &str) -> Option<String>;

    /// Store a raw value, replacing any previous one.
    fn store(&self, key: &str, value: &str) -> Result<()>;
}

/// File-backed storage: one JSON object of key -> raw value.
pub struct FileStorage {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileStorage {
    /// Open (or create) the store at `path`. An unreadable or corrupt file
    /// starts empty rather than failing.
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let entries = std::fs::read_to_string(&path)
            .ok()
            .and_then(|text| serde_json::from_str(&text).ok())
            .unwrap_or_default();
        Self {
            path,
            entries: Mutex::new(entries),
        }
    }

    fn flush(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let text = serde_json::to_string_pretty(entries)?;
        // Write through a temp file so a crash mid-write cannot corrupt prefs.
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, text)?;
        std::fs::rename(&tmp, &self.path)
            .map_err(|e| DashError::Storage(format!("rename {}: {e}", self.path.display())))
    }
}

impl KvStorage for FileStorage {
    fn load(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).cloned()
    }

    fn store(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.lock();
        entries.insert(key.to_string(), value.to_string());
        self.flush(&entries)
    }
}

/// In-memory storage for tests and ephemeral runs.
#[derive(Default)]
pub struct MemoryStorage {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seed a key, e.g. to simulate a previous session.
    pub fn seed(self, key: &str, value: &str) -> Self {
        self.entries.lock().insert(key.into(), value.into());
        self
    }
}

impl KvStorage for MemoryStorage {
    fn load(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).cloned()
    }

    fn store(&self, key: &str, value: &str) -> Result<()> {
        self.entries.lock().insert(key.into(), value.into());
        Ok(())
    }
}
