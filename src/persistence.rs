//! Key-value preference storage
//!
//! String keys mapped to string values, the same shape as browser local
//! storage. Table layouts are written here under `{table_id}_*` keys.

use anyhow::{Context, Result};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Minimal string store used for UI preferences
pub trait KeyValueStore {
    fn get_item(&self, key: &str) -> Result<Option<String>>;
    fn set_item(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove_item(&mut self, key: &str) -> Result<()>;
}

/// JSON-file backed store
///
/// The whole map is held in memory and rewritten on every mutation.
/// Entries are kept sorted so the file diffs cleanly.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    /// Open the store at `path`
    ///
    /// A missing file is an empty store. A corrupt file is logged and also
    /// treated as empty; it gets replaced on the next write.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<BTreeMap<String, String>>(&contents) {
                Ok(entries) => {
                    info!(path = %path.display(), entries = entries.len(), "Loaded preference store");
                    entries
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Preference store is not a JSON string map, starting empty");
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No preference store yet");
                BTreeMap::new()
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to read preference store, starting empty");
                BTreeMap::new()
            }
        };

        Self { path, entries }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create preference directory {:?}", parent))?;
        }

        let json = serde_json::to_string_pretty(&self.entries)
            .context("Failed to serialize preference store")?;

        fs::write(&self.path, json)
            .with_context(|| format!("Failed to write preference store {:?}", self.path))
    }
}

impl KeyValueStore for FileStore {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        self.flush()
    }

    fn remove_item(&mut self, key: &str) -> Result<()> {
        if self.entries.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }
}

/// In-memory store
///
/// Writes to keys registered with [`MemoryStore::fail_writes_for`] return an
/// error, which lets callers exercise partial-failure paths.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
    failing_keys: HashSet<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_writes_for(&mut self, key: &str) {
        self.failing_keys.insert(key.to_string());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<()> {
        if self.failing_keys.contains(key) {
            anyhow::bail!("write rejected for key '{key}'");
        }
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_path(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "project-board-store-{}-{}",
            name,
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        dir.join("preferences.json")
    }

    #[test]
    fn test_file_store_missing_file_is_empty() {
        let path = scratch_path("missing");
        let store = FileStore::open(&path);
        assert_eq!(store.get_item("anything").unwrap(), None);
        assert!(!path.exists());
    }

    #[test]
    fn test_file_store_persists_across_reopen() {
        let path = scratch_path("reopen");
        let mut store = FileStore::open(&path);
        store.set_item("projects-table_column_sizing_mode", "redimensionables").unwrap();
        store.set_item("other", "1").unwrap();

        let reopened = FileStore::open(&path);
        assert_eq!(
            reopened.get_item("projects-table_column_sizing_mode").unwrap().as_deref(),
            Some("redimensionables")
        );
        assert_eq!(reopened.get_item("other").unwrap().as_deref(), Some("1"));
    }

    #[test]
    fn test_file_store_remove_item() {
        let path = scratch_path("remove");
        let mut store = FileStore::open(&path);
        store.set_item("a", "1").unwrap();
        store.remove_item("a").unwrap();

        let reopened = FileStore::open(&path);
        assert_eq!(reopened.get_item("a").unwrap(), None);
    }

    #[test]
    fn test_file_store_corrupt_file_starts_empty() {
        let path = scratch_path("corrupt");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "{ not json").unwrap();

        let mut store = FileStore::open(&path);
        assert_eq!(store.get_item("a").unwrap(), None);

        // Next write replaces the corrupt content
        store.set_item("a", "1").unwrap();
        let reopened = FileStore::open(&path);
        assert_eq!(reopened.get_item("a").unwrap().as_deref(), Some("1"));
    }

    #[test]
    fn test_memory_store_failing_key() {
        let mut store = MemoryStore::new();
        store.fail_writes_for("bad");

        assert!(store.set_item("bad", "x").is_err());
        assert!(store.set_item("good", "y").is_ok());
        assert_eq!(store.get_item("bad").unwrap(), None);
        assert_eq!(store.get_item("good").unwrap().as_deref(), Some("y"));
        assert_eq!(store.len(), 1);
    }
}
