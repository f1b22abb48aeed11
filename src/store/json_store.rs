use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::store::schema::SessionFile;

/// One write in an atomic batch: `Some` sets the key, `None` removes it.
pub type StorageWrite<'a> = (&'a str, Option<&'a str>);

/// Session-scoped string key/value storage.
pub trait SessionStorage {
    fn get(&self, key: &str) -> Option<String>;

    /// Apply every write or none of them.
    fn apply(&mut self, batch: &[StorageWrite<'_>]) -> Result<()>;

    /// Drop every key.
    fn clear(&mut self) -> Result<()>;
}

#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a raw value bypassing any serialization, e.g. to simulate tampering.
    pub fn insert_raw(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
    }
}

impl SessionStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn apply(&mut self, batch: &[StorageWrite<'_>]) -> Result<()> {
        for (key, value) in batch {
            match value {
                Some(v) => {
                    self.entries.insert(key.to_string(), v.to_string());
                }
                None => {
                    self.entries.remove(*key);
                }
            }
        }
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        self.entries.clear();
        Ok(())
    }
}

/// Session storage backed by a single JSON file.
///
/// The file is re-read on every access so separate processes in the same
/// session observe each other's writes. Writes go through a temp file and a
/// rename, so a batch lands whole or not at all.
pub struct JsonSessionStore {
    path: PathBuf,
}

impl JsonSessionStore {
    pub fn open(dir: &Path, session_id: &str) -> Result<Self> {
        fs::create_dir_all(dir)?;
        Ok(Self {
            path: dir.join(format!("session-{}.json", sanitize_id(session_id))),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> SessionFile {
        let Ok(content) = fs::read_to_string(&self.path) else {
            return SessionFile::default();
        };
        match serde_json::from_str::<SessionFile>(&content) {
            Ok(file) if !file.needs_reset() => file,
            _ => SessionFile::default(),
        }
    }

    fn write(&self, data: &SessionFile) -> Result<()> {
        let tmp_path = self.path.with_extension("json.tmp");

        let json = serde_json::to_string_pretty(data)?;
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;

        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

impl SessionStorage for JsonSessionStore {
    fn get(&self, key: &str) -> Option<String> {
        self.read().entries.remove(key)
    }

    fn apply(&mut self, batch: &[StorageWrite<'_>]) -> Result<()> {
        let mut data = self.read();
        for (key, value) in batch {
            match value {
                Some(v) => {
                    data.entries.insert(key.to_string(), v.to_string());
                }
                None => {
                    data.entries.remove(*key);
                }
            }
        }
        self.write(&data)
    }

    fn clear(&mut self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

fn sanitize_id(id: &str) -> String {
    let cleaned: String = id
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "default".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn make_test_store() -> (TempDir, JsonSessionStore) {
        let dir = TempDir::new().unwrap();
        let store = JsonSessionStore::open(dir.path(), "test").unwrap();
        (dir, store)
    }

    #[test]
    fn test_missing_file_reads_as_empty() {
        let (_dir, store) = make_test_store();
        assert!(!store.path().exists());
        assert_eq!(store.get("anything"), None);
    }

    #[test]
    fn test_batch_set_and_remove() {
        let (_dir, mut store) = make_test_store();
        store.apply(&[("a", Some("1")), ("b", Some("2"))]).unwrap();
        store.apply(&[("a", Some("3")), ("b", None)]).unwrap();
        assert_eq!(store.get("a").as_deref(), Some("3"));
        assert_eq!(store.get("b"), None);
    }

    #[test]
    fn test_writes_visible_to_second_handle() {
        let (dir, mut store) = make_test_store();
        store.apply(&[("k", Some("v"))]).unwrap();

        let other = JsonSessionStore::open(dir.path(), "test").unwrap();
        assert_eq!(other.get("k").as_deref(), Some("v"));

        let unrelated = JsonSessionStore::open(dir.path(), "other").unwrap();
        assert_eq!(unrelated.get("k"), None);
    }

    #[test]
    fn test_corrupt_file_reads_as_empty_and_is_replaced() {
        let (_dir, mut store) = make_test_store();
        fs::write(store.path(), "{ not json").unwrap();
        assert_eq!(store.get("k"), None);

        store.apply(&[("k", Some("v"))]).unwrap();
        assert_eq!(store.get("k").as_deref(), Some("v"));
    }

    #[test]
    fn test_stale_schema_is_discarded() {
        let (_dir, store) = make_test_store();
        fs::write(
            store.path(),
            r#"{"schema_version": 99, "created_at": "2024-01-01T00:00:00Z", "entries": {"k": "v"}}"#,
        )
        .unwrap();
        assert_eq!(store.get("k"), None);
    }

    #[test]
    fn test_no_tmp_file_left_after_write() {
        let (dir, mut store) = make_test_store();
        store.apply(&[("k", Some("v"))]).unwrap();
        let tmp_files: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().and_then(|x| x.to_str()) == Some("tmp"))
            .collect();
        assert!(tmp_files.is_empty(), "no residual .tmp files");
    }

    #[test]
    fn test_clear_removes_file_and_is_idempotent() {
        let (_dir, mut store) = make_test_store();
        store.apply(&[("k", Some("v"))]).unwrap();
        store.clear().unwrap();
        assert!(!store.path().exists());
        store.clear().unwrap();
    }

    #[test]
    fn test_session_id_is_sanitized() {
        let dir = TempDir::new().unwrap();
        let store = JsonSessionStore::open(dir.path(), "../evil id").unwrap();
        assert_eq!(
            store.path().file_name().and_then(|n| n.to_str()),
            Some("session-___evil_id.json")
        );
        let blank = JsonSessionStore::open(dir.path(), "").unwrap();
        assert!(blank.path().ends_with("session-default.json"));
    }

    #[test]
    fn test_memory_storage_batch() {
        let mut storage = MemoryStorage::new();
        storage.apply(&[("a", Some("1"))]).unwrap();
        storage.insert_raw("b", "raw");
        storage.apply(&[("a", None)]).unwrap();
        assert_eq!(storage.get("a"), None);
        assert_eq!(storage.get("b").as_deref(), Some("raw"));
        storage.clear().unwrap();
        assert_eq!(storage.get("b"), None);
    }
}
