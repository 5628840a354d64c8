//! # Profile Storage
//!
//! Key-value persistence for monitor state using XDG-compliant paths.
//!
//! ## Storage Location
//!
//! ```text
//! ~/.local/share/dirac-monitor/profiles/
//! ├── RequestMonitor.json
//! └── ...
//! ```
//!
//! Values are opaque JSON documents; the store never looks inside them.

use anyhow::{Context, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Opaque get/set store for saved state.
pub trait ProfileStore {
    fn get(&self, key: &str) -> Result<Option<Value>>;
    fn set(&mut self, key: &str, value: Value) -> Result<()>;
}

/// One JSON file per key inside a directory.
#[derive(Debug)]
pub struct FileProfileStore {
    dir: PathBuf,
}

impl FileProfileStore {
    /// Open the store in the platform data directory.
    pub fn open_default() -> Result<Self> {
        Self::open(get_storage_dir()?)
    }

    /// Open the store in `dir`, creating it if needed.
    pub fn open(dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&dir).with_context(|| {
            format!("Failed to create profile storage directory: {}", dir.display())
        })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", sanitize_key(key)))
    }
}

impl ProfileStore for FileProfileStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read profile file: {}", path.display()))?;
        let value = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse profile file: {}", path.display()))?;
        Ok(Some(value))
    }

    fn set(&mut self, key: &str, value: Value) -> Result<()> {
        let path = self.path_for(key);
        let json = serde_json::to_string_pretty(&value).context("Failed to serialize profile")?;
        fs::write(&path, json)
            .with_context(|| format!("Failed to write profile file: {}", path.display()))?;
        Ok(())
    }
}

/// In-memory store, used when nothing should touch the disk.
#[derive(Debug, Default)]
pub struct MemoryProfileStore {
    values: HashMap<String, Value>,
}

impl ProfileStore for MemoryProfileStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: Value) -> Result<()> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }
}

/// Get the XDG-compliant storage directory for profiles
fn get_storage_dir() -> Result<PathBuf> {
    let proj_dirs = directories::ProjectDirs::from("", "", "dirac-monitor")
        .context("Failed to determine application data directory")?;

    Ok(proj_dirs.data_dir().join("profiles"))
}

/// Keep keys usable as file names on every platform
fn sanitize_key(key: &str) -> String {
    key.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_file_store_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = FileProfileStore::open(temp_dir.path().join("profiles")).unwrap();

        assert!(store.get("RequestMonitor").unwrap().is_none());
        store
            .set("RequestMonitor", json!({"leftMenu": {"reqId": "5"}}))
            .unwrap();

        let reopened = FileProfileStore::open(temp_dir.path().join("profiles")).unwrap();
        let value = reopened.get("RequestMonitor").unwrap().unwrap();
        assert_eq!(value["leftMenu"]["reqId"], "5");
    }

    #[test]
    fn test_corrupted_profile_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileProfileStore::open(temp_dir.path().to_path_buf()).unwrap();
        fs::write(store.path_for("Broken"), "not valid json").unwrap();

        let err = store.get("Broken").unwrap_err();
        assert!(err.to_string().contains("Failed to parse profile file"));
    }

    #[test]
    fn test_keys_are_sanitized() {
        assert_eq!(sanitize_key("Request Monitor/../x"), "Request_Monitor_.._x");
        let temp_dir = TempDir::new().unwrap();
        let store = FileProfileStore::open(temp_dir.path().to_path_buf()).unwrap();
        assert_eq!(store.path_for("a/b").parent().unwrap(), store.dir());
    }

    #[test]
    fn test_memory_store() {
        let mut store = MemoryProfileStore::default();
        store.set("k", json!(1)).unwrap();
        assert_eq!(store.get("k").unwrap(), Some(json!(1)));
        assert_eq!(store.get("missing").unwrap(), None);
    }
}
