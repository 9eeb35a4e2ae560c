//! File-per-key storage backend.
//!
//! Each key is stored as `<root>/kv/<key>.json`. Writes go to a sibling
//! temporary file first and are renamed into place, so a crash mid-write
//! leaves the previous value intact.

use super::backend::{validate_key, BackendType, KeyValueStore};
use crate::Result;
use std::fs;
use std::path::{Path, PathBuf};

/// Directory under the storage root that holds the key files.
pub const KV_DIR: &str = "kv";

/// Key-value store backed by one JSON file per key.
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    /// Open (creating if needed) the key directory under `root`.
    pub fn open(root: &Path) -> Result<Self> {
        let dir = root.join(KV_DIR);
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn key_path(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl KeyValueStore for FileBackend {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        let path = self.key_path(key)?;
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(&path)?))
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<()> {
        let path = self.key_path(key)?;
        let tmp = self.dir.join(format!(".{}.json.tmp", key));
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<()> {
        let path = self.key_path(key)?;
        if path.exists() {
            fs::remove_file(&path)?;
        }
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                if !stem.starts_with('.') {
                    keys.push(stem.to_string());
                }
            }
        }
        keys.sort();
        Ok(keys)
    }

    fn location(&self) -> String {
        self.dir.display().to_string()
    }

    fn backend_type(&self) -> BackendType {
        BackendType::File
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_set_get_remove() {
        let temp = TempDir::new().unwrap();
        let mut store = FileBackend::open(temp.path()).unwrap();

        assert_eq!(store.get_item("products").unwrap(), None);

        store.set_item("products", "[]").unwrap();
        assert_eq!(store.get_item("products").unwrap().as_deref(), Some("[]"));
        assert!(temp.path().join("kv").join("products.json").exists());

        store.set_item("products", "[1]").unwrap();
        assert_eq!(store.get_item("products").unwrap().as_deref(), Some("[1]"));

        store.remove_item("products").unwrap();
        assert_eq!(store.get_item("products").unwrap(), None);

        // Removing again is fine
        store.remove_item("products").unwrap();
    }

    #[test]
    fn test_keys_sorted_and_no_temp_files() {
        let temp = TempDir::new().unwrap();
        let mut store = FileBackend::open(temp.path()).unwrap();
        store.set_item("orders", "[]").unwrap();
        store.set_item("customers", "[]").unwrap();
        fs::write(temp.path().join("kv").join("notes.txt"), "x").unwrap();

        assert_eq!(store.keys().unwrap(), vec!["customers", "orders"]);
    }

    #[test]
    fn test_rejects_path_like_keys() {
        let temp = TempDir::new().unwrap();
        let mut store = FileBackend::open(temp.path()).unwrap();
        assert!(store.set_item("../escape", "x").is_err());
        assert!(store.get_item("a/b").is_err());
    }

    #[test]
    fn test_values_survive_reopen() {
        let temp = TempDir::new().unwrap();
        {
            let mut store = FileBackend::open(temp.path()).unwrap();
            store.set_item("cart", "[{\"id\":\"1\"}]").unwrap();
        }
        let store = FileBackend::open(temp.path()).unwrap();
        assert_eq!(
            store.get_item("cart").unwrap().as_deref(),
            Some("[{\"id\":\"1\"}]")
        );
        assert_eq!(store.backend_type(), BackendType::File);
    }
}
