use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// Key-value string storage holding the serialized note collection.
pub trait Backend {
    /// Read a key. A missing key is `Ok(None)`, not an error.
    fn get(&self, key: &str) -> io::Result<Option<String>>;

    fn set(&mut self, key: &str, value: &str) -> io::Result<()>;

    /// Remove a key. Removing a missing key succeeds.
    fn remove(&mut self, key: &str) -> io::Result<()>;
}

/// Stores each key as `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing `key`
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl Backend for FileBackend {
    fn get(&self, key: &str) -> io::Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)
    }

    fn remove(&mut self, key: &str) -> io::Result<()> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}

/// In-process backend. Clones share the same entries, so a test can keep a
/// handle after moving one into a store.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    entries: Arc<Mutex<HashMap<String, String>>>,
    fail_reads: Arc<AtomicBool>,
    fail_writes: Arc<AtomicBool>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend pre-seeded with one raw entry.
    pub fn with_entry(key: &str, value: &str) -> Self {
        let backend = Self::new();
        backend.lock().insert(key.to_string(), value.to_string());
        backend
    }

    /// Make subsequent `get` calls fail.
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent `set`/`remove` calls fail.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Raw stored value for `key`.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_writable(&self) -> io::Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                "storage quota exceeded",
            ));
        }
        Ok(())
    }
}

impl Backend for MemoryBackend {
    fn get(&self, key: &str) -> io::Result<Option<String>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "storage access denied",
            ));
        }
        Ok(self.lock().get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> io::Result<()> {
        self.check_writable()?;
        self.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> io::Result<()> {
        self.check_writable()?;
        self.lock().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_backend_missing_key_is_none() {
        let tmp = TempDir::new().unwrap();
        let backend = FileBackend::new(tmp.path());
        assert_eq!(backend.get("notes").unwrap(), None);
    }

    #[test]
    fn test_file_backend_set_get_remove() {
        let tmp = TempDir::new().unwrap();
        let mut backend = FileBackend::new(tmp.path().join("nested"));

        backend.set("notes", "[]").unwrap();
        assert!(tmp.path().join("nested/notes.json").exists());
        assert_eq!(backend.get("notes").unwrap().as_deref(), Some("[]"));
        assert!(!tmp.path().join("nested/notes.json.tmp").exists());

        backend.remove("notes").unwrap();
        assert_eq!(backend.get("notes").unwrap(), None);
        backend.remove("notes").unwrap();
    }

    #[test]
    fn test_memory_backend_clones_share_entries() {
        let backend = MemoryBackend::new();
        let mut writer = backend.clone();
        writer.set("k", "v").unwrap();
        assert_eq!(backend.raw("k").as_deref(), Some("v"));
    }

    #[test]
    fn test_memory_backend_write_failure() {
        let mut backend = MemoryBackend::with_entry("k", "old");
        backend.set_fail_writes(true);

        assert!(backend.set("k", "new").is_err());
        assert!(backend.remove("k").is_err());
        assert_eq!(backend.get("k").unwrap().as_deref(), Some("old"));
    }

    #[test]
    fn test_memory_backend_read_failure() {
        let backend = MemoryBackend::with_entry("k", "v");
        backend.set_fail_reads(true);

        assert!(backend.get("k").is_err());
        assert_eq!(backend.raw("k").as_deref(), Some("v"));
    }
}
