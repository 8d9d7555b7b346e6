//! Durable key-value storage port.
//!
//! The dashboard never touches the filesystem directly; it is handed a
//! [`KeyValueStore`]. [`FileStore`] keeps one JSON file per key,
//! [`MemoryStore`] backs tests.

use crate::error::Result;
use crate::io;
use crate::paths;
use std::collections::HashMap;
use std::path::PathBuf;

pub trait KeyValueStore {
    /// Read the payload stored under `key`, if any.
    fn load(&self, key: &str) -> Result<Option<String>>;

    /// Replace the payload stored under `key`.
    fn save(&mut self, key: &str, value: &str) -> Result<()>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &mut S {
    fn load(&self, key: &str) -> Result<Option<String>> {
        (**self).load(key)
    }

    fn save(&mut self, key: &str, value: &str) -> Result<()> {
        (**self).save(key, value)
    }
}

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
    writes: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `save` calls seen so far.
    pub fn writes(&self) -> usize {
        self.writes
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }
}

impl KeyValueStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<String>> {
        paths::validate_key(key)?;
        Ok(self.entries.get(key).cloned())
    }

    fn save(&mut self, key: &str, value: &str) -> Result<()> {
        paths::validate_key(key)?;
        self.entries.insert(key.to_string(), value.to_string());
        self.writes += 1;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// FileStore
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, key: &str) -> Result<PathBuf> {
        paths::validate_key(key)?;
        Ok(self.dir.join(format!("{key}.json")))
    }

    /// Delete the entry for `key`. Returns true if something was removed.
    pub fn remove(&self, key: &str) -> Result<bool> {
        io::remove_if_exists(&self.path_for(key)?)
    }
}

impl KeyValueStore for FileStore {
    fn load(&self, key: &str) -> Result<Option<String>> {
        io::read_if_exists(&self.path_for(key)?)
    }

    fn save(&mut self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;
        io::atomic_write(&path, value.as_bytes())?;
        tracing::debug!(key, path = %path.display(), bytes = value.len(), "stored payload");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
