use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use serde_json::{Map, Value};
use tempfile::NamedTempFile;

/// Error type for key-value store access
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("could not access {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("{path} is not a valid store document: {reason}")]
    Corrupt { path: PathBuf, reason: String },
    #[error("could not serialize value: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("store is read-only")]
    ReadOnly,
}

/// A durable string-keyed store of JSON values.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StorageError>;
    fn set(&mut self, key: &str, value: Value) -> Result<(), StorageError>;

    /// Preserve an unreadable backing document before it gets overwritten.
    /// Returns where the copy went, if anywhere.
    fn backup(&self) -> io::Result<Option<PathBuf>> {
        Ok(None)
    }

    /// Human-readable location, for messages
    fn location(&self) -> String;
}

/// Write `content` to `path` atomically using a temp file + rename.
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// JSON file backend
// ---------------------------------------------------------------------------

/// All keys live in one pretty-printed JSON object file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `None` when the file does not exist yet
    fn read_document(&self) -> Result<Option<Map<String, Value>>, StorageError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(t) => t,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(StorageError::Io {
                    path: self.path.clone(),
                    source: e,
                });
            }
        };
        if text.trim().is_empty() {
            return Ok(Some(Map::new()));
        }
        match serde_json::from_str::<Value>(&text) {
            Ok(Value::Object(map)) => Ok(Some(map)),
            Ok(_) => Err(StorageError::Corrupt {
                path: self.path.clone(),
                reason: "top level is not an object".into(),
            }),
            Err(e) => Err(StorageError::Corrupt {
                path: self.path.clone(),
                reason: e.to_string(),
            }),
        }
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StorageError> {
        Ok(self
            .read_document()?
            .and_then(|mut doc| doc.remove(key)))
    }

    fn set(&mut self, key: &str, value: Value) -> Result<(), StorageError> {
        // An unreadable document was already backed up at load time; start over.
        let mut doc = match self.read_document() {
            Ok(doc) => doc.unwrap_or_default(),
            Err(StorageError::Corrupt { .. }) => Map::new(),
            Err(e) => return Err(e),
        };
        doc.insert(key.to_string(), value);
        let mut content = serde_json::to_string_pretty(&Value::Object(doc))?;
        content.push('\n');
        atomic_write(&self.path, content.as_bytes()).map_err(|e| StorageError::Io {
            path: self.path.clone(),
            source: e,
        })
    }

    fn backup(&self) -> io::Result<Option<PathBuf>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let mut bak = self.path.clone().into_os_string();
        bak.push(".bak");
        let bak = PathBuf::from(bak);
        fs::copy(&self.path, &bak)?;
        Ok(Some(bak))
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

// ---------------------------------------------------------------------------
// In-memory backend
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct MemoryInner {
    values: HashMap<String, Value>,
    writes: Vec<String>,
    fail_writes: bool,
}

/// Volatile store. Clones share the same contents, so a caller can keep a
/// handle to inspect what was written.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Rc<RefCell<MemoryInner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `set` fail
    pub fn fail_writes(&self, fail: bool) {
        self.inner.borrow_mut().fail_writes = fail;
    }

    /// Keys passed to successful `set` calls, in order
    pub fn writes(&self) -> Vec<String> {
        self.inner.borrow().writes.clone()
    }

    pub fn value(&self, key: &str) -> Option<Value> {
        self.inner.borrow().values.get(key).cloned()
    }

    /// Seed a value without recording a write
    pub fn insert(&self, key: &str, value: Value) {
        self.inner.borrow_mut().values.insert(key.to_string(), value);
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StorageError> {
        Ok(self.value(key))
    }

    fn set(&mut self, key: &str, value: Value) -> Result<(), StorageError> {
        let mut inner = self.inner.borrow_mut();
        if inner.fail_writes {
            return Err(StorageError::ReadOnly);
        }
        inner.values.insert(key.to_string(), value);
        inner.writes.push(key.to_string());
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}
