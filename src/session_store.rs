//! Persistence of the client's session identifier.
//!
//! A session store is a tiny key/value store.  The only key kbchat writes is
//! [`SESSION_ID_KEY`]; the file format is a flat JSON object so the file can be inspected
//! and edited by hand.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::types::SessionId;

/// Key under which the session identifier is stored.
pub const SESSION_ID_KEY: &str = "sessionId";

/// A string key/value store that outlives the process.
pub trait SessionStore: Send {
    /// Read a value.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a value.
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// Return the persisted session identifier, minting and persisting one if absent.
pub fn ensure_session_id<S: SessionStore + ?Sized>(store: &mut S) -> Result<SessionId> {
    if let Some(id) = store.get(SESSION_ID_KEY)?.filter(|id| !id.is_empty()) {
        return Ok(SessionId::new(id));
    }
    let id = SessionId::generate();
    store.set(SESSION_ID_KEY, id.as_str())?;
    Ok(id)
}

/// Default location of the session file: `~/.kbchat/session.json`.
pub fn default_session_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".kbchat").join("session.json"))
}

/// A session store backed by a JSON object file.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    /// Creates a store at `path`.  The file is created on first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Map<String, Value>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(err) => {
                return Err(Error::io(
                    format!("failed to read {}", self.path.display()),
                    err,
                ));
            }
        };
        if contents.trim().is_empty() {
            return Ok(Map::new());
        }
        match serde_json::from_str::<Value>(&contents)? {
            Value::Object(map) => Ok(map),
            _ => Err(Error::serialization(
                format!("{} does not hold a JSON object", self.path.display()),
                None,
            )),
        }
    }
}

impl SessionStore for FileSessionStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self
            .load()?
            .get(key)
            .and_then(Value::as_str)
            .map(String::from))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut map = self.load()?;
        map.insert(key.to_string(), Value::String(value.to_string()));
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|err| {
                Error::io(format!("failed to create {}", parent.display()), err)
            })?;
        }
        let contents = serde_json::to_string_pretty(&Value::Object(map))?;
        fs::write(&self.path, contents)
            .map_err(|err| Error::io(format!("failed to write {}", self.path.display()), err))
    }
}

/// A session store that lives only as long as the process.
#[derive(Debug, Default, Clone)]
pub struct MemorySessionStore {
    values: HashMap<String, String>,
}

impl MemorySessionStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that already holds a session identifier.
    pub fn with_session_id(id: impl Into<String>) -> Self {
        let mut values = HashMap::new();
        values.insert(SESSION_ID_KEY.to_string(), id.into());
        Self { values }
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("kbchat-test-{}-{}", std::process::id(), name))
            .join("session.json")
    }

    #[test]
    fn ensure_mints_once_then_reuses() {
        let mut store = MemorySessionStore::new();
        let first = ensure_session_id(&mut store).unwrap();
        let second = ensure_session_id(&mut store).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            store.get(SESSION_ID_KEY).unwrap().as_deref(),
            Some(first.as_str())
        );
    }

    #[test]
    fn ensure_reuses_existing_id() {
        let mut store = MemorySessionStore::with_session_id("1700000000000-424242");
        let id = ensure_session_id(&mut store).unwrap();
        assert_eq!(id.as_str(), "1700000000000-424242");
    }

    #[test]
    fn empty_id_is_replaced() {
        let mut store = MemorySessionStore::with_session_id("");
        let id = ensure_session_id(&mut store).unwrap();
        assert!(!id.as_str().is_empty());
    }

    #[test]
    fn file_store_roundtrip() {
        let path = scratch_path("roundtrip");
        let _ = fs::remove_file(&path);
        let mut store = FileSessionStore::new(&path);
        assert_eq!(store.get(SESSION_ID_KEY).unwrap(), None);

        let id = ensure_session_id(&mut store).unwrap();
        let reopened = FileSessionStore::new(&path);
        assert_eq!(
            reopened.get(SESSION_ID_KEY).unwrap().as_deref(),
            Some(id.as_str())
        );

        let contents = fs::read_to_string(&path).unwrap();
        let value: Value = serde_json::from_str(&contents).unwrap();
        assert_eq!(value[SESSION_ID_KEY], Value::String(id.to_string()));
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn file_store_preserves_other_keys() {
        let path = scratch_path("other-keys");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, r#"{"theme": "dark"}"#).unwrap();
        let mut store = FileSessionStore::new(&path);
        store.set(SESSION_ID_KEY, "abc").unwrap();
        assert_eq!(store.get("theme").unwrap().as_deref(), Some("dark"));
        assert_eq!(store.get(SESSION_ID_KEY).unwrap().as_deref(), Some("abc"));
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn file_store_rejects_non_object() {
        let path = scratch_path("non-object");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "[1, 2, 3]").unwrap();
        let store = FileSessionStore::new(&path);
        assert!(store.get(SESSION_ID_KEY).is_err());
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }
}
