//! Key-value persistence behind the identity store and the date cursors.
//!
//! The browser build writes to `localStorage`; native builds and tests use
//! [`MemoryStore`].

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use school_dash_shared::DashResult;

#[cfg(target_arch = "wasm32")]
use school_dash_shared::DashError;

/// String key-value storage with JSON helpers
pub trait KeyValueStore {
    /// Get a string value
    fn get(&self, key: &str) -> DashResult<Option<String>>;

    /// Store a string value
    fn set(&self, key: &str, value: &str) -> DashResult<()>;

    /// Remove a value
    fn remove(&self, key: &str) -> DashResult<()>;

    /// Store JSON data
    fn set_json<T: serde::Serialize>(&self, key: &str, value: &T) -> DashResult<()>
    where
        Self: Sized,
    {
        let json = serde_json::to_string(value)?;
        self.set(key, &json)
    }

    /// Get JSON data; a payload that does not parse is an error, a missing key is `None`
    fn get_json<T: serde::de::DeserializeOwned>(&self, key: &str) -> DashResult<Option<T>>
    where
        Self: Sized,
    {
        match self.get(key)? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Rc<S> {
    fn get(&self, key: &str) -> DashResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> DashResult<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> DashResult<()> {
        (**self).remove(key)
    }
}

/// In-process storage; survives as long as the value (or its `Rc` clones) does
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> DashResult<Option<String>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> DashResult<()> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> DashResult<()> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

/// Simple browser storage using LocalStorage or SessionStorage
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone, Copy)]
pub struct BrowserStorage {
    use_session: bool,
}

#[cfg(target_arch = "wasm32")]
impl BrowserStorage {
    /// Create storage using LocalStorage
    pub fn local() -> Self {
        Self { use_session: false }
    }

    /// Create storage using SessionStorage
    pub fn session() -> Self {
        Self { use_session: true }
    }

    fn get_storage(&self) -> DashResult<web_sys::Storage> {
        let window = web_sys::window().ok_or_else(|| DashError::JsInterop {
            message: "No window object".to_string(),
        })?;

        let storage = if self.use_session {
            school_dash_shared::map_dash_error!(
                window.session_storage(),
                Storage,
                "SessionStorage not available"
            )?
        } else {
            school_dash_shared::map_dash_error!(
                window.local_storage(),
                Storage,
                "LocalStorage not available"
            )?
        };

        storage.ok_or_else(|| DashError::Storage {
            message: "Browser storage not supported".to_string(),
        })
    }
}

#[cfg(target_arch = "wasm32")]
impl KeyValueStore for BrowserStorage {
    fn get(&self, key: &str) -> DashResult<Option<String>> {
        let storage = self.get_storage()?;
        school_dash_shared::map_dash_error!(storage.get_item(key), Storage, "getItem failed")
    }

    fn set(&self, key: &str, value: &str) -> DashResult<()> {
        let storage = self.get_storage()?;
        school_dash_shared::map_dash_error!(storage.set_item(key, value), Storage, "setItem failed")
    }

    fn remove(&self, key: &str) -> DashResult<()> {
        let storage = self.get_storage()?;
        school_dash_shared::map_dash_error!(storage.remove_item(key), Storage, "removeItem failed")
    }
}

/// Read a plain string, logging and swallowing storage failures
pub fn read_string<S: KeyValueStore>(store: &S, key: &str) -> Option<String> {
    match store.get(key) {
        Ok(value) => value,
        Err(e) => {
            log::warn!("Failed to read '{key}' from storage: {e}");
            None
        }
    }
}

/// Write a plain string, logging storage failures
pub fn write_string<S: KeyValueStore>(store: &S, key: &str, value: &str) {
    if let Err(e) = store.set(key, value) {
        log::warn!("Failed to write '{key}' to storage: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use school_dash_shared::DashError;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        name: String,
        count: u32,
    }

    #[test]
    fn test_json_helpers() {
        let store = MemoryStore::new();
        let sample = Sample {
            name: "a".to_string(),
            count: 2,
        };

        store.set_json("sample", &sample).unwrap();
        assert_eq!(store.get_json::<Sample>("sample").unwrap(), Some(sample));
        assert_eq!(store.get_json::<Sample>("missing").unwrap(), None);
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        let store = MemoryStore::new();
        store.set("sample", "{oops").unwrap();

        let err = store.get_json::<Sample>("sample").unwrap_err();
        assert!(matches!(err, DashError::Parse { .. }));
    }

    #[test]
    fn test_rc_clones_share_entries() {
        let store = Rc::new(MemoryStore::new());
        let other = Rc::clone(&store);

        write_string(&store, "k", "v");
        assert_eq!(read_string(&other, "k"), Some("v".to_string()));

        other.remove("k").unwrap();
        assert!(store.is_empty());
    }
}
