//! In-process store.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use super::Store;
use crate::error::StoreError;

/// Keeps serialized JSON text in a map, so decode failures behave the same
/// way they do on disk.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, String>>,
    fail_writes: Cell<bool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `save` fail with a backend error.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }

    /// Store raw text under `key`, bypassing JSON encoding.
    pub fn put_raw(&self, key: &str, text: &str) {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), text.to_string());
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.borrow().contains_key(key)
    }
}

impl Store for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<serde_json::Value>, StoreError> {
        match self.entries.borrow().get(key) {
            Some(text) => serde_json::from_str(text)
                .map(Some)
                .map_err(|source| StoreError::Decode {
                    key: key.to_string(),
                    source,
                }),
            None => Ok(None),
        }
    }

    fn save(&self, key: &str, value: &serde_json::Value) -> Result<(), StoreError> {
        if self.fail_writes.get() {
            return Err(StoreError::Backend("writes disabled".into()));
        }
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) {
        self.entries.borrow_mut().remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remove_is_idempotent() {
        let store = MemoryStore::new();
        store.save("k", &serde_json::json!(1)).unwrap();
        store.remove("k");
        store.remove("k");
        assert!(store.load("k").unwrap().is_none());
    }

    #[test]
    fn garbage_text_is_decode_error() {
        let store = MemoryStore::new();
        store.put_raw("k", "{not json");
        assert!(matches!(store.load("k"), Err(StoreError::Decode { .. })));
    }

    #[test]
    fn failing_writes_leave_previous_value() {
        let store = MemoryStore::new();
        store.save("k", &serde_json::json!(1)).unwrap();
        store.fail_writes(true);
        assert!(store.save("k", &serde_json::json!(2)).is_err());
        assert_eq!(store.load("k").unwrap(), Some(serde_json::json!(1)));
    }
}
