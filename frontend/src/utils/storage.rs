use std::rc::Rc;

use web_sys::{Storage, Window};

use crate::api::{Session, StorageError};

#[cfg(target_arch = "wasm32")]
pub fn window() -> Result<Window, String> {
    web_sys::window().ok_or_else(|| "No window object".to_string())
}

/// There is no browser outside wasm.
#[cfg(not(target_arch = "wasm32"))]
pub fn window() -> Result<Window, String> {
    Err("No window object".to_string())
}

pub fn local_storage() -> Result<Storage, String> {
    window()?
        .local_storage()
        .map_err(|_| "No localStorage".to_string())?
        .ok_or_else(|| "No localStorage".to_string())
}

pub trait KeyValueStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

/// `window.localStorage`, looked up on every call: private browsing can
/// disable it at any time.
#[derive(Clone, Copy, Default)]
pub struct BrowserStorage;

impl KeyValueStore for BrowserStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        local_storage()
            .map_err(StorageError::Unavailable)?
            .get_item(key)
            .map_err(|_| StorageError::Read { key: key.into() })
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        local_storage()
            .map_err(StorageError::Unavailable)?
            .set_item(key, value)
            .map_err(|_| StorageError::Write { key: key.into() })
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        local_storage()
            .map_err(StorageError::Unavailable)?
            .remove_item(key)
            .map_err(|_| StorageError::Remove { key: key.into() })
    }
}

/// Persists the auth session. Storage failures never reach the caller.
#[derive(Clone)]
pub struct SessionStorageAdapter {
    store: Rc<dyn KeyValueStore>,
    key: String,
}

impl SessionStorageAdapter {
    pub fn new(store: Rc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    pub fn browser(key: impl Into<String>) -> Self {
        Self::new(Rc::new(BrowserStorage), key)
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn get_item(&self, key: &str) -> Option<String> {
        match self.store.get_item(key) {
            Ok(value) => value,
            Err(err) => {
                log::warn!("Error reading auth data: {}", err);
                None
            }
        }
    }

    pub fn set_item(&self, key: &str, value: &str) {
        if let Err(err) = self.store.set_item(key, value) {
            log::error!("Error storing auth data: {}", err);
        }
    }

    pub fn remove_item(&self, key: &str) {
        if let Err(err) = self.store.remove_item(key) {
            log::error!("Error removing auth data: {}", err);
        }
    }

    pub fn load_session(&self) -> Option<Session> {
        let raw = self.get_item(&self.key)?;
        match serde_json::from_str(&raw) {
            Ok(session) => Some(session),
            Err(err) => {
                log::warn!("Discarding unreadable stored session: {}", err);
                None
            }
        }
    }

    pub fn save_session(&self, session: &Session) {
        match serde_json::to_string(session) {
            Ok(raw) => self.set_item(&self.key, &raw),
            Err(err) => log::error!("Error serializing auth session: {}", err),
        }
    }

    pub fn clear_session(&self) {
        self.remove_item(&self.key);
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod host_tests {
    use super::*;
    use crate::test_support::helpers::{session_for, user_with};
    use crate::test_support::storage::MemoryStorage;

    fn adapter(store: Rc<MemoryStorage>) -> SessionStorageAdapter {
        SessionStorageAdapter::new(store, "charities-next-to-me-auth")
    }

    #[test]
    fn get_returns_none_when_underlying_read_fails() {
        let store = Rc::new(MemoryStorage::default());
        store.insert("charities-next-to-me-auth", "{}");
        store.fail_reads(true);

        let adapter = adapter(store);
        assert_eq!(adapter.get_item("charities-next-to-me-auth"), None);
        assert!(adapter.load_session().is_none());
    }

    #[test]
    fn write_and_remove_failures_are_absorbed() {
        let store = Rc::new(MemoryStorage::default());
        store.fail_writes(true);
        let adapter = adapter(store.clone());

        let session = session_for(user_with("u1", "jane@example.ca", Some("Jane Doe")));
        adapter.save_session(&session);
        adapter.clear_session();
        assert!(store.raw("charities-next-to-me-auth").is_none());
    }

    #[test]
    fn session_survives_save_and_load() {
        let store = Rc::new(MemoryStorage::default());
        let adapter = adapter(store.clone());
        let session = session_for(user_with("u1", "jane@example.ca", Some("Jane Doe")));

        adapter.save_session(&session);
        assert!(store.raw("charities-next-to-me-auth").is_some());
        assert_eq!(adapter.load_session(), Some(session));

        adapter.clear_session();
        assert!(adapter.load_session().is_none());
    }

    #[test]
    fn corrupt_stored_session_reads_as_none() {
        let store = Rc::new(MemoryStorage::default());
        store.insert("charities-next-to-me-auth", "not json");
        assert!(adapter(store).load_session().is_none());
    }

    #[test]
    fn browser_storage_is_unavailable_without_a_window() {
        assert!(matches!(
            BrowserStorage.get_item("charities-next-to-me-auth"),
            Err(StorageError::Unavailable(_))
        ));
        assert_eq!(
            SessionStorageAdapter::browser("charities-next-to-me-auth").load_session(),
            None
        );
    }
}
