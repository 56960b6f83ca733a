#[cfg(all(test, not(target_arch = "wasm32")))]
pub mod ssr;

#[cfg(test)]
pub mod storage {
    use std::cell::{Cell, RefCell};
    use std::collections::HashMap;

    use crate::api::StorageError;
    use crate::utils::storage::KeyValueStore;

    /// In-memory stand-in for `localStorage` that can be told to fail.
    #[derive(Default)]
    pub struct MemoryStorage {
        values: RefCell<HashMap<String, String>>,
        fail_reads: Cell<bool>,
        fail_writes: Cell<bool>,
    }

    impl MemoryStorage {
        pub fn insert(&self, key: &str, value: &str) {
            self.values
                .borrow_mut()
                .insert(key.to_string(), value.to_string());
        }

        pub fn fail_reads(&self, fail: bool) {
            self.fail_reads.set(fail);
        }

        /// Also fails removals.
        pub fn fail_writes(&self, fail: bool) {
            self.fail_writes.set(fail);
        }

        pub fn raw(&self, key: &str) -> Option<String> {
            self.values.borrow().get(key).cloned()
        }
    }

    impl KeyValueStore for MemoryStorage {
        fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
            if self.fail_reads.get() {
                return Err(StorageError::Read { key: key.into() });
            }
            Ok(self.raw(key))
        }

        fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
            if self.fail_writes.get() {
                return Err(StorageError::Write { key: key.into() });
            }
            self.insert(key, value);
            Ok(())
        }

        fn remove_item(&self, key: &str) -> Result<(), StorageError> {
            if self.fail_writes.get() {
                return Err(StorageError::Remove { key: key.into() });
            }
            self.values.borrow_mut().remove(key);
            Ok(())
        }
    }
}

#[cfg(test)]
pub mod helpers {
    use std::cell::RefCell;
    use std::rc::Rc;

    use crate::api::{AuthUser, Session, UserMetadata};
    use crate::config::{BackendConfig, APPLICATION_NAME, STORAGE_KEY};
    use crate::utils::navigation::Navigator;

    pub fn backend_config() -> BackendConfig {
        BackendConfig {
            url: "https://project.supabase.co".into(),
            anon_key: "anon-key".into(),
            storage_key: STORAGE_KEY.into(),
            application_name: APPLICATION_NAME.into(),
        }
    }

    pub fn user_with(id: &str, email: &str, full_name: Option<&str>) -> AuthUser {
        AuthUser {
            id: id.into(),
            email: Some(email.into()),
            user_metadata: UserMetadata {
                full_name: full_name.map(str::to_string),
                ..UserMetadata::default()
            },
            identities: None,
            created_at: None,
        }
    }

    pub fn session_for(user: AuthUser) -> Session {
        crate::api::test_support::session_for_user(user)
    }

    /// Navigator that records every target instead of leaving the page.
    pub fn recording_navigator() -> (Navigator, Rc<RefCell<Vec<String>>>) {
        let visited = Rc::new(RefCell::new(Vec::new()));
        let sink = visited.clone();
        let navigator = Navigator::new(move |path| sink.borrow_mut().push(path.to_string()));
        (navigator, visited)
    }

    /// Lets spawned local tasks run to completion.
    #[cfg(not(target_arch = "wasm32"))]
    pub async fn settle() {
        for _ in 0..16 {
            tokio::task::yield_now().await;
        }
    }

    /// Provides an [`AuthContext`](crate::state::auth::AuthContext) frozen at
    /// `state`, backed by fakes, plus a recording [`Navigator`].
    pub fn provide_auth_state(state: crate::state::auth::AuthState) -> Rc<RefCell<Vec<String>>> {
        use crate::api::test_support::{FakeBackend, FakeProfiles};
        use crate::state::auth::AuthContext;
        use leptos::provide_context;

        let (navigator, visited) = recording_navigator();
        let ctx = AuthContext::new(FakeBackend::new(), FakeProfiles::new(), navigator.clone());
        ctx.set_state(state);
        provide_context(ctx);
        provide_context(navigator);
        visited
    }
}
