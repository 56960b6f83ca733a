use std::{
    cell::{Cell, RefCell},
    rc::{Rc, Weak},
};

use async_trait::async_trait;

use super::{
    error::{AuthError, QueryError},
    types::{AuthChangeEvent, NewUserProfile, OAuthProvider, Session, SignUpMetadata, UserProfile},
};

pub type SessionListener = Rc<dyn Fn(AuthChangeEvent, Option<Session>)>;

/// Session half of the managed backend.
#[async_trait(?Send)]
pub trait AuthBackend {
    async fn get_session(&self) -> Result<Option<Session>, AuthError>;

    fn on_session_change(&self, listener: SessionListener) -> Subscription;

    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<(), AuthError>;

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: SignUpMetadata,
    ) -> Result<(), AuthError>;

    /// Starts a redirect flow; the session arrives later through `on_session_change`.
    async fn sign_in_with_oauth(
        &self,
        provider: OAuthProvider,
        redirect_to: &str,
    ) -> Result<(), AuthError>;

    async fn sign_out(&self) -> Result<(), AuthError>;
}

/// The `users` collection, as far as profile bootstrap needs it.
#[async_trait(?Send)]
pub trait ProfileStore {
    async fn find_profile(&self, id: &str) -> Result<Option<UserProfile>, QueryError>;

    async fn insert_profile(&self, profile: &NewUserProfile) -> Result<(), QueryError>;
}

#[derive(Default)]
pub struct ListenerRegistry {
    next_id: Cell<u64>,
    listeners: RefCell<Vec<(u64, SessionListener)>>,
}

impl ListenerRegistry {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn subscribe(self: &Rc<Self>, listener: SessionListener) -> Subscription {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.listeners.borrow_mut().push((id, listener));
        Subscription {
            id,
            registry: Rc::downgrade(self),
            active: Cell::new(true),
        }
    }

    fn remove(&self, id: u64) {
        self.listeners.borrow_mut().retain(|(entry, _)| *entry != id);
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.listeners.borrow().len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn notify(&self, event: AuthChangeEvent, session: Option<Session>) {
        // Snapshot so listeners may (un)subscribe while being notified.
        let snapshot: Vec<SessionListener> = self
            .listeners
            .borrow()
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();
        for listener in snapshot {
            listener(event, session.clone());
        }
    }
}

/// Handle returned by `on_session_change`. Dropping it unregisters the listener.
pub struct Subscription {
    id: u64,
    registry: Weak<ListenerRegistry>,
    active: Cell<bool>,
}

impl Subscription {
    pub fn unsubscribe(&self) {
        if !self.active.replace(false) {
            return;
        }
        if let Some(registry) = self.registry.upgrade() {
            registry.remove(self.id);
        }
    }

    #[cfg(test)]
    pub fn is_active(&self) -> bool {
        self.active.get()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}
