//! In-memory stand-ins for the managed backend.

use std::{
    cell::{Cell, RefCell},
    collections::HashMap,
    rc::Rc,
};

use async_trait::async_trait;
use futures::channel::oneshot;

use super::{
    backend::{AuthBackend, ListenerRegistry, ProfileStore, SessionListener, Subscription},
    error::{AuthError, AuthErrorKind, QueryError, UNIQUE_VIOLATION_CODE},
    types::{
        AuthChangeEvent, AuthUser, NewUserProfile, OAuthProvider, Session, SignUpMetadata,
        UserMetadata, UserProfile,
    },
};

struct Account {
    user: AuthUser,
    password: String,
}

/// Auto-confirming auth backend: sign-up signs the user straight in.
#[derive(Default)]
pub struct FakeBackend {
    accounts: RefCell<HashMap<String, Account>>,
    session: RefCell<Option<Session>>,
    listeners: Rc<ListenerRegistry>,
    calls: RefCell<Vec<String>>,
    session_error: RefCell<Option<AuthError>>,
    sign_out_error: RefCell<Option<AuthError>>,
    session_gate: RefCell<Option<oneshot::Receiver<()>>>,
    next_id: Cell<u64>,
}

impl FakeBackend {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn with_session(session: Session) -> Rc<Self> {
        let backend = Self::default();
        *backend.session.borrow_mut() = Some(session);
        Rc::new(backend)
    }

    pub fn register(&self, email: &str, password: &str, full_name: Option<&str>) -> AuthUser {
        let user = self.new_user(email, full_name);
        self.accounts.borrow_mut().insert(
            email.to_string(),
            Account {
                user: user.clone(),
                password: password.to_string(),
            },
        );
        user
    }

    pub fn fail_get_session(&self, error: AuthError) {
        *self.session_error.borrow_mut() = Some(error);
    }

    pub fn fail_sign_out(&self, error: AuthError) {
        *self.sign_out_error.borrow_mut() = Some(error);
    }

    /// Holds the next `get_session` answer until the returned sender fires.
    /// The answer is read when the call starts.
    pub fn defer_get_session(&self) -> oneshot::Sender<()> {
        let (release, gate) = oneshot::channel();
        *self.session_gate.borrow_mut() = Some(gate);
        release
    }

    /// What the provider redirect delivers once the browser comes back.
    pub fn complete_oauth(&self, user: AuthUser) {
        self.establish(session_for_user(user));
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn current_session(&self) -> Option<Session> {
        self.session.borrow().clone()
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.borrow_mut().push(call.into());
    }

    fn new_user(&self, email: &str, full_name: Option<&str>) -> AuthUser {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        AuthUser {
            id: format!("user-{}", id),
            email: Some(email.to_string()),
            user_metadata: UserMetadata {
                full_name: full_name.map(str::to_string),
                ..UserMetadata::default()
            },
            identities: Some(vec![serde_json::json!({ "provider": "email" })]),
            created_at: None,
        }
    }

    fn establish(&self, session: Session) {
        *self.session.borrow_mut() = Some(session.clone());
        self.listeners.notify(AuthChangeEvent::SignedIn, Some(session));
    }
}

pub fn session_for_user(user: AuthUser) -> Session {
    Session {
        access_token: format!("access-{}", user.id),
        refresh_token: format!("refresh-{}", user.id),
        token_type: "bearer".into(),
        expires_in: 3600,
        expires_at: Some(4_102_444_800),
        user,
    }
}

#[async_trait(?Send)]
impl AuthBackend for FakeBackend {
    async fn get_session(&self) -> Result<Option<Session>, AuthError> {
        self.record("get_session");
        let answer = match self.session_error.borrow().clone() {
            Some(error) => Err(error),
            None => Ok(self.session.borrow().clone()),
        };
        let gate = self.session_gate.borrow_mut().take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        answer
    }

    fn on_session_change(&self, listener: SessionListener) -> Subscription {
        self.record("on_session_change");
        self.listeners.subscribe(listener)
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<(), AuthError> {
        self.record(format!("sign_in:{}", email));
        let user = match self.accounts.borrow().get(email) {
            Some(account) if account.password == password => account.user.clone(),
            _ => {
                return Err(AuthError::new(
                    AuthErrorKind::InvalidCredentials,
                    "Invalid login credentials",
                ))
            }
        };
        self.establish(session_for_user(user));
        Ok(())
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: SignUpMetadata,
    ) -> Result<(), AuthError> {
        self.record(format!("sign_up:{}", email));
        if self.accounts.borrow().contains_key(email) {
            return Err(AuthError::new(
                AuthErrorKind::DuplicateEmail,
                "User already registered",
            ));
        }
        let user = self.register(email, password, Some(&metadata.full_name));
        self.establish(session_for_user(user));
        Ok(())
    }

    async fn sign_in_with_oauth(
        &self,
        provider: OAuthProvider,
        redirect_to: &str,
    ) -> Result<(), AuthError> {
        self.record(format!("oauth:{}:{}", provider.as_str(), redirect_to));
        if redirect_to.is_empty() {
            return Err(AuthError::new(
                AuthErrorKind::RedirectInitFailure,
                "OAuth redirect URL is not configured",
            ));
        }
        Ok(())
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.record("sign_out");
        if let Some(error) = self.sign_out_error.borrow().clone() {
            return Err(error);
        }
        self.session.borrow_mut().take();
        self.listeners.notify(AuthChangeEvent::SignedOut, None);
        Ok(())
    }
}

/// `users` collection keyed by id, enforcing the primary key like the real table.
#[derive(Default)]
pub struct FakeProfiles {
    rows: RefCell<HashMap<String, UserProfile>>,
    stale_lookups: Cell<bool>,
    lookup_failure: RefCell<Option<QueryError>>,
    insert_failure: RefCell<Option<QueryError>>,
    insert_attempts: Cell<usize>,
}

impl FakeProfiles {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// Lookups miss every row, as when two tabs both read before either writes.
    pub fn stale_lookups(&self, stale: bool) {
        self.stale_lookups.set(stale);
    }

    pub fn fail_lookups(&self, error: QueryError) {
        *self.lookup_failure.borrow_mut() = Some(error);
    }

    pub fn fail_inserts(&self, error: QueryError) {
        *self.insert_failure.borrow_mut() = Some(error);
    }

    pub fn rows(&self) -> Vec<UserProfile> {
        self.rows.borrow().values().cloned().collect()
    }

    pub fn row(&self, id: &str) -> Option<UserProfile> {
        self.rows.borrow().get(id).cloned()
    }

    pub fn insert_attempts(&self) -> usize {
        self.insert_attempts.get()
    }
}

#[async_trait(?Send)]
impl ProfileStore for FakeProfiles {
    async fn find_profile(&self, id: &str) -> Result<Option<UserProfile>, QueryError> {
        if let Some(error) = self.lookup_failure.borrow().clone() {
            return Err(error);
        }
        if self.stale_lookups.get() {
            return Ok(None);
        }
        Ok(self.rows.borrow().get(id).cloned())
    }

    async fn insert_profile(&self, profile: &NewUserProfile) -> Result<(), QueryError> {
        self.insert_attempts.set(self.insert_attempts.get() + 1);
        if let Some(error) = self.insert_failure.borrow().clone() {
            return Err(error);
        }
        let mut rows = self.rows.borrow_mut();
        if rows.contains_key(&profile.id) {
            return Err(QueryError::from_response(
                409,
                Some(UNIQUE_VIOLATION_CODE.into()),
                "duplicate key value violates unique constraint \"users_pkey\"".into(),
            ));
        }
        rows.insert(profile.id.clone(), profile.clone().into());
        Ok(())
    }
}
