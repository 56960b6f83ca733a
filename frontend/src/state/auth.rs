use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use leptos::*;

use super::profile::{self, ProfileOutcome};
use crate::{
    api::{
        AuthBackend, AuthChangeEvent, AuthError, AuthUser, OAuthProvider, ProfileStore, Session,
        SessionListener, SignUpMetadata, Subscription,
    },
    config,
    router::{AUTH, HOME},
    utils::navigation::Navigator,
};

#[derive(Debug, Clone, PartialEq)]
pub struct AuthState {
    pub user: Option<AuthUser>,
    pub loading: bool,
    pub session_error: Option<AuthError>,
    pub profile_warning: Option<String>,
}

impl Default for AuthState {
    fn default() -> Self {
        Self {
            user: None,
            loading: true,
            session_error: None,
            profile_warning: None,
        }
    }
}

impl AuthState {
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}

/// Shared alive flag for async work started by the container.
#[derive(Debug, Clone)]
pub struct Liveness(Rc<Cell<bool>>);

impl Liveness {
    pub fn new() -> Self {
        Self(Rc::new(Cell::new(true)))
    }

    pub fn is_alive(&self) -> bool {
        self.0.get()
    }

    pub fn end(&self) {
        self.0.set(false);
    }
}

impl Default for Liveness {
    fn default() -> Self {
        Self::new()
    }
}

/// Auth state for the mounted application.
///
/// Built once at the root by [`AuthProvider`]. The state signal is written
/// only by the bootstrap and the session-change listener, and every write is
/// dropped once [`AuthContext::teardown`] has run.
#[derive(Clone)]
pub struct AuthContext {
    state: RwSignal<AuthState>,
    backend: Rc<dyn AuthBackend>,
    profiles: Rc<dyn ProfileStore>,
    navigator: Navigator,
    liveness: Liveness,
    activated: Rc<Cell<bool>>,
    event_applied: Rc<Cell<bool>>,
    subscription: Rc<RefCell<Option<Subscription>>>,
    oauth_redirect: Option<String>,
}

impl AuthContext {
    pub fn new(
        backend: Rc<dyn AuthBackend>,
        profiles: Rc<dyn ProfileStore>,
        navigator: Navigator,
    ) -> Self {
        Self {
            state: create_rw_signal(AuthState::default()),
            backend,
            profiles,
            navigator,
            liveness: Liveness::new(),
            activated: Rc::new(Cell::new(false)),
            event_applied: Rc::new(Cell::new(false)),
            subscription: Rc::new(RefCell::new(None)),
            oauth_redirect: None,
        }
    }

    /// Overrides `<origin>/auth` as the page the OAuth provider returns to.
    #[cfg(test)]
    pub fn with_oauth_redirect(mut self, url: impl Into<String>) -> Self {
        self.oauth_redirect = Some(url.into());
        self
    }

    pub fn state(&self) -> ReadSignal<AuthState> {
        self.state.read_only()
    }

    #[cfg(test)]
    pub fn user(&self) -> Option<AuthUser> {
        self.state.with_untracked(|state| state.user.clone())
    }

    #[cfg(test)]
    pub fn is_loading(&self) -> bool {
        self.state.with_untracked(|state| state.loading)
    }

    /// Subscribes to session changes, then loads the current session.
    /// Only the first call does anything.
    pub fn activate(&self) {
        if self.activated.replace(true) {
            return;
        }

        let ctx = self.clone();
        let listener: SessionListener =
            Rc::new(move |event, session| ctx.handle_session_change(event, session));
        let subscription = self.backend.on_session_change(listener);
        self.subscription.replace(Some(subscription));

        let ctx = self.clone();
        spawn_local(async move {
            ctx.bootstrap().await;
        });
    }

    /// Loads the current session; a restored user also gets the profile bootstrap.
    ///
    /// A session-change notification that landed first is newer than this
    /// result, so only `loading` is cleared then.
    pub async fn bootstrap(&self) {
        let result = self.backend.get_session().await;
        if self.event_applied.get() {
            log::debug!("Session already set by a change notification");
            self.write(|state| state.loading = false);
            return;
        }
        match result {
            Ok(session) => {
                let user = session.map(|session| session.user);
                let restored = user.clone();
                let written = self.write(move |state| {
                    state.user = user;
                    state.loading = false;
                    state.session_error = None;
                });
                if let (true, Some(user)) = (written, restored) {
                    self.ensure_profile(&user).await;
                }
            }
            Err(err) => {
                log::error!("Error getting session: {}", err);
                self.write(move |state| {
                    state.session_error = Some(err);
                    state.loading = false;
                });
            }
        }
    }

    pub fn handle_session_change(&self, event: AuthChangeEvent, session: Option<Session>) {
        let user = session.map(|session| session.user);
        log::info!(
            "Auth state changed: {:?} {:?}",
            event,
            user.as_ref().and_then(|user| user.email.as_deref())
        );
        let signed_in_user = user.clone();
        if !self.write(move |state| {
            state.user = user;
            state.loading = false;
        }) {
            return;
        }
        self.event_applied.set(true);

        match event {
            AuthChangeEvent::SignedIn => {
                if let Some(user) = signed_in_user {
                    let ctx = self.clone();
                    spawn_local(async move {
                        ctx.ensure_profile(&user).await;
                    });
                }
            }
            AuthChangeEvent::SignedOut => self.navigator.navigate(HOME),
            _ => {}
        }
    }

    /// Runs the profile bootstrap; a failure becomes a warning, never an auth failure.
    pub async fn ensure_profile(&self, user: &AuthUser) -> Option<ProfileOutcome> {
        match profile::ensure_profile(self.profiles.as_ref(), user).await {
            Ok(outcome) => {
                self.write(|state| state.profile_warning = None);
                Some(outcome)
            }
            Err(err) => {
                log::warn!("Error creating user profile: {}", err);
                self.write(move |state| state.profile_warning = Some(err.to_string()));
                None
            }
        }
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<(), AuthError> {
        self.backend
            .sign_in_with_password(email, password)
            .await
            .map_err(|err| {
                log::error!("Sign in error: {}", err);
                err
            })
    }

    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
    ) -> Result<(), AuthError> {
        let metadata = SignUpMetadata {
            full_name: full_name.to_string(),
        };
        self.backend
            .sign_up(email, password, metadata)
            .await
            .map_err(|err| {
                log::error!("Sign up error: {}", err);
                err
            })
    }

    pub async fn sign_in_with_oauth(&self, provider: OAuthProvider) -> Result<(), AuthError> {
        let redirect_to = self
            .oauth_redirect
            .clone()
            .unwrap_or_else(|| config::oauth_redirect_url(AUTH));
        self.backend
            .sign_in_with_oauth(provider, &redirect_to)
            .await
            .map_err(|err| {
                log::error!("OAuth sign in error: {}", err);
                err
            })
    }

    pub async fn sign_out(&self) -> Result<(), AuthError> {
        self.backend.sign_out().await.map_err(|err| {
            log::error!("Sign out error: {}", err);
            err
        })
    }

    /// Ends the container: pending work can no longer write, and the
    /// listener is unregistered.
    pub fn teardown(&self) {
        self.liveness.end();
        if let Some(subscription) = self.subscription.borrow_mut().take() {
            subscription.unsubscribe();
        }
    }

    fn write(&self, update: impl FnOnce(&mut AuthState)) -> bool {
        if !self.liveness.is_alive() {
            log::debug!("Dropping auth state update after teardown");
            return false;
        }
        self.state.try_update(update).is_some()
    }

    #[cfg(test)]
    pub fn set_state(&self, state: AuthState) {
        self.state.set(state);
    }
}

#[component]
pub fn AuthProvider(
    backend: Rc<dyn AuthBackend>,
    profiles: Rc<dyn ProfileStore>,
    #[prop(optional)] navigator: Option<Navigator>,
    children: Children,
) -> impl IntoView {
    let navigator = navigator
        .or_else(use_context::<Navigator>)
        .unwrap_or_else(Navigator::router);
    let ctx = AuthContext::new(backend, profiles, navigator);
    provide_context(ctx.clone());
    ctx.activate();
    on_cleanup(move || ctx.teardown());
    view! { <>{children()}</> }
}

/// Must be called below [`AuthProvider`].
pub fn use_auth() -> AuthContext {
    expect_context::<AuthContext>()
}
