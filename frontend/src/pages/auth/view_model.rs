use super::utils::{validate_sign_in, validate_sign_up, AuthFormState, AuthTab};
use crate::{
    api::{AuthError, OAuthProvider},
    router::FEED,
    state::auth::{use_auth, AuthContext},
    utils::navigation::Navigator,
};
use leptos::*;

pub const SIGN_IN_SUCCESS: &str = "Successfully signed in! Redirecting...";
pub const SIGN_UP_SUCCESS: &str =
    "Account created successfully! Please check your email to verify your account.";

#[cfg(target_arch = "wasm32")]
const REDIRECT_DELAY_MS: u32 = 1_000;

#[derive(Clone)]
pub struct AuthViewModel {
    pub form: AuthFormState,
    pub error: RwSignal<Option<String>>,
    pub success: RwSignal<Option<String>>,
    pub pending: RwSignal<bool>,
    auth: AuthContext,
    navigator: Navigator,
}

pub fn use_auth_view_model() -> AuthViewModel {
    let navigator = use_context::<Navigator>().unwrap_or_else(Navigator::location);
    AuthViewModel::new(use_auth(), navigator)
}

fn message_or(error: AuthError, fallback: &str) -> String {
    if error.message.trim().is_empty() {
        fallback.to_string()
    } else {
        error.message
    }
}

impl AuthViewModel {
    pub fn new(auth: AuthContext, navigator: Navigator) -> Self {
        Self {
            form: AuthFormState::default(),
            error: create_rw_signal(None),
            success: create_rw_signal(None),
            pending: create_rw_signal(false),
            auth,
            navigator,
        }
    }

    pub fn select_tab(&self, tab: AuthTab) {
        self.form.tab.set(tab);
        self.clear_messages();
    }

    pub fn clear_messages(&self) {
        self.error.set(None);
        self.success.set(None);
    }

    /// Returns whether the sign in went through.
    pub async fn submit_sign_in(&self) -> bool {
        if self.pending.get_untracked() {
            return false;
        }
        self.clear_messages();
        let email = self.form.email.get_untracked().trim().to_string();
        let password = self.form.password.get_untracked();
        if let Err(message) = validate_sign_in(&email, &password) {
            self.error.set(Some(message));
            return false;
        }

        self.pending.set(true);
        let result = self.auth.sign_in(&email, &password).await;
        self.pending.set(false);
        match result {
            Ok(()) => {
                self.success.set(Some(SIGN_IN_SUCCESS.into()));
                let navigator = self.navigator.clone();
                spawn_local(async move {
                    redirect_pause().await;
                    navigator.navigate(FEED);
                });
                true
            }
            Err(err) => {
                self.error.set(Some(message_or(
                    err,
                    "Failed to sign in. Please check your credentials.",
                )));
                false
            }
        }
    }

    pub async fn submit_sign_up(&self) -> bool {
        if self.pending.get_untracked() {
            return false;
        }
        self.clear_messages();
        let email = self.form.email.get_untracked().trim().to_string();
        let password = self.form.password.get_untracked();
        let full_name = self.form.full_name.get_untracked().trim().to_string();
        if let Err(message) = validate_sign_up(&email, &password, &full_name) {
            self.error.set(Some(message));
            return false;
        }

        self.pending.set(true);
        let result = self.auth.sign_up(&email, &password, &full_name).await;
        self.pending.set(false);
        match result {
            Ok(()) => {
                self.success.set(Some(SIGN_UP_SUCCESS.into()));
                true
            }
            Err(err) => {
                self.error.set(Some(message_or(
                    err,
                    "Failed to create account. Please try again.",
                )));
                false
            }
        }
    }

    /// Pending stays set on success: the browser is leaving the page.
    pub async fn continue_with_google(&self) {
        if self.pending.get_untracked() {
            return;
        }
        self.error.set(None);
        self.pending.set(true);
        if let Err(err) = self.auth.sign_in_with_oauth(OAuthProvider::Google).await {
            self.error
                .set(Some(message_or(err, "Failed to sign in with Google")));
            self.pending.set(false);
        }
    }
}

async fn redirect_pause() {
    #[cfg(target_arch = "wasm32")]
    gloo_timers::future::TimeoutFuture::new(REDIRECT_DELAY_MS).await;
}
