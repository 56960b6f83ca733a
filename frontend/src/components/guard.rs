use crate::{
    components::layout::LoadingSpinner,
    router::{AUTH, AUTHENTICATED_LANDING},
    state::auth::use_auth,
    utils::navigation::Navigator,
};
use leptos::*;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardConfig {
    pub require_auth: bool,
    pub redirect_to: String,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            require_auth: true,
            redirect_to: AUTH.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardState {
    Pending,
    Allowed,
    Redirecting(String),
}

pub fn evaluate(config: &GuardConfig, has_user: bool, loading: bool) -> GuardState {
    if loading {
        GuardState::Pending
    } else if config.require_auth && !has_user {
        GuardState::Redirecting(config.redirect_to.clone())
    } else if !config.require_auth && has_user {
        GuardState::Redirecting(AUTHENTICATED_LANDING.to_string())
    } else {
        GuardState::Allowed
    }
}

/// Renders `children` only once the auth state matches `require_auth`.
#[component]
pub fn RouteGuard(
    #[prop(default = true)] require_auth: bool,
    #[prop(default = AUTH.to_string())] redirect_to: String,
    children: ChildrenFn,
) -> impl IntoView {
    let auth = use_auth();
    let navigator = use_context::<Navigator>().unwrap_or_else(Navigator::location);
    let config = GuardConfig {
        require_auth,
        redirect_to,
    };
    let state = auth.state();
    let guard_state = create_memo(move |_| {
        state.with(|state| evaluate(&config, state.is_authenticated(), state.loading))
    });

    create_effect(move |_| {
        if let GuardState::Redirecting(target) = guard_state.get() {
            navigator.navigate(&target);
        }
    });

    move || match guard_state.get() {
        GuardState::Pending => view! { <LoadingSpinner/> }.into_view(),
        GuardState::Allowed => children().into_view(),
        GuardState::Redirecting(_) => ().into_view(),
    }
}
