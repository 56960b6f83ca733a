use leptos::*;

use crate::state::auth::AuthState;
use crate::test_support::helpers::provide_auth_state;

/// Resources stay unloaded while rendering on the host.
struct ResourceLoadSuppressed;

impl ResourceLoadSuppressed {
    fn new() -> Self {
        leptos_reactive::suppress_resource_load(true);
        Self
    }
}

impl Drop for ResourceLoadSuppressed {
    fn drop(&mut self) {
        leptos_reactive::suppress_resource_load(false);
    }
}

pub fn render_to_string<F, N>(view: F) -> String
where
    F: FnOnce() -> N + 'static,
    N: IntoView + 'static,
{
    let _suppressed = ResourceLoadSuppressed::new();
    let runtime = create_runtime();
    let html = view().into_view().render_to_string().to_string();
    runtime.dispose();
    html
}

/// Renders `view` below an auth context frozen at `state`.
pub fn render_with_auth<F, N>(state: AuthState, view: F) -> String
where
    F: FnOnce() -> N + 'static,
    N: IntoView + 'static,
{
    render_to_string(move || {
        provide_auth_state(state);
        view()
    })
}
