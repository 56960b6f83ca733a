use leptos::*;
use leptos_router::use_query_map;

pub mod utils;
pub mod view_model;

mod panel;

pub use panel::AuthPanel;

#[component]
pub fn AuthPage() -> impl IntoView {
    let query = use_query_map();
    let callback_error = query.with_untracked(|params| params.get("error").cloned());
    view! { <AuthPanel callback_error=callback_error /> }
}
