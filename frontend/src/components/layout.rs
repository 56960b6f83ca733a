use crate::{
    api::AuthUser,
    router::{AUTH, FEED, HOME, MAP, PROFILE, SEARCH},
    state::auth::use_auth,
};
use leptos::*;

const NAV_LINK_CLASS: &str =
    "text-gray-700 hover:text-charity-red px-3 py-2 rounded-md text-sm font-medium";

#[component]
pub fn Header() -> impl IntoView {
    let auth = use_auth();
    let state = auth.state();
    let (menu_open, set_menu_open) = create_signal(false);
    let (signing_out, set_signing_out) = create_signal(false);

    let user = move || state.with(|state| state.user.clone());
    let loading = move || state.with(|state| state.loading);

    let on_sign_out = {
        let auth = auth.clone();
        move |_| {
            if signing_out.get_untracked() {
                return;
            }
            set_menu_open.set(false);
            set_signing_out.set(true);
            let auth = auth.clone();
            spawn_local(async move {
                // Failures are already logged by the container.
                let _ = auth.sign_out().await;
                set_signing_out.set(false);
            });
        }
    };
    let on_sign_out_mobile = on_sign_out.clone();
    let toggle_menu = move |_| set_menu_open.update(|open| *open = !*open);

    view! {
        <header class="bg-white border-b border-gray-200 sticky top-0 z-50">
            <div class="max-w-7xl mx-auto px-4 sm:px-6 lg:px-8">
                <div class="flex justify-between items-center h-16">
                    <a href=HOME class="flex items-center space-x-2">
                        <span class="font-bold text-xl text-gray-900">"CharitiesNextToMe"</span>
                    </a>
                    <Show when=move || user().is_some()>
                        <nav class="hidden md:flex items-center space-x-8">
                            <a href=FEED class=NAV_LINK_CLASS>"Feed"</a>
                            <a href=MAP class=NAV_LINK_CLASS>"Map"</a>
                            <a href=SEARCH class=NAV_LINK_CLASS>"Search"</a>
                        </nav>
                    </Show>
                    <div class="flex items-center space-x-4">
                        {move || {
                            if loading() {
                                view! { <div class="h-8 w-20 bg-gray-200 rounded animate-pulse"></div> }
                                    .into_view()
                            } else if let Some(user) = user() {
                                view! {
                                    <a href=PROFILE class="flex items-center space-x-2" title=user.email.clone()>
                                        <span class="h-8 w-8 rounded-full bg-charity-red text-white flex items-center justify-center">
                                            {avatar_initial(&user)}
                                        </span>
                                        <span class="hidden md:inline text-sm text-gray-700">
                                            {display_name(&user)}
                                        </span>
                                    </a>
                                }
                                    .into_view()
                            } else {
                                view! {
                                    <a href=AUTH class=NAV_LINK_CLASS>"Sign In"</a>
                                    <a href=AUTH class="bg-charity-red text-white px-3 py-2 rounded-md text-sm font-medium">
                                        "Sign Up"
                                    </a>
                                }
                                    .into_view()
                            }
                        }}
                        <Show when=move || user().is_some()>
                            <button
                                class="hidden md:inline text-gray-700 hover:text-red-600 px-3 py-2 rounded-md text-sm font-medium disabled:opacity-50"
                                on:click=on_sign_out.clone()
                                disabled=move || signing_out.get()
                            >
                                "Sign Out"
                            </button>
                            <button
                                type="button"
                                class="md:hidden inline-flex items-center justify-center p-2 rounded-md text-gray-700"
                                on:click=toggle_menu
                                aria-expanded=move || menu_open.get()
                                aria-controls="mobile-nav"
                            >
                                {move || if menu_open.get() { "Close" } else { "Menu" }}
                            </button>
                        </Show>
                    </div>
                </div>
                <Show when=move || menu_open.get() && user().is_some()>
                    <nav id="mobile-nav" class="md:hidden py-4 border-t border-gray-200 flex flex-col space-y-4">
                        <a href=FEED class=NAV_LINK_CLASS on:click=move |_| set_menu_open.set(false)>"Feed"</a>
                        <a href=MAP class=NAV_LINK_CLASS on:click=move |_| set_menu_open.set(false)>"Map"</a>
                        <a href=SEARCH class=NAV_LINK_CLASS on:click=move |_| set_menu_open.set(false)>"Search"</a>
                        <a href=PROFILE class=NAV_LINK_CLASS on:click=move |_| set_menu_open.set(false)>"Profile"</a>
                        <button
                            class="text-left text-gray-700 hover:text-red-600 px-3 py-2 text-sm font-medium"
                            on:click=on_sign_out_mobile.clone()
                            disabled=move || signing_out.get()
                        >
                            "Sign Out"
                        </button>
                    </nav>
                </Show>
            </div>
        </header>
    }
}

#[component]
pub fn Layout(children: Children) -> impl IntoView {
    view! {
        <div class="min-h-screen bg-white">
            <Header/>
            <main class="max-w-7xl mx-auto py-6 px-4 sm:px-6 lg:px-8">
                <ProfileWarningBanner/>
                {children()}
            </main>
        </div>
    }
}

/// Shown when the profile row could not be created; the session itself is fine.
#[component]
pub fn ProfileWarningBanner() -> impl IntoView {
    let state = use_auth().state();
    let warning = move || state.with(|state| state.profile_warning.clone());

    view! {
        <Show when=move || warning().is_some()>
            <div class="mb-4 bg-yellow-50 border border-yellow-200 text-yellow-800 px-4 py-3 rounded">
                <p class="font-semibold">"Your profile could not be set up"</p>
                <p class="text-sm mt-1">{move || warning().unwrap_or_default()}</p>
            </div>
        </Show>
    }
}

#[component]
pub fn LoadingSpinner() -> impl IntoView {
    view! {
        <div class="min-h-screen flex items-center justify-center">
            <div class="animate-spin rounded-full h-8 w-8 border-b-2 border-charity-red"></div>
        </div>
    }
}

pub fn display_name(user: &AuthUser) -> String {
    user.user_metadata
        .full_name
        .clone()
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| "User".to_string())
}

pub fn avatar_initial(user: &AuthUser) -> String {
    user.user_metadata
        .full_name
        .as_deref()
        .and_then(|name| name.trim().chars().next())
        .or_else(|| user.email.as_deref().and_then(|email| email.chars().next()))
        .map(|initial| initial.to_uppercase().to_string())
        .unwrap_or_else(|| "U".to_string())
}
