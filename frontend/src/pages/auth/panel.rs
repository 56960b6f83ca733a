use super::{
    utils::AuthTab,
    view_model::use_auth_view_model,
};
use crate::{
    components::error::{InlineErrorMessage, SuccessMessage},
    router::HOME,
    state::auth::use_auth,
};
use leptos::{ev::SubmitEvent, *};
use web_sys::HtmlInputElement;

const INPUT_CLASS: &str = "appearance-none block w-full px-3 py-2 border border-gray-300 rounded-md placeholder-gray-400 text-gray-900 focus:outline-none focus:ring-charity-red focus:border-charity-red sm:text-sm";
const TAB_CLASS: &str = "w-full py-2 text-sm font-medium rounded-md";

fn tab_class(active: bool) -> String {
    if active {
        format!("{} bg-white text-gray-900 shadow", TAB_CLASS)
    } else {
        format!("{} text-gray-500", TAB_CLASS)
    }
}

#[component]
pub fn AuthPanel(#[prop(optional_no_strip)] callback_error: Option<String>) -> impl IntoView {
    let vm = use_auth_view_model();
    if let Some(message) = callback_error {
        vm.error.set(Some(message));
    }
    let state = use_auth().state();
    let session_error = move || state.with(|state| state.session_error.clone());

    let tab = vm.form.tab;
    let pending = vm.pending;
    let on_submit = {
        let vm = vm.clone();
        move |ev: SubmitEvent| {
            ev.prevent_default();
            let vm = vm.clone();
            spawn_local(async move {
                match vm.form.tab.get_untracked() {
                    AuthTab::SignIn => vm.submit_sign_in().await,
                    AuthTab::SignUp => vm.submit_sign_up().await,
                };
            });
        }
    };
    let on_google = {
        let vm = vm.clone();
        move |_| {
            let vm = vm.clone();
            spawn_local(async move { vm.continue_with_google().await });
        }
    };
    let on_sign_in_tab = {
        let vm = vm.clone();
        move |_| vm.select_tab(AuthTab::SignIn)
    };
    let on_sign_up_tab = {
        let vm = vm.clone();
        move |_| vm.select_tab(AuthTab::SignUp)
    };
    let form = vm.form;

    view! {
        <div class="min-h-screen bg-gray-50 flex flex-col justify-center py-12 sm:px-6 lg:px-8">
            <div class="sm:mx-auto sm:w-full sm:max-w-md text-center">
                <a href=HOME class="font-bold text-2xl text-gray-900">"CharitiesNextToMe"</a>
                <h2 class="mt-6 text-3xl font-bold text-gray-900">"Join our community"</h2>
                <p class="mt-2 text-sm text-gray-600">"Discover and support local Canadian charities"</p>
            </div>
            <div class="mt-8 sm:mx-auto sm:w-full sm:max-w-md bg-white py-8 px-4 shadow sm:rounded-lg sm:px-10">
                <div class="grid grid-cols-2 gap-1 p-1 bg-gray-100 rounded-md mb-4">
                    <button
                        type="button"
                        class=move || tab_class(tab.get() == AuthTab::SignIn)
                        on:click=on_sign_in_tab
                    >
                        "Sign In"
                    </button>
                    <button
                        type="button"
                        class=move || tab_class(tab.get() == AuthTab::SignUp)
                        on:click=on_sign_up_tab
                    >
                        "Sign Up"
                    </button>
                </div>

                {move || session_error().map(|error| view! {
                    <div class="bg-red-50 border border-red-200 text-red-700 px-4 py-3 rounded my-2">
                        <p class="text-sm">{error}</p>
                    </div>
                })}
                <InlineErrorMessage error=vm.error.into() />
                <SuccessMessage message=vm.success.into() />

                <button
                    type="button"
                    class="w-full mb-4 py-2 px-4 border border-gray-300 rounded-md text-sm font-medium text-gray-700 hover:bg-gray-50 disabled:opacity-50"
                    on:click=on_google
                    disabled=move || pending.get()
                >
                    "Continue with Google"
                </button>
                <p class="text-center text-sm text-gray-500 mb-4">"Or continue with email"</p>

                <form class="space-y-4" on:submit=on_submit>
                    <Show when=move || tab.get() == AuthTab::SignUp>
                        <div>
                            <label for="full_name" class="block text-sm font-medium text-gray-700">"Full Name"</label>
                            <input
                                id="full_name"
                                name="full_name"
                                type="text"
                                class=INPUT_CLASS
                                placeholder="Enter your full name"
                                prop:value=move || form.full_name.get()
                                on:input=move |ev| {
                                    let target = event_target::<HtmlInputElement>(&ev);
                                    form.full_name.set(target.value());
                                }
                            />
                        </div>
                    </Show>
                    <div>
                        <label for="email" class="block text-sm font-medium text-gray-700">"Email"</label>
                        <input
                            id="email"
                            name="email"
                            type="email"
                            class=INPUT_CLASS
                            placeholder="Enter your email"
                            prop:value=move || form.email.get()
                            on:input=move |ev| {
                                let target = event_target::<HtmlInputElement>(&ev);
                                form.email.set(target.value());
                            }
                        />
                    </div>
                    <div>
                        <label for="password" class="block text-sm font-medium text-gray-700">"Password"</label>
                        <input
                            id="password"
                            name="password"
                            type="password"
                            class=INPUT_CLASS
                            placeholder=move || match tab.get() {
                                AuthTab::SignIn => "Enter your password",
                                AuthTab::SignUp => "Create a password (min. 6 characters)",
                            }
                            prop:value=move || form.password.get()
                            on:input=move |ev| {
                                let target = event_target::<HtmlInputElement>(&ev);
                                form.password.set(target.value());
                            }
                        />
                    </div>
                    <button
                        type="submit"
                        disabled=move || pending.get()
                        class="w-full flex justify-center py-2 px-4 border border-transparent rounded-md text-sm font-medium text-white bg-charity-red hover:bg-red-600 disabled:opacity-50"
                    >
                        {move || match (tab.get(), pending.get()) {
                            (AuthTab::SignIn, true) => "Signing in...",
                            (AuthTab::SignIn, false) => "Sign In",
                            (AuthTab::SignUp, true) => "Creating account...",
                            (AuthTab::SignUp, false) => "Create Account",
                        }}
                    </button>
                </form>
            </div>
        </div>
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod host_tests {
    use super::*;
    use crate::state::auth::AuthState;
    use crate::test_support::helpers::provide_auth_state;
    use crate::test_support::ssr::render_to_string;

    #[test]
    fn renders_sign_in_form_by_default() {
        let html = render_to_string(|| {
            provide_auth_state(AuthState {
                loading: false,
                ..AuthState::default()
            });
            view! { <AuthPanel /> }
        });
        assert!(html.contains("Continue with Google"));
        assert!(html.contains("Enter your password"));
        assert!(!html.contains("Enter your full name"));
    }

    #[test]
    fn shows_oauth_callback_error() {
        let html = render_to_string(|| {
            provide_auth_state(AuthState {
                loading: false,
                ..AuthState::default()
            });
            view! { <AuthPanel callback_error=Some("Email link is invalid or has expired".to_string()) /> }
        });
        assert!(html.contains("Email link is invalid or has expired"));
    }
}
