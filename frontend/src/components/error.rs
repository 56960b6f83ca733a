use leptos::*;

#[component]
pub fn InlineErrorMessage(error: Signal<Option<String>>) -> impl IntoView {
    view! {
        <Show when=move || error.get().is_some() fallback=|| ()>
            <div class="bg-red-50 border border-red-200 text-red-700 px-4 py-3 rounded my-2" role="alert">
                <p class="text-sm">{move || error.get().unwrap_or_default()}</p>
            </div>
        </Show>
    }
}

#[component]
pub fn SuccessMessage(message: Signal<Option<String>>) -> impl IntoView {
    view! {
        <Show when=move || message.get().is_some() fallback=|| ()>
            <div class="bg-green-50 border border-green-200 text-green-700 px-4 py-3 rounded my-2">
                <p class="text-sm">{move || message.get().unwrap_or_default()}</p>
            </div>
        </Show>
    }
}

/// Full-page notice shown instead of the app when the backend is not configured.
#[component]
pub fn ConfigErrorPage(message: String) -> impl IntoView {
    view! {
        <div class="min-h-screen flex items-center justify-center bg-gray-50 px-4">
            <div class="max-w-md w-full bg-white shadow rounded-lg p-6" role="alert">
                <h1 class="text-lg font-semibold text-gray-900">"CharitiesNextToMe is not configured"</h1>
                <p class="mt-2 text-sm text-red-700">{message}</p>
                <p class="mt-4 text-sm text-gray-600">
                    "Provide SUPABASE_URL and SUPABASE_ANON_KEY through env.js or config.json."
                </p>
            </div>
        </div>
    }
}
