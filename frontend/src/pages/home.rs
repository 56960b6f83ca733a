use crate::{
    components::layout::Header,
    router::{AUTH, FEED, MAP},
    state::auth::{use_auth, AuthState},
};
use leptos::*;

const FEATURES: [(&str, &str); 3] = [
    (
        "Social Feed",
        "Follow your favorite charities and stay updated with their latest posts, events, and impact stories.",
    ),
    (
        "Interactive Map",
        "Discover charities near you with our interactive map showing locations, contact info, and details.",
    ),
    (
        "Smart Search",
        "Find charities by city, category, or cause.",
    ),
];

#[component]
pub fn HomePage() -> impl IntoView {
    let state = use_auth().state();
    let start_href = move || {
        if state.with(AuthState::is_authenticated) {
            FEED
        } else {
            AUTH
        }
    };

    view! {
        <div class="min-h-screen bg-white">
            <Header/>
            <section class="bg-gradient-to-br from-red-50 to-blue-50 py-20">
                <div class="max-w-7xl mx-auto px-4 sm:px-6 lg:px-8 text-center">
                    <h1 class="text-4xl md:text-6xl font-bold text-gray-900 mb-6">
                        "Discover Local"
                        <span class="text-charity-red">" Canadian Charities"</span>
                    </h1>
                    <p class="text-xl text-gray-600 mb-8 max-w-3xl mx-auto">
                        "Connect with charitable organizations in your community through our social platform."
                    </p>
                    <div class="flex flex-col sm:flex-row gap-4 justify-center">
                        <a href=start_href class="px-8 py-3 rounded-md text-white bg-charity-red hover:bg-red-600">
                            "Get Started"
                        </a>
                        <a href=MAP class="px-8 py-3 rounded-md border border-gray-300 text-gray-700">
                            "Explore Map"
                        </a>
                    </div>
                </div>
            </section>
            <section class="py-20 bg-gray-50">
                <div class="max-w-7xl mx-auto px-4 sm:px-6 lg:px-8 grid md:grid-cols-3 gap-8">
                    {FEATURES
                        .iter()
                        .map(|(title, description)| view! {
                            <div class="text-center bg-white rounded-lg shadow p-6">
                                <h3 class="font-semibold text-lg text-gray-900">{*title}</h3>
                                <p class="mt-2 text-gray-600">{*description}</p>
                            </div>
                        })
                        .collect_view()}
                </div>
            </section>
        </div>
    }
}
