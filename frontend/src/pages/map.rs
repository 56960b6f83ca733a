use crate::components::{empty_state::EmptyState, layout::Layout};
use leptos::*;
use leptos_meta::Title;

#[component]
pub fn MapPage() -> impl IntoView {
    view! {
        <Title text="Map | CharitiesNextToMe"/>
        <Layout>
            <h1 class="text-2xl font-bold text-gray-900 mb-6">"Charities Near You"</h1>
            <EmptyState
                title="Map unavailable"
                description="Charity locations will appear here."
            />
        </Layout>
    }
}
