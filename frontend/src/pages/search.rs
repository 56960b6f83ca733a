use crate::components::{empty_state::EmptyState, layout::Layout};
use leptos::*;
use leptos_meta::Title;

#[component]
pub fn SearchPage() -> impl IntoView {
    view! {
        <Title text="Search | CharitiesNextToMe"/>
        <Layout>
            <h1 class="text-2xl font-bold text-gray-900 mb-6">"Search"</h1>
            <EmptyState
                title="Find charities and people"
                description="Search by city, category, or name."
            />
        </Layout>
    }
}
