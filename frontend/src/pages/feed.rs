use crate::components::{empty_state::EmptyState, layout::Layout};
use leptos::*;
use leptos_meta::Title;

#[component]
pub fn FeedPage() -> impl IntoView {
    view! {
        <Title text="Feed | CharitiesNextToMe"/>
        <Layout>
            <h1 class="text-2xl font-bold text-gray-900 mb-6">"Your Feed"</h1>
            <EmptyState
                title="No posts yet"
                description="Follow charities and community members to see their updates here."
            />
        </Layout>
    }
}
