use std::rc::Rc;

use leptos::*;
use leptos_meta::provide_meta_context;
use leptos_router::*;

use crate::{
    api::SupabaseClient,
    components::guard::RouteGuard,
    config::BackendConfig,
    pages::{AuthPage, FeedPage, HomePage, MapPage, ProfilePage, SearchPage},
    state::auth::AuthProvider,
    utils::{navigation::Navigator, storage::SessionStorageAdapter},
};

pub const HOME: &str = "/";
pub const AUTH: &str = "/auth";
pub const FEED: &str = "/feed";
pub const MAP: &str = "/map";
pub const SEARCH: &str = "/search";
pub const PROFILE: &str = "/profile";

/// Where a signed-in visitor of a public-only page is sent.
pub const AUTHENTICATED_LANDING: &str = FEED;

pub const ROUTE_PATHS: &[&str] = &[HOME, AUTH, FEED, MAP, SEARCH, PROFILE];

pub const PROTECTED_ROUTE_PATHS: &[&str] = &[FEED, MAP, SEARCH, PROFILE];

/// Only reachable while signed out.
pub const PUBLIC_ONLY_ROUTE_PATHS: &[&str] = &[AUTH];

pub fn mount_app(config: BackendConfig) {
    let sessions = SessionStorageAdapter::browser(config.storage_key.clone());
    let client = Rc::new(SupabaseClient::new(config, sessions));
    mount_to_body(move || app_root(client));
}

pub fn app_root(client: Rc<SupabaseClient>) -> impl IntoView {
    provide_meta_context();
    provide_context(client.clone());
    view! {
        <Router>
            <AppRoutes client=client/>
        </Router>
    }
}

#[component]
fn AppRoutes(client: Rc<SupabaseClient>) -> impl IntoView {
    provide_context(Navigator::router());
    view! {
        <AuthProvider backend=client.clone() profiles=client>
            <Routes>
                <Route path=HOME view=HomePage/>
                <Route path=AUTH view=PublicAuth/>
                <Route path=FEED view=ProtectedFeed/>
                <Route path=MAP view=ProtectedMap/>
                <Route path=SEARCH view=ProtectedSearch/>
                <Route path=PROFILE view=ProtectedProfile/>
            </Routes>
        </AuthProvider>
    }
}

#[component]
fn PublicAuth() -> impl IntoView {
    view! { <RouteGuard require_auth=false><AuthPage/></RouteGuard> }
}

#[component]
fn ProtectedFeed() -> impl IntoView {
    view! { <RouteGuard><FeedPage/></RouteGuard> }
}

#[component]
fn ProtectedMap() -> impl IntoView {
    view! { <RouteGuard><MapPage/></RouteGuard> }
}

#[component]
fn ProtectedSearch() -> impl IntoView {
    view! { <RouteGuard><SearchPage/></RouteGuard> }
}

#[component]
fn ProtectedProfile() -> impl IntoView {
    view! { <RouteGuard><ProfilePage/></RouteGuard> }
}
