use std::rc::Rc;

use crate::{
    api::{AvatarError, AvatarFile, ProfileStore, SupabaseClient, UserProfile},
    components::{
        error::{InlineErrorMessage, SuccessMessage},
        layout::{avatar_initial, Layout, LoadingSpinner},
    },
    state::auth::use_auth,
};
use leptos::*;
use leptos_meta::Title;
use wasm_bindgen::JsCast;
use web_sys::HtmlInputElement;

const UPLOAD_SUCCESS: &str = "Profile picture updated successfully!";
const REMOVE_SUCCESS: &str = "Profile picture removed successfully!";

#[component]
pub fn ProfilePage() -> impl IntoView {
    let auth = use_auth();
    let state = auth.state();
    let client = store_value(use_context::<Rc<SupabaseClient>>());
    let user_id = move || state.with(|state| state.user.as_ref().map(|user| user.id.clone()));

    let profile = create_local_resource(user_id, move |id| {
        let client = client.get_value();
        async move {
            let (Some(client), Some(id)) = (client, id) else {
                return None;
            };
            match client.find_profile(&id).await {
                Ok(profile) => profile,
                Err(err) => {
                    log::error!("Error fetching profile: {}", err);
                    None
                }
            }
        }
    });

    let avatar_url = create_rw_signal(None::<String>);
    create_effect(move |_| {
        if let Some(Some(loaded)) = profile.get() {
            avatar_url.set(loaded.avatar_url);
        }
    });

    let error = create_rw_signal(None::<String>);
    let success = create_rw_signal(None::<String>);
    let uploading = create_rw_signal(false);

    let on_file_change = move |event: ev::Event| {
        let Some(input) = event
            .target()
            .and_then(|target| target.dyn_into::<HtmlInputElement>().ok())
        else {
            return;
        };
        let Some(file) = input.files().and_then(|files| files.get(0)) else {
            return;
        };
        let (Some(client), Some(id)) = (client.get_value(), user_id()) else {
            return;
        };
        error.set(None);
        success.set(None);
        uploading.set(true);
        spawn_local(async move {
            let result = match AvatarFile::read(&file).await {
                Ok(avatar) => client.upload_avatar(&id, avatar).await,
                Err(err) => Err(err),
            };
            match result {
                Ok(url) => {
                    avatar_url.set(Some(url));
                    success.set(Some(UPLOAD_SUCCESS.into()));
                    input.set_value("");
                }
                Err(err) => {
                    log::error!("Error uploading avatar: {}", err);
                    error.set(Some(upload_error_message(&err)));
                }
            }
            uploading.set(false);
        });
    };

    let on_remove = move |_| {
        let (Some(client), Some(id)) = (client.get_value(), user_id()) else {
            return;
        };
        error.set(None);
        success.set(None);
        uploading.set(true);
        spawn_local(async move {
            match client.remove_avatar(&id).await {
                Ok(()) => {
                    avatar_url.set(None);
                    success.set(Some(REMOVE_SUCCESS.into()));
                }
                Err(err) => {
                    log::error!("Error removing avatar: {}", err);
                    error.set(Some(upload_error_message(&err)));
                }
            }
            uploading.set(false);
        });
    };

    view! {
        <Title text="Profile | CharitiesNextToMe"/>
        <Layout>
            <Suspense fallback=move || view! { <LoadingSpinner/> }>
                {move || {
                    let user = state.with(|state| state.user.clone());
                    let loaded = profile.get().flatten();
                    user.map(|user| {
                        let initial = avatar_initial(&user);
                        let details = ProfileDetails::from_profile(loaded.as_ref(), user.email.clone());
                        view! {
                            <div class="bg-white shadow rounded-lg p-6 space-y-6">
                                <div class="flex flex-col items-center space-y-4">
                                    {move || match avatar_url.get() {
                                        Some(url) => view! {
                                            <img src=url alt="Profile picture" class="h-32 w-32 rounded-full object-cover"/>
                                        }.into_view(),
                                        None => view! {
                                            <span class="h-32 w-32 rounded-full bg-charity-red text-white text-4xl flex items-center justify-center">
                                                {initial.clone()}
                                            </span>
                                        }.into_view(),
                                    }}
                                    <label class="cursor-pointer text-sm font-medium text-charity-red">
                                        {move || if uploading.get() { "Uploading..." } else { "Change picture" }}
                                        <input
                                            type="file"
                                            accept="image/png,image/jpeg,image/jpg"
                                            class="hidden"
                                            disabled=move || uploading.get()
                                            on:change=on_file_change
                                        />
                                    </label>
                                    <Show when=move || avatar_url.get().is_some()>
                                        <button
                                            class="text-sm text-gray-600 hover:text-red-600 disabled:opacity-50"
                                            disabled=move || uploading.get()
                                            on:click=on_remove
                                        >
                                            "Remove picture"
                                        </button>
                                    </Show>
                                    <p class="text-xs text-gray-500">"PNG or JPEG, up to 5MB"</p>
                                </div>
                                <InlineErrorMessage error=error.into() />
                                <SuccessMessage message=success.into() />
                                <ProfileSummary details=details />
                            </div>
                        }
                    })
                }}
            </Suspense>
        </Layout>
    }
}

fn upload_error_message(err: &AvatarError) -> String {
    match err {
        AvatarError::Upload(_) => "Failed to upload profile picture".to_string(),
        other => other.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq)]
struct ProfileDetails {
    full_name: String,
    email: String,
    location: Option<String>,
    bio: Option<String>,
    follower_count: i64,
    following_count: i64,
}

impl ProfileDetails {
    fn from_profile(profile: Option<&UserProfile>, fallback_email: Option<String>) -> Self {
        Self {
            full_name: profile
                .and_then(|p| p.full_name.clone())
                .unwrap_or_else(|| "Anonymous".into()),
            email: profile
                .and_then(|p| p.email.clone())
                .or(fallback_email)
                .unwrap_or_default(),
            location: profile.and_then(|p| p.location.clone()),
            bio: profile.and_then(|p| p.bio.clone()),
            follower_count: profile.map(|p| p.follower_count).unwrap_or_default(),
            following_count: profile.map(|p| p.following_count).unwrap_or_default(),
        }
    }
}

#[component]
fn ProfileSummary(details: ProfileDetails) -> impl IntoView {
    view! {
        <div class="text-center">
            <h1 class="text-2xl font-bold text-gray-900">{details.full_name}</h1>
            <p class="text-gray-600">{details.email}</p>
            {details.location.map(|location| view! { <p class="text-sm text-gray-500">{location}</p> })}
            {details.bio.map(|bio| view! { <p class="mt-4 text-gray-700">{bio}</p> })}
            <div class="mt-4 flex justify-center space-x-8 text-sm">
                <span><strong>{details.follower_count}</strong>" Followers"</span>
                <span><strong>{details.following_count}</strong>" Following"</span>
            </div>
        </div>
    }
}
