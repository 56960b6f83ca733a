use leptos::*;

mod api;
mod components;
pub mod config;
mod pages;
pub mod router;
mod state;
pub mod utils;

#[cfg(test)]
mod test_support;

use components::error::ConfigErrorPage;

/// Entry point for both the Trunk binary and JS hosts loading the cdylib.
#[wasm_bindgen::prelude::wasm_bindgen]
pub fn start() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Debug).is_err() {
        web_sys::console::warn_1(&"Logger already initialized".into());
    }
    log::info!("Starting CharitiesNextToMe frontend");

    // Runtime config: window.__CHARITIES_ENV (env.js) first, then ./config.json.
    spawn_local(async move {
        match config::load().await {
            Ok(config) => {
                log::info!("Runtime config initialized for {}", config.url);
                router::mount_app(config);
            }
            Err(err) => {
                log::error!("Supabase configuration error: {}", err);
                let message = err.to_string();
                mount_to_body(move || view! { <ConfigErrorPage message=message.clone()/> });
            }
        }
    });
}
