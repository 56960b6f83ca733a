use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use thiserror::Error;

/// localStorage key the auth session is persisted under.
pub const STORAGE_KEY: &str = "charities-next-to-me-auth";
pub const APPLICATION_NAME: &str = "charities-next-to-me";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    #[serde(default, alias = "SUPABASE_URL")]
    pub supabase_url: Option<String>,
    #[serde(default, alias = "SUPABASE_ANON_KEY")]
    pub supabase_anon_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    pub url: String,
    pub anon_key: String,
    pub storage_key: String,
    pub application_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Missing SUPABASE_URL")]
    MissingUrl,
    #[error("Missing SUPABASE_ANON_KEY")]
    MissingAnonKey,
}

impl RuntimeConfig {
    /// Values already present win over `fallback`.
    pub fn or(self, fallback: RuntimeConfig) -> RuntimeConfig {
        RuntimeConfig {
            supabase_url: self.supabase_url.or(fallback.supabase_url),
            supabase_anon_key: self.supabase_anon_key.or(fallback.supabase_anon_key),
        }
    }

    pub fn is_complete(&self) -> bool {
        non_blank(&self.supabase_url).is_some() && non_blank(&self.supabase_anon_key).is_some()
    }

    pub fn into_backend_config(self) -> Result<BackendConfig, ConfigError> {
        let url = non_blank(&self.supabase_url).ok_or(ConfigError::MissingUrl)?;
        let anon_key = non_blank(&self.supabase_anon_key).ok_or(ConfigError::MissingAnonKey)?;
        Ok(BackendConfig {
            url: url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
            storage_key: STORAGE_KEY.into(),
            application_name: APPLICATION_NAME.into(),
        })
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

static BACKEND_CONFIG: OnceLock<BackendConfig> = OnceLock::new();

fn read_global_string(obj: &js_sys::Object, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| {
        js_sys::Reflect::get(obj, &(*key).into())
            .ok()
            .filter(|v| !v.is_undefined() && !v.is_null())
            .and_then(|v| v.as_string())
    })
}

fn get_from_env_js() -> RuntimeConfig {
    // Optional global object: window.__CHARITIES_ENV = { SUPABASE_URL: "...", SUPABASE_ANON_KEY: "..." }
    let Some(w) = web_sys::window() else {
        return RuntimeConfig::default();
    };
    let any = match js_sys::Reflect::get(&w, &"__CHARITIES_ENV".into()) {
        Ok(any) if !any.is_undefined() && !any.is_null() => any,
        _ => return RuntimeConfig::default(),
    };
    let obj = js_sys::Object::from(any);
    RuntimeConfig {
        supabase_url: read_global_string(&obj, &["SUPABASE_URL", "supabase_url"]),
        supabase_anon_key: read_global_string(&obj, &["SUPABASE_ANON_KEY", "supabase_anon_key"]),
    }
}

async fn fetch_runtime_config() -> anyhow::Result<RuntimeConfig> {
    let url = site_origin()
        .map(|origin| format!("{}/config.json", origin))
        .context("no window origin to resolve config.json against")?;
    let resp = reqwest::get(&url)
        .await
        .with_context(|| format!("requesting {}", url))?;
    if !resp.status().is_success() {
        bail!("{} answered {}", url, resp.status());
    }
    resp.json::<RuntimeConfig>()
        .await
        .context("decoding config.json")
}

pub async fn load() -> Result<BackendConfig, ConfigError> {
    if let Some(cached) = BACKEND_CONFIG.get() {
        return Ok(cached.clone());
    }
    let mut runtime = get_from_env_js();
    if !runtime.is_complete() {
        match fetch_runtime_config().await {
            Ok(file) => runtime = runtime.or(file),
            Err(err) => log::warn!("Runtime config file unavailable: {:#}", err),
        }
    }
    let config = runtime.into_backend_config()?;
    Ok(BACKEND_CONFIG.get_or_init(|| config).clone())
}

pub fn site_origin() -> Option<String> {
    crate::utils::storage::window()
        .ok()
        .and_then(|w| w.location().origin().ok())
}

/// Absolute URL the OAuth provider sends the browser back to.
pub fn oauth_redirect_url(path: &str) -> String {
    site_origin()
        .map(|origin| format!("{}{}", origin, path))
        .unwrap_or_default()
}
