use async_trait::async_trait;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::Utc;
use percent_encoding::{percent_decode_str, utf8_percent_encode, NON_ALPHANUMERIC};
use reqwest::StatusCode;
use serde::Deserialize;

use super::{
    backend::{AuthBackend, SessionListener, Subscription},
    client::{read_auth_error, SupabaseClient},
    error::{AuthError, AuthErrorKind},
    types::{
        AuthChangeEvent, AuthUser, OAuthProvider, PasswordCredentials, RefreshTokenRequest,
        Session, SignUpMetadata, SignUpOutcome, SignUpRequest,
    },
};
use crate::{router::AUTH, utils::storage as storage_utils};

#[async_trait(?Send)]
impl AuthBackend for SupabaseClient {
    async fn get_session(&self) -> Result<Option<Session>, AuthError> {
        if let Some(session) = self.session_from_url().await? {
            return Ok(Some(session));
        }

        let Some(session) = self.stored_session() else {
            return Ok(None);
        };
        if !session.is_expired(Utc::now()) {
            return Ok(Some(session));
        }

        log::debug!("Stored session expired, refreshing");
        match self.refresh_session(&session.refresh_token).await {
            Ok(refreshed) => {
                self.persist_session(&refreshed);
                self.notify(AuthChangeEvent::TokenRefreshed, Some(refreshed.clone()));
                Ok(Some(refreshed))
            }
            Err(err) => {
                self.clear_session();
                Err(err)
            }
        }
    }

    fn on_session_change(&self, listener: SessionListener) -> Subscription {
        self.listeners().subscribe(listener)
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<(), AuthError> {
        let credentials = PasswordCredentials {
            email: email.to_string(),
            password: password.to_string(),
        };
        let response = self
            .http_client()
            .post(self.auth_url("/token?grant_type=password"))
            .headers(self.headers_with_token(None))
            .json(&credentials)
            .send()
            .await
            .map_err(AuthError::network)?;

        if !response.status().is_success() {
            return Err(read_auth_error(response).await);
        }
        let session = decode_session(response).await?;
        self.persist_session(&session);
        self.notify(AuthChangeEvent::SignedIn, Some(session));
        Ok(())
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: SignUpMetadata,
    ) -> Result<(), AuthError> {
        let request = SignUpRequest {
            email: email.to_string(),
            password: password.to_string(),
            data: metadata,
        };
        let response = self
            .http_client()
            .post(self.auth_url("/signup"))
            .headers(self.headers_with_token(None))
            .json(&request)
            .send()
            .await
            .map_err(AuthError::network)?;

        if !response.status().is_success() {
            return Err(read_auth_error(response).await);
        }
        let outcome: SignUpOutcome = response
            .json()
            .await
            .map_err(|e| AuthError::unknown(format!("Failed to parse response: {}", e)))?;

        match outcome {
            SignUpOutcome::Session(session) => {
                let session = session.with_expiry_from(Utc::now());
                self.persist_session(&session);
                self.notify(AuthChangeEvent::SignedIn, Some(session));
                Ok(())
            }
            SignUpOutcome::User(user) => check_new_user(&user),
        }
    }

    async fn sign_in_with_oauth(
        &self,
        provider: OAuthProvider,
        redirect_to: &str,
    ) -> Result<(), AuthError> {
        if redirect_to.trim().is_empty() {
            return Err(AuthError::new(
                AuthErrorKind::RedirectInitFailure,
                "OAuth redirect URL is not configured",
            ));
        }
        let url = self.authorize_url(provider, redirect_to);
        let window = storage_utils::window()
            .map_err(|e| AuthError::new(AuthErrorKind::RedirectInitFailure, e))?;
        window.location().set_href(&url).map_err(|_| {
            AuthError::new(
                AuthErrorKind::RedirectInitFailure,
                format!("Failed to start {} sign in", provider.as_str()),
            )
        })
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        if let Some(session) = self.stored_session() {
            let response = self
                .http_client()
                .post(self.auth_url("/logout"))
                .headers(self.headers_with_token(Some(&session.access_token)))
                .send()
                .await
                .map_err(AuthError::network)?;
            let status = response.status();
            // The session is already gone on the backend for these.
            let already_signed_out = matches!(
                status,
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::NOT_FOUND
            );
            if !status.is_success() && !already_signed_out {
                return Err(read_auth_error(response).await);
            }
        }
        self.clear_session();
        self.notify(AuthChangeEvent::SignedOut, None);
        Ok(())
    }
}

impl SupabaseClient {
    pub fn authorize_url(&self, provider: OAuthProvider, redirect_to: &str) -> String {
        format!(
            "{}?provider={}&redirect_to={}",
            self.auth_url("/authorize"),
            provider.as_str(),
            utf8_percent_encode(redirect_to, NON_ALPHANUMERIC)
        )
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<Session, AuthError> {
        let response = self
            .http_client()
            .post(self.auth_url("/token?grant_type=refresh_token"))
            .headers(self.headers_with_token(None))
            .json(&RefreshTokenRequest { refresh_token })
            .send()
            .await
            .map_err(AuthError::network)?;
        if !response.status().is_success() {
            return Err(read_auth_error(response).await);
        }
        decode_session(response).await
    }

    async fn fetch_user(&self, access_token: &str) -> Result<AuthUser, AuthError> {
        let response = self
            .http_client()
            .get(self.auth_url("/user"))
            .headers(self.headers_with_token(Some(access_token)))
            .send()
            .await
            .map_err(AuthError::network)?;
        if !response.status().is_success() {
            return Err(read_auth_error(response).await);
        }
        response
            .json()
            .await
            .map_err(|e| AuthError::unknown(format!("Failed to parse response: {}", e)))
    }

    /// Picks up the tokens an OAuth provider appended to the URL on redirect back.
    async fn session_from_url(&self) -> Result<Option<Session>, AuthError> {
        let Ok(window) = storage_utils::window() else {
            return Ok(None);
        };
        let location = window.location();
        let pathname = location.pathname().unwrap_or_else(|_| "/".into());
        let hash = location.hash().unwrap_or_default();
        let search = location.search().unwrap_or_default();

        let Some(tokens) = read_redirect(&pathname, &hash, &search)? else {
            return Ok(None);
        };

        let user = self.fetch_user(&tokens.access_token).await?;
        let session = tokens.into_session(user);
        self.persist_session(&session);

        let clean = pathname + &search;
        if let Ok(history) = window.history() {
            if history
                .replace_state_with_url(&wasm_bindgen::JsValue::NULL, "", Some(&clean))
                .is_err()
            {
                log::warn!("Failed to strip auth tokens from the URL");
            }
        }

        self.notify(AuthChangeEvent::SignedIn, Some(session.clone()));
        Ok(Some(session))
    }
}

async fn decode_session(response: reqwest::Response) -> Result<Session, AuthError> {
    let session: Session = response
        .json()
        .await
        .map_err(|e| AuthError::unknown(format!("Failed to parse response: {}", e)))?;
    Ok(session.with_expiry_from(Utc::now()))
}

/// A confirmation-pending signup for an address that is already registered
/// comes back as a user without identities.
fn check_new_user(user: &AuthUser) -> Result<(), AuthError> {
    match &user.identities {
        Some(identities) if identities.is_empty() => Err(AuthError::new(
            AuthErrorKind::DuplicateEmail,
            "User already registered",
        )),
        _ => Ok(()),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub expires_at: Option<i64>,
}

impl RedirectTokens {
    fn into_session(self, user: AuthUser) -> Session {
        let expires_at = self
            .expires_at
            .or_else(|| decode_claims(&self.access_token).and_then(|claims| claims.exp));
        Session {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            token_type: self.token_type,
            expires_in: self.expires_in,
            expires_at,
            user,
        }
        .with_expiry_from(Utc::now())
    }
}

/// Tokens in the fragment are taken on any page. A callback `error` only
/// counts on the OAuth redirect target; elsewhere it is someone else's
/// query parameter.
fn read_redirect(
    pathname: &str,
    hash: &str,
    search: &str,
) -> Result<Option<RedirectTokens>, AuthError> {
    let callback = pathname.trim_end_matches('/') == AUTH;
    match parse_redirect_params(hash) {
        Ok(Some(tokens)) => return Ok(Some(tokens)),
        Err(err) if callback => return Err(err),
        Err(err) => log::debug!("Ignoring redirect error on {}: {}", pathname, err),
        Ok(None) => {}
    }
    if callback {
        parse_redirect_params(search)?;
    }
    Ok(None)
}

/// Parses `#access_token=..&refresh_token=..` or `?error=..` style parameters.
pub fn parse_redirect_params(raw: &str) -> Result<Option<RedirectTokens>, AuthError> {
    let raw = raw.trim_start_matches(['#', '?']);
    if raw.is_empty() {
        return Ok(None);
    }

    let mut access_token = None;
    let mut refresh_token = None;
    let mut token_type = None;
    let mut expires_in = None;
    let mut expires_at = None;
    let mut error = None;
    let mut error_description = None;

    for pair in raw.split('&') {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        let value = percent_decode_str(&value.replace('+', " "))
            .decode_utf8_lossy()
            .into_owned();
        match key {
            "access_token" => access_token = Some(value),
            "refresh_token" => refresh_token = Some(value),
            "token_type" => token_type = Some(value),
            "expires_in" => expires_in = value.parse::<i64>().ok(),
            "expires_at" => expires_at = value.parse::<i64>().ok(),
            "error" => error = Some(value),
            "error_description" => error_description = Some(value),
            _ => {}
        }
    }

    if let Some(error) = error {
        return Err(AuthError::new(
            AuthErrorKind::OAuthCallback,
            error_description.unwrap_or(error),
        ));
    }

    match (access_token, refresh_token) {
        (Some(access_token), Some(refresh_token)) => Ok(Some(RedirectTokens {
            access_token,
            refresh_token,
            token_type: token_type.unwrap_or_else(|| "bearer".into()),
            expires_in: expires_in.unwrap_or_default(),
            expires_at,
        })),
        _ => Ok(None),
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccessTokenClaims {
    #[serde(default)]
    pub exp: Option<i64>,
}

pub fn decode_claims(token: &str) -> Option<AccessTokenClaims> {
    let payload = token.split('.').nth(1)?;
    let decoded = URL_SAFE_NO_PAD.decode(payload).ok()?;
    serde_json::from_slice(&decoded).ok()
}
