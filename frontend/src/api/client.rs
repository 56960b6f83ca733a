use std::rc::Rc;

use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION},
    Client, Response,
};

use super::{
    backend::ListenerRegistry,
    error::{AuthError, AuthErrorKind, QueryError},
    types::{AuthChangeEvent, AuthErrorBody, QueryErrorBody, Session},
};
use crate::{config::BackendConfig, utils::storage::SessionStorageAdapter};

/// The one handle to the managed backend (auth, data store, object storage).
pub struct SupabaseClient {
    http: Client,
    config: BackendConfig,
    sessions: SessionStorageAdapter,
    listeners: Rc<ListenerRegistry>,
}

impl SupabaseClient {
    pub fn new(config: BackendConfig, sessions: SessionStorageAdapter) -> Self {
        Self {
            http: Client::new(),
            config,
            sessions,
            listeners: ListenerRegistry::new(),
        }
    }

    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    pub(crate) fn http_client(&self) -> &Client {
        &self.http
    }

    pub(crate) fn listeners(&self) -> &Rc<ListenerRegistry> {
        &self.listeners
    }

    pub(crate) fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1{}", self.config.url, path)
    }

    pub(crate) fn rest_url(&self, path: &str) -> String {
        format!("{}/rest/v1{}", self.config.url, path)
    }

    pub(crate) fn storage_url(&self, path: &str) -> String {
        format!("{}/storage/v1{}", self.config.url, path)
    }

    /// Headers for a request on behalf of the stored session (or anonymously).
    pub(crate) fn headers(&self) -> HeaderMap {
        let token = self
            .sessions
            .load_session()
            .map(|session| session.access_token);
        self.headers_with_token(token.as_deref())
    }

    pub(crate) fn headers_with_token(&self, access_token: Option<&str>) -> HeaderMap {
        let mut headers = HeaderMap::new();
        let bearer = access_token.unwrap_or(&self.config.anon_key);
        insert_header(&mut headers, HeaderName::from_static("apikey"), &self.config.anon_key);
        insert_header(
            &mut headers,
            HeaderName::from_static("x-application-name"),
            &self.config.application_name,
        );
        insert_header(&mut headers, AUTHORIZATION, &format!("Bearer {}", bearer));
        headers
    }

    pub(crate) fn stored_session(&self) -> Option<Session> {
        self.sessions.load_session()
    }

    pub(crate) fn persist_session(&self, session: &Session) {
        self.sessions.save_session(session);
    }

    pub(crate) fn clear_session(&self) {
        self.sessions.clear_session();
    }

    pub(crate) fn notify(&self, event: AuthChangeEvent, session: Option<Session>) {
        log::debug!(
            "Session change {:?} for {:?}",
            event,
            session.as_ref().and_then(|s| s.user.email.as_deref())
        );
        self.listeners.notify(event, session);
    }
}

fn insert_header(headers: &mut HeaderMap, name: HeaderName, value: &str) {
    match HeaderValue::from_str(value) {
        Ok(value) => {
            headers.insert(name, value);
        }
        Err(_) => log::warn!("Skipping header {} with invalid value", name),
    }
}

/// Turns a non-success auth response into a typed error.
pub(crate) async fn read_auth_error(response: Response) -> AuthError {
    let status = response.status().as_u16();
    let body: AuthErrorBody = response.json().await.unwrap_or_default();
    auth_error_from_body(status, &body)
}

pub(crate) fn auth_error_from_body(status: u16, body: &AuthErrorBody) -> AuthError {
    let message = body.message();
    let kind = AuthErrorKind::classify(status, body.code(), &message);
    AuthError::new(kind, message)
}

/// Turns a non-success data-store response into a typed error.
pub(crate) async fn read_query_error(response: Response) -> QueryError {
    let status = response.status().as_u16();
    let body: QueryErrorBody = response.json().await.unwrap_or_default();
    let message = body
        .message
        .or(body.details)
        .unwrap_or_else(|| format!("HTTP {}", status));
    QueryError::from_response(status, body.code, message)
}
