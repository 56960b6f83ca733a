use leptos::*;
use thiserror::Error;

/// Why the auth backend rejected an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthErrorKind {
    InvalidCredentials,
    UnconfirmedAccount,
    RateLimited,
    WeakPassword,
    DuplicateEmail,
    RedirectInitFailure,
    OAuthCallback,
    Network,
    Unknown,
}

impl AuthErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthErrorKind::InvalidCredentials => "invalid_credentials",
            AuthErrorKind::UnconfirmedAccount => "unconfirmed_account",
            AuthErrorKind::RateLimited => "rate_limited",
            AuthErrorKind::WeakPassword => "weak_password",
            AuthErrorKind::DuplicateEmail => "duplicate_email",
            AuthErrorKind::RedirectInitFailure => "redirect_init_failure",
            AuthErrorKind::OAuthCallback => "oauth_callback",
            AuthErrorKind::Network => "network",
            AuthErrorKind::Unknown => "unknown",
        }
    }

    /// Maps a GoTrue status / `error_code` pair onto the error taxonomy.
    pub fn classify(status: u16, error_code: Option<&str>, message: &str) -> Self {
        let code = error_code.unwrap_or_default();
        if status == 429 || code.starts_with("over_") {
            return AuthErrorKind::RateLimited;
        }
        match code {
            "invalid_credentials" | "invalid_grant" => return AuthErrorKind::InvalidCredentials,
            "email_not_confirmed" => return AuthErrorKind::UnconfirmedAccount,
            "weak_password" => return AuthErrorKind::WeakPassword,
            "user_already_exists" | "email_exists" => return AuthErrorKind::DuplicateEmail,
            _ => {}
        }

        // Older GoTrue releases only report a message.
        let lowered = message.to_ascii_lowercase();
        if lowered.contains("invalid login credentials") {
            AuthErrorKind::InvalidCredentials
        } else if lowered.contains("email not confirmed") {
            AuthErrorKind::UnconfirmedAccount
        } else if lowered.contains("already registered") {
            AuthErrorKind::DuplicateEmail
        } else if lowered.contains("password should be") {
            AuthErrorKind::WeakPassword
        } else {
            AuthErrorKind::Unknown
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct AuthError {
    pub kind: AuthErrorKind,
    pub message: String,
}

impl AuthError {
    pub fn new(kind: AuthErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn network(error: impl std::fmt::Display) -> Self {
        Self::new(AuthErrorKind::Network, format!("Request failed: {}", error))
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(AuthErrorKind::Unknown, message)
    }

    pub fn is(&self, kind: AuthErrorKind) -> bool {
        self.kind == kind
    }
}

impl From<AuthError> for String {
    fn from(error: AuthError) -> Self {
        error.message
    }
}

impl IntoView for AuthError {
    fn into_view(self) -> View {
        self.message.into_view()
    }
}

/// Failure of a data-store (PostgREST) or object-storage call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),
    #[error("request failed: {0}")]
    Request(String),
    #[error("backend rejected the request ({status}): {message}")]
    Rejected {
        status: u16,
        code: Option<String>,
        message: String,
    },
    #[error("failed to decode response: {0}")]
    Decode(String),
}

/// SQLSTATE the data store reports for a unique-constraint violation.
pub const UNIQUE_VIOLATION_CODE: &str = "23505";

impl QueryError {
    pub fn request(error: impl std::fmt::Display) -> Self {
        QueryError::Request(error.to_string())
    }

    pub fn from_response(status: u16, code: Option<String>, message: String) -> Self {
        if code.as_deref() == Some(UNIQUE_VIOLATION_CODE) {
            QueryError::UniqueViolation(message)
        } else {
            QueryError::Rejected {
                status,
                code,
                message,
            }
        }
    }

    pub fn is_unique_violation(&self) -> bool {
        matches!(self, QueryError::UniqueViolation(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProfileBootstrapError {
    #[error("could not create user profile: {0}")]
    Insert(QueryError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("local storage is unavailable: {0}")]
    Unavailable(String),
    #[error("failed to read `{key}` from local storage")]
    Read { key: String },
    #[error("failed to write `{key}` to local storage")]
    Write { key: String },
    #[error("failed to remove `{key}` from local storage")]
    Remove { key: String },
}
