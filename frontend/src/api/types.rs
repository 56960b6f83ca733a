use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Seconds before `expires_at` at which a session is already treated as expired.
pub const EXPIRY_MARGIN_SECS: i64 = 10;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: UserMetadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identities: Option<Vec<Value>>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl AuthUser {
    /// Local part of the e-mail address, if any.
    pub fn email_local_part(&self) -> Option<&str> {
        self.email
            .as_deref()
            .and_then(|email| email.split('@').next())
            .filter(|local| !local.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default)]
    pub expires_in: i64,
    #[serde(default)]
    pub expires_at: Option<i64>,
    pub user: AuthUser,
}

fn default_token_type() -> String {
    "bearer".into()
}

impl Session {
    /// Fills in `expires_at` from `expires_in` when the backend omitted it.
    pub fn with_expiry_from(mut self, now: DateTime<Utc>) -> Self {
        if self.expires_at.is_none() && self.expires_in > 0 {
            self.expires_at = Some(now.timestamp() + self.expires_in);
        }
        self
    }

    pub fn expires_at_utc(&self) -> Option<DateTime<Utc>> {
        self.expires_at
            .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
    }

    /// Sessions without a known expiry are trusted until the backend rejects them.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(expires_at) => expires_at - EXPIRY_MARGIN_SECS <= now.timestamp(),
            None => false,
        }
    }
}

/// Application-level profile row in the `users` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub follower_count: i64,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub following_count: i64,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

fn null_as_zero<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<i64>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewUserProfile {
    pub id: String,
    pub email: String,
    pub full_name: String,
    pub avatar_url: Option<String>,
}

impl From<NewUserProfile> for UserProfile {
    fn from(profile: NewUserProfile) -> Self {
        UserProfile {
            id: profile.id,
            email: Some(profile.email),
            full_name: Some(profile.full_name),
            avatar_url: profile.avatar_url,
            bio: None,
            location: None,
            follower_count: 0,
            following_count: 0,
            created_at: None,
            updated_at: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthChangeEvent {
    SignedIn,
    SignedOut,
    TokenRefreshed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OAuthProvider {
    Google,
}

impl OAuthProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            OAuthProvider::Google => "google",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordCredentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignUpMetadata {
    pub full_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub data: SignUpMetadata,
}

#[derive(Debug, Clone, Serialize)]
pub struct RefreshTokenRequest<'a> {
    pub refresh_token: &'a str,
}

/// The signup endpoint answers with a session when the account is
/// auto-confirmed and with a bare user when a confirmation e-mail was sent.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SignUpOutcome {
    Session(Session),
    User(AuthUser),
}

/// Error body of the auth endpoints. Field names differ between releases.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthErrorBody {
    #[serde(default)]
    pub error_code: Option<String>,
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub error_description: Option<String>,
}

impl AuthErrorBody {
    pub fn message(&self) -> String {
        self.msg
            .clone()
            .or_else(|| self.error_description.clone())
            .or_else(|| self.message.clone())
            .or_else(|| self.error.clone())
            .unwrap_or_else(|| "Authentication request failed".into())
    }

    /// `invalid_grant` was reported in `error` before `error_code` existed.
    pub fn code(&self) -> Option<&str> {
        self.error_code.as_deref().or(self.error.as_deref())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryErrorBody {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AvatarUpdate {
    pub avatar_url: Option<String>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn user_json() -> Value {
        json!({
            "id": "0b6c3f4e-1111-4c1e-9a53-000000000001",
            "email": "jane@example.ca",
            "user_metadata": { "full_name": "Jane Doe", "provider_id": "123" },
            "identities": [{ "provider": "email" }],
            "created_at": "2025-01-02T10:00:00Z"
        })
    }

    #[test]
    fn profile_counters_tolerate_null_and_missing() {
        let profile: UserProfile = serde_json::from_value(json!({
            "id": "u1",
            "full_name": "Jane Doe",
            "follower_count": null
        }))
        .unwrap();
        assert_eq!(profile.follower_count, 0);
        assert_eq!(profile.following_count, 0);

        let profile: UserProfile =
            serde_json::from_value(json!({ "id": "u1", "following_count": 7 })).unwrap();
        assert_eq!(profile.following_count, 7);
    }

    #[test]
    fn deserialize_session_and_fill_expiry() {
        let raw = json!({
            "access_token": "at",
            "refresh_token": "rt",
            "expires_in": 3600,
            "user": user_json()
        });
        let session: Session = serde_json::from_value(raw).unwrap();
        assert_eq!(session.token_type, "bearer");
        assert_eq!(session.user.user_metadata.full_name.as_deref(), Some("Jane Doe"));
        assert_eq!(session.user.user_metadata.extra["provider_id"], "123");

        let now = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let session = session.with_expiry_from(now);
        assert_eq!(session.expires_at, Some(1_700_003_600));
        assert!(!session.is_expired(now));
        assert!(session.is_expired(now + chrono::Duration::seconds(3595)));
    }

    #[test]
    fn session_without_expiry_is_never_expired() {
        let session: Session = serde_json::from_value(json!({
            "access_token": "at",
            "refresh_token": "rt",
            "user": user_json()
        }))
        .unwrap();
        assert!(!session.is_expired(Utc::now()));
        assert!(session.expires_at_utc().is_none());
    }

    #[test]
    fn signup_outcome_distinguishes_session_and_user() {
        let session = json!({
            "access_token": "at",
            "refresh_token": "rt",
            "expires_in": 3600,
            "user": user_json()
        });
        assert!(matches!(
            serde_json::from_value::<SignUpOutcome>(session).unwrap(),
            SignUpOutcome::Session(_)
        ));
        assert!(matches!(
            serde_json::from_value::<SignUpOutcome>(user_json()).unwrap(),
            SignUpOutcome::User(_)
        ));
    }

    #[test]
    fn auth_error_body_prefers_msg_then_description() {
        let body: AuthErrorBody = serde_json::from_value(json!({
            "error": "invalid_grant",
            "error_description": "Invalid login credentials"
        }))
        .unwrap();
        assert_eq!(body.message(), "Invalid login credentials");
        assert_eq!(body.code(), Some("invalid_grant"));

        let body: AuthErrorBody = serde_json::from_value(json!({
            "code": 422,
            "error_code": "user_already_exists",
            "msg": "User already registered"
        }))
        .unwrap();
        assert_eq!(body.message(), "User already registered");
        assert_eq!(body.code(), Some("user_already_exists"));
    }

    #[test]
    fn email_local_part_handles_missing_email() {
        let mut user: AuthUser = serde_json::from_value(user_json()).unwrap();
        assert_eq!(user.email_local_part(), Some("jane"));
        user.email = Some("@example.ca".into());
        assert_eq!(user.email_local_part(), None);
        user.email = None;
        assert_eq!(user.email_local_part(), None);
    }

    #[test]
    fn auth_change_event_uses_backend_names() {
        assert_eq!(
            serde_json::to_value(AuthChangeEvent::SignedIn).unwrap(),
            json!("SIGNED_IN")
        );
        assert_eq!(
            serde_json::from_value::<AuthChangeEvent>(json!("TOKEN_REFRESHED")).unwrap(),
            AuthChangeEvent::TokenRefreshed
        );
    }
}
