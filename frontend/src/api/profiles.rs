use async_trait::async_trait;
use chrono::Utc;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use reqwest::header::{HeaderName, HeaderValue};

use super::{
    backend::ProfileStore,
    client::{read_query_error, SupabaseClient},
    error::QueryError,
    types::{AvatarUpdate, NewUserProfile, UserProfile},
};

pub const PROFILES_TABLE: &str = "users";

fn prefer_minimal() -> (HeaderName, HeaderValue) {
    (
        HeaderName::from_static("prefer"),
        HeaderValue::from_static("return=minimal"),
    )
}

pub(crate) fn profile_filter(id: &str) -> String {
    format!("id=eq.{}", utf8_percent_encode(id, NON_ALPHANUMERIC))
}

#[async_trait(?Send)]
impl ProfileStore for SupabaseClient {
    async fn find_profile(&self, id: &str) -> Result<Option<UserProfile>, QueryError> {
        let url = self.rest_url(&format!(
            "/{}?{}&select=*",
            PROFILES_TABLE,
            profile_filter(id)
        ));
        let response = self
            .http_client()
            .get(url)
            .headers(self.headers())
            .send()
            .await
            .map_err(QueryError::request)?;
        if !response.status().is_success() {
            return Err(read_query_error(response).await);
        }
        let rows: Vec<UserProfile> = response
            .json()
            .await
            .map_err(|e| QueryError::Decode(e.to_string()))?;
        Ok(rows.into_iter().next())
    }

    async fn insert_profile(&self, profile: &NewUserProfile) -> Result<(), QueryError> {
        let (prefer, minimal) = prefer_minimal();
        let mut headers = self.headers();
        headers.insert(prefer, minimal);
        let response = self
            .http_client()
            .post(self.rest_url(&format!("/{}", PROFILES_TABLE)))
            .headers(headers)
            .json(profile)
            .send()
            .await
            .map_err(QueryError::request)?;
        if !response.status().is_success() {
            return Err(read_query_error(response).await);
        }
        Ok(())
    }
}

impl SupabaseClient {
    /// Points the profile at a new picture, or clears it with `None`.
    pub async fn update_avatar_url(
        &self,
        user_id: &str,
        avatar_url: Option<String>,
    ) -> Result<(), QueryError> {
        let (prefer, minimal) = prefer_minimal();
        let mut headers = self.headers();
        headers.insert(prefer, minimal);
        let update = AvatarUpdate {
            avatar_url,
            updated_at: Utc::now(),
        };
        let response = self
            .http_client()
            .patch(self.rest_url(&format!(
                "/{}?{}",
                PROFILES_TABLE,
                profile_filter(user_id)
            )))
            .headers(headers)
            .json(&update)
            .send()
            .await
            .map_err(QueryError::request)?;
        if !response.status().is_success() {
            return Err(read_query_error(response).await);
        }
        Ok(())
    }
}
