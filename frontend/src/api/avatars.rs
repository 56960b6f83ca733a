use reqwest::header::{HeaderName, HeaderValue, CACHE_CONTROL, CONTENT_TYPE};
use thiserror::Error;
use wasm_bindgen_futures::JsFuture;

use super::{
    client::{read_query_error, SupabaseClient},
    error::QueryError,
};

pub const AVATAR_BUCKET: &str = "avatars";
pub const MAX_AVATAR_BYTES: u64 = 5 * 1024 * 1024;
const ACCEPTED_TYPES: [&str; 3] = ["image/png", "image/jpeg", "image/jpg"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AvatarError {
    #[error("Please select a PNG or JPEG image file")]
    UnsupportedType,
    #[error("File size must be less than 5MB")]
    TooLarge,
    #[error("Failed to read the selected file")]
    Read,
    #[error("{0}")]
    Upload(QueryError),
}

/// A picked image, already read into memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvatarFile {
    pub name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl AvatarFile {
    /// Validates before reading so oversized files are never loaded.
    pub async fn read(file: &web_sys::File) -> Result<Self, AvatarError> {
        validate_avatar(&file.type_(), file.size() as u64)?;
        let buffer = JsFuture::from(file.array_buffer())
            .await
            .map_err(|_| AvatarError::Read)?;
        Ok(Self {
            name: file.name(),
            content_type: file.type_(),
            bytes: js_sys::Uint8Array::new(&buffer).to_vec(),
        })
    }

    pub fn extension(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or_default()
    }
}

pub fn validate_avatar(content_type: &str, size: u64) -> Result<(), AvatarError> {
    if !ACCEPTED_TYPES.contains(&content_type) {
        return Err(AvatarError::UnsupportedType);
    }
    if size > MAX_AVATAR_BYTES {
        return Err(AvatarError::TooLarge);
    }
    Ok(())
}

pub fn avatar_object_path(user_id: &str, extension: &str, millis: i64) -> String {
    format!("{}/{}-{}.{}", AVATAR_BUCKET, user_id, millis, extension)
}

impl SupabaseClient {
    pub fn public_avatar_url(&self, path: &str) -> String {
        self.storage_url(&format!("/object/public/{}/{}", AVATAR_BUCKET, path))
    }

    /// Uploads the picture, points the profile at it and returns its public URL.
    pub async fn upload_avatar(
        &self,
        user_id: &str,
        file: AvatarFile,
    ) -> Result<String, AvatarError> {
        validate_avatar(&file.content_type, file.bytes.len() as u64)?;
        let path = avatar_object_path(
            user_id,
            file.extension(),
            chrono::Utc::now().timestamp_millis(),
        );

        let mut headers = self.headers();
        if let Ok(content_type) = HeaderValue::from_str(&file.content_type) {
            headers.insert(CONTENT_TYPE, content_type);
        }
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("max-age=3600"));
        headers.insert(
            HeaderName::from_static("x-upsert"),
            HeaderValue::from_static("false"),
        );

        let response = self
            .http_client()
            .post(self.storage_url(&format!("/object/{}/{}", AVATAR_BUCKET, path)))
            .headers(headers)
            .body(file.bytes)
            .send()
            .await
            .map_err(|e| AvatarError::Upload(QueryError::request(e)))?;
        if !response.status().is_success() {
            return Err(AvatarError::Upload(read_query_error(response).await));
        }

        let public_url = self.public_avatar_url(&path);
        self.update_avatar_url(user_id, Some(public_url.clone()))
            .await
            .map_err(AvatarError::Upload)?;
        log::info!("Profile picture updated for {}", user_id);
        Ok(public_url)
    }

    pub async fn remove_avatar(&self, user_id: &str) -> Result<(), AvatarError> {
        self.update_avatar_url(user_id, None)
            .await
            .map_err(AvatarError::Upload)
    }
}
