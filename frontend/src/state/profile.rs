use crate::api::{AuthUser, NewUserProfile, ProfileBootstrapError, ProfileStore};

pub const ANONYMOUS_NAME: &str = "Anonymous";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileOutcome {
    Existing,
    Created,
    /// Another tab or request inserted the row first.
    CreatedConcurrently,
}

pub fn profile_full_name(user: &AuthUser) -> String {
    user.user_metadata
        .full_name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .or_else(|| user.email_local_part())
        .unwrap_or(ANONYMOUS_NAME)
        .to_string()
}

pub fn new_profile_for(user: &AuthUser) -> NewUserProfile {
    NewUserProfile {
        id: user.id.clone(),
        email: user.email.clone().unwrap_or_default(),
        full_name: profile_full_name(user),
        avatar_url: user.user_metadata.avatar_url.clone(),
    }
}

/// Makes sure exactly one profile row exists for `user`.
pub async fn ensure_profile(
    store: &dyn ProfileStore,
    user: &AuthUser,
) -> Result<ProfileOutcome, ProfileBootstrapError> {
    match store.find_profile(&user.id).await {
        Ok(Some(_)) => return Ok(ProfileOutcome::Existing),
        Ok(None) => {}
        Err(err) => log::warn!("Error checking user profile for {}: {}", user.id, err),
    }

    match store.insert_profile(&new_profile_for(user)).await {
        Ok(()) => {
            log::info!("Created user profile for {}", user.id);
            Ok(ProfileOutcome::Created)
        }
        Err(err) if err.is_unique_violation() => {
            log::debug!("User profile for {} already created elsewhere", user.id);
            Ok(ProfileOutcome::CreatedConcurrently)
        }
        Err(err) => Err(ProfileBootstrapError::Insert(err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::user_with;

    #[test]
    fn full_name_prefers_metadata_then_email_then_placeholder() {
        assert_eq!(
            profile_full_name(&user_with("u1", "jane@example.ca", Some("  Jane Doe "))),
            "Jane Doe"
        );
        assert_eq!(
            profile_full_name(&user_with("u1", "jane@example.ca", Some("   "))),
            "jane"
        );
        assert_eq!(profile_full_name(&user_with("u1", "@example.ca", None)), "Anonymous");

        let mut no_email = user_with("u1", "", None);
        no_email.email = None;
        assert_eq!(profile_full_name(&no_email), "Anonymous");
    }

    #[test]
    fn new_profile_carries_metadata_avatar() {
        let mut user = user_with("u1", "jane@example.ca", Some("Jane Doe"));
        user.user_metadata.avatar_url = Some("https://cdn.example/jane.png".into());
        let profile = new_profile_for(&user);
        assert_eq!(profile.id, "u1");
        assert_eq!(profile.email, "jane@example.ca");
        assert_eq!(profile.full_name, "Jane Doe");
        assert_eq!(
            profile.avatar_url.as_deref(),
            Some("https://cdn.example/jane.png")
        );
    }
}
