mod auth;
pub mod avatars;
pub mod backend;
pub mod client;
pub mod error;
mod profiles;
pub mod types;

pub use avatars::{AvatarError, AvatarFile};
pub use backend::{AuthBackend, ProfileStore, SessionListener, Subscription};
pub use client::SupabaseClient;
pub use error::*;
pub use types::*;

#[cfg(test)]
pub mod test_support;
