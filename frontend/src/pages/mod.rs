pub mod auth;
pub mod feed;
pub mod home;
pub mod map;
pub mod profile;
pub mod search;

pub use auth::AuthPage;
pub use feed::FeedPage;
pub use home::HomePage;
pub use map::MapPage;
pub use profile::ProfilePage;
pub use search::SearchPage;
