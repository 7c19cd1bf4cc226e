//! Database repositories.

pub mod movie;
pub mod user;
pub mod watch_party;

pub use movie::MovieRepository;
pub use user::UserRepository;
pub use watch_party::WatchPartyRepository;
