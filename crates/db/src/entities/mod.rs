//! Database entities.

pub mod movie;
pub mod user;
pub mod watch_party;
pub mod watch_party_participant;
pub mod watch_party_suggestion;

pub use movie::Entity as Movie;
pub use user::Entity as User;
pub use watch_party::Entity as WatchParty;
pub use watch_party_participant::Entity as WatchPartyParticipant;
pub use watch_party_suggestion::Entity as WatchPartySuggestion;
