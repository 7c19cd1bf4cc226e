//! Business services.
//!
//! `WatchPartyService` is the orchestrator and the only component that talks
//! to the repositories; `party_lifecycle`, `membership`, and `voting` hold
//! the pure decision logic it delegates to.

pub mod membership;
pub mod party_lifecycle;
pub mod party_locks;
pub mod voting;
pub mod watch_party;

pub use party_lifecycle::UpdatePartyInput;
pub use party_locks::PartyLocks;
pub use watch_party::{CreatePartyInput, WatchPartyService};
