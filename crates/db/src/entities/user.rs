//! User entity.
//!
//! Minimal account record. Identity and profile management live outside this
//! core; parties only need a resolvable user id.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// User account.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Unique handle.
    #[sea_orm(unique)]
    pub username: String,

    /// Display name shown alongside the handle.
    #[sea_orm(nullable)]
    pub display_name: Option<String>,

    /// When the account was created.
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::watch_party::Entity")]
    WatchParty,
    #[sea_orm(has_many = "super::watch_party_participant::Entity")]
    WatchPartyParticipant,
}

impl Related<super::watch_party::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WatchParty.def()
    }
}

impl Related<super::watch_party_participant::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WatchPartyParticipant.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
