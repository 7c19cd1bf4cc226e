//! Watch party participant entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Status of a participant in a watch party.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[derive(Default)]
pub enum ParticipantStatus {
    /// User has been invited but hasn't responded yet.
    #[sea_orm(string_value = "invited")]
    #[default]
    Invited,
    /// User has accepted the invitation and joined the party.
    #[sea_orm(string_value = "joined")]
    Joined,
    /// User has declined the invitation.
    #[sea_orm(string_value = "declined")]
    Declined,
    /// User joined but later left the party.
    #[sea_orm(string_value = "left")]
    Left,
}

impl ParticipantStatus {
    /// Check if the participant has joined. Only joined participants count
    /// toward capacity and may vote.
    #[must_use]
    pub const fn has_joined(self) -> bool {
        matches!(self, Self::Joined)
    }
}

/// Watch party participant - a user's membership record within a party.
///
/// One row per `(party_id, user_id)` pair. The host is represented by a row
/// created at party creation time with status Joined. Rows are never deleted;
/// leaving a party sets status Left.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "watch_party_participant")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// The party this membership belongs to.
    #[sea_orm(indexed)]
    pub party_id: String,

    /// The member.
    #[sea_orm(indexed)]
    pub user_id: String,

    /// Current membership status.
    pub status: ParticipantStatus,

    /// Movie id of the suggestion this participant currently votes for.
    /// Non-owning reference: the suggestion belongs to the party.
    #[sea_orm(nullable)]
    pub voted_movie_id: Option<String>,

    /// Set on transition into Joined.
    #[sea_orm(nullable)]
    pub joined_at: Option<DateTimeWithTimeZone>,

    /// When the membership record was created.
    pub created_at: DateTimeWithTimeZone,

    /// When the membership record was last updated.
    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::watch_party::Entity",
        from = "Column::PartyId",
        to = "super::watch_party::Column::Id",
        on_delete = "Cascade"
    )]
    Party,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::watch_party::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Party.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
