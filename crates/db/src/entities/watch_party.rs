//! Watch party entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Status of a watch party.
///
/// Legal transitions: `Scheduled` → `Live` → `Ended`, and
/// `Scheduled` → `Cancelled`. `Ended` and `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[derive(Default)]
pub enum PartyStatus {
    /// Party is planned but has not started yet.
    #[sea_orm(string_value = "scheduled")]
    #[default]
    Scheduled,
    /// Party is currently running.
    #[sea_orm(string_value = "live")]
    Live,
    /// Party finished normally.
    #[sea_orm(string_value = "ended")]
    Ended,
    /// Party was called off before it started.
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl PartyStatus {
    /// Check whether a transition to `next` is legal.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Scheduled, Self::Live | Self::Cancelled) | (Self::Live, Self::Ended)
        )
    }

    /// Check if the status is terminal (no further transitions).
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Ended | Self::Cancelled)
    }

    /// Check if the party accepts new joins in this status.
    #[must_use]
    pub const fn accepts_joins(self) -> bool {
        matches!(self, Self::Scheduled | Self::Live)
    }
}

/// Watch party - a scheduled or live group movie-viewing session.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "watch_party")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// The user hosting the party. Immutable after creation.
    #[sea_orm(indexed)]
    pub host_id: String,

    /// The selected movie, once one is fixed or voted in.
    #[sea_orm(indexed, nullable)]
    pub movie_id: Option<String>,

    /// Party title.
    pub title: String,

    /// Free-form description.
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,

    /// When the party is scheduled to start.
    pub scheduled_at: DateTimeWithTimeZone,

    /// Set when the party goes live. Present iff status is Live or Ended.
    #[sea_orm(nullable)]
    pub started_at: Option<DateTimeWithTimeZone>,

    /// Set when the party ends. Present iff status is Ended.
    #[sea_orm(nullable)]
    pub ended_at: Option<DateTimeWithTimeZone>,

    /// Current lifecycle status.
    pub status: PartyStatus,

    /// Maximum number of joined participants. NULL means unlimited.
    #[sea_orm(nullable)]
    pub max_participants: Option<i32>,

    /// Whether anyone may join without an invitation.
    #[sea_orm(default_value = false)]
    pub is_public: bool,

    /// When the party was created.
    pub created_at: DateTimeWithTimeZone,

    /// When the party was last updated.
    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::HostId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Host,
    #[sea_orm(
        belongs_to = "super::movie::Entity",
        from = "Column::MovieId",
        to = "super::movie::Column::Id",
        on_delete = "SetNull"
    )]
    Movie,
    #[sea_orm(has_many = "super::watch_party_participant::Entity")]
    Participants,
    #[sea_orm(has_many = "super::watch_party_suggestion::Entity")]
    Suggestions,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Host.def()
    }
}

impl Related<super::watch_party_participant::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Participants.def()
    }
}

impl Related<super::watch_party_suggestion::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Suggestions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
