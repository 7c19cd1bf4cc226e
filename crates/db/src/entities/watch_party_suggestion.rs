//! Watch party movie suggestion entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Movie suggestion - a candidate movie proposed for a party.
///
/// One row per `(party_id, movie_id)` pair. `vote_count` mirrors the number
/// of participants whose `voted_movie_id` points at this suggestion and is
/// seeded with 1 for the suggester's own vote.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "watch_party_suggestion")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// The party this suggestion belongs to.
    #[sea_orm(indexed)]
    pub party_id: String,

    /// The suggested movie.
    #[sea_orm(indexed)]
    pub movie_id: String,

    /// The participant who proposed the movie.
    pub suggested_by_id: String,

    /// Number of participants currently voting for this suggestion.
    #[sea_orm(default_value = 1)]
    pub vote_count: i32,

    /// When the suggestion was created. Earliest suggestion wins vote ties.
    pub created_at: DateTimeWithTimeZone,
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
        belongs_to = "super::movie::Entity",
        from = "Column::MovieId",
        to = "super::movie::Column::Id",
        on_delete = "Cascade"
    )]
    Movie,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::SuggestedById",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    SuggestedBy,
}

impl Related<super::watch_party::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Party.def()
    }
}

impl Related<super::movie::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Movie.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
