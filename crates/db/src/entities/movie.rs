//! Movie entity.
//!
//! Minimal catalog record. Full movie CRUD lives outside this core; parties
//! and suggestions only need a resolvable movie id.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Movie catalog entry.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "movie")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Movie title.
    pub title: String,

    /// Release year, if known.
    #[sea_orm(nullable)]
    pub release_year: Option<i32>,

    /// When the record was created.
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::watch_party_suggestion::Entity")]
    WatchPartySuggestion,
}

impl Related<super::watch_party_suggestion::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WatchPartySuggestion.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
