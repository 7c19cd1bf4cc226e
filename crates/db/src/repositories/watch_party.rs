//! Watch party repository.
//!
//! Durable storage for the party aggregate: the party record, its
//! participants, and its movie suggestions.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use cineconnect_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, Order, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect,
};

use crate::entities::watch_party::PartyStatus;
use crate::entities::watch_party_participant::ParticipantStatus;
use crate::entities::{
    WatchParty, WatchPartyParticipant, WatchPartySuggestion, watch_party, watch_party_participant,
    watch_party_suggestion,
};

/// Repository for watch party aggregate operations.
#[derive(Clone)]
pub struct WatchPartyRepository {
    db: Arc<DatabaseConnection>,
}

impl WatchPartyRepository {
    /// Create a new watch party repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    // ==================== Party Operations ====================

    /// Find a party by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<watch_party::Model>> {
        WatchParty::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a party by ID, returning error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<watch_party::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Party not found: {id}")))
    }

    /// Create a new party.
    pub async fn create(&self, model: watch_party::ActiveModel) -> AppResult<watch_party::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a party.
    pub async fn update(&self, model: watch_party::ActiveModel) -> AppResult<watch_party::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find upcoming public scheduled parties, soonest first.
    pub async fn find_upcoming_public(
        &self,
        now: DateTime<Utc>,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<watch_party::Model>> {
        WatchParty::find()
            .filter(watch_party::Column::IsPublic.eq(true))
            .filter(watch_party::Column::Status.eq(PartyStatus::Scheduled))
            .filter(watch_party::Column::ScheduledAt.gt(now))
            .order_by(watch_party::Column::ScheduledAt, Order::Asc)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find parties hosted by a user, newest schedule first.
    pub async fn find_by_host(
        &self,
        host_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<watch_party::Model>> {
        WatchParty::find()
            .filter(watch_party::Column::HostId.eq(host_id))
            .order_by(watch_party::Column::ScheduledAt, Order::Desc)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find parties a user has a participation row in, newest schedule first.
    pub async fn find_for_participant(
        &self,
        user_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<watch_party::Model>> {
        let memberships = WatchPartyParticipant::find()
            .filter(watch_party_participant::Column::UserId.eq(user_id))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let party_ids: Vec<String> = memberships.into_iter().map(|m| m.party_id).collect();

        if party_ids.is_empty() {
            return Ok(vec![]);
        }

        WatchParty::find()
            .filter(watch_party::Column::Id.is_in(party_ids))
            .order_by(watch_party::Column::ScheduledAt, Order::Desc)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find live parties a user hosts or participates in.
    pub async fn find_live_for_user(&self, user_id: &str) -> AppResult<Vec<watch_party::Model>> {
        let memberships = WatchPartyParticipant::find()
            .filter(watch_party_participant::Column::UserId.eq(user_id))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let party_ids: Vec<String> = memberships.into_iter().map(|m| m.party_id).collect();

        WatchParty::find()
            .filter(watch_party::Column::Status.eq(PartyStatus::Live))
            .filter(
                watch_party::Column::HostId
                    .eq(user_id)
                    .or(watch_party::Column::Id.is_in(party_ids)),
            )
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ==================== Participant Operations ====================

    /// Find a participant row by party and user.
    pub async fn find_participant(
        &self,
        party_id: &str,
        user_id: &str,
    ) -> AppResult<Option<watch_party_participant::Model>> {
        WatchPartyParticipant::find()
            .filter(watch_party_participant::Column::PartyId.eq(party_id))
            .filter(watch_party_participant::Column::UserId.eq(user_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Check if a participant row exists for a user in a party (any status).
    pub async fn participant_exists(&self, party_id: &str, user_id: &str) -> AppResult<bool> {
        let count = WatchPartyParticipant::find()
            .filter(watch_party_participant::Column::PartyId.eq(party_id))
            .filter(watch_party_participant::Column::UserId.eq(user_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(count > 0)
    }

    /// List participants of a party.
    pub async fn list_participants(
        &self,
        party_id: &str,
    ) -> AppResult<Vec<watch_party_participant::Model>> {
        WatchPartyParticipant::find()
            .filter(watch_party_participant::Column::PartyId.eq(party_id))
            .order_by(watch_party_participant::Column::CreatedAt, Order::Asc)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count participants with status Joined, for capacity checks.
    pub async fn count_joined(&self, party_id: &str) -> AppResult<u64> {
        WatchPartyParticipant::find()
            .filter(watch_party_participant::Column::PartyId.eq(party_id))
            .filter(watch_party_participant::Column::Status.eq(ParticipantStatus::Joined))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a participant row.
    pub async fn create_participant(
        &self,
        model: watch_party_participant::ActiveModel,
    ) -> AppResult<watch_party_participant::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a participant row.
    pub async fn update_participant(
        &self,
        model: watch_party_participant::ActiveModel,
    ) -> AppResult<watch_party_participant::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ==================== Suggestion Operations ====================

    /// Find a suggestion by party and movie.
    pub async fn find_suggestion(
        &self,
        party_id: &str,
        movie_id: &str,
    ) -> AppResult<Option<watch_party_suggestion::Model>> {
        WatchPartySuggestion::find()
            .filter(watch_party_suggestion::Column::PartyId.eq(party_id))
            .filter(watch_party_suggestion::Column::MovieId.eq(movie_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Check if a movie has already been suggested for a party.
    pub async fn suggestion_exists(&self, party_id: &str, movie_id: &str) -> AppResult<bool> {
        let count = WatchPartySuggestion::find()
            .filter(watch_party_suggestion::Column::PartyId.eq(party_id))
            .filter(watch_party_suggestion::Column::MovieId.eq(movie_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(count > 0)
    }

    /// List suggestions for a party. Ranking is applied by the caller.
    pub async fn list_suggestions(
        &self,
        party_id: &str,
    ) -> AppResult<Vec<watch_party_suggestion::Model>> {
        WatchPartySuggestion::find()
            .filter(watch_party_suggestion::Column::PartyId.eq(party_id))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a suggestion.
    pub async fn create_suggestion(
        &self,
        model: watch_party_suggestion::ActiveModel,
    ) -> AppResult<watch_party_suggestion::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a suggestion.
    pub async fn update_suggestion(
        &self,
        model: watch_party_suggestion::ActiveModel,
    ) -> AppResult<watch_party_suggestion::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn mock_party(id: &str, host_id: &str) -> watch_party::Model {
        watch_party::Model {
            id: id.to_string(),
            host_id: host_id.to_string(),
            movie_id: None,
            title: "Movie night".to_string(),
            description: None,
            scheduled_at: Utc::now().into(),
            started_at: None,
            ended_at: None,
            status: PartyStatus::Scheduled,
            max_participants: Some(10),
            is_public: true,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_get_by_id_returns_party() {
        let party = mock_party("p1", "u1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[party.clone()]])
                .into_connection(),
        );

        let repo = WatchPartyRepository::new(db);
        let found = repo.get_by_id("p1").await.unwrap();

        assert_eq!(found.id, "p1");
        assert_eq!(found.host_id, "u1");
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<watch_party::Model>::new()])
                .into_connection(),
        );

        let repo = WatchPartyRepository::new(db);
        let err = repo.get_by_id("missing").await.unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_find_participant_returns_none_for_non_member() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<watch_party_participant::Model>::new()])
                .into_connection(),
        );

        let repo = WatchPartyRepository::new(db);
        let found = repo.find_participant("p1", "stranger").await.unwrap();

        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_list_suggestions_returns_party_rows() {
        let s1 = watch_party_suggestion::Model {
            id: "s1".to_string(),
            party_id: "p1".to_string(),
            movie_id: "m1".to_string(),
            suggested_by_id: "u1".to_string(),
            vote_count: 3,
            created_at: Utc::now().into(),
        };
        let s2 = watch_party_suggestion::Model {
            id: "s2".to_string(),
            party_id: "p1".to_string(),
            movie_id: "m2".to_string(),
            suggested_by_id: "u2".to_string(),
            vote_count: 1,
            created_at: Utc::now().into(),
        };

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[s1, s2]])
                .into_connection(),
        );

        let repo = WatchPartyRepository::new(db);
        let suggestions = repo.list_suggestions("p1").await.unwrap();

        assert_eq!(suggestions.len(), 2);
        assert_eq!(suggestions[0].movie_id, "m1");
    }
}
