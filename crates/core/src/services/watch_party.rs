//! Watch party service.
//!
//! Orchestrates the party lifecycle, membership, and voting rules over the
//! repositories. Every mutating operation on a party runs under that party's
//! lock so concurrent joins and votes observe consistent counts.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use cineconnect_common::{AppError, AppResult, IdGenerator};
use cineconnect_db::entities::watch_party::{self, PartyStatus};
use cineconnect_db::entities::{watch_party_participant, watch_party_suggestion};
use cineconnect_db::repositories::{MovieRepository, UserRepository, WatchPartyRepository};
use sea_orm::{DatabaseConnection, Set};
use serde::Deserialize;
use tracing::info;
use validator::Validate;

use super::membership::{self, JoinDecision};
use super::party_lifecycle::{self, UpdatePartyInput};
use super::party_locks::PartyLocks;
use super::voting::{self, VoteDecision};

/// Input for scheduling a new party.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePartyInput {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(max = 2048))]
    pub description: Option<String>,
    pub scheduled_at: DateTime<Utc>,
    /// Fix the movie up front; when unset, participants suggest and vote.
    pub movie_id: Option<String>,
    #[validate(range(min = 1))]
    pub max_participants: Option<i32>,
    #[serde(default)]
    pub is_public: bool,
}

/// Default participant cap when the host does not specify one.
const DEFAULT_MAX_PARTICIPANTS: i32 = 10;

/// Service for watch party operations.
#[derive(Clone)]
pub struct WatchPartyService {
    party_repo: WatchPartyRepository,
    user_repo: UserRepository,
    movie_repo: MovieRepository,
    locks: PartyLocks,
    id_gen: IdGenerator,
}

impl WatchPartyService {
    /// Create a new watch party service.
    #[must_use]
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            party_repo: WatchPartyRepository::new(db.clone()),
            user_repo: UserRepository::new(db.clone()),
            movie_repo: MovieRepository::new(db),
            locks: PartyLocks::new(),
            id_gen: IdGenerator::new(),
        }
    }

    // ==================== Lifecycle ====================

    /// Schedule a new party. The host becomes a Joined participant.
    pub async fn create(
        &self,
        host_id: &str,
        input: CreatePartyInput,
    ) -> AppResult<watch_party::Model> {
        input.validate()?;

        let host = self.user_repo.get_by_id(host_id).await?;
        if let Some(ref movie_id) = input.movie_id {
            self.movie_repo.get_by_id(movie_id).await?;
        }

        let now = Utc::now();
        let party_id = self.id_gen.generate();
        let party = watch_party::ActiveModel {
            id: Set(party_id.clone()),
            host_id: Set(host.id.clone()),
            movie_id: Set(input.movie_id),
            title: Set(input.title),
            description: Set(input.description),
            scheduled_at: Set(input.scheduled_at.into()),
            started_at: Set(None),
            ended_at: Set(None),
            status: Set(PartyStatus::Scheduled),
            max_participants: Set(Some(
                input.max_participants.unwrap_or(DEFAULT_MAX_PARTICIPANTS),
            )),
            is_public: Set(input.is_public),
            created_at: Set(now.into()),
            updated_at: Set(None),
        };
        let party = self.party_repo.create(party).await?;

        let host_row =
            membership::host_participant(self.id_gen.generate(), &party.id, &host.id, now);
        self.party_repo.create_participant(host_row).await?;

        info!(party_id = %party.id, host_id = %host.id, "Created watch party");
        Ok(party)
    }

    /// Update a scheduled party's details. Host only.
    pub async fn update(
        &self,
        party_id: &str,
        caller_id: &str,
        input: UpdatePartyInput,
    ) -> AppResult<watch_party::Model> {
        input.validate()?;
        let _guard = self.locks.acquire(party_id).await;

        let party = self.party_repo.get_by_id(party_id).await?;
        let active = party_lifecycle::apply_update(party, caller_id, &input, Utc::now())?;
        self.party_repo.update(active).await
    }

    /// Cancel a scheduled party. Host only.
    pub async fn cancel(&self, party_id: &str, caller_id: &str) -> AppResult<watch_party::Model> {
        let _guard = self.locks.acquire(party_id).await;

        let party = self.party_repo.get_by_id(party_id).await?;
        let active = party_lifecycle::cancel(party, caller_id, Utc::now())?;
        let party = self.party_repo.update(active).await?;

        info!(party_id = %party.id, "Cancelled watch party");
        Ok(party)
    }

    /// Start a scheduled party. When no movie is fixed, the top-voted
    /// suggestion wins.
    pub async fn start(&self, party_id: &str, caller_id: &str) -> AppResult<watch_party::Model> {
        let _guard = self.locks.acquire(party_id).await;

        let party = self.party_repo.get_by_id(party_id).await?;
        party_lifecycle::ensure_can_start(&party, caller_id)?;

        let winning_movie_id = if party.movie_id.is_none() {
            let suggestions = self.party_repo.list_suggestions(party_id).await?;
            voting::rank(suggestions)
                .into_iter()
                .next()
                .map(|s| s.movie_id)
        } else {
            None
        };

        let active = party_lifecycle::start(party, winning_movie_id, Utc::now());
        let party = self.party_repo.update(active).await?;

        info!(party_id = %party.id, movie_id = ?party.movie_id, "Started watch party");
        Ok(party)
    }

    /// End a live party. Host only.
    pub async fn end(&self, party_id: &str, caller_id: &str) -> AppResult<watch_party::Model> {
        let _guard = self.locks.acquire(party_id).await;

        let party = self.party_repo.get_by_id(party_id).await?;
        let active = party_lifecycle::end(party, caller_id, Utc::now())?;
        let party = self.party_repo.update(active).await?;

        info!(party_id = %party.id, "Ended watch party");
        Ok(party)
    }

    /// Set or replace the fixed movie of a scheduled party. Host only.
    pub async fn set_movie(
        &self,
        party_id: &str,
        caller_id: &str,
        movie_id: &str,
    ) -> AppResult<watch_party::Model> {
        let _guard = self.locks.acquire(party_id).await;

        let party = self.party_repo.get_by_id(party_id).await?;
        party_lifecycle::ensure_host(&party, caller_id)?;
        if party.status != PartyStatus::Scheduled {
            return Err(AppError::InvalidState(
                "Can only set the movie for scheduled parties".to_string(),
            ));
        }
        let movie = self.movie_repo.get_by_id(movie_id).await?;

        let mut active: watch_party::ActiveModel = party.into();
        active.movie_id = Set(Some(movie.id));
        active.updated_at = Set(Some(Utc::now().into()));
        self.party_repo.update(active).await
    }

    // ==================== Membership ====================

    /// Invite a user to a scheduled party. Host only.
    pub async fn invite(
        &self,
        party_id: &str,
        inviter_id: &str,
        invitee_id: &str,
    ) -> AppResult<watch_party_participant::Model> {
        let _guard = self.locks.acquire(party_id).await;

        let party = self.party_repo.get_by_id(party_id).await?;
        let has_row = self.party_repo.participant_exists(party_id, invitee_id).await?;
        membership::ensure_can_invite(&party, inviter_id, has_row)?;

        let invitee = self.user_repo.get_by_id(invitee_id).await?;
        let row =
            membership::invited_participant(self.id_gen.generate(), party_id, &invitee.id, Utc::now());
        let participant = self.party_repo.create_participant(row).await?;

        info!(party_id, invitee_id, "Invited user to watch party");
        Ok(participant)
    }

    /// Join a party, either accepting an invitation or entering a public
    /// party directly.
    pub async fn join(
        &self,
        party_id: &str,
        user_id: &str,
    ) -> AppResult<watch_party_participant::Model> {
        let _guard = self.locks.acquire(party_id).await;

        let party = self.party_repo.get_by_id(party_id).await?;
        let existing = self.party_repo.find_participant(party_id, user_id).await?;
        let joined_count = self.party_repo.count_joined(party_id).await?;

        let now = Utc::now();
        let participant = match membership::decide_join(&party, existing, joined_count, now)? {
            JoinDecision::Rejoin(active) => self.party_repo.update_participant(active).await?,
            JoinDecision::CreateNew => {
                let user = self.user_repo.get_by_id(user_id).await?;
                let row =
                    membership::joined_participant(self.id_gen.generate(), party_id, &user.id, now);
                self.party_repo.create_participant(row).await?
            }
        };

        info!(party_id, user_id, "User joined watch party");
        Ok(participant)
    }

    /// Decline a pending invitation.
    pub async fn decline(
        &self,
        party_id: &str,
        user_id: &str,
    ) -> AppResult<watch_party_participant::Model> {
        let _guard = self.locks.acquire(party_id).await;

        let existing = self.party_repo.find_participant(party_id, user_id).await?;
        let active = membership::decline(existing, Utc::now())?;
        self.party_repo.update_participant(active).await
    }

    /// Leave a party. The host cannot leave.
    pub async fn leave(
        &self,
        party_id: &str,
        user_id: &str,
    ) -> AppResult<watch_party_participant::Model> {
        let _guard = self.locks.acquire(party_id).await;

        let party = self.party_repo.get_by_id(party_id).await?;
        let existing = self.party_repo.find_participant(party_id, user_id).await?;
        let active = membership::leave(&party, user_id, existing, Utc::now())?;
        self.party_repo.update_participant(active).await
    }

    /// Whether `user_id` is the host or has any participant row.
    pub async fn is_participant(&self, party_id: &str, user_id: &str) -> AppResult<bool> {
        let Some(party) = self.party_repo.find_by_id(party_id).await? else {
            return Ok(false);
        };
        if party.host_id == user_id {
            return Ok(true);
        }
        self.party_repo.participant_exists(party_id, user_id).await
    }

    /// List the participants of a party.
    pub async fn list_participants(
        &self,
        party_id: &str,
    ) -> AppResult<Vec<watch_party_participant::Model>> {
        self.party_repo.get_by_id(party_id).await?;
        self.party_repo.list_participants(party_id).await
    }

    // ==================== Voting ====================

    /// Suggest a movie for a scheduled party without a fixed movie.
    ///
    /// The suggestion is seeded with the suggester's own vote; any vote they
    /// previously held on another suggestion is released.
    pub async fn suggest_movie(
        &self,
        party_id: &str,
        user_id: &str,
        movie_id: &str,
    ) -> AppResult<watch_party_suggestion::Model> {
        let _guard = self.locks.acquire(party_id).await;

        let party = self.party_repo.get_by_id(party_id).await?;
        let has_row = self.party_repo.participant_exists(party_id, user_id).await?;
        let is_member = membership::is_member(&party, user_id, has_row);
        let already_suggested = self.party_repo.suggestion_exists(party_id, movie_id).await?;
        voting::ensure_can_suggest(&party, is_member, already_suggested)?;

        let movie = self.movie_repo.get_by_id(movie_id).await?;

        let now = Utc::now();
        let suggestion = voting::new_suggestion(
            self.id_gen.generate(),
            party_id,
            &movie.id,
            user_id,
            now,
        );
        let suggestion = self.party_repo.create_suggestion(suggestion).await?;

        // Move the suggester's vote onto their own suggestion.
        if let Some(participant) = self.party_repo.find_participant(party_id, user_id).await? {
            if let Some(ref previous) = participant.voted_movie_id
                && previous != movie_id
            {
                self.release_vote(party_id, previous).await?;
            }
            let mut active: watch_party_participant::ActiveModel = participant.into();
            active.voted_movie_id = Set(Some(movie_id.to_string()));
            active.updated_at = Set(Some(now.into()));
            self.party_repo.update_participant(active).await?;
        }

        info!(party_id, movie_id, user_id, "Suggested movie for watch party");
        Ok(suggestion)
    }

    /// Vote for a suggested movie. Re-voting for the same movie is a no-op;
    /// voting for a different one moves the vote.
    pub async fn vote(
        &self,
        party_id: &str,
        user_id: &str,
        movie_id: &str,
    ) -> AppResult<watch_party_suggestion::Model> {
        let _guard = self.locks.acquire(party_id).await;

        let party = self.party_repo.get_by_id(party_id).await?;
        let participant = self.party_repo.find_participant(party_id, user_id).await?;
        let participant = voting::ensure_can_vote(&party, participant)?;

        let suggestion = self
            .party_repo
            .find_suggestion(party_id, movie_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Movie suggestion not found".to_string()))?;

        let previous = match voting::decide_vote(&participant, movie_id) {
            VoteDecision::Unchanged => return Ok(suggestion),
            VoteDecision::Cast { previous_movie_id } => previous_movie_id,
        };

        if let Some(ref previous) = previous {
            self.release_vote(party_id, previous).await?;
        }

        let new_count = suggestion.vote_count + 1;
        let mut active: watch_party_suggestion::ActiveModel = suggestion.into();
        active.vote_count = Set(new_count);
        let suggestion = self.party_repo.update_suggestion(active).await?;

        let now = Utc::now();
        let mut active: watch_party_participant::ActiveModel = participant.into();
        active.voted_movie_id = Set(Some(movie_id.to_string()));
        active.updated_at = Set(Some(now.into()));
        self.party_repo.update_participant(active).await?;

        info!(party_id, movie_id, user_id, "Vote cast for watch party movie");
        Ok(suggestion)
    }

    /// List suggestions, highest vote count first, ties broken by earliest
    /// creation.
    pub async fn list_suggestions(
        &self,
        party_id: &str,
    ) -> AppResult<Vec<watch_party_suggestion::Model>> {
        self.party_repo.get_by_id(party_id).await?;
        let suggestions = self.party_repo.list_suggestions(party_id).await?;
        Ok(voting::rank(suggestions))
    }

    /// Decrement the vote count of the suggestion for `movie_id`, if any.
    async fn release_vote(&self, party_id: &str, movie_id: &str) -> AppResult<()> {
        if let Some(previous) = self.party_repo.find_suggestion(party_id, movie_id).await? {
            let decremented = voting::decrement(previous.vote_count);
            let mut active: watch_party_suggestion::ActiveModel = previous.into();
            active.vote_count = Set(decremented);
            self.party_repo.update_suggestion(active).await?;
        }
        Ok(())
    }

    // ==================== Queries ====================

    /// Find a party by ID.
    pub async fn find_by_id(&self, party_id: &str) -> AppResult<Option<watch_party::Model>> {
        self.party_repo.find_by_id(party_id).await
    }

    /// Get a party by ID, returning error if not found.
    pub async fn get_by_id(&self, party_id: &str) -> AppResult<watch_party::Model> {
        self.party_repo.get_by_id(party_id).await
    }

    /// Upcoming public scheduled parties, soonest first.
    pub async fn upcoming_public_parties(
        &self,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<watch_party::Model>> {
        self.party_repo
            .find_upcoming_public(Utc::now(), limit, offset)
            .await
    }

    /// Parties hosted by a user, newest schedule first.
    pub async fn parties_hosted_by(
        &self,
        host_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<watch_party::Model>> {
        self.party_repo.find_by_host(host_id, limit, offset).await
    }

    /// Parties a user participates in, newest schedule first.
    pub async fn parties_for_user(
        &self,
        user_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<watch_party::Model>> {
        self.party_repo
            .find_for_participant(user_id, limit, offset)
            .await
    }

    /// Live parties a user hosts or participates in.
    pub async fn live_parties_for_user(
        &self,
        user_id: &str,
    ) -> AppResult<Vec<watch_party::Model>> {
        self.party_repo.find_live_for_user(user_id).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use cineconnect_db::entities::movie;
    use cineconnect_db::entities::watch_party_participant::ParticipantStatus;
    use maplit::btreemap;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn party(id: &str, host_id: &str, status: PartyStatus) -> watch_party::Model {
        watch_party::Model {
            id: id.to_string(),
            host_id: host_id.to_string(),
            movie_id: None,
            title: "Movie night".to_string(),
            description: None,
            scheduled_at: Utc::now().into(),
            started_at: None,
            ended_at: None,
            status,
            max_participants: Some(10),
            is_public: true,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn participant(
        party_id: &str,
        user_id: &str,
        status: ParticipantStatus,
    ) -> watch_party_participant::Model {
        watch_party_participant::Model {
            id: format!("wpp-{user_id}"),
            party_id: party_id.to_string(),
            user_id: user_id.to_string(),
            status,
            voted_movie_id: None,
            joined_at: None,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn suggestion(id: &str, party_id: &str, movie_id: &str, votes: i32) -> watch_party_suggestion::Model {
        watch_party_suggestion::Model {
            id: id.to_string(),
            party_id: party_id.to_string(),
            movie_id: movie_id.to_string(),
            suggested_by_id: "u2".to_string(),
            vote_count: votes,
            created_at: Utc::now().into(),
        }
    }

    fn service(db: MockDatabase) -> WatchPartyService {
        WatchPartyService::new(Arc::new(db.into_connection()))
    }

    #[tokio::test]
    async fn test_cancel_scheduled_party() {
        let scheduled = party("p1", "host", PartyStatus::Scheduled);
        let mut cancelled = scheduled.clone();
        cancelled.status = PartyStatus::Cancelled;

        let svc = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![scheduled], vec![cancelled]]),
        );

        let result = svc.cancel("p1", "host").await.unwrap();
        assert_eq!(result.status, PartyStatus::Cancelled);
    }

    #[tokio::test]
    async fn test_cancel_live_party_rejected() {
        let live = party("p1", "host", PartyStatus::Live);

        let svc = service(
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([vec![live]]),
        );

        let err = svc.cancel("p1", "host").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidState(_)));
    }

    #[tokio::test]
    async fn test_cancel_requires_host() {
        let scheduled = party("p1", "host", PartyStatus::Scheduled);

        let svc = service(
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([vec![scheduled]]),
        );

        let err = svc.cancel("p1", "guest").await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_start_assigns_top_voted_movie() {
        let scheduled = party("p1", "host", PartyStatus::Scheduled);
        let trailing = suggestion("s1", "p1", "m1", 1);
        let top = suggestion("s2", "p1", "m2", 3);
        let mut live = scheduled.clone();
        live.status = PartyStatus::Live;
        live.movie_id = Some("m2".to_string());

        let svc = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![scheduled]])
                .append_query_results([vec![trailing, top]])
                .append_query_results([vec![live]]),
        );

        let result = svc.start("p1", "host").await.unwrap();
        assert_eq!(result.status, PartyStatus::Live);
        assert_eq!(result.movie_id, Some("m2".to_string()));
    }

    #[tokio::test]
    async fn test_start_not_found() {
        let svc = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<watch_party::Model>::new()]),
        );

        let err = svc.start("missing", "host").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_join_accepts_invitation() {
        let scheduled = party("p1", "host", PartyStatus::Scheduled);
        let invited = participant("p1", "u2", ParticipantStatus::Invited);
        let mut joined = invited.clone();
        joined.status = ParticipantStatus::Joined;

        let svc = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![scheduled]])
                .append_query_results([vec![invited]])
                .append_query_results([vec![btreemap! {
                    "num_items" => sea_orm::Value::BigInt(Some(1)),
                }]])
                .append_query_results([vec![joined]]),
        );

        let result = svc.join("p1", "u2").await.unwrap();
        assert_eq!(result.status, ParticipantStatus::Joined);
    }

    #[tokio::test]
    async fn test_join_full_party_rejected() {
        let mut scheduled = party("p1", "host", PartyStatus::Scheduled);
        scheduled.max_participants = Some(2);

        let svc = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![scheduled]])
                .append_query_results([Vec::<watch_party_participant::Model>::new()])
                .append_query_results([vec![btreemap! {
                    "num_items" => sea_orm::Value::BigInt(Some(2)),
                }]]),
        );

        let err = svc.join("p1", "u3").await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_vote_for_unknown_suggestion() {
        let scheduled = party("p1", "host", PartyStatus::Scheduled);
        let joined = participant("p1", "u2", ParticipantStatus::Joined);

        let svc = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![scheduled]])
                .append_query_results([vec![joined]])
                .append_query_results([Vec::<watch_party_suggestion::Model>::new()]),
        );

        let err = svc.vote("p1", "u2", "m9").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_revote_same_movie_returns_unchanged() {
        let scheduled = party("p1", "host", PartyStatus::Scheduled);
        let mut joined = participant("p1", "u2", ParticipantStatus::Joined);
        joined.voted_movie_id = Some("m1".to_string());
        let existing = suggestion("s1", "p1", "m1", 2);

        let svc = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![scheduled]])
                .append_query_results([vec![joined]])
                .append_query_results([vec![existing]]),
        );

        let result = svc.vote("p1", "u2", "m1").await.unwrap();
        assert_eq!(result.vote_count, 2);
    }

    /// A participant who already votes for one suggestion suggests another
    /// movie: the old suggestion is decremented and their vote repointed.
    #[tokio::test]
    async fn test_suggest_releases_previous_vote() {
        let scheduled = party("p1", "host", PartyStatus::Scheduled);

        let mut voter = participant("p1", "u2", ParticipantStatus::Joined);
        voter.voted_movie_id = Some("m1".to_string());
        let mut repointed = voter.clone();
        repointed.voted_movie_id = Some("m2".to_string());

        let movie = movie::Model {
            id: "m2".to_string(),
            title: "Second pick".to_string(),
            release_year: None,
            created_at: Utc::now().into(),
        };
        let old = suggestion("s1", "p1", "m1", 2);
        let mut decremented = old.clone();
        decremented.vote_count = 1;
        let created = suggestion("s2", "p1", "m2", 1);

        let svc = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![scheduled]])
                .append_query_results([vec![btreemap! {
                    "num_items" => sea_orm::Value::BigInt(Some(1)),
                }]])
                .append_query_results([vec![btreemap! {
                    "num_items" => sea_orm::Value::BigInt(Some(0)),
                }]])
                .append_query_results([vec![movie]])
                .append_query_results([vec![created.clone()]])
                .append_query_results([vec![voter]])
                .append_query_results([vec![old]])
                .append_query_results([vec![decremented]])
                .append_query_results([vec![repointed]]),
        );

        let result = svc.suggest_movie("p1", "u2", "m2").await.unwrap();
        assert_eq!(result.movie_id, "m2");
        assert_eq!(result.vote_count, 1);
    }

    #[tokio::test]
    async fn test_find_by_id_returns_none() {
        let svc = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<watch_party::Model>::new()]),
        );

        let found = svc.find_by_id("missing").await.unwrap();
        assert!(found.is_none());
    }
}
