//! Movie suggestion vote tallying.
//!
//! Pure tally logic. Each joined participant holds at most one active vote
//! per party; voting for a different suggestion reassigns it. Suggesting a
//! movie seeds the suggestion with the suggester's own vote and repoints
//! their `voted_movie_id`, so a suggestion's `vote_count` always equals the
//! number of participants pointing at it.

use chrono::{DateTime, Utc};
use cineconnect_common::{AppError, AppResult};
use cineconnect_db::entities::watch_party::{self, PartyStatus};
use cineconnect_db::entities::watch_party_participant::{self, ParticipantStatus};
use cineconnect_db::entities::watch_party_suggestion;
use sea_orm::Set;

/// Check that `party` accepts a new suggestion from a member.
pub fn ensure_can_suggest(
    party: &watch_party::Model,
    is_member: bool,
    already_suggested: bool,
) -> AppResult<()> {
    if party.status != PartyStatus::Scheduled {
        return Err(AppError::InvalidState(
            "Can only suggest movies for scheduled parties".to_string(),
        ));
    }
    if party.movie_id.is_some() {
        return Err(AppError::Conflict(
            "Party already has a movie set".to_string(),
        ));
    }
    if !is_member {
        return Err(AppError::Forbidden(
            "Only participants can suggest movies".to_string(),
        ));
    }
    if already_suggested {
        return Err(AppError::Conflict(
            "Movie has already been suggested".to_string(),
        ));
    }
    Ok(())
}

/// Build a suggestion seeded with the suggester's own vote.
#[must_use]
pub fn new_suggestion(
    id: String,
    party_id: &str,
    movie_id: &str,
    suggested_by_id: &str,
    now: DateTime<Utc>,
) -> watch_party_suggestion::ActiveModel {
    watch_party_suggestion::ActiveModel {
        id: Set(id),
        party_id: Set(party_id.to_string()),
        movie_id: Set(movie_id.to_string()),
        suggested_by_id: Set(suggested_by_id.to_string()),
        vote_count: Set(1),
        created_at: Set(now.into()),
    }
}

/// Check vote preconditions and extract the joined participant row.
pub fn ensure_can_vote(
    party: &watch_party::Model,
    participant: Option<watch_party_participant::Model>,
) -> AppResult<watch_party_participant::Model> {
    if party.status != PartyStatus::Scheduled {
        return Err(AppError::InvalidState(
            "Can only vote for scheduled parties".to_string(),
        ));
    }

    let participant = participant
        .ok_or_else(|| AppError::Forbidden("Only participants can vote".to_string()))?;

    if participant.status != ParticipantStatus::Joined {
        return Err(AppError::Forbidden(
            "Must join the party to vote".to_string(),
        ));
    }

    Ok(participant)
}

/// Outcome of a vote decision.
#[derive(Debug, PartialEq, Eq)]
pub enum VoteDecision {
    /// The participant already votes for this movie; nothing changes.
    Unchanged,
    /// Cast the vote: increment the target, release `previous_movie_id` if
    /// the participant voted elsewhere before.
    Cast {
        /// Movie the participant's vote moves away from, if any.
        previous_movie_id: Option<String>,
    },
}

/// Decide what a vote by `participant` for `movie_id` does to the tally.
#[must_use]
pub fn decide_vote(participant: &watch_party_participant::Model, movie_id: &str) -> VoteDecision {
    match participant.voted_movie_id.as_deref() {
        Some(current) if current == movie_id => VoteDecision::Unchanged,
        Some(current) => VoteDecision::Cast {
            previous_movie_id: Some(current.to_string()),
        },
        None => VoteDecision::Cast {
            previous_movie_id: None,
        },
    }
}

/// Decrement a vote count, never going below zero.
#[must_use]
pub const fn decrement(count: i32) -> i32 {
    if count > 0 { count - 1 } else { 0 }
}

/// Order suggestions by vote count descending, ties broken by earliest
/// creation. The first entry is the winner used by party start.
#[must_use]
pub fn rank(
    mut suggestions: Vec<watch_party_suggestion::Model>,
) -> Vec<watch_party_suggestion::Model> {
    suggestions.sort_by(|a, b| {
        b.vote_count
            .cmp(&a.vote_count)
            .then_with(|| a.created_at.cmp(&b.created_at))
    });
    suggestions
}
