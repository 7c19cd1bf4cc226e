//! Participant membership rules.
//!
//! Pure decision logic for invite/join/decline/leave transitions and the
//! membership invariants: one row per (party, user), implicit host
//! membership, capacity limits, and public/private visibility.

use chrono::{DateTime, Utc};
use cineconnect_common::{AppError, AppResult};
use cineconnect_db::entities::watch_party::{self, PartyStatus};
use cineconnect_db::entities::watch_party_participant::{self, ParticipantStatus};
use sea_orm::Set;

/// Build the host's participant row, created together with the party.
///
/// The host is always a member: capacity and visibility checks do not apply.
#[must_use]
pub fn host_participant(
    id: String,
    party_id: &str,
    host_id: &str,
    now: DateTime<Utc>,
) -> watch_party_participant::ActiveModel {
    watch_party_participant::ActiveModel {
        id: Set(id),
        party_id: Set(party_id.to_string()),
        user_id: Set(host_id.to_string()),
        status: Set(ParticipantStatus::Joined),
        voted_movie_id: Set(None),
        joined_at: Set(Some(now.into())),
        created_at: Set(now.into()),
        updated_at: Set(None),
    }
}

/// Check that `inviter_id` may invite a new user to `party`.
pub fn ensure_can_invite(
    party: &watch_party::Model,
    inviter_id: &str,
    invitee_has_row: bool,
) -> AppResult<()> {
    if party.host_id != inviter_id {
        return Err(AppError::Forbidden(
            "Only the host can invite users".to_string(),
        ));
    }
    if party.status != PartyStatus::Scheduled {
        return Err(AppError::InvalidState(
            "Can only invite to scheduled parties".to_string(),
        ));
    }
    if invitee_has_row {
        return Err(AppError::Conflict(
            "User is already invited or participating".to_string(),
        ));
    }
    Ok(())
}

/// Build an Invited participant row.
#[must_use]
pub fn invited_participant(
    id: String,
    party_id: &str,
    invitee_id: &str,
    now: DateTime<Utc>,
) -> watch_party_participant::ActiveModel {
    watch_party_participant::ActiveModel {
        id: Set(id),
        party_id: Set(party_id.to_string()),
        user_id: Set(invitee_id.to_string()),
        status: Set(ParticipantStatus::Invited),
        voted_movie_id: Set(None),
        joined_at: Set(None),
        created_at: Set(now.into()),
        updated_at: Set(None),
    }
}

/// Outcome of a join decision.
#[derive(Debug)]
pub enum JoinDecision {
    /// An existing row transitions into Joined.
    Rejoin(watch_party_participant::ActiveModel),
    /// No row exists; a fresh Joined row must be created.
    CreateNew,
}

/// Decide how `user` joins `party`.
///
/// An existing row (Invited, Declined, or Left) rejoins regardless of
/// visibility; a brand-new participant requires a public party with free
/// capacity.
pub fn decide_join(
    party: &watch_party::Model,
    existing: Option<watch_party_participant::Model>,
    joined_count: u64,
    now: DateTime<Utc>,
) -> AppResult<JoinDecision> {
    if !party.status.accepts_joins() {
        return Err(AppError::InvalidState(
            "Cannot join a cancelled or ended party".to_string(),
        ));
    }

    if let Some(participant) = existing {
        if participant.status == ParticipantStatus::Joined {
            return Err(AppError::Conflict("Already joined this party".to_string()));
        }
        let mut active: watch_party_participant::ActiveModel = participant.into();
        active.status = Set(ParticipantStatus::Joined);
        active.joined_at = Set(Some(now.into()));
        active.updated_at = Set(Some(now.into()));
        return Ok(JoinDecision::Rejoin(active));
    }

    if !party.is_public {
        return Err(AppError::Forbidden(
            "Cannot join a private party without an invitation".to_string(),
        ));
    }
    if let Some(max) = party.max_participants
        && joined_count >= u64::try_from(max).unwrap_or(0)
    {
        return Err(AppError::Conflict("Party is full".to_string()));
    }

    Ok(JoinDecision::CreateNew)
}

/// Build a Joined participant row for a direct public join.
#[must_use]
pub fn joined_participant(
    id: String,
    party_id: &str,
    user_id: &str,
    now: DateTime<Utc>,
) -> watch_party_participant::ActiveModel {
    watch_party_participant::ActiveModel {
        id: Set(id),
        party_id: Set(party_id.to_string()),
        user_id: Set(user_id.to_string()),
        status: Set(ParticipantStatus::Joined),
        voted_movie_id: Set(None),
        joined_at: Set(Some(now.into())),
        created_at: Set(now.into()),
        updated_at: Set(None),
    }
}

/// Decline a pending invitation.
pub fn decline(
    existing: Option<watch_party_participant::Model>,
    now: DateTime<Utc>,
) -> AppResult<watch_party_participant::ActiveModel> {
    let participant =
        existing.ok_or_else(|| AppError::NotFound("Invitation not found".to_string()))?;

    if participant.status != ParticipantStatus::Invited {
        return Err(AppError::InvalidState(
            "Can only decline pending invitations".to_string(),
        ));
    }

    let mut active: watch_party_participant::ActiveModel = participant.into();
    active.status = Set(ParticipantStatus::Declined);
    active.updated_at = Set(Some(now.into()));
    Ok(active)
}

/// Leave a party. The host cannot leave; everyone else may leave from any
/// status.
pub fn leave(
    party: &watch_party::Model,
    user_id: &str,
    existing: Option<watch_party_participant::Model>,
    now: DateTime<Utc>,
) -> AppResult<watch_party_participant::ActiveModel> {
    if party.host_id == user_id {
        return Err(AppError::Forbidden(
            "Host cannot leave their own party".to_string(),
        ));
    }

    let participant = existing
        .ok_or_else(|| AppError::NotFound("Not a participant in this party".to_string()))?;

    let mut active: watch_party_participant::ActiveModel = participant.into();
    active.status = Set(ParticipantStatus::Left);
    active.updated_at = Set(Some(now.into()));
    Ok(active)
}

/// Membership predicate: the host, or any user with a participant row
/// (regardless of status).
#[must_use]
pub fn is_member(party: &watch_party::Model, user_id: &str, has_row: bool) -> bool {
    party.host_id == user_id || has_row
}
