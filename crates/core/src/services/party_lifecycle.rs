//! Party lifecycle state machine.
//!
//! Pure transition logic over the party record. Legal edges:
//! Scheduled → Live → Ended, and Scheduled → Cancelled. A party that has
//! already started is ended, never cancelled.

use chrono::{DateTime, Utc};
use cineconnect_common::{AppError, AppResult};
use cineconnect_db::entities::watch_party::{self, PartyStatus};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

/// Input for updating a scheduled party. Omitted fields keep their prior
/// values.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePartyInput {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(length(max = 2048))]
    pub description: Option<String>,
    pub scheduled_at: Option<DateTime<Utc>>,
    #[validate(range(min = 1))]
    pub max_participants: Option<i32>,
    pub is_public: Option<bool>,
}

/// Require that the caller is the party host.
pub fn ensure_host(party: &watch_party::Model, user_id: &str) -> AppResult<()> {
    if party.host_id == user_id {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "Only the host can perform this action".to_string(),
        ))
    }
}

/// Check that `party` may be started by `caller_id`.
pub fn ensure_can_start(party: &watch_party::Model, caller_id: &str) -> AppResult<()> {
    ensure_host(party, caller_id)?;
    if party.status != PartyStatus::Scheduled {
        return Err(AppError::InvalidState(
            "Party must be scheduled to start".to_string(),
        ));
    }
    Ok(())
}

/// Transition a validated party to Live.
///
/// `winning_movie_id` is the top-voted suggestion's movie, supplied by the
/// caller when the party has no movie fixed; it stays unset when there were
/// no suggestions.
#[must_use]
pub fn start(
    party: watch_party::Model,
    winning_movie_id: Option<String>,
    now: DateTime<Utc>,
) -> watch_party::ActiveModel {
    let had_movie = party.movie_id.is_some();
    let mut active: watch_party::ActiveModel = party.into();
    active.status = Set(PartyStatus::Live);
    active.started_at = Set(Some(now.into()));
    if !had_movie && let Some(movie_id) = winning_movie_id {
        active.movie_id = Set(Some(movie_id));
    }
    active.updated_at = Set(Some(now.into()));
    active
}

/// Transition a Live party to Ended.
pub fn end(
    party: watch_party::Model,
    caller_id: &str,
    now: DateTime<Utc>,
) -> AppResult<watch_party::ActiveModel> {
    ensure_host(&party, caller_id)?;
    if party.status != PartyStatus::Live {
        return Err(AppError::InvalidState(
            "Party must be live to end".to_string(),
        ));
    }

    let mut active: watch_party::ActiveModel = party.into();
    active.status = Set(PartyStatus::Ended);
    active.ended_at = Set(Some(now.into()));
    active.updated_at = Set(Some(now.into()));
    Ok(active)
}

/// Transition a Scheduled party to Cancelled.
pub fn cancel(
    party: watch_party::Model,
    caller_id: &str,
    now: DateTime<Utc>,
) -> AppResult<watch_party::ActiveModel> {
    ensure_host(&party, caller_id)?;
    if party.status != PartyStatus::Scheduled {
        return Err(AppError::InvalidState(
            "Only scheduled parties can be cancelled".to_string(),
        ));
    }

    let mut active: watch_party::ActiveModel = party.into();
    active.status = Set(PartyStatus::Cancelled);
    active.updated_at = Set(Some(now.into()));
    Ok(active)
}

/// Apply a partial update to a Scheduled party.
pub fn apply_update(
    party: watch_party::Model,
    caller_id: &str,
    input: &UpdatePartyInput,
    now: DateTime<Utc>,
) -> AppResult<watch_party::ActiveModel> {
    ensure_host(&party, caller_id)?;
    if party.status != PartyStatus::Scheduled {
        return Err(AppError::InvalidState(
            "Cannot update a party that has started or ended".to_string(),
        ));
    }

    let mut active: watch_party::ActiveModel = party.into();
    if let Some(ref title) = input.title {
        active.title = Set(title.clone());
    }
    if let Some(ref description) = input.description {
        active.description = Set(Some(description.clone()));
    }
    if let Some(scheduled_at) = input.scheduled_at {
        active.scheduled_at = Set(scheduled_at.into());
    }
    if let Some(max_participants) = input.max_participants {
        active.max_participants = Set(Some(max_participants));
    }
    if let Some(is_public) = input.is_public {
        active.is_public = Set(is_public);
    }
    active.updated_at = Set(Some(now.into()));
    Ok(active)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::ActiveValue;

    fn scheduled_party(host_id: &str) -> watch_party::Model {
        watch_party::Model {
            id: "p1".to_string(),
            host_id: host_id.to_string(),
            movie_id: None,
            title: "Movie night".to_string(),
            description: None,
            scheduled_at: Utc::now().into(),
            started_at: None,
            ended_at: None,
            status: PartyStatus::Scheduled,
            max_participants: Some(10),
            is_public: false,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn with_status(mut party: watch_party::Model, status: PartyStatus) -> watch_party::Model {
        party.status = status;
        party
    }

    #[test]
    fn test_start_requires_host() {
        let party = scheduled_party("host");
        let err = ensure_can_start(&party, "someone-else").unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[test]
    fn test_start_requires_scheduled() {
        for status in [PartyStatus::Live, PartyStatus::Ended, PartyStatus::Cancelled] {
            let party = with_status(scheduled_party("host"), status);
            let err = ensure_can_start(&party, "host").unwrap_err();
            assert!(matches!(err, AppError::InvalidState(_)));
        }
    }

    #[test]
    fn test_start_assigns_winning_movie() {
        let party = scheduled_party("host");
        ensure_can_start(&party, "host").unwrap();
        let active = start(party, Some("m2".to_string()), Utc::now());

        assert!(matches!(active.status, ActiveValue::Set(PartyStatus::Live)));
        assert_eq!(active.movie_id.clone().unwrap(), Some("m2".to_string()));
        assert!(matches!(active.started_at, ActiveValue::Set(Some(_))));
    }

    #[test]
    fn test_start_keeps_fixed_movie() {
        let mut party = scheduled_party("host");
        party.movie_id = Some("m1".to_string());
        // A pre-set movie is never overridden by the vote winner.
        let active = start(party, Some("m2".to_string()), Utc::now());
        assert!(matches!(active.movie_id, ActiveValue::Unchanged(_)));
    }

    #[test]
    fn test_start_without_suggestions_leaves_movie_unset() {
        let party = scheduled_party("host");
        let active = start(party, None, Utc::now());
        assert!(matches!(active.movie_id, ActiveValue::Unchanged(None)));
    }

    #[test]
    fn test_end_requires_live() {
        for status in [
            PartyStatus::Scheduled,
            PartyStatus::Ended,
            PartyStatus::Cancelled,
        ] {
            let party = with_status(scheduled_party("host"), status);
            let err = end(party, "host", Utc::now()).unwrap_err();
            assert!(matches!(err, AppError::InvalidState(_)));
        }
    }

    #[test]
    fn test_end_sets_ended_at() {
        let party = with_status(scheduled_party("host"), PartyStatus::Live);
        let active = end(party, "host", Utc::now()).unwrap();
        assert!(matches!(active.status, ActiveValue::Set(PartyStatus::Ended)));
        assert!(matches!(active.ended_at, ActiveValue::Set(Some(_))));
    }

    #[test]
    fn test_cancel_is_scheduled_only() {
        let party = scheduled_party("host");
        let active = cancel(party, "host", Utc::now()).unwrap();
        assert!(matches!(active.status, ActiveValue::Set(PartyStatus::Cancelled)));

        // A live party is ended, not cancelled.
        for status in [PartyStatus::Live, PartyStatus::Ended, PartyStatus::Cancelled] {
            let party = with_status(scheduled_party("host"), status);
            let err = cancel(party, "host", Utc::now()).unwrap_err();
            assert!(matches!(err, AppError::InvalidState(_)));
        }
    }

    #[test]
    fn test_cancel_requires_host() {
        let party = scheduled_party("host");
        let err = cancel(party, "guest", Utc::now()).unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[test]
    fn test_update_is_partial() {
        let party = scheduled_party("host");
        let input = UpdatePartyInput {
            title: Some("New title".to_string()),
            ..UpdatePartyInput::default()
        };

        let active = apply_update(party, "host", &input, Utc::now()).unwrap();
        assert_eq!(active.title.clone().unwrap(), "New title");
        // Omitted fields keep prior values.
        assert!(matches!(active.is_public, ActiveValue::Unchanged(false)));
        assert!(matches!(active.max_participants, ActiveValue::Unchanged(Some(10))));
    }

    #[test]
    fn test_update_rejected_once_started() {
        let party = with_status(scheduled_party("host"), PartyStatus::Live);
        let err = apply_update(party, "host", &UpdatePartyInput::default(), Utc::now()).unwrap_err();
        assert!(matches!(err, AppError::InvalidState(_)));
    }
}
