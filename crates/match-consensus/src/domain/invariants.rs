//! # Domain Invariants
//!
//! Input rules checked before any state is touched. Each returns
//! `ValidationError` on failure.

use shared_types::TeamId;

use super::entities::MatchRequest;
use super::errors::ConsensusError;
use super::value_objects::{BestPlayer, ConsensusConfig, Scores};

/// A team cannot challenge itself.
pub fn invariant_distinct_teams(challenger: TeamId, opponent: TeamId) -> Result<(), ConsensusError> {
    if challenger == opponent {
        return Err(ConsensusError::ValidationError(
            "a team cannot challenge itself".into(),
        ));
    }
    Ok(())
}

/// Optional free text stays within `max` characters.
pub fn invariant_text_len(field: &str, text: Option<&str>, max: usize) -> Result<(), ConsensusError> {
    match text {
        Some(text) if text.chars().count() > max => Err(ConsensusError::ValidationError(format!(
            "{field} exceeds {max} characters"
        ))),
        _ => Ok(()),
    }
}

/// Resolve and check the match type against the allow-list.
///
/// Returns the normalized (trimmed, lowercase) type.
pub fn normalize_match_type(
    requested: Option<&str>,
    config: &ConsensusConfig,
) -> Result<String, ConsensusError> {
    let match_type = match requested.map(str::trim) {
        Some(t) if !t.is_empty() => t.to_lowercase(),
        _ => config.default_match_type.to_lowercase(),
    };
    if !config.is_allowed_match_type(&match_type) {
        return Err(ConsensusError::ValidationError(format!(
            "match type '{match_type}' is not allowed"
        )));
    }
    Ok(match_type)
}

/// The winner is one of the two teams on the request.
pub fn invariant_winner_participates(
    request: &MatchRequest,
    winner: TeamId,
) -> Result<(), ConsensusError> {
    if request.side_of_team(winner).is_none() {
        return Err(ConsensusError::ValidationError(
            "winner must be one of the two teams".into(),
        ));
    }
    Ok(())
}

/// The best player is named and played for one of the two teams.
pub fn invariant_best_player(
    request: &MatchRequest,
    best_player: Option<&BestPlayer>,
) -> Result<(), ConsensusError> {
    let Some(player) = best_player else {
        return Ok(());
    };
    if player.name.trim().is_empty() {
        return Err(ConsensusError::ValidationError(
            "best player name must not be empty".into(),
        ));
    }
    if request.side_of_team(player.team).is_none() {
        return Err(ConsensusError::ValidationError(
            "best player must belong to one of the two teams".into(),
        ));
    }
    Ok(())
}

/// Duration, when given, is in `1..=max` minutes.
pub fn invariant_duration(duration: Option<u32>, max: u32) -> Result<(), ConsensusError> {
    match duration {
        Some(minutes) if minutes == 0 || minutes > max => Err(ConsensusError::ValidationError(
            format!("duration must be between 1 and {max} minutes"),
        )),
        _ => Ok(()),
    }
}

/// The winner did not score less than the loser.
pub fn invariant_score_consistency(
    request: &MatchRequest,
    winner: TeamId,
    scores: &Scores,
) -> Result<(), ConsensusError> {
    let Some(winner_side) = request.side_of_team(winner) else {
        return invariant_winner_participates(request, winner);
    };
    let winner_score = scores.for_side(winner_side);
    let loser_score = scores.for_side(winner_side.opposite());
    if winner_score < loser_score {
        return Err(ConsensusError::ValidationError(format!(
            "winner scored {winner_score} but loser scored {loser_score}"
        )));
    }
    Ok(())
}
