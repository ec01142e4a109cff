//! # Statistics Aggregator
//!
//! Turns a confirmed outcome into one win and one loss. The aggregator only
//! plans and mutates values; the store applies the plan in the same atomic
//! unit as the verification transition.

use serde::{Deserialize, Serialize};
use shared_types::{TeamId, Timestamp};

use super::entities::{MatchRequest, MatchResult, TeamStatistics};
use super::errors::ConsensusError;

/// Which team gets the win and which the loss.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeApplication {
    /// Team credited with a win.
    pub winner: TeamId,
    /// Team charged with a loss.
    pub loser: TeamId,
}

impl OutcomeApplication {
    /// Both teams, winner first.
    pub fn teams(&self) -> [TeamId; 2] {
        [self.winner, self.loser]
    }
}

/// Stateless planner for statistics updates.
#[derive(Clone, Copy, Debug, Default)]
pub struct StatisticsAggregator;

impl StatisticsAggregator {
    /// Plan the update for `result` on its parent `request`.
    pub fn plan(
        request: &MatchRequest,
        result: &MatchResult,
    ) -> Result<OutcomeApplication, ConsensusError> {
        if result.match_request_id != request.id {
            return Err(ConsensusError::ValidationError(format!(
                "result {} does not belong to match {}",
                result.id, request.id
            )));
        }
        let winner_side = request.side_of_team(result.winner_team).ok_or_else(|| {
            ConsensusError::ValidationError("winner must be one of the two teams".into())
        })?;
        Ok(OutcomeApplication {
            winner: result.winner_team,
            loser: request.team_on(winner_side.opposite()),
        })
    }

    /// Apply the plan to both records. Both are updated or, on a mismatched
    /// record, neither is.
    pub fn apply_outcome(
        plan: &OutcomeApplication,
        winner: &mut TeamStatistics,
        loser: &mut TeamStatistics,
        now: Timestamp,
    ) -> Result<(), ConsensusError> {
        if winner.team_id != plan.winner || loser.team_id != plan.loser {
            return Err(ConsensusError::ValidationError(
                "statistics records do not match the outcome".into(),
            ));
        }
        winner.record(true, now);
        loser.record(false, now);
        Ok(())
    }
}
