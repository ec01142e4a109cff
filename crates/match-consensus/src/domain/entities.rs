//! # Domain Entities
//!
//! Match requests, their single outcome record, and per-team aggregates.

use serde::{Deserialize, Serialize};
use shared_types::{
    MatchRequestId, MatchResultId, TeamId, TeamSide, Timestamp, UserId, VerificationDecision,
};

use super::errors::ConsensusError;
use super::value_objects::{BestPlayer, MatchStatus, Scores, TeamPair, VerificationState};

/// A team as known to the team directory.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamProfile {
    /// Team identifier.
    pub id: TeamId,
    /// Display name.
    pub name: String,
    /// User who acts for the team.
    pub captain: UserId,
}

/// A proposed or negotiated contest between two teams.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRequest {
    /// Unique identifier.
    pub id: MatchRequestId,
    /// Team that issued the challenge.
    pub challenger_team: TeamId,
    /// Team that was challenged.
    pub opponent_team: TeamId,
    /// User who proposed the match.
    pub challenger_user: UserId,
    /// Opponent team's representative at creation time.
    pub opponent_user: UserId,
    /// Negotiation state.
    pub status: MatchStatus,
    /// Category, e.g. scrim or ranked.
    pub match_type: String,
    /// Free-text note from the challenger.
    pub message: Option<String>,
    /// Creation time.
    pub created_at: Timestamp,
    /// Last status change.
    pub updated_at: Timestamp,
    /// When the opponent answered.
    pub responded_at: Option<Timestamp>,
    /// When the match was marked played.
    pub completed_at: Option<Timestamp>,
}

impl MatchRequest {
    /// Create a new pending request.
    pub fn new(
        challenger_team: TeamId,
        opponent_team: TeamId,
        challenger_user: UserId,
        opponent_user: UserId,
        match_type: String,
        message: Option<String>,
        now: Timestamp,
    ) -> Self {
        Self {
            id: MatchRequestId::new(),
            challenger_team,
            opponent_team,
            challenger_user,
            opponent_user,
            status: MatchStatus::Pending,
            match_type,
            message,
            created_at: now,
            updated_at: now,
            responded_at: None,
            completed_at: None,
        }
    }

    /// Unordered team pair key.
    pub fn pair(&self) -> TeamPair {
        TeamPair::new(self.challenger_team, self.opponent_team)
    }

    /// Whether this request holds its team pair.
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// Which side `user` acts for on this request.
    pub fn side_of_user(&self, user: UserId) -> Option<TeamSide> {
        if user == self.challenger_user {
            Some(TeamSide::Challenger)
        } else if user == self.opponent_user {
            Some(TeamSide::Opponent)
        } else {
            None
        }
    }

    /// Which side `team` plays on this request.
    pub fn side_of_team(&self, team: TeamId) -> Option<TeamSide> {
        if team == self.challenger_team {
            Some(TeamSide::Challenger)
        } else if team == self.opponent_team {
            Some(TeamSide::Opponent)
        } else {
            None
        }
    }

    /// Team on `side`.
    pub fn team_on(&self, side: TeamSide) -> TeamId {
        match side {
            TeamSide::Challenger => self.challenger_team,
            TeamSide::Opponent => self.opponent_team,
        }
    }

    /// User acting for `side`.
    pub fn user_on(&self, side: TeamSide) -> UserId {
        match side {
            TeamSide::Challenger => self.challenger_user,
            TeamSide::Opponent => self.opponent_user,
        }
    }

    /// Whether `user` is one of the two participants.
    pub fn is_participant(&self, user: UserId) -> bool {
        self.side_of_user(user).is_some()
    }

    /// The other participant.
    pub fn counterpart_of(&self, user: UserId) -> Option<UserId> {
        self.side_of_user(user)
            .map(|side| self.user_on(side.opposite()))
    }

    /// Move to `next`, stamping the matching timestamp.
    pub fn transition_to(&mut self, next: MatchStatus, now: Timestamp) -> Result<(), ConsensusError> {
        if !self.status.can_transition_to(next) {
            return Err(ConsensusError::transition(self.status, next));
        }
        self.status = next;
        self.updated_at = now;
        match next {
            MatchStatus::Accepted | MatchStatus::Declined => self.responded_at = Some(now),
            MatchStatus::Completed => self.completed_at = Some(now),
            MatchStatus::Pending => {}
        }
        Ok(())
    }
}

/// The single outcome record of a completed request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    /// Unique identifier.
    pub id: MatchResultId,
    /// Parent request.
    pub match_request_id: MatchRequestId,
    /// Winning team, one of the two on the request.
    pub winner_team: TeamId,
    /// Final score line.
    pub scores: Scores,
    /// Length of the match in minutes.
    pub duration_minutes: Option<u32>,
    /// Standout player.
    pub best_player: Option<BestPlayer>,
    /// Feedback written by the challenger side.
    pub challenger_feedback: Option<String>,
    /// Feedback written by the opponent side.
    pub opponent_feedback: Option<String>,
    /// Participant who submitted the outcome.
    pub reporter_user: UserId,
    /// Participant who confirmed or disputed it.
    pub verifier_user: Option<UserId>,
    /// Counter-party verification state.
    pub verification_state: VerificationState,
    /// Submission time.
    pub reported_at: Timestamp,
    /// Verification time.
    pub verified_at: Option<Timestamp>,
}

impl MatchResult {
    /// Create an unverified result. `feedback` lands in the reporter's slot.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        match_request_id: MatchRequestId,
        winner_team: TeamId,
        scores: Scores,
        duration_minutes: Option<u32>,
        best_player: Option<BestPlayer>,
        reporter_user: UserId,
        reporter_side: TeamSide,
        feedback: Option<String>,
        now: Timestamp,
    ) -> Self {
        let mut result = Self {
            id: MatchResultId::new(),
            match_request_id,
            winner_team,
            scores,
            duration_minutes,
            best_player,
            challenger_feedback: None,
            opponent_feedback: None,
            reporter_user,
            verifier_user: None,
            verification_state: VerificationState::Unverified,
            reported_at: now,
            verified_at: None,
        };
        if let Some(text) = feedback {
            result.append_feedback(reporter_side, text);
        }
        result
    }

    /// Feedback slot of one side.
    pub fn feedback_for(&self, side: TeamSide) -> Option<&str> {
        match side {
            TeamSide::Challenger => self.challenger_feedback.as_deref(),
            TeamSide::Opponent => self.opponent_feedback.as_deref(),
        }
    }

    /// Append to one side's slot. Existing text is kept, newline separated.
    pub fn append_feedback(&mut self, side: TeamSide, text: String) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        let slot = match side {
            TeamSide::Challenger => &mut self.challenger_feedback,
            TeamSide::Opponent => &mut self.opponent_feedback,
        };
        let joined = match slot.take() {
            Some(existing) if !existing.is_empty() => format!("{existing}\n{text}"),
            _ => text.to_string(),
        };
        *slot = Some(joined);
    }

    /// Record the counter-party's ruling.
    ///
    /// Fails with `SelfVerification` for the reporter and `AlreadyVerified`
    /// once the result has left `unverified`.
    pub fn record_verification(
        &mut self,
        verifier: UserId,
        verifier_side: TeamSide,
        decision: VerificationDecision,
        feedback: Option<String>,
        now: Timestamp,
    ) -> Result<(), ConsensusError> {
        if verifier == self.reporter_user {
            return Err(ConsensusError::SelfVerification);
        }
        let next = VerificationState::after_decision(decision);
        if !self.verification_state.can_transition_to(next) {
            return Err(ConsensusError::AlreadyVerified {
                result_id: self.id,
                state: self.verification_state.to_string(),
            });
        }
        self.verification_state = next;
        self.verifier_user = Some(verifier);
        self.verified_at = Some(now);
        if let Some(text) = feedback {
            self.append_feedback(verifier_side, text);
        }
        Ok(())
    }
}

/// Win/loss aggregate of one team.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TeamStatistics {
    /// Team the numbers belong to.
    pub team_id: TeamId,
    /// Verified wins.
    pub wins: u32,
    /// Verified losses.
    pub losses: u32,
    /// Verified matches.
    pub total_matches: u32,
    /// `wins / total_matches`, 0 with no matches.
    pub win_rate: f64,
    /// Last change, `None` until the first verified match.
    pub updated_at: Option<Timestamp>,
}

impl TeamStatistics {
    /// All-zero record.
    pub fn empty(team_id: TeamId) -> Self {
        Self {
            team_id,
            wins: 0,
            losses: 0,
            total_matches: 0,
            win_rate: 0.0,
            updated_at: None,
        }
    }

    /// Count one verified match.
    pub fn record(&mut self, won: bool, now: Timestamp) {
        if won {
            self.wins = self.wins.saturating_add(1);
        } else {
            self.losses = self.losses.saturating_add(1);
        }
        self.total_matches = self.total_matches.saturating_add(1);
        self.win_rate = win_rate(self.wins, self.total_matches);
        self.updated_at = Some(now);
    }
}

/// `wins / total`, 0 when nothing was played.
pub fn win_rate(wins: u32, total: u32) -> f64 {
    if total == 0 {
        0.0
    } else {
        f64::from(wins) / f64::from(total)
    }
}
