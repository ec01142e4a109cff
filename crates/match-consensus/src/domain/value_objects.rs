//! # Domain Value Objects
//!
//! State machines, score lines and the engine configuration.

use serde::{Deserialize, Serialize};
use shared_types::{MatchDecision, TeamId, TeamSide, VerificationDecision};
use std::fmt;

use super::errors::ConsensusError;

/// Negotiation state of a match request.
///
/// ```text
/// pending --accept--> accepted --complete--> completed
///    |
///    +----decline---> declined
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    /// Proposed, waiting for the opponent.
    #[default]
    Pending,
    /// Opponent agreed to play.
    Accepted,
    /// Opponent refused. Terminal.
    Declined,
    /// Played. Terminal for negotiation, open for reporting.
    Completed,
}

impl MatchStatus {
    /// Check if transition is valid.
    pub fn can_transition_to(&self, next: MatchStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Accepted)
                | (Self::Pending, Self::Declined)
                | (Self::Accepted, Self::Completed)
        )
    }

    /// Pending and accepted requests hold the team pair.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Pending | Self::Accepted)
    }

    /// Check if terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Declined | Self::Completed)
    }

    /// Status an opponent's decision moves a pending request into.
    pub fn after_decision(decision: MatchDecision) -> Self {
        match decision {
            MatchDecision::Accept => Self::Accepted,
            MatchDecision::Decline => Self::Declined,
        }
    }

    /// Stable lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Declined => "declined",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Counter-party verification state of a reported outcome.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationState {
    /// Reported, waiting for the counter-party.
    #[default]
    Unverified,
    /// Confirmed by the counter-party. Statistics applied.
    Verified,
    /// Rejected by the counter-party. Terminal, statistics untouched.
    Disputed,
}

impl VerificationState {
    /// Only `unverified` moves, and only forward.
    pub fn can_transition_to(&self, next: VerificationState) -> bool {
        matches!(
            (self, next),
            (Self::Unverified, Self::Verified) | (Self::Unverified, Self::Disputed)
        )
    }

    /// Check if terminal state.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Unverified)
    }

    /// State a verifier's decision moves an unverified result into.
    pub fn after_decision(decision: VerificationDecision) -> Self {
        match decision {
            VerificationDecision::Confirm => Self::Verified,
            VerificationDecision::Dispute => Self::Disputed,
        }
    }

    /// Stable lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unverified => "unverified",
            Self::Verified => "verified",
            Self::Disputed => "disputed",
        }
    }
}

impl fmt::Display for VerificationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Final score line, one number per side of the request.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scores {
    /// Points scored by the challenger team.
    pub challenger: u32,
    /// Points scored by the opponent team.
    pub opponent: u32,
}

impl Scores {
    /// Create a score line.
    pub fn new(challenger: u32, opponent: u32) -> Self {
        Self {
            challenger,
            opponent,
        }
    }

    /// Score of one side.
    pub fn for_side(&self, side: TeamSide) -> u32 {
        match side {
            TeamSide::Challenger => self.challenger,
            TeamSide::Opponent => self.opponent,
        }
    }
}

/// Standout player of the match.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BestPlayer {
    /// Display name.
    pub name: String,
    /// Team the player played for.
    pub team: TeamId,
}

/// Unordered pair of teams.
///
/// `TeamPair::new(a, b) == TeamPair::new(b, a)`, so it can key the
/// single-active-request constraint regardless of who challenged whom.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TeamPair {
    low: TeamId,
    high: TeamId,
}

impl TeamPair {
    /// Normalize two teams into a pair key.
    pub fn new(a: TeamId, b: TeamId) -> Self {
        if a <= b {
            Self { low: a, high: b }
        } else {
            Self { low: b, high: a }
        }
    }

    /// Both teams, lower id first.
    pub fn teams(&self) -> (TeamId, TeamId) {
        (self.low, self.high)
    }

    /// Whether `team` is one of the two.
    pub fn contains(&self, team: TeamId) -> bool {
        self.low == team || self.high == team
    }

    /// 32-byte storage key.
    pub fn to_key(&self) -> [u8; 32] {
        let mut key = [0u8; 32];
        key[..16].copy_from_slice(self.low.as_bytes());
        key[16..].copy_from_slice(self.high.as_bytes());
        key
    }
}

/// Which side of a user's match requests to list.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchListFilter {
    /// Requests the user proposed.
    Sent,
    /// Requests addressed to the user.
    Received,
    /// Both.
    #[default]
    All,
}

/// Engine configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsensusConfig {
    /// Match type used when a proposal names none.
    pub default_match_type: String,
    /// Accepted match types, lowercase.
    pub allowed_match_types: Vec<String>,
    /// Maximum characters in a proposal message.
    pub max_message_len: usize,
    /// Maximum characters in one feedback submission.
    pub max_feedback_len: usize,
    /// Upper bound for a reported duration, in minutes.
    pub max_duration_minutes: u32,
    /// Reject outcomes where the winner scored less than the loser.
    pub enforce_score_consistency: bool,
}

impl Default for ConsensusConfig {
    fn default() -> Self {
        Self {
            default_match_type: "scrim".to_string(),
            allowed_match_types: ["scrim", "practice", "ranked", "tournament"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            max_message_len: 500,
            max_feedback_len: 1000,
            max_duration_minutes: 600,
            enforce_score_consistency: true,
        }
    }
}

impl ConsensusConfig {
    /// Reject configurations the engine cannot run with.
    pub fn validate(&self) -> Result<(), ConsensusError> {
        if self.allowed_match_types.is_empty() {
            return Err(ConsensusError::ValidationError(
                "allowed_match_types must not be empty".into(),
            ));
        }
        if !self.is_allowed_match_type(&self.default_match_type) {
            return Err(ConsensusError::ValidationError(format!(
                "default match type '{}' is not in the allow-list",
                self.default_match_type
            )));
        }
        if self.max_duration_minutes == 0 {
            return Err(ConsensusError::ValidationError(
                "max_duration_minutes must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Case-insensitive allow-list lookup.
    pub fn is_allowed_match_type(&self, match_type: &str) -> bool {
        let wanted = match_type.trim().to_lowercase();
        self.allowed_match_types
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(&wanted))
    }
}
