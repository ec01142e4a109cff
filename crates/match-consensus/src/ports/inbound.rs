//! # Inbound Ports
//!
//! API trait defining what the match consensus engine can do. Every call
//! names the acting user; resolving that user from a credential is the
//! caller's job (see `IdentityProvider`).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shared_types::{
    MatchDecision, MatchRequestId, MatchResultId, TeamId, UserId, VerificationDecision,
};

use crate::domain::{
    BestPlayer, ConsensusError, MatchListFilter, MatchRequest, MatchResult, Scores,
    TeamStatistics,
};

/// Parameters of a new challenge.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposeMatch {
    /// Team issuing the challenge; the caller must represent it.
    pub challenger_team: TeamId,
    /// Team being challenged.
    pub opponent_team: TeamId,
    /// Optional note for the opponent.
    #[serde(default)]
    pub message: Option<String>,
    /// Category; the configured default when absent.
    #[serde(default)]
    pub match_type: Option<String>,
}

/// Parameters of an outcome report.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportOutcome {
    /// Winning team.
    pub winner_team: TeamId,
    /// Final score line.
    pub scores: Scores,
    /// Match length in minutes.
    #[serde(default)]
    pub duration_minutes: Option<u32>,
    /// Standout player.
    #[serde(default)]
    pub best_player: Option<BestPlayer>,
    /// Reporter's feedback, stored on the reporter's side.
    #[serde(default)]
    pub feedback: Option<String>,
}

/// Match consensus API - inbound port.
#[async_trait]
pub trait MatchConsensusApi: Send + Sync {
    /// Challenge another team. Creates a `pending` request.
    async fn propose_match(
        &self,
        actor: UserId,
        proposal: ProposeMatch,
    ) -> Result<MatchRequest, ConsensusError>;

    /// Accept or decline a pending request. Opponent only.
    async fn respond_to_match(
        &self,
        actor: UserId,
        request_id: MatchRequestId,
        decision: MatchDecision,
    ) -> Result<MatchRequest, ConsensusError>;

    /// Mark an accepted request as played. Either participant.
    async fn complete_match(
        &self,
        actor: UserId,
        request_id: MatchRequestId,
    ) -> Result<MatchRequest, ConsensusError>;

    /// The caller's requests, newest first.
    async fn list_matches(
        &self,
        actor: UserId,
        filter: MatchListFilter,
    ) -> Result<Vec<MatchRequest>, ConsensusError>;

    /// One request, visible to its participants.
    async fn get_match(
        &self,
        actor: UserId,
        request_id: MatchRequestId,
    ) -> Result<MatchRequest, ConsensusError>;

    /// Report the outcome of a completed match. First report wins.
    async fn report_outcome(
        &self,
        actor: UserId,
        request_id: MatchRequestId,
        report: ReportOutcome,
    ) -> Result<MatchResult, ConsensusError>;

    /// Confirm or dispute the counter-party's report.
    async fn verify_outcome(
        &self,
        actor: UserId,
        result_id: MatchResultId,
        decision: VerificationDecision,
        feedback: Option<String>,
    ) -> Result<MatchResult, ConsensusError>;

    /// The outcome recorded for a request, visible to its participants.
    async fn get_outcome(
        &self,
        actor: UserId,
        request_id: MatchRequestId,
    ) -> Result<MatchResult, ConsensusError>;

    /// Current aggregate of a team; zeroes before its first verified match.
    async fn team_statistics(&self, team_id: TeamId) -> Result<TeamStatistics, ConsensusError>;
}
