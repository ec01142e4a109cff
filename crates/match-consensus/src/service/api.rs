//! `MatchConsensusApi` implementation. Every rejection is logged once here.

use async_trait::async_trait;
use shared_types::{
    MatchDecision, MatchRequestId, MatchResultId, TeamId, UserId, VerificationDecision,
};

use super::*;
use crate::domain::{MatchListFilter, MatchRequest, MatchResult, TeamStatistics};
use crate::ports::inbound::{MatchConsensusApi, ProposeMatch, ReportOutcome};

#[async_trait]
impl<S, D, N, T> MatchConsensusApi for MatchConsensusService<S, D, N, T>
where
    S: MatchStore,
    D: TeamDirectory,
    N: NotificationChannel,
    T: TimeSource,
{
    async fn propose_match(
        &self,
        actor: UserId,
        proposal: ProposeMatch,
    ) -> Result<MatchRequest, ConsensusError> {
        self.propose(actor, proposal)
            .await
            .map_err(|e| self.rejected("propose_match", Some(actor), e))
    }

    async fn respond_to_match(
        &self,
        actor: UserId,
        request_id: MatchRequestId,
        decision: MatchDecision,
    ) -> Result<MatchRequest, ConsensusError> {
        self.respond(actor, request_id, decision)
            .await
            .map_err(|e| self.rejected("respond_to_match", Some(actor), e))
    }

    async fn complete_match(
        &self,
        actor: UserId,
        request_id: MatchRequestId,
    ) -> Result<MatchRequest, ConsensusError> {
        self.complete(actor, request_id)
            .await
            .map_err(|e| self.rejected("complete_match", Some(actor), e))
    }

    async fn list_matches(
        &self,
        actor: UserId,
        filter: MatchListFilter,
    ) -> Result<Vec<MatchRequest>, ConsensusError> {
        self.list(actor, filter)
            .map_err(|e| self.rejected("list_matches", Some(actor), e))
    }

    async fn get_match(
        &self,
        actor: UserId,
        request_id: MatchRequestId,
    ) -> Result<MatchRequest, ConsensusError> {
        self.find_match(actor, request_id)
            .map_err(|e| self.rejected("get_match", Some(actor), e))
    }

    async fn report_outcome(
        &self,
        actor: UserId,
        request_id: MatchRequestId,
        report: ReportOutcome,
    ) -> Result<MatchResult, ConsensusError> {
        self.report(actor, request_id, report)
            .await
            .map_err(|e| self.rejected("report_outcome", Some(actor), e))
    }

    async fn verify_outcome(
        &self,
        actor: UserId,
        result_id: MatchResultId,
        decision: VerificationDecision,
        feedback: Option<String>,
    ) -> Result<MatchResult, ConsensusError> {
        self.verify(actor, result_id, decision, feedback)
            .await
            .map_err(|e| self.rejected("verify_outcome", Some(actor), e))
    }

    async fn get_outcome(
        &self,
        actor: UserId,
        request_id: MatchRequestId,
    ) -> Result<MatchResult, ConsensusError> {
        self.find_outcome(actor, request_id)
            .map_err(|e| self.rejected("get_outcome", Some(actor), e))
    }

    async fn team_statistics(&self, team_id: TeamId) -> Result<TeamStatistics, ConsensusError> {
        self.statistics_for(team_id)
            .map_err(|e| self.rejected("team_statistics", None, e))
    }
}
