//! Read-side operations. Nothing here writes.

use shared_types::{MatchRequestId, TeamId, UserId};

use super::*;
use crate::domain::{
    AuthSubject, MatchListFilter, MatchRequest, MatchResult, Role, TeamStatistics,
};

impl<S, D, N, T> MatchConsensusService<S, D, N, T>
where
    S: MatchStore,
    D: TeamDirectory,
    N: NotificationChannel,
    T: TimeSource,
{
    pub(crate) fn list(
        &self,
        actor: UserId,
        filter: MatchListFilter,
    ) -> Result<Vec<MatchRequest>, ConsensusError> {
        Ok(self.store.list_requests(actor, filter)?)
    }

    pub(crate) fn find_match(
        &self,
        actor: UserId,
        request_id: MatchRequestId,
    ) -> Result<MatchRequest, ConsensusError> {
        let request = self.load_request(request_id)?;
        self.guard
            .authorize(actor, AuthSubject::Request(&request), Role::EitherParticipant)?;
        Ok(request)
    }

    pub(crate) fn find_outcome(
        &self,
        actor: UserId,
        request_id: MatchRequestId,
    ) -> Result<MatchResult, ConsensusError> {
        let request = self.find_match(actor, request_id)?;
        self.store
            .result_for_request(request.id)?
            .ok_or_else(|| ConsensusError::not_found("match result", request_id))
    }

    pub(crate) fn statistics_for(&self, team_id: TeamId) -> Result<TeamStatistics, ConsensusError> {
        if self.directory.team(team_id).is_none() {
            return Err(ConsensusError::not_found("team", team_id));
        }
        Ok(self
            .store
            .team_statistics(team_id)?
            .unwrap_or_else(|| TeamStatistics::empty(team_id)))
    }
}
