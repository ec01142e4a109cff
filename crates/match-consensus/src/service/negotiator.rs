//! # Match Negotiator
//!
//! `pending --accept--> accepted --complete--> completed`, and
//! `pending --decline--> declined`.

use shared_bus::MatchEvent;
use shared_types::{MatchDecision, MatchRequestId, UserId};
use tracing::info;

use super::*;
use crate::domain::{
    invariant_distinct_teams, invariant_text_len, normalize_match_type, AuthSubject, MatchRequest,
    MatchStatus, Role, TeamPair,
};
use crate::ports::inbound::ProposeMatch;

impl<S, D, N, T> MatchConsensusService<S, D, N, T>
where
    S: MatchStore,
    D: TeamDirectory,
    N: NotificationChannel,
    T: TimeSource,
{
    pub(crate) async fn propose(
        &self,
        actor: UserId,
        proposal: ProposeMatch,
    ) -> Result<MatchRequest, ConsensusError> {
        invariant_distinct_teams(proposal.challenger_team, proposal.opponent_team)?;
        let message = proposal
            .message
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty());
        invariant_text_len("message", message.as_deref(), self.config.max_message_len)?;
        let match_type = normalize_match_type(proposal.match_type.as_deref(), &self.config)?;

        let challenger = self
            .directory
            .team(proposal.challenger_team)
            .ok_or_else(|| ConsensusError::not_found("team", proposal.challenger_team))?;
        let opponent = self
            .directory
            .team(proposal.opponent_team)
            .ok_or_else(|| ConsensusError::not_found("team", proposal.opponent_team))?;

        self.guard
            .authorize(actor, AuthSubject::Team(&challenger), Role::Challenger)?;
        if opponent.captain == actor {
            return Err(ConsensusError::ValidationError(
                "cannot challenge a team you also represent".into(),
            ));
        }

        // Fast path; the conditional insert below is what closes the race
        let pair = TeamPair::new(challenger.id, opponent.id);
        if let Some(existing) = self.store.active_request_for_pair(pair)? {
            return Err(ConsensusError::Conflict(format!(
                "match {} between these teams is still {}",
                existing.id, existing.status
            )));
        }

        let request = MatchRequest::new(
            challenger.id,
            opponent.id,
            actor,
            opponent.captain,
            match_type,
            message,
            self.time_source.now(),
        );
        self.store.insert_request(&request)?;

        info!(
            request_id = %request.id,
            challenger_team = %request.challenger_team,
            opponent_team = %request.opponent_team,
            actor = %actor,
            match_type = %request.match_type,
            "Match proposed"
        );

        self.publish(MatchEvent::MatchProposed {
            request_id: request.id,
            challenger_team: request.challenger_team,
            opponent_team: request.opponent_team,
            match_type: request.match_type.clone(),
            recipient: request.opponent_user,
        })
        .await;

        Ok(request)
    }

    pub(crate) async fn respond(
        &self,
        actor: UserId,
        request_id: MatchRequestId,
        decision: MatchDecision,
    ) -> Result<MatchRequest, ConsensusError> {
        let request = self.load_request(request_id)?;
        self.guard
            .authorize(actor, AuthSubject::Request(&request), Role::Opponent)?;

        let updated = self.advance(&request, MatchStatus::after_decision(decision))?;

        info!(
            request_id = %updated.id,
            actor = %actor,
            decision = %decision,
            status = %updated.status,
            "Match request answered"
        );

        self.publish(MatchEvent::MatchResponded {
            request_id: updated.id,
            decision,
            recipient: updated.challenger_user,
        })
        .await;

        Ok(updated)
    }

    pub(crate) async fn complete(
        &self,
        actor: UserId,
        request_id: MatchRequestId,
    ) -> Result<MatchRequest, ConsensusError> {
        let request = self.load_request(request_id)?;
        self.guard
            .authorize(actor, AuthSubject::Request(&request), Role::EitherParticipant)?;

        let updated = self.advance(&request, MatchStatus::Completed)?;

        info!(request_id = %updated.id, actor = %actor, "Match completed");

        if let Some(recipient) = updated.counterpart_of(actor) {
            self.publish(MatchEvent::MatchCompleted {
                request_id: updated.id,
                completed_by: actor,
                recipient,
            })
            .await;
        }

        Ok(updated)
    }
}
