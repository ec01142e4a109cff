//! # Match Consensus Service - Helper Methods
//!
//! Loading, conditional transitions, event delivery and rejection logging
//! shared by the negotiator, reporter and arbiter.

use shared_bus::MatchEvent;
use shared_types::{MatchRequestId, MatchResultId, UserId};
use tracing::{debug, error, warn};

use super::*;
use crate::domain::{MatchRequest, MatchResult, MatchStatus, StoreError};

impl<S, D, N, T> MatchConsensusService<S, D, N, T>
where
    S: MatchStore,
    D: TeamDirectory,
    N: NotificationChannel,
    T: TimeSource,
{
    pub(crate) fn load_request(&self, id: MatchRequestId) -> Result<MatchRequest, ConsensusError> {
        self.store
            .get_request(id)?
            .ok_or_else(|| ConsensusError::not_found("match request", id))
    }

    pub(crate) fn load_result(&self, id: MatchResultId) -> Result<MatchResult, ConsensusError> {
        self.store
            .get_result(id)?
            .ok_or_else(|| ConsensusError::not_found("match result", id))
    }

    /// Move `request` to `next` with a conditional update on its current
    /// status. A lost race surfaces as `InvalidStateTransition` from the
    /// status the winner left behind.
    pub(crate) fn advance(
        &self,
        request: &MatchRequest,
        next: MatchStatus,
    ) -> Result<MatchRequest, ConsensusError> {
        if !request.status.can_transition_to(next) {
            return Err(ConsensusError::transition(request.status, next));
        }
        self.store
            .transition_request(request.id, request.status, next, self.time_source.now())
            .map_err(|e| match e {
                StoreError::StaleState { actual, .. } => ConsensusError::transition(actual, next),
                other => other.into(),
            })
    }

    /// Hand an event to the notification channel. Runs after the commit;
    /// a failure here is logged and otherwise ignored.
    pub(crate) async fn publish(&self, event: MatchEvent) {
        let topic = event.topic();
        let recipient = event.recipient();
        match self.notifier.notify(event).await {
            Ok(0) => debug!(?topic, ?recipient, "Event had no receivers"),
            Ok(receivers) => debug!(?topic, ?recipient, receivers, "Event delivered"),
            Err(e) => warn!(?topic, ?recipient, error = %e, "Event delivery failed"),
        }
    }

    /// Log a rejected call and pass the error through.
    pub(crate) fn rejected(
        &self,
        operation: &'static str,
        actor: Option<UserId>,
        err: ConsensusError,
    ) -> ConsensusError {
        if err.is_transient() {
            error!(operation, actor = ?actor, code = err.code(), error = %err, "Operation failed");
        } else {
            warn!(operation, actor = ?actor, code = err.code(), error = %err, "Operation rejected");
        }
        err
    }
}
