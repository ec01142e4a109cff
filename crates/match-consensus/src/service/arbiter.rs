//! # Verification Arbiter
//!
//! The participant who did not report confirms or disputes. A confirm
//! applies statistics in the same store commit as the state change, so a
//! result is counted exactly once or not at all.

use shared_bus::MatchEvent;
use shared_types::{MatchResultId, UserId, VerificationDecision};
use tracing::info;

use super::*;
use crate::domain::{
    invariant_text_len, AuthSubject, MatchResult, Role, StatisticsAggregator, StoreError,
};
use crate::ports::outbound::VerificationCommit;

impl<S, D, N, T> MatchConsensusService<S, D, N, T>
where
    S: MatchStore,
    D: TeamDirectory,
    N: NotificationChannel,
    T: TimeSource,
{
    pub(crate) async fn verify(
        &self,
        actor: UserId,
        result_id: MatchResultId,
        decision: VerificationDecision,
        feedback: Option<String>,
    ) -> Result<MatchResult, ConsensusError> {
        let result = self.load_result(result_id)?;
        let request = self.load_request(result.match_request_id)?;

        // Role first: the reporter is refused whatever state the result is in
        self.guard.authorize(
            actor,
            AuthSubject::Outcome {
                request: &request,
                result: &result,
            },
            Role::ReporterCounterpart,
        )?;

        let feedback = feedback
            .map(|f| f.trim().to_string())
            .filter(|f| !f.is_empty());
        invariant_text_len("feedback", feedback.as_deref(), self.config.max_feedback_len)?;

        if result.verification_state.is_terminal() {
            return Err(ConsensusError::AlreadyVerified {
                result_id,
                state: result.verification_state.to_string(),
            });
        }

        let verifier_side = request.side_of_user(actor).ok_or_else(|| {
            ConsensusError::Unauthorized(format!(
                "user is not a participant of match {}",
                request.id
            ))
        })?;
        let application = match decision {
            VerificationDecision::Confirm => Some(StatisticsAggregator::plan(&request, &result)?),
            VerificationDecision::Dispute => None,
        };

        let receipt = self
            .store
            .commit_verification(VerificationCommit {
                result_id,
                verifier: actor,
                verifier_side,
                decision,
                feedback,
                application,
                at: self.time_source.now(),
            })
            .map_err(|e| match e {
                StoreError::StaleState { actual, .. } => ConsensusError::AlreadyVerified {
                    result_id,
                    state: actual,
                },
                other => other.into(),
            })?;

        info!(
            request_id = %request.id,
            result_id = %result_id,
            actor = %actor,
            decision = %decision,
            state = %receipt.result.verification_state,
            teams_updated = receipt.statistics.len(),
            "Outcome verified"
        );

        self.publish(MatchEvent::OutcomeVerified {
            request_id: request.id,
            result_id,
            decision,
            recipient: receipt.result.reporter_user,
        })
        .await;

        for stats in &receipt.statistics {
            info!(
                team = %stats.team_id,
                wins = stats.wins,
                losses = stats.losses,
                total = stats.total_matches,
                "Team statistics updated"
            );
            self.publish(MatchEvent::StatisticsUpdated {
                team_id: stats.team_id,
                wins: stats.wins,
                losses: stats.losses,
                total_matches: stats.total_matches,
                win_rate: stats.win_rate,
            })
            .await;
        }

        Ok(receipt.result)
    }
}
