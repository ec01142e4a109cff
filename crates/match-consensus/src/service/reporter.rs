//! # Outcome Reporter
//!
//! First participant to report a completed match creates its single
//! `MatchResult`. Store-level uniqueness settles simultaneous reports.

use shared_bus::MatchEvent;
use shared_types::{MatchRequestId, UserId};
use tracing::info;

use super::*;
use crate::domain::{
    invariant_best_player, invariant_duration, invariant_score_consistency, invariant_text_len,
    invariant_winner_participates, AuthSubject, MatchRequest, MatchResult, MatchStatus, Role,
};
use crate::ports::inbound::ReportOutcome;

impl<S, D, N, T> MatchConsensusService<S, D, N, T>
where
    S: MatchStore,
    D: TeamDirectory,
    N: NotificationChannel,
    T: TimeSource,
{
    pub(crate) async fn report(
        &self,
        actor: UserId,
        request_id: MatchRequestId,
        report: ReportOutcome,
    ) -> Result<MatchResult, ConsensusError> {
        let request = self.load_request(request_id)?;
        self.guard
            .authorize(actor, AuthSubject::Request(&request), Role::EitherParticipant)?;

        // Only a played match has an outcome to report
        if request.status != MatchStatus::Completed {
            return Err(ConsensusError::not_found("completed match request", request_id));
        }
        let reporter_side = request.side_of_user(actor).ok_or_else(|| {
            ConsensusError::Unauthorized(format!("user is not a participant of match {request_id}"))
        })?;

        let feedback = report
            .feedback
            .as_deref()
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .map(str::to_string);
        self.validate_report(&request, &report, feedback.as_deref())?;

        if self.store.result_for_request(request.id)?.is_some() {
            return Err(ConsensusError::AlreadyReported(request.id));
        }

        let result = MatchResult::new(
            request.id,
            report.winner_team,
            report.scores,
            report.duration_minutes,
            report.best_player,
            actor,
            reporter_side,
            feedback,
            self.time_source.now(),
        );
        // DuplicateResult maps to AlreadyReported
        self.store.insert_result(&result)?;

        info!(
            request_id = %request.id,
            result_id = %result.id,
            actor = %actor,
            winner_team = %result.winner_team,
            "Outcome reported"
        );

        self.publish(MatchEvent::OutcomeReported {
            request_id: request.id,
            result_id: result.id,
            winner_team: result.winner_team,
            recipient: request.user_on(reporter_side.opposite()),
        })
        .await;

        Ok(result)
    }

    fn validate_report(
        &self,
        request: &MatchRequest,
        report: &ReportOutcome,
        feedback: Option<&str>,
    ) -> Result<(), ConsensusError> {
        invariant_winner_participates(request, report.winner_team)?;
        invariant_best_player(request, report.best_player.as_ref())?;
        invariant_duration(report.duration_minutes, self.config.max_duration_minutes)?;
        invariant_text_len("feedback", feedback, self.config.max_feedback_len)?;
        if self.config.enforce_score_consistency {
            invariant_score_consistency(request, report.winner_team, &report.scores)?;
        }
        Ok(())
    }
}
