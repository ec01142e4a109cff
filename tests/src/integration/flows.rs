//! # End-to-End Flows
//!
//! Full lifecycles across `match-consensus` and `shared-bus`:
//!
//! 1. **Confirm**: propose → accept → complete → report → confirm → statistics
//! 2. **Dispute**: same, ending `disputed` with statistics untouched
//! 3. **Self-verification**: the reporter can never rule on their own report
//! 4. **Choreography**: each step notifies exactly the other party

#[cfg(test)]
mod tests {
    use crate::integration::fixtures::World;
    use match_consensus::{
        ConsensusError, MatchConsensusApi, MatchListFilter, MatchStatus, VerificationState,
    };
    use shared_bus::{EventFilter, EventTopic, MatchEvent};
    use shared_types::{MatchDecision, VerificationDecision};

    // =========================================================================
    // OUTCOME SCENARIOS
    // =========================================================================

    #[tokio::test]
    async fn test_confirmed_outcome_updates_both_teams() {
        let world = World::new();
        let request = world.played(&world.a1, &world.b1).await;
        assert_eq!(request.status, MatchStatus::Completed);

        let result = world.report(&request, world.alice, world.a1.id).await;
        assert_eq!(result.verification_state, VerificationState::Unverified);

        let verified = world
            .service
            .verify_outcome(
                world.bob,
                result.id,
                VerificationDecision::Confirm,
                Some("well played".into()),
            )
            .await
            .unwrap();
        assert_eq!(verified.verification_state, VerificationState::Verified);
        assert_eq!(verified.verifier_user, Some(world.bob));

        let a1 = world.service.team_statistics(world.a1.id).await.unwrap();
        let b1 = world.service.team_statistics(world.b1.id).await.unwrap();
        assert_eq!((a1.wins, a1.losses, a1.total_matches), (1, 0, 1));
        assert_eq!((b1.wins, b1.losses, b1.total_matches), (0, 1, 1));
        assert_eq!(a1.win_rate, 1.0);
        assert_eq!(b1.win_rate, 0.0);

        let stored = world
            .service
            .get_outcome(world.alice, request.id)
            .await
            .unwrap();
        assert_eq!(stored, verified);
    }

    #[tokio::test]
    async fn test_disputed_outcome_leaves_statistics_untouched() {
        let world = World::new();
        let request = world.played(&world.a1, &world.b1).await;
        let result = world.report(&request, world.alice, world.a1.id).await;

        let disputed = world
            .service
            .verify_outcome(world.bob, result.id, VerificationDecision::Dispute, None)
            .await
            .unwrap();
        assert_eq!(disputed.verification_state, VerificationState::Disputed);

        for team in [world.a1.id, world.b1.id] {
            let stats = world.service.team_statistics(team).await.unwrap();
            assert_eq!(stats.total_matches, 0);
            assert_eq!(stats.win_rate, 0.0);
        }

        // Disputed is final
        let err = world
            .service
            .verify_outcome(world.bob, result.id, VerificationDecision::Confirm, None)
            .await
            .unwrap_err();
        assert!(matches!(err, ConsensusError::AlreadyVerified { .. }));
    }

    #[tokio::test]
    async fn test_reporter_cannot_verify_own_outcome() {
        let world = World::new();
        let request = world.played(&world.a1, &world.b1).await;
        let result = world.report(&request, world.alice, world.a1.id).await;

        for decision in [VerificationDecision::Confirm, VerificationDecision::Dispute] {
            let err = world
                .service
                .verify_outcome(world.alice, result.id, decision, None)
                .await
                .unwrap_err();
            assert_eq!(err, ConsensusError::SelfVerification);
        }

        let unchanged = world
            .service
            .get_outcome(world.bob, request.id)
            .await
            .unwrap();
        assert_eq!(unchanged.verification_state, VerificationState::Unverified);

        // The counter-party can still rule on it
        world
            .service
            .verify_outcome(world.bob, result.id, VerificationDecision::Confirm, None)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_opponent_report_is_ruled_by_challenger() {
        let world = World::new();
        let request = world.played(&world.a1, &world.b1).await;
        let result = world.report(&request, world.bob, world.b1.id).await;

        let err = world
            .service
            .verify_outcome(world.bob, result.id, VerificationDecision::Confirm, None)
            .await
            .unwrap_err();
        assert_eq!(err, ConsensusError::SelfVerification);

        world
            .service
            .verify_outcome(world.alice, result.id, VerificationDecision::Confirm, None)
            .await
            .unwrap();
        let b1 = world.service.team_statistics(world.b1.id).await.unwrap();
        assert_eq!(b1.wins, 1);
    }

    #[tokio::test]
    async fn test_outsider_is_locked_out_of_every_stage() {
        let world = World::new();
        let request = world.propose(&world.a1, &world.b1).await;

        let err = world
            .service
            .respond_to_match(world.carol, request.id, MatchDecision::Accept)
            .await
            .unwrap_err();
        assert!(matches!(err, ConsensusError::Unauthorized(_)));

        world
            .service
            .respond_to_match(world.bob, request.id, MatchDecision::Accept)
            .await
            .unwrap();
        let err = world
            .service
            .complete_match(world.carol, request.id)
            .await
            .unwrap_err();
        assert!(matches!(err, ConsensusError::Unauthorized(_)));

        world
            .service
            .complete_match(world.bob, request.id)
            .await
            .unwrap();
        let result = world.report(&request, world.alice, world.a1.id).await;
        let err = world
            .service
            .verify_outcome(world.carol, result.id, VerificationDecision::Confirm, None)
            .await
            .unwrap_err();
        assert!(matches!(err, ConsensusError::Unauthorized(_)));

        assert!(world
            .service
            .list_matches(world.carol, MatchListFilter::All)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_win_rate_over_several_matches() {
        let world = World::new();

        // B1 wins twice, A1 once; the pair is free again after each completion
        for winner in [world.b1.id, world.a1.id, world.b1.id] {
            let request = world.played(&world.a1, &world.b1).await;
            let result = world.report(&request, world.alice, winner).await;
            world
                .service
                .verify_outcome(world.bob, result.id, VerificationDecision::Confirm, None)
                .await
                .unwrap();
        }

        let a1 = world.service.team_statistics(world.a1.id).await.unwrap();
        let b1 = world.service.team_statistics(world.b1.id).await.unwrap();
        assert_eq!((a1.wins, a1.losses, a1.total_matches), (1, 2, 3));
        assert_eq!((b1.wins, b1.losses, b1.total_matches), (2, 1, 3));
        assert!((a1.win_rate - 1.0 / 3.0).abs() < 1e-9);
        assert!((b1.win_rate - 2.0 / 3.0).abs() < 1e-9);

        let history = world
            .service
            .list_matches(world.bob, MatchListFilter::Received)
            .await
            .unwrap();
        assert_eq!(history.len(), 3);
        assert!(history.windows(2).all(|w| w[0].created_at >= w[1].created_at));
    }

    #[tokio::test]
    async fn test_declined_request_frees_the_pair() {
        let world = World::new();
        let first = world.propose(&world.a1, &world.b1).await;
        let declined = world
            .service
            .respond_to_match(world.bob, first.id, MatchDecision::Decline)
            .await
            .unwrap();
        assert_eq!(declined.status, MatchStatus::Declined);

        // B1 may now challenge A1 in the other direction
        let second = world.propose(&world.b1, &world.a1).await;
        assert_eq!(second.challenger_team, world.b1.id);
        assert_eq!(world.store.active_pair_count(), 1);

        let err = world
            .service
            .report_outcome(
                world.alice,
                first.id,
                match_consensus::ReportOutcome {
                    winner_team: world.a1.id,
                    scores: match_consensus::Scores::new(1, 0),
                    duration_minutes: None,
                    best_player: None,
                    feedback: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ConsensusError::NotFound { .. }));
    }

    // =========================================================================
    // EVENT CHOREOGRAPHY
    // =========================================================================

    #[tokio::test]
    async fn test_each_step_notifies_the_other_party() {
        let world = World::new();
        let mut alice_inbox = world.inbox(world.alice);
        let mut bob_inbox = world.inbox(world.bob);
        let mut carol_inbox = world.inbox(world.carol);

        let request = world.played(&world.a1, &world.b1).await;
        let result = world.report(&request, world.alice, world.a1.id).await;
        world
            .service
            .verify_outcome(world.bob, result.id, VerificationDecision::Confirm, None)
            .await
            .unwrap();

        let to_bob = bob_inbox.drain();
        assert_eq!(to_bob.len(), 3, "{to_bob:?}");
        assert!(matches!(to_bob[0], MatchEvent::MatchProposed { request_id, .. } if request_id == request.id));
        assert!(matches!(to_bob[1], MatchEvent::MatchCompleted { completed_by, .. } if completed_by == world.alice));
        assert!(matches!(to_bob[2], MatchEvent::OutcomeReported { result_id, .. } if result_id == result.id));

        let to_alice = alice_inbox.drain();
        assert_eq!(to_alice.len(), 2, "{to_alice:?}");
        assert!(matches!(
            to_alice[0],
            MatchEvent::MatchResponded { decision: MatchDecision::Accept, .. }
        ));
        assert!(matches!(
            to_alice[1],
            MatchEvent::OutcomeVerified { decision: VerificationDecision::Confirm, .. }
        ));

        assert!(carol_inbox.drain().is_empty());
    }

    #[tokio::test]
    async fn test_statistics_events_follow_confirmation_only() {
        let world = World::new();
        let mut stats = world
            .bus
            .subscribe(EventFilter::topics(vec![EventTopic::Statistics]));

        let disputed = world.played(&world.a1, &world.b1).await;
        let result = world.report(&disputed, world.bob, world.b1.id).await;
        world
            .service
            .verify_outcome(world.alice, result.id, VerificationDecision::Dispute, None)
            .await
            .unwrap();
        assert!(stats.drain().is_empty());

        let confirmed = world.played(&world.a1, &world.b1).await;
        let result = world.report(&confirmed, world.bob, world.b1.id).await;
        world
            .service
            .verify_outcome(world.alice, result.id, VerificationDecision::Confirm, None)
            .await
            .unwrap();

        let events = stats.drain();
        assert_eq!(events.len(), 2);
        match &events[0] {
            MatchEvent::StatisticsUpdated {
                team_id,
                wins,
                total_matches,
                ..
            } => {
                assert_eq!(*team_id, world.b1.id);
                assert_eq!((*wins, *total_matches), (1, 1));
            }
            other => panic!("Expected StatisticsUpdated, got {other:?}"),
        }
        assert!(matches!(
            events[1],
            MatchEvent::StatisticsUpdated { team_id, losses: 1, .. } if team_id == world.a1.id
        ));
    }
}
