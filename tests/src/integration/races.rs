//! # Concurrency Races
//!
//! Many callers hit one entity at the same time on a multi-thread runtime.
//! Each race must resolve to exactly one winner with every loser rejected
//! and no partial effect visible, including on the event bus.

#[cfg(test)]
mod tests {
    use crate::integration::fixtures::World;
    use futures::future::join_all;
    use match_consensus::{
        ConsensusError, MatchConsensusApi, ProposeMatch, ReportOutcome, Scores,
        VerificationState,
    };
    use shared_bus::{EventFilter, EventTopic};
    use shared_types::{MatchDecision, VerificationDecision};
    use std::sync::Arc;

    const RACERS: usize = 32;

    fn winners<T>(outcomes: &[Result<T, ConsensusError>]) -> usize {
        outcomes.iter().filter(|o| o.is_ok()).count()
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_proposals_from_both_sides_leave_one_active_request() {
        let world = Arc::new(World::new());

        let tasks = (0..RACERS).map(|i| {
            let world = world.clone();
            tokio::spawn(async move {
                let (from, to) = if i % 2 == 0 {
                    (&world.a1, &world.b1)
                } else {
                    (&world.b1, &world.a1)
                };
                world
                    .service
                    .propose_match(
                        from.captain,
                        ProposeMatch {
                            challenger_team: from.id,
                            opponent_team: to.id,
                            message: None,
                            match_type: None,
                        },
                    )
                    .await
            })
        });
        let outcomes: Vec<_> = join_all(tasks)
            .await
            .into_iter()
            .map(|joined| joined.unwrap())
            .collect();

        assert_eq!(winners(&outcomes), 1);
        assert!(outcomes
            .iter()
            .filter_map(|o| o.as_ref().err())
            .all(|e| matches!(e, ConsensusError::Conflict(_))));
        assert_eq!(world.store.request_count(), 1);
        assert_eq!(world.store.active_pair_count(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_accept_and_decline_race_has_one_outcome() {
        let world = Arc::new(World::new());
        let request = world.propose(&world.a1, &world.b1).await;
        let mut alice_inbox = world.inbox(world.alice);

        let tasks = (0..RACERS).map(|i| {
            let world = world.clone();
            let request_id = request.id;
            let decision = if i % 2 == 0 {
                MatchDecision::Accept
            } else {
                MatchDecision::Decline
            };
            tokio::spawn(async move {
                world
                    .service
                    .respond_to_match(world.bob, request_id, decision)
                    .await
            })
        });
        let outcomes: Vec<_> = join_all(tasks)
            .await
            .into_iter()
            .map(|joined| joined.unwrap())
            .collect();

        assert_eq!(winners(&outcomes), 1);
        assert!(outcomes
            .iter()
            .filter_map(|o| o.as_ref().err())
            .all(|e| matches!(e, ConsensusError::InvalidStateTransition { .. })));
        assert_eq!(alice_inbox.drain().len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_both_sides_report_at_once() {
        let world = Arc::new(World::new());
        let request = world.played(&world.a1, &world.b1).await;

        let tasks = (0..RACERS).map(|i| {
            let world = world.clone();
            let request = request.clone();
            tokio::spawn(async move {
                let (reporter, winner, scores) = if i % 2 == 0 {
                    (world.alice, world.a1.id, Scores::new(3, 0))
                } else {
                    (world.bob, world.b1.id, Scores::new(0, 3))
                };
                world
                    .service
                    .report_outcome(
                        reporter,
                        request.id,
                        ReportOutcome {
                            winner_team: winner,
                            scores,
                            duration_minutes: None,
                            best_player: None,
                            feedback: None,
                        },
                    )
                    .await
            })
        });
        let outcomes: Vec<_> = join_all(tasks)
            .await
            .into_iter()
            .map(|joined| joined.unwrap())
            .collect();

        assert_eq!(winners(&outcomes), 1);
        assert!(outcomes
            .iter()
            .filter_map(|o| o.as_ref().err())
            .all(|e| matches!(e, ConsensusError::AlreadyReported(_))));
        assert_eq!(world.store.result_count(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_confirm_and_dispute_race_aggregates_at_most_once() {
        let world = Arc::new(World::new());
        let request = world.played(&world.a1, &world.b1).await;
        let result = world.report(&request, world.alice, world.a1.id).await;
        let mut stats_events = world
            .bus
            .subscribe(EventFilter::topics(vec![EventTopic::Statistics]));

        let tasks = (0..RACERS).map(|i| {
            let world = world.clone();
            let result_id = result.id;
            let decision = if i % 3 == 0 {
                VerificationDecision::Dispute
            } else {
                VerificationDecision::Confirm
            };
            tokio::spawn(async move {
                world
                    .service
                    .verify_outcome(world.bob, result_id, decision, None)
                    .await
            })
        });
        let outcomes: Vec<_> = join_all(tasks)
            .await
            .into_iter()
            .map(|joined| joined.unwrap())
            .collect();

        assert_eq!(winners(&outcomes), 1);
        assert!(outcomes
            .iter()
            .filter_map(|o| o.as_ref().err())
            .all(|e| matches!(e, ConsensusError::AlreadyVerified { .. })));

        let final_state = world
            .service
            .get_outcome(world.alice, request.id)
            .await
            .unwrap()
            .verification_state;
        let a1 = world.service.team_statistics(world.a1.id).await.unwrap();
        let b1 = world.service.team_statistics(world.b1.id).await.unwrap();
        match final_state {
            VerificationState::Verified => {
                assert_eq!((a1.total_matches, b1.total_matches), (1, 1));
                assert_eq!((a1.wins, b1.losses), (1, 1));
                assert_eq!(stats_events.drain().len(), 2);
            }
            VerificationState::Disputed => {
                assert_eq!((a1.total_matches, b1.total_matches), (0, 0));
                assert!(stats_events.drain().is_empty());
            }
            VerificationState::Unverified => panic!("one verification must have landed"),
        }
    }
}
