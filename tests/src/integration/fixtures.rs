//! # Test World
//!
//! One consensus service over the in-memory adapters and a real event bus,
//! with three teams captained by alice (A1), bob (B1) and carol (C1).

use match_consensus::{
    BusNotifier, ConsensusConfig, InMemoryMatchStore, InMemoryTeamDirectory, ManualClock,
    MatchConsensusApi, MatchConsensusDependencies, MatchConsensusService, MatchRequest,
    MatchResult, ProposeMatch, ReportOutcome, Scores, TeamProfile,
};
use shared_bus::{EventFilter, InMemoryEventBus, Subscription};
use shared_types::{MatchDecision, TeamId, UserId};
use std::sync::Arc;

/// Service type used throughout the suite.
pub type WorldService = MatchConsensusService<
    Arc<InMemoryMatchStore>,
    Arc<InMemoryTeamDirectory>,
    BusNotifier,
    Arc<ManualClock>,
>;

/// Start of every world clock.
pub const GENESIS: u64 = 1_700_000_000;

/// Everything a scenario needs.
pub struct World {
    pub service: Arc<WorldService>,
    pub store: Arc<InMemoryMatchStore>,
    pub bus: Arc<InMemoryEventBus>,
    pub clock: Arc<ManualClock>,
    pub alice: UserId,
    pub bob: UserId,
    pub carol: UserId,
    pub a1: TeamProfile,
    pub b1: TeamProfile,
    pub c1: TeamProfile,
}

impl World {
    /// World with the default configuration.
    pub fn new() -> Self {
        Self::with_config(ConsensusConfig::default())
    }

    /// World with a custom configuration.
    pub fn with_config(config: ConsensusConfig) -> Self {
        let store = Arc::new(InMemoryMatchStore::new());
        let directory = Arc::new(InMemoryTeamDirectory::new());
        let bus = Arc::new(InMemoryEventBus::new());
        let clock = Arc::new(ManualClock::new(GENESIS));

        let (alice, bob, carol) = (UserId::new(), UserId::new(), UserId::new());
        let a1 = directory.create_team("A1", alice);
        let b1 = directory.create_team("B1", bob);
        let c1 = directory.create_team("C1", carol);

        let service = MatchConsensusService::new(
            MatchConsensusDependencies {
                store: store.clone(),
                directory,
                notifier: BusNotifier::new(bus.clone()),
                time_source: clock.clone(),
            },
            config,
        )
        .expect("default config is valid");

        Self {
            service: Arc::new(service),
            store,
            bus,
            clock,
            alice,
            bob,
            carol,
            a1,
            b1,
            c1,
        }
    }

    /// Subscribe to everything addressed to `user`.
    pub fn inbox(&self, user: UserId) -> Subscription {
        self.bus.subscribe(EventFilter::for_recipient(user))
    }

    /// `from`'s captain challenges `to`.
    pub async fn propose(&self, from: &TeamProfile, to: &TeamProfile) -> MatchRequest {
        self.service
            .propose_match(
                from.captain,
                ProposeMatch {
                    challenger_team: from.id,
                    opponent_team: to.id,
                    message: Some("scrim tonight?".into()),
                    match_type: None,
                },
            )
            .await
            .expect("proposal accepted")
    }

    /// Propose, accept and complete a match between `from` and `to`.
    pub async fn played(&self, from: &TeamProfile, to: &TeamProfile) -> MatchRequest {
        let request = self.propose(from, to).await;
        self.clock.advance(60);
        self.service
            .respond_to_match(to.captain, request.id, MatchDecision::Accept)
            .await
            .expect("opponent accepts");
        self.clock.advance(3_600);
        self.service
            .complete_match(from.captain, request.id)
            .await
            .expect("challenger completes")
    }

    /// `reporter` submits `winner` with a consistent score line.
    pub async fn report(
        &self,
        request: &MatchRequest,
        reporter: UserId,
        winner: TeamId,
    ) -> MatchResult {
        let scores = if winner == request.challenger_team {
            Scores::new(2, 1)
        } else {
            Scores::new(1, 2)
        };
        self.service
            .report_outcome(
                reporter,
                request.id,
                ReportOutcome {
                    winner_team: winner,
                    scores,
                    duration_minutes: Some(45),
                    best_player: None,
                    feedback: Some("good match".into()),
                },
            )
            .await
            .expect("report accepted")
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}
