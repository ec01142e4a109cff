//! # Outbound Ports
//!
//! Dependencies the engine needs from the outside world: the persistent
//! store, the team directory, identity resolution, notification delivery
//! and a clock.

use async_trait::async_trait;
use shared_bus::MatchEvent;
use shared_types::{
    MatchRequestId, MatchResultId, TeamId, TeamSide, Timestamp, UserId, VerificationDecision,
};
use std::sync::Arc;
use thiserror::Error;

use crate::domain::{
    MatchListFilter, MatchRequest, MatchResult, MatchStatus, OutcomeApplication, StoreError,
    TeamPair, TeamProfile, TeamStatistics,
};

/// Everything `commit_verification` needs to rule on a result.
#[derive(Clone, Debug, PartialEq)]
pub struct VerificationCommit {
    /// Result being ruled on.
    pub result_id: MatchResultId,
    /// Acting counter-party.
    pub verifier: UserId,
    /// Side the verifier acts for; their feedback lands there.
    pub verifier_side: TeamSide,
    /// Confirm or dispute.
    pub decision: VerificationDecision,
    /// Verifier feedback.
    pub feedback: Option<String>,
    /// Statistics plan. Present exactly when `decision` is confirm.
    pub application: Option<OutcomeApplication>,
    /// Commit time.
    pub at: Timestamp,
}

/// What `commit_verification` wrote.
#[derive(Clone, Debug, PartialEq)]
pub struct VerificationReceipt {
    /// The result after the transition.
    pub result: MatchResult,
    /// Updated team records, winner first. Empty on dispute.
    pub statistics: Vec<TeamStatistics>,
}

/// Persistent store with the conditional writes the engine relies on.
///
/// Every method is atomic on its own. Implementations serialize the
/// conditional sections so a lost race is reported, never half-applied.
pub trait MatchStore: Send + Sync {
    /// Insert a request unless its unordered team pair already has an
    /// active one (`ActivePairExists`).
    fn insert_request(&self, request: &MatchRequest) -> Result<(), StoreError>;

    /// Look up a request.
    fn get_request(&self, id: MatchRequestId) -> Result<Option<MatchRequest>, StoreError>;

    /// Active request holding `pair`, if any.
    fn active_request_for_pair(&self, pair: TeamPair)
        -> Result<Option<MatchRequest>, StoreError>;

    /// Move a request from `expected` to `next`. `StaleState` when the
    /// stored status is no longer `expected`.
    fn transition_request(
        &self,
        id: MatchRequestId,
        expected: MatchStatus,
        next: MatchStatus,
        at: Timestamp,
    ) -> Result<MatchRequest, StoreError>;

    /// Requests where `user` is challenger (sent), opponent (received) or
    /// either, newest first.
    fn list_requests(
        &self,
        user: UserId,
        filter: MatchListFilter,
    ) -> Result<Vec<MatchRequest>, StoreError>;

    /// Insert a result unless its request already has one (`DuplicateResult`).
    fn insert_result(&self, result: &MatchResult) -> Result<(), StoreError>;

    /// Look up a result.
    fn get_result(&self, id: MatchResultId) -> Result<Option<MatchResult>, StoreError>;

    /// Result recorded for a request.
    fn result_for_request(
        &self,
        request_id: MatchRequestId,
    ) -> Result<Option<MatchResult>, StoreError>;

    /// Transition an unverified result and, on confirm, apply the statistics
    /// plan. Both land or neither does. `StaleState` when the result is no
    /// longer unverified.
    fn commit_verification(
        &self,
        commit: VerificationCommit,
    ) -> Result<VerificationReceipt, StoreError>;

    /// Stored aggregate of a team; `None` before its first verified match.
    fn team_statistics(&self, team: TeamId) -> Result<Option<TeamStatistics>, StoreError>;
}

impl<T: MatchStore + ?Sized> MatchStore for Arc<T> {
    fn insert_request(&self, request: &MatchRequest) -> Result<(), StoreError> {
        (**self).insert_request(request)
    }

    fn get_request(&self, id: MatchRequestId) -> Result<Option<MatchRequest>, StoreError> {
        (**self).get_request(id)
    }

    fn active_request_for_pair(
        &self,
        pair: TeamPair,
    ) -> Result<Option<MatchRequest>, StoreError> {
        (**self).active_request_for_pair(pair)
    }

    fn transition_request(
        &self,
        id: MatchRequestId,
        expected: MatchStatus,
        next: MatchStatus,
        at: Timestamp,
    ) -> Result<MatchRequest, StoreError> {
        (**self).transition_request(id, expected, next, at)
    }

    fn list_requests(
        &self,
        user: UserId,
        filter: MatchListFilter,
    ) -> Result<Vec<MatchRequest>, StoreError> {
        (**self).list_requests(user, filter)
    }

    fn insert_result(&self, result: &MatchResult) -> Result<(), StoreError> {
        (**self).insert_result(result)
    }

    fn get_result(&self, id: MatchResultId) -> Result<Option<MatchResult>, StoreError> {
        (**self).get_result(id)
    }

    fn result_for_request(
        &self,
        request_id: MatchRequestId,
    ) -> Result<Option<MatchResult>, StoreError> {
        (**self).result_for_request(request_id)
    }

    fn commit_verification(
        &self,
        commit: VerificationCommit,
    ) -> Result<VerificationReceipt, StoreError> {
        (**self).commit_verification(commit)
    }

    fn team_statistics(&self, team: TeamId) -> Result<Option<TeamStatistics>, StoreError> {
        (**self).team_statistics(team)
    }
}

/// Teams and who acts for them.
pub trait TeamDirectory: Send + Sync {
    /// Look up a team.
    fn team(&self, id: TeamId) -> Option<TeamProfile>;

    /// Whether `user` may act for `team`.
    fn represents(&self, user: UserId, team: TeamId) -> bool {
        self.team(team).is_some_and(|t| t.captain == user)
    }
}

impl<T: TeamDirectory + ?Sized> TeamDirectory for Arc<T> {
    fn team(&self, id: TeamId) -> Option<TeamProfile> {
        (**self).team(id)
    }

    fn represents(&self, user: UserId, team: TeamId) -> bool {
        (**self).represents(user, team)
    }
}

/// Resolves a caller credential to a user.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// `None` for an unknown or expired credential.
    async fn resolve(&self, credential: &str) -> Option<UserId>;
}

/// Notification delivery failure. Logged, never propagated to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotificationError {
    /// The channel cannot accept events.
    #[error("Notification channel unavailable: {0}")]
    Unavailable(String),
}

/// Delivers lifecycle events to the other party.
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    /// Deliver one event. Returns how many receivers took it.
    async fn notify(&self, event: MatchEvent) -> Result<usize, NotificationError>;
}

#[async_trait]
impl<T: NotificationChannel + ?Sized> NotificationChannel for Arc<T> {
    async fn notify(&self, event: MatchEvent) -> Result<usize, NotificationError> {
        (**self).notify(event).await
    }
}

/// Time source abstraction (for testing).
pub trait TimeSource: Send + Sync {
    /// Current time in seconds since the Unix epoch.
    fn now(&self) -> Timestamp;
}

impl<T: TimeSource + ?Sized> TimeSource for Arc<T> {
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}

/// Default time source using system time.
#[derive(Default, Clone, Copy, Debug)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> Timestamp {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}
