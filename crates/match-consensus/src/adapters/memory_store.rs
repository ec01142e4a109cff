//! In-memory `MatchStore`.
//!
//! All tables sit behind one `parking_lot::RwLock`, so every conditional
//! write (pair-guarded insert, status CAS, unique result insert, the
//! verification + statistics commit) runs under a single write guard.

use parking_lot::RwLock;
use shared_types::{MatchRequestId, MatchResultId, TeamId, UserId};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

use crate::domain::{
    MatchListFilter, MatchRequest, MatchResult, MatchStatus, StatisticsAggregator, StoreError,
    TeamPair, TeamStatistics, VerificationState,
};
use crate::ports::{MatchStore, VerificationCommit, VerificationReceipt};

#[derive(Default)]
struct StoreState {
    requests: HashMap<MatchRequestId, MatchRequest>,
    /// Insertion order, oldest first.
    request_order: Vec<MatchRequestId>,
    active_pairs: HashMap<TeamPair, MatchRequestId>,
    results: HashMap<MatchResultId, MatchResult>,
    results_by_request: HashMap<MatchRequestId, MatchResultId>,
    statistics: HashMap<TeamId, TeamStatistics>,
}

/// Process-local store for tests and single-node deployments.
#[derive(Default)]
pub struct InMemoryMatchStore {
    state: RwLock<StoreState>,
    fail_next_commit: AtomicBool,
}

impl InMemoryMatchStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `commit_verification` fail after all checks pass and
    /// before anything is written.
    pub fn fail_next_commit(&self) {
        self.fail_next_commit.store(true, Ordering::SeqCst);
    }

    /// Number of stored requests.
    pub fn request_count(&self) -> usize {
        self.state.read().requests.len()
    }

    /// Number of stored results.
    pub fn result_count(&self) -> usize {
        self.state.read().results.len()
    }

    /// Number of team pairs currently held by an active request.
    pub fn active_pair_count(&self) -> usize {
        self.state.read().active_pairs.len()
    }
}

impl MatchStore for InMemoryMatchStore {
    fn insert_request(&self, request: &MatchRequest) -> Result<(), StoreError> {
        let mut state = self.state.write();
        let pair = request.pair();

        if request.is_active() {
            if let Some(existing) = state.active_pairs.get(&pair) {
                return Err(StoreError::ActivePairExists {
                    existing: *existing,
                });
            }
        }
        if state.requests.contains_key(&request.id) {
            return Err(StoreError::Backend(format!(
                "duplicate match request id {}",
                request.id
            )));
        }

        if request.is_active() {
            state.active_pairs.insert(pair, request.id);
        }
        state.requests.insert(request.id, request.clone());
        state.request_order.push(request.id);
        debug!(request_id = %request.id, "Stored match request");
        Ok(())
    }

    fn get_request(&self, id: MatchRequestId) -> Result<Option<MatchRequest>, StoreError> {
        Ok(self.state.read().requests.get(&id).cloned())
    }

    fn active_request_for_pair(
        &self,
        pair: TeamPair,
    ) -> Result<Option<MatchRequest>, StoreError> {
        let state = self.state.read();
        Ok(state
            .active_pairs
            .get(&pair)
            .and_then(|id| state.requests.get(id))
            .cloned())
    }

    fn transition_request(
        &self,
        id: MatchRequestId,
        expected: MatchStatus,
        next: MatchStatus,
        at: shared_types::Timestamp,
    ) -> Result<MatchRequest, StoreError> {
        let mut state = self.state.write();
        let current = state
            .requests
            .get(&id)
            .ok_or_else(|| StoreError::NotFound {
                entity: "match request",
                id: id.to_string(),
            })?;

        if current.status != expected {
            return Err(StoreError::StaleState {
                expected: expected.to_string(),
                actual: current.status.to_string(),
            });
        }

        let mut updated = current.clone();
        updated
            .transition_to(next, at)
            .map_err(|_| StoreError::StaleState {
                expected: expected.to_string(),
                actual: current.status.to_string(),
            })?;

        if !updated.is_active() {
            let pair = updated.pair();
            if state.active_pairs.get(&pair) == Some(&id) {
                state.active_pairs.remove(&pair);
            }
        }
        state.requests.insert(id, updated.clone());
        debug!(request_id = %id, from = %expected, to = %next, "Transitioned match request");
        Ok(updated)
    }

    fn list_requests(
        &self,
        user: UserId,
        filter: MatchListFilter,
    ) -> Result<Vec<MatchRequest>, StoreError> {
        let state = self.state.read();
        Ok(state
            .request_order
            .iter()
            .rev()
            .filter_map(|id| state.requests.get(id))
            .filter(|r| match filter {
                MatchListFilter::Sent => r.challenger_user == user,
                MatchListFilter::Received => r.opponent_user == user,
                MatchListFilter::All => r.is_participant(user),
            })
            .cloned()
            .collect())
    }

    fn insert_result(&self, result: &MatchResult) -> Result<(), StoreError> {
        let mut state = self.state.write();
        if let Some(existing) = state.results_by_request.get(&result.match_request_id) {
            return Err(StoreError::DuplicateResult {
                request_id: result.match_request_id,
                existing: *existing,
            });
        }
        state
            .results_by_request
            .insert(result.match_request_id, result.id);
        state.results.insert(result.id, result.clone());
        debug!(result_id = %result.id, request_id = %result.match_request_id, "Stored match result");
        Ok(())
    }

    fn get_result(&self, id: MatchResultId) -> Result<Option<MatchResult>, StoreError> {
        Ok(self.state.read().results.get(&id).cloned())
    }

    fn result_for_request(
        &self,
        request_id: MatchRequestId,
    ) -> Result<Option<MatchResult>, StoreError> {
        let state = self.state.read();
        Ok(state
            .results_by_request
            .get(&request_id)
            .and_then(|id| state.results.get(id))
            .cloned())
    }

    fn commit_verification(
        &self,
        commit: VerificationCommit,
    ) -> Result<VerificationReceipt, StoreError> {
        let mut state = self.state.write();

        let mut result = state
            .results
            .get(&commit.result_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                entity: "match result",
                id: commit.result_id.to_string(),
            })?;

        let current = result.verification_state;
        if current != VerificationState::Unverified {
            return Err(StoreError::StaleState {
                expected: VerificationState::Unverified.to_string(),
                actual: current.to_string(),
            });
        }
        result
            .record_verification(
                commit.verifier,
                commit.verifier_side,
                commit.decision,
                commit.feedback,
                commit.at,
            )
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        let mut statistics = Vec::new();
        if let Some(plan) = commit.application {
            let mut winner = state
                .statistics
                .get(&plan.winner)
                .cloned()
                .unwrap_or_else(|| TeamStatistics::empty(plan.winner));
            let mut loser = state
                .statistics
                .get(&plan.loser)
                .cloned()
                .unwrap_or_else(|| TeamStatistics::empty(plan.loser));
            StatisticsAggregator::apply_outcome(&plan, &mut winner, &mut loser, commit.at)
                .map_err(|e| StoreError::Backend(e.to_string()))?;
            statistics.push(winner);
            statistics.push(loser);
        }

        if self.fail_next_commit.swap(false, Ordering::SeqCst) {
            return Err(StoreError::Backend("injected commit failure".into()));
        }

        // Nothing has been written before this point
        for stats in &statistics {
            state.statistics.insert(stats.team_id, stats.clone());
        }
        state.results.insert(result.id, result.clone());
        debug!(
            result_id = %result.id,
            state = %result.verification_state,
            teams_updated = statistics.len(),
            "Committed verification"
        );

        Ok(VerificationReceipt { result, statistics })
    }

    fn team_statistics(&self, team: TeamId) -> Result<Option<TeamStatistics>, StoreError> {
        Ok(self.state.read().statistics.get(&team).cloned())
    }
}
