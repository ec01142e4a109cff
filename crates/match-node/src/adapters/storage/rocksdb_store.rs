//! # RocksDB Match Store
//!
//! Persistent implementation of `MatchStore`.
//!
//! ## Column Families
//!
//! - `match_requests` - request id → `MatchRequest`
//! - `match_results` - result id → `MatchResult`
//! - `team_statistics` - team id → `TeamStatistics`
//! - `active_pairs` - unordered team pair → id of its active request
//! - `results_by_request` - request id → result id
//! - `request_order` - big-endian insertion sequence → request id
//!
//! Keys are raw identifier bytes, values are bincode.
//!
//! ## Atomicity
//!
//! Conditional writes hold `commit_lock` across their read-check-write and
//! land as one `WriteBatch`, so the index families never disagree with the
//! entity families.

use match_consensus::{
    MatchListFilter, MatchRequest, MatchResult, MatchStatus, MatchStore, StatisticsAggregator,
    StoreError, TeamPair, TeamStatistics, VerificationCommit, VerificationReceipt,
    VerificationState,
};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, IteratorMode, Options, WriteBatch, DB};
use serde::de::DeserializeOwned;
use serde::Serialize;
use shared_types::{MatchRequestId, MatchResultId, TeamId, Timestamp, UserId};
use std::path::PathBuf;
use tracing::debug;

/// Column family names
pub const CF_MATCH_REQUESTS: &str = "match_requests";
pub const CF_MATCH_RESULTS: &str = "match_results";
pub const CF_TEAM_STATISTICS: &str = "team_statistics";
pub const CF_ACTIVE_PAIRS: &str = "active_pairs";
pub const CF_RESULTS_BY_REQUEST: &str = "results_by_request";
pub const CF_REQUEST_ORDER: &str = "request_order";

/// All column families used by the store
pub const COLUMN_FAMILIES: &[&str] = &[
    CF_MATCH_REQUESTS,
    CF_MATCH_RESULTS,
    CF_TEAM_STATISTICS,
    CF_ACTIVE_PAIRS,
    CF_RESULTS_BY_REQUEST,
    CF_REQUEST_ORDER,
];

/// RocksDB configuration
#[derive(Debug, Clone)]
pub struct RocksDbConfig {
    /// Path to the database directory
    pub path: PathBuf,
    /// Block cache size in bytes (default: 64MB)
    pub block_cache_size: usize,
    /// Write buffer size in bytes (default: 16MB)
    pub write_buffer_size: usize,
    /// Enable fsync after each write (default: true for durability)
    pub sync_writes: bool,
}

impl Default for RocksDbConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./data"),
            block_cache_size: 64 * 1024 * 1024, // 64MB
            write_buffer_size: 16 * 1024 * 1024, // 16MB
            sync_writes: true,
        }
    }
}

impl RocksDbConfig {
    /// Create config for testing (smaller buffers, no sync)
    pub fn for_testing(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            block_cache_size: 4 * 1024 * 1024, // 4MB
            write_buffer_size: 1024 * 1024,    // 1MB
            sync_writes: false,
        }
    }
}

/// RocksDB-backed `MatchStore`.
pub struct RocksDbMatchStore {
    db: DB,
    config: RocksDbConfig,
    /// Serializes every read-check-write section.
    commit_lock: Mutex<()>,
    /// Next `request_order` key. Only advanced under `commit_lock`.
    next_sequence: AtomicU64,
}

impl RocksDbMatchStore {
    /// Open or create the database.
    pub fn open(config: RocksDbConfig) -> Result<Self, StoreError> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);
        opts.set_write_buffer_size(config.write_buffer_size);
        opts.set_compression_type(rocksdb::DBCompressionType::Snappy);

        // Bloom filter for point lookups by id
        let mut block_opts = rocksdb::BlockBasedOptions::default();
        block_opts.set_bloom_filter(10.0, false);
        block_opts.set_block_cache(&rocksdb::Cache::new_lru_cache(config.block_cache_size));
        opts.set_block_based_table_factory(&block_opts);

        let cf_descriptors: Vec<ColumnFamilyDescriptor> = COLUMN_FAMILIES
            .iter()
            .map(|name| {
                let mut cf_opts = Options::default();
                cf_opts.set_compression_type(rocksdb::DBCompressionType::Snappy);
                ColumnFamilyDescriptor::new(*name, cf_opts)
            })
            .collect();

        let db = DB::open_cf_descriptors(&opts, &config.path, cf_descriptors)
            .map_err(|e| backend("open", e))?;

        let next_sequence = last_sequence(&db)?.map_or(0, |last| last + 1);

        Ok(Self {
            db,
            config,
            commit_lock: Mutex::new(()),
            next_sequence: AtomicU64::new(next_sequence),
        })
    }

    fn cf(&self, name: &'static str) -> Result<&ColumnFamily, StoreError> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| StoreError::Backend(format!("missing column family {name}")))
    }

    fn read<T: DeserializeOwned>(
        &self,
        cf: &'static str,
        key: &[u8],
    ) -> Result<Option<T>, StoreError> {
        self.db
            .get_cf(self.cf(cf)?, key)
            .map_err(|e| backend("get", e))?
            .map(|bytes| decode(&bytes))
            .transpose()
    }

    fn write(&self, batch: WriteBatch) -> Result<(), StoreError> {
        let mut write_opts = rocksdb::WriteOptions::default();
        write_opts.set_sync(self.config.sync_writes);
        self.db
            .write_opt(batch, &write_opts)
            .map_err(|e| backend("write", e))
    }
}

fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, StoreError> {
    bincode::serialize(value).map_err(|e| StoreError::Backend(format!("encode failed: {e}")))
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, StoreError> {
    bincode::deserialize(bytes).map_err(|e| StoreError::Backend(format!("decode failed: {e}")))
}

fn last_sequence(db: &DB) -> Result<Option<u64>, StoreError> {
    let cf = db
        .cf_handle(CF_REQUEST_ORDER)
        .ok_or_else(|| StoreError::Backend(format!("missing column family {CF_REQUEST_ORDER}")))?;
    match db.iterator_cf(cf, IteratorMode::End).next() {
        Some(item) => {
            let (key, _) = item.map_err(|e| backend("iterate", e))?;
            let bytes: [u8; 8] = key.as_ref().try_into().map_err(|_| {
                StoreError::Backend(format!("malformed request_order key of {} bytes", key.len()))
            })?;
            Ok(Some(u64::from_be_bytes(bytes)))
        }
        None => Ok(None),
    }
}

fn backend(operation: &str, e: rocksdb::Error) -> StoreError {
    StoreError::Backend(format!("RocksDB {operation} failed: {e}"))
}

fn request_not_found(id: MatchRequestId) -> StoreError {
    StoreError::NotFound {
        entity: "match request",
        id: id.to_string(),
    }
}

impl MatchStore for RocksDbMatchStore {
    fn insert_request(&self, request: &MatchRequest) -> Result<(), StoreError> {
        let _guard = self.commit_lock.lock();
        let pair_key = request.pair().to_key();

        if request.is_active() {
            if let Some(existing) = self.read::<MatchRequestId>(CF_ACTIVE_PAIRS, &pair_key)? {
                return Err(StoreError::ActivePairExists { existing });
            }
        }
        let requests = self.cf(CF_MATCH_REQUESTS)?;
        if self
            .db
            .get_pinned_cf(requests, request.id.as_bytes())
            .map_err(|e| backend("get", e))?
            .is_some()
        {
            return Err(StoreError::Backend(format!(
                "duplicate match request id {}",
                request.id
            )));
        }

        let sequence = self.next_sequence.load(Ordering::SeqCst);
        let mut batch = WriteBatch::default();
        batch.put_cf(requests, request.id.as_bytes(), encode(request)?);
        batch.put_cf(
            self.cf(CF_REQUEST_ORDER)?,
            sequence.to_be_bytes(),
            encode(&request.id)?,
        );
        if request.is_active() {
            batch.put_cf(self.cf(CF_ACTIVE_PAIRS)?, pair_key, encode(&request.id)?);
        }
        self.write(batch)?;
        self.next_sequence.store(sequence + 1, Ordering::SeqCst);
        debug!(request_id = %request.id, "Stored match request");
        Ok(())
    }

    fn get_request(&self, id: MatchRequestId) -> Result<Option<MatchRequest>, StoreError> {
        self.read(CF_MATCH_REQUESTS, id.as_bytes())
    }

    fn active_request_for_pair(
        &self,
        pair: TeamPair,
    ) -> Result<Option<MatchRequest>, StoreError> {
        match self.read::<MatchRequestId>(CF_ACTIVE_PAIRS, &pair.to_key())? {
            Some(id) => self.get_request(id),
            None => Ok(None),
        }
    }

    fn transition_request(
        &self,
        id: MatchRequestId,
        expected: MatchStatus,
        next: MatchStatus,
        at: Timestamp,
    ) -> Result<MatchRequest, StoreError> {
        let _guard = self.commit_lock.lock();
        let current = self.get_request(id)?.ok_or_else(|| request_not_found(id))?;

        let stale = || StoreError::StaleState {
            expected: expected.to_string(),
            actual: current.status.to_string(),
        };
        if current.status != expected {
            return Err(stale());
        }
        let mut updated = current.clone();
        updated.transition_to(next, at).map_err(|_| stale())?;

        let mut batch = WriteBatch::default();
        batch.put_cf(self.cf(CF_MATCH_REQUESTS)?, id.as_bytes(), encode(&updated)?);
        if !updated.is_active() {
            let pair_key = updated.pair().to_key();
            if self.read::<MatchRequestId>(CF_ACTIVE_PAIRS, &pair_key)? == Some(id) {
                batch.delete_cf(self.cf(CF_ACTIVE_PAIRS)?, pair_key);
            }
        }
        self.write(batch)?;
        debug!(request_id = %id, from = %expected, to = %next, "Transitioned match request");
        Ok(updated)
    }

    fn list_requests(
        &self,
        user: UserId,
        filter: MatchListFilter,
    ) -> Result<Vec<MatchRequest>, StoreError> {
        // Newest insertion first
        let mut requests = Vec::new();
        for item in self
            .db
            .iterator_cf(self.cf(CF_REQUEST_ORDER)?, IteratorMode::End)
        {
            let (_, value) = item.map_err(|e| backend("iterate", e))?;
            let id: MatchRequestId = decode(&value)?;
            let request = self.get_request(id)?.ok_or_else(|| request_not_found(id))?;
            let wanted = match filter {
                MatchListFilter::Sent => request.challenger_user == user,
                MatchListFilter::Received => request.opponent_user == user,
                MatchListFilter::All => request.is_participant(user),
            };
            if wanted {
                requests.push(request);
            }
        }
        Ok(requests)
    }

    fn insert_result(&self, result: &MatchResult) -> Result<(), StoreError> {
        let _guard = self.commit_lock.lock();
        let request_key = result.match_request_id.as_bytes();
        if let Some(existing) = self.read::<MatchResultId>(CF_RESULTS_BY_REQUEST, request_key)? {
            return Err(StoreError::DuplicateResult {
                request_id: result.match_request_id,
                existing,
            });
        }

        let mut batch = WriteBatch::default();
        batch.put_cf(self.cf(CF_MATCH_RESULTS)?, result.id.as_bytes(), encode(result)?);
        batch.put_cf(
            self.cf(CF_RESULTS_BY_REQUEST)?,
            request_key,
            encode(&result.id)?,
        );
        self.write(batch)?;
        debug!(result_id = %result.id, request_id = %result.match_request_id, "Stored match result");
        Ok(())
    }

    fn get_result(&self, id: MatchResultId) -> Result<Option<MatchResult>, StoreError> {
        self.read(CF_MATCH_RESULTS, id.as_bytes())
    }

    fn result_for_request(
        &self,
        request_id: MatchRequestId,
    ) -> Result<Option<MatchResult>, StoreError> {
        match self.read::<MatchResultId>(CF_RESULTS_BY_REQUEST, request_id.as_bytes())? {
            Some(id) => self.get_result(id),
            None => Ok(None),
        }
    }

    fn commit_verification(
        &self,
        commit: VerificationCommit,
    ) -> Result<VerificationReceipt, StoreError> {
        let _guard = self.commit_lock.lock();
        let mut result = self
            .get_result(commit.result_id)?
            .ok_or_else(|| StoreError::NotFound {
                entity: "match result",
                id: commit.result_id.to_string(),
            })?;

        if result.verification_state != VerificationState::Unverified {
            return Err(StoreError::StaleState {
                expected: VerificationState::Unverified.to_string(),
                actual: result.verification_state.to_string(),
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

        let mut batch = WriteBatch::default();
        let mut statistics = Vec::new();
        if let Some(plan) = commit.application {
            let mut winner = self
                .team_statistics(plan.winner)?
                .unwrap_or_else(|| TeamStatistics::empty(plan.winner));
            let mut loser = self
                .team_statistics(plan.loser)?
                .unwrap_or_else(|| TeamStatistics::empty(plan.loser));
            StatisticsAggregator::apply_outcome(&plan, &mut winner, &mut loser, commit.at)
                .map_err(|e| StoreError::Backend(e.to_string()))?;

            let stats_cf = self.cf(CF_TEAM_STATISTICS)?;
            for stats in [&winner, &loser] {
                batch.put_cf(stats_cf, stats.team_id.as_bytes(), encode(stats)?);
            }
            statistics.push(winner);
            statistics.push(loser);
        }
        batch.put_cf(self.cf(CF_MATCH_RESULTS)?, result.id.as_bytes(), encode(&result)?);

        // Result state and statistics land together or not at all
        self.write(batch)?;
        debug!(
            result_id = %result.id,
            state = %result.verification_state,
            teams_updated = statistics.len(),
            "Committed verification"
        );

        Ok(VerificationReceipt { result, statistics })
    }

    fn team_statistics(&self, team: TeamId) -> Result<Option<TeamStatistics>, StoreError> {
        self.read(CF_TEAM_STATISTICS, team.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use match_consensus::{OutcomeApplication, Scores};
    use shared_types::{TeamSide, VerificationDecision};
    use tempfile::TempDir;

    fn open() -> (TempDir, RocksDbMatchStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = RocksDbMatchStore::open(RocksDbConfig::for_testing(dir.path())).unwrap();
        (dir, store)
    }

    fn pending(a: TeamId, b: TeamId, at: Timestamp) -> MatchRequest {
        MatchRequest::new(a, b, UserId::new(), UserId::new(), "scrim".into(), None, at)
    }

    fn completed_with_result(store: &RocksDbMatchStore) -> (MatchRequest, MatchResult) {
        let req = pending(TeamId::new(), TeamId::new(), 1);
        store.insert_request(&req).unwrap();
        store
            .transition_request(req.id, MatchStatus::Pending, MatchStatus::Accepted, 2)
            .unwrap();
        let req = store
            .transition_request(req.id, MatchStatus::Accepted, MatchStatus::Completed, 3)
            .unwrap();
        let result = MatchResult::new(
            req.id,
            req.challenger_team,
            Scores::new(2, 1),
            Some(35),
            None,
            req.challenger_user,
            TeamSide::Challenger,
            Some("close one".into()),
            4,
        );
        store.insert_result(&result).unwrap();
        (req, result)
    }

    #[test]
    fn test_request_roundtrip_and_pair_guard() {
        let (_dir, store) = open();
        let (a, b) = (TeamId::new(), TeamId::new());
        let first = pending(a, b, 1);
        store.insert_request(&first).unwrap();

        assert_eq!(store.get_request(first.id).unwrap(), Some(first.clone()));
        assert_eq!(
            store.insert_request(&pending(b, a, 2)),
            Err(StoreError::ActivePairExists { existing: first.id })
        );
        assert_eq!(
            store.active_request_for_pair(TeamPair::new(b, a)).unwrap(),
            Some(first)
        );
    }

    #[test]
    fn test_terminal_transition_releases_pair() {
        let (_dir, store) = open();
        let (a, b) = (TeamId::new(), TeamId::new());
        let first = pending(a, b, 1);
        store.insert_request(&first).unwrap();
        store
            .transition_request(first.id, MatchStatus::Pending, MatchStatus::Declined, 2)
            .unwrap();

        assert_eq!(store.active_request_for_pair(TeamPair::new(a, b)).unwrap(), None);
        assert!(store.insert_request(&pending(b, a, 3)).is_ok());

        let err = store
            .transition_request(first.id, MatchStatus::Pending, MatchStatus::Accepted, 4)
            .unwrap_err();
        assert!(matches!(err, StoreError::StaleState { ref actual, .. } if actual == "declined"));
    }

    #[test]
    fn test_list_newest_first() {
        let (_dir, store) = open();
        let older = pending(TeamId::new(), TeamId::new(), 10);
        let mut newer = pending(TeamId::new(), TeamId::new(), 20);
        newer.challenger_user = older.challenger_user;
        store.insert_request(&older).unwrap();
        store.insert_request(&newer).unwrap();

        let sent = store
            .list_requests(older.challenger_user, MatchListFilter::Sent)
            .unwrap();
        assert_eq!(
            sent.iter().map(|r| r.id).collect::<Vec<_>>(),
            vec![newer.id, older.id]
        );
        assert!(store
            .list_requests(older.challenger_user, MatchListFilter::Received)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_list_ties_keep_reverse_insertion_order() {
        let (_dir, store) = open();
        let user = UserId::new();
        let mut inserted = Vec::new();
        for _ in 0..5 {
            let mut request = pending(TeamId::new(), TeamId::new(), 42);
            request.opponent_user = user;
            store.insert_request(&request).unwrap();
            inserted.push(request.id);
        }
        inserted.reverse();

        let received = store.list_requests(user, MatchListFilter::Received).unwrap();
        assert_eq!(received.iter().map(|r| r.id).collect::<Vec<_>>(), inserted);
    }

    #[test]
    fn test_unique_result_per_request() {
        let (_dir, store) = open();
        let (req, result) = completed_with_result(&store);

        let again = MatchResult::new(
            req.id,
            req.opponent_team,
            Scores::new(0, 3),
            None,
            None,
            req.opponent_user,
            TeamSide::Opponent,
            None,
            5,
        );
        assert_eq!(
            store.insert_result(&again),
            Err(StoreError::DuplicateResult {
                request_id: req.id,
                existing: result.id,
            })
        );
        assert_eq!(store.result_for_request(req.id).unwrap(), Some(result));
    }

    #[test]
    fn test_commit_verification_applies_statistics_once() {
        let (_dir, store) = open();
        let (req, result) = completed_with_result(&store);
        let commit = VerificationCommit {
            result_id: result.id,
            verifier: req.opponent_user,
            verifier_side: TeamSide::Opponent,
            decision: VerificationDecision::Confirm,
            feedback: Some("gg".into()),
            application: Some(OutcomeApplication {
                winner: req.challenger_team,
                loser: req.opponent_team,
            }),
            at: 6,
        };

        let receipt = store.commit_verification(commit.clone()).unwrap();
        assert_eq!(receipt.result.verification_state, VerificationState::Verified);
        assert_eq!(receipt.statistics.len(), 2);

        assert!(matches!(
            store.commit_verification(commit),
            Err(StoreError::StaleState { .. })
        ));

        let winner = store.team_statistics(req.challenger_team).unwrap().unwrap();
        let loser = store.team_statistics(req.opponent_team).unwrap().unwrap();
        assert_eq!((winner.wins, winner.losses, winner.total_matches), (1, 0, 1));
        assert_eq!((loser.wins, loser.losses, loser.total_matches), (0, 1, 1));
        assert_eq!(
            store.get_result(result.id).unwrap().unwrap().verification_state,
            VerificationState::Verified
        );
    }

    #[test]
    fn test_state_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let request = {
            let store = RocksDbMatchStore::open(RocksDbConfig::for_testing(dir.path())).unwrap();
            let request = pending(TeamId::new(), TeamId::new(), 1);
            store.insert_request(&request).unwrap();
            request
        };

        let store = RocksDbMatchStore::open(RocksDbConfig::for_testing(dir.path())).unwrap();
        assert_eq!(store.get_request(request.id).unwrap(), Some(request.clone()));
        assert!(store.active_request_for_pair(request.pair()).unwrap().is_some());

        // Ordering continues after the persisted sequence
        let mut later = pending(TeamId::new(), TeamId::new(), 1);
        later.challenger_user = request.challenger_user;
        store.insert_request(&later).unwrap();
        let sent = store
            .list_requests(request.challenger_user, MatchListFilter::Sent)
            .unwrap();
        assert_eq!(
            sent.iter().map(|r| r.id).collect::<Vec<_>>(),
            vec![later.id, request.id]
        );
    }
}
