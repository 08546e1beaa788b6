//! Score submission and ranked leaderboard
//!
//! Records live in memory for the lifetime of the process. Storage errors
//! never reach the simulation: a finished run keeps its score whether or
//! not submission succeeds.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Longest accepted player name (characters)
pub const MAX_NAME_LEN: usize = 15;

/// Entries shown on the leaderboard
pub const LEADERBOARD_SIZE: usize = 5;

/// Submission failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScoreError {
    /// Malformed or out-of-range payload
    Validation(String),
    /// Store could not complete the request
    Storage(String),
}

impl ScoreError {
    /// HTTP status a server front-end should answer with
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::Storage(_) => 500,
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Storage(_))
    }
}

impl std::fmt::Display for ScoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(m) => write!(f, "Invalid score data: {m}"),
            Self::Storage(m) => write!(f, "Failed to save score: {m}"),
        }
    }
}

impl std::error::Error for ScoreError {}

/// Incoming score payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreSubmission {
    pub player_name: String,
    pub score: i64,
    /// Whole seconds
    pub time_elapsed: i64,
}

impl ScoreSubmission {
    /// Build a submission from a finished run
    pub fn from_run(player_name: &str, score: u64, elapsed_secs: f32) -> Self {
        Self {
            player_name: player_name.to_string(),
            score: i64::try_from(score).unwrap_or(i64::MAX),
            time_elapsed: elapsed_secs.max(0.0).round() as i64,
        }
    }

    /// Like `from_run`, but `None` for a run that scored nothing
    pub fn for_leaderboard(player_name: &str, score: u64, elapsed_secs: f32) -> Option<Self> {
        (score > 0).then(|| Self::from_run(player_name, score, elapsed_secs))
    }

    /// Parse a JSON body. Missing or mistyped fields are validation errors.
    pub fn from_json(body: &str) -> Result<Self, ScoreError> {
        let submission: Self =
            serde_json::from_str(body).map_err(|e| ScoreError::Validation(e.to_string()))?;
        submission.validate()?;
        Ok(submission)
    }

    pub fn validate(&self) -> Result<(), ScoreError> {
        let name = self.player_name.trim();
        if name.is_empty() {
            return Err(ScoreError::Validation("playerName is required".into()));
        }
        if name.chars().count() > MAX_NAME_LEN {
            return Err(ScoreError::Validation(format!(
                "playerName longer than {MAX_NAME_LEN} characters"
            )));
        }
        if self.score < 0 {
            return Err(ScoreError::Validation("score must be non-negative".into()));
        }
        if self.time_elapsed < 0 {
            return Err(ScoreError::Validation("timeElapsed must be non-negative".into()));
        }
        Ok(())
    }
}

/// A stored score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreRecord {
    pub id: u32,
    pub player_name: String,
    pub score: i64,
    pub time_elapsed: i64,
    /// Unix timestamp (ms) assigned by the store
    pub created_at: f64,
}

/// Storage seam for score records
pub trait ScoreStore {
    /// Validate and store a submission, returning the stored record
    fn create_score(
        &mut self,
        submission: &ScoreSubmission,
        now_ms: f64,
    ) -> Result<ScoreRecord, ScoreError>;

    /// All records, highest score first
    fn scores(&self) -> Result<Vec<ScoreRecord>, ScoreError>;
}

/// In-memory score store
#[derive(Debug, Clone)]
pub struct MemScoreStore {
    records: BTreeMap<u32, ScoreRecord>,
    next_id: u32,
}

impl Default for MemScoreStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemScoreStore {
    pub fn new() -> Self {
        Self {
            records: BTreeMap::new(),
            next_id: 1,
        }
    }

    /// Store pre-populated with a few sample scores
    pub fn with_sample_scores(now_ms: f64) -> Self {
        let mut store = Self::new();
        for (name, score, time) in [
            ("RoboChampion", 1500, 120),
            ("AI_Master", 1200, 90),
            ("Tech_Guru", 900, 75),
        ] {
            let submission = ScoreSubmission {
                player_name: name.to_string(),
                score,
                time_elapsed: time,
            };
            if let Err(e) = store.create_score(&submission, now_ms) {
                log::warn!("Skipping sample score for {}: {}", name, e);
            }
        }
        store
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl ScoreStore for MemScoreStore {
    fn create_score(
        &mut self,
        submission: &ScoreSubmission,
        now_ms: f64,
    ) -> Result<ScoreRecord, ScoreError> {
        submission.validate()?;

        let id = self.next_id;
        self.next_id = id
            .checked_add(1)
            .ok_or_else(|| ScoreError::Storage("score id space exhausted".into()))?;

        let record = ScoreRecord {
            id,
            player_name: submission.player_name.trim().to_string(),
            score: submission.score,
            time_elapsed: submission.time_elapsed,
            created_at: now_ms,
        };
        self.records.insert(id, record.clone());
        log::info!("Stored score {} for {}", record.score, record.player_name);
        Ok(record)
    }

    fn scores(&self) -> Result<Vec<ScoreRecord>, ScoreError> {
        let mut list: Vec<ScoreRecord> = self.records.values().cloned().collect();
        // Stable sort keeps submission order among equal scores
        list.sort_by(|a, b| b.score.cmp(&a.score));
        Ok(list)
    }
}

/// Submit a score, retrying once on a storage failure
///
/// Validation failures are returned immediately. A second storage failure
/// is logged and returned; the caller's game state is unaffected either way.
pub fn submit_with_retry(
    store: &mut dyn ScoreStore,
    submission: &ScoreSubmission,
    now_ms: f64,
) -> Result<ScoreRecord, ScoreError> {
    match store.create_score(submission, now_ms) {
        Err(e) if e.is_retryable() => {
            log::warn!("Score submission failed ({}), retrying", e);
            store.create_score(submission, now_ms).inspect_err(|e| {
                log::warn!("Score submission failed again: {}", e);
            })
        }
        result => result,
    }
}

/// Ranked view over a store's records
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoreBoard {
    pub entries: Vec<ScoreRecord>,
}

impl ScoreBoard {
    /// Fetch the current ranking. Listing errors yield an empty board.
    pub fn load(store: &dyn ScoreStore) -> Self {
        match store.scores() {
            Ok(entries) => Self { entries },
            Err(e) => {
                log::warn!("Failed to fetch scores: {}", e);
                Self::default()
            }
        }
    }

    /// Get the rank a score would achieve (1-indexed)
    ///
    /// Ties rank below existing equal scores. Zero never ranks.
    pub fn potential_rank(&self, score: i64) -> Option<usize> {
        if score <= 0 {
            return None;
        }
        let rank = self.entries.iter().position(|e| score > e.score);
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    /// Check if the leaderboard is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the top score (if any)
    pub fn top_score(&self) -> Option<i64> {
        self.entries.first().map(|e| e.score)
    }

    /// Top `n` entries
    pub fn top(&self, n: usize) -> &[ScoreRecord] {
        &self.entries[..n.min(self.entries.len())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission(name: &str, score: i64, time: i64) -> ScoreSubmission {
        ScoreSubmission {
            player_name: name.to_string(),
            score,
            time_elapsed: time,
        }
    }

    /// Store that fails a fixed number of times before delegating
    struct FlakyStore {
        failures_left: u32,
        calls: u32,
        inner: MemScoreStore,
    }

    impl ScoreStore for FlakyStore {
        fn create_score(
            &mut self,
            submission: &ScoreSubmission,
            now_ms: f64,
        ) -> Result<ScoreRecord, ScoreError> {
            self.calls += 1;
            if self.failures_left > 0 {
                self.failures_left -= 1;
                return Err(ScoreError::Storage("disk on fire".into()));
            }
            self.inner.create_score(submission, now_ms)
        }

        fn scores(&self) -> Result<Vec<ScoreRecord>, ScoreError> {
            Err(ScoreError::Storage("unavailable".into()))
        }
    }

    fn flaky(failures: u32) -> FlakyStore {
        FlakyStore {
            failures_left: failures,
            calls: 0,
            inner: MemScoreStore::new(),
        }
    }

    #[test]
    fn test_create_assigns_id_and_timestamp() {
        let mut store = MemScoreStore::new();
        let a = store.create_score(&submission("Ann", 300, 40), 1000.0).unwrap();
        let b = store.create_score(&submission(" Bob ", 500, 20), 2000.0).unwrap();
        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
        assert_eq!(b.player_name, "Bob");
        assert_eq!(b.created_at, 2000.0);

        let mut store = MemScoreStore::default();
        let first = store.create_score(&submission("Cy", 10, 1), 0.0).unwrap();
        assert_eq!(first.id, 1);
    }

    #[test]
    fn test_listing_sorted_descending() {
        let mut store = MemScoreStore::with_sample_scores(0.0);
        store.create_score(&submission("Zed", 1300, 10), 1.0).unwrap();

        let scores: Vec<i64> = store.scores().unwrap().iter().map(|r| r.score).collect();
        assert_eq!(scores, vec![1500, 1300, 1200, 900]);
        assert!(MemScoreStore::new().scores().unwrap().is_empty());
    }

    #[test]
    fn test_validation_errors() {
        let mut store = MemScoreStore::new();
        for bad in [
            submission("", 100, 10),
            submission("   ", 100, 10),
            submission("Ann", -1, 10),
            submission("Ann", 100, -5),
            submission(&"x".repeat(MAX_NAME_LEN + 1), 100, 10),
        ] {
            let err = store.create_score(&bad, 0.0).unwrap_err();
            assert_eq!(err.status_code(), 400);
        }
        assert!(store.is_empty());
    }

    #[test]
    fn test_from_json() {
        let ok = ScoreSubmission::from_json(r#"{"playerName":"Ann","score":100,"timeElapsed":12}"#)
            .unwrap();
        assert_eq!(ok, submission("Ann", 100, 12));

        for body in [
            r#"{"playerName":"Ann","score":100}"#,
            r#"{"playerName":"Ann","score":"lots","timeElapsed":12}"#,
            "garbage",
        ] {
            assert!(matches!(
                ScoreSubmission::from_json(body),
                Err(ScoreError::Validation(_))
            ));
        }
    }

    #[test]
    fn test_from_run_rounds_time() {
        let s = ScoreSubmission::from_run("Ann", 400, 61.6);
        assert_eq!(s.time_elapsed, 62);
        assert_eq!(s.score, 400);
    }

    #[test]
    fn test_zero_score_not_submitted() {
        assert_eq!(ScoreSubmission::for_leaderboard("Ann", 0, 30.0), None);
        assert_eq!(
            ScoreSubmission::for_leaderboard("Ann", 100, 30.0),
            Some(submission("Ann", 100, 30))
        );
    }

    #[test]
    fn test_name_length_limit() {
        let mut store = MemScoreStore::new();
        let longest = "x".repeat(15);
        assert!(store.create_score(&submission(&longest, 10, 1), 0.0).is_ok());
        let err = store
            .create_score(&submission(&"x".repeat(16), 10, 1), 0.0)
            .unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn test_retry_once_on_storage_failure() {
        let mut store = flaky(1);
        let record = submit_with_retry(&mut store, &submission("Ann", 100, 1), 0.0).unwrap();
        assert_eq!(record.score, 100);
        assert_eq!(store.calls, 2);

        let mut store = flaky(5);
        let err = submit_with_retry(&mut store, &submission("Ann", 100, 1), 0.0).unwrap_err();
        assert_eq!(err.status_code(), 500);
        assert_eq!(store.calls, 2);
    }

    #[test]
    fn test_no_retry_on_validation_failure() {
        let mut store = flaky(0);
        let err = submit_with_retry(&mut store, &submission("", 100, 1), 0.0).unwrap_err();
        assert!(!err.is_retryable());
        assert_eq!(store.calls, 1);
    }

    #[test]
    fn test_board_ranking() {
        let store = MemScoreStore::with_sample_scores(0.0);
        let board = ScoreBoard::load(&store);
        assert_eq!(board.top_score(), Some(1500));
        assert_eq!(board.potential_rank(2000), Some(1));
        assert_eq!(board.potential_rank(1200), Some(3));
        assert_eq!(board.potential_rank(100), Some(4));
        assert_eq!(board.potential_rank(0), None);
        assert_eq!(board.top(2).len(), 2);
        assert_eq!(board.top(10).len(), 3);

        let mut store = MemScoreStore::with_sample_scores(0.0);
        for (i, score) in [100, 200, 300, 400].into_iter().enumerate() {
            store
                .create_score(&submission(&format!("P{i}"), score, 5), 0.0)
                .unwrap();
        }
        let board = ScoreBoard::load(&store);
        let shown: Vec<i64> = board.top(LEADERBOARD_SIZE).iter().map(|r| r.score).collect();
        assert_eq!(shown, vec![1500, 1200, 900, 400, 300]);

        assert!(ScoreBoard::load(&flaky(0)).is_empty());
    }
}
