//! Leaderboard service
//!
//! The score table lives behind a small HTTP service:
//! - `POST /save-score` with `{name, score}` → `{message}`
//! - `GET /leaderboard` → top 10 `{name, score}`, best first
//!
//! [`LocalLeaderboard`] is an in-process model of that service, and
//! `HttpLeaderboard` (feature `http`) talks to a real one. Submissions
//! never touch simulation state: failures are logged and dropped.

use std::thread::JoinHandle;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sim::FinalReport;

/// Maximum number of entries the service returns
pub const MAX_LEADERBOARD: usize = 10;

#[derive(Error, Debug)]
pub enum LeaderboardError {
    #[error("Invalid submission: {0}")]
    Invalid(String),
    #[error("Server returned HTTP {0}")]
    Status(u16),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[cfg(feature = "http")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// A single leaderboard row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub name: String,
    pub score: i64,
}

/// Body of `POST /save-score`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreSubmission {
    pub name: String,
    pub score: i64,
}

impl ScoreSubmission {
    pub fn new(name: &str, score: i64) -> Result<Self, LeaderboardError> {
        if name.is_empty() {
            return Err(LeaderboardError::Invalid("name is empty".into()));
        }
        Ok(Self {
            name: name.to_string(),
            score,
        })
    }

    /// Build from a run's report
    pub fn from_report(report: &FinalReport) -> Result<Self, LeaderboardError> {
        let score = i64::try_from(report.score).map_err(|_| {
            LeaderboardError::Invalid(format!("score {} out of range", report.score))
        })?;
        Self::new(&report.player_name, score)
    }

    /// Validate a raw request body the way the service does: `name` must be
    /// a non-empty string and `score` an integer.
    pub fn parse_json(body: &str) -> Result<Self, LeaderboardError> {
        let value: serde_json::Value = serde_json::from_str(body)?;
        let name = value
            .get("name")
            .and_then(|v| v.as_str())
            .ok_or_else(|| LeaderboardError::Invalid("missing name".into()))?;
        let score = value
            .get("score")
            .and_then(|v| v.as_i64())
            .ok_or_else(|| LeaderboardError::Invalid("score is not an integer".into()))?;
        Self::new(name, score)
    }
}

/// Body of a successful `POST /save-score`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveResponse {
    pub message: String,
}

/// Remote score table
pub trait LeaderboardService {
    /// Record a score; returns the service's confirmation message
    fn submit_score(&mut self, name: &str, score: i64) -> Result<String, LeaderboardError>;

    /// Best scores first, at most `min(limit, MAX_LEADERBOARD)` entries
    fn fetch_top_scores(&self, limit: usize) -> Result<Vec<ScoreEntry>, LeaderboardError>;
}

/// In-memory leaderboard with the service's semantics
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocalLeaderboard {
    /// All recorded scores, sorted descending (ties keep arrival order)
    entries: Vec<ScoreEntry>,
}

impl LocalLeaderboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the top score (if any)
    pub fn top_score(&self) -> Option<i64> {
        self.entries.first().map(|e| e.score)
    }

    /// Rank a score would reach on the visible board (1-indexed), or None
    /// if it would not make the top [`MAX_LEADERBOARD`]
    pub fn potential_rank(&self, score: i64) -> Option<usize> {
        let rank = self
            .entries
            .iter()
            .position(|e| score > e.score)
            .unwrap_or(self.entries.len())
            + 1;
        (rank <= MAX_LEADERBOARD).then_some(rank)
    }

    fn insert(&mut self, entry: ScoreEntry) -> usize {
        // Find insertion point (sorted descending by score)
        match self.entries.iter().position(|e| entry.score > e.score) {
            Some(i) => {
                self.entries.insert(i, entry);
                i + 1
            }
            None => {
                self.entries.push(entry);
                self.entries.len()
            }
        }
    }
}

impl LeaderboardService for LocalLeaderboard {
    fn submit_score(&mut self, name: &str, score: i64) -> Result<String, LeaderboardError> {
        let submission = ScoreSubmission::new(name, score)?;
        let rank = self.insert(ScoreEntry {
            name: submission.name,
            score: submission.score,
        });
        log::debug!("Score {} recorded at rank {}", score, rank);
        Ok("Saved".to_string())
    }

    fn fetch_top_scores(&self, limit: usize) -> Result<Vec<ScoreEntry>, LeaderboardError> {
        Ok(self
            .entries
            .iter()
            .take(limit.min(MAX_LEADERBOARD))
            .cloned()
            .collect())
    }
}

/// Submit a finished run. Failures are logged, never returned.
pub fn submit_report(service: &mut dyn LeaderboardService, report: &FinalReport) -> bool {
    let result = ScoreSubmission::from_report(report)
        .and_then(|s| service.submit_score(&s.name, s.score));
    match result {
        Ok(message) => {
            log::info!("Score submitted for {}: {}", report.player_name, message);
            true
        }
        Err(e) => {
            log::warn!("Failed to submit score for {}: {}", report.player_name, e);
            false
        }
    }
}

/// Fire-and-forget submission on a detached thread. The handle may be
/// dropped; joining it only reports whether the submission succeeded.
pub fn submit_in_background<S>(mut service: S, report: FinalReport) -> JoinHandle<bool>
where
    S: LeaderboardService + Send + 'static,
{
    std::thread::spawn(move || submit_report(&mut service, &report))
}

/// Submit on a background thread and wait for it. A panic in the
/// submission is logged and counts as a failure.
pub fn submit_and_wait<S>(service: S, report: FinalReport) -> bool
where
    S: LeaderboardService + Send + 'static,
{
    match submit_in_background(service, report).join() {
        Ok(submitted) => submitted,
        Err(_) => {
            log::error!("Leaderboard submission thread panicked");
            false
        }
    }
}

#[cfg(feature = "http")]
mod http {
    use std::future::Future;
    use std::time::Duration;

    use super::{LeaderboardError, LeaderboardService, SaveResponse, ScoreEntry, ScoreSubmission};
    use super::MAX_LEADERBOARD;

    /// Per-request timeout
    const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

    /// Client for the leaderboard HTTP service
    #[derive(Debug, Clone)]
    pub struct HttpLeaderboard {
        base_url: String,
        client: reqwest::Client,
    }

    impl HttpLeaderboard {
        pub fn new(base_url: &str) -> Result<Self, LeaderboardError> {
            let client = reqwest::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()?;
            Ok(Self {
                base_url: base_url.trim_end_matches('/').to_string(),
                client,
            })
        }

        fn block_on<F: Future>(fut: F) -> Result<F::Output, LeaderboardError> {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            Ok(rt.block_on(fut))
        }

        async fn submit_async(&self, body: &ScoreSubmission) -> Result<String, LeaderboardError> {
            let response = self
                .client
                .post(format!("{}/save-score", self.base_url))
                .json(body)
                .send()
                .await?;
            if !response.status().is_success() {
                return Err(LeaderboardError::Status(response.status().as_u16()));
            }
            let saved: SaveResponse = response.json().await?;
            Ok(saved.message)
        }

        async fn fetch_async(&self) -> Result<Vec<ScoreEntry>, LeaderboardError> {
            let response = self
                .client
                .get(format!("{}/leaderboard", self.base_url))
                .send()
                .await?;
            if !response.status().is_success() {
                return Err(LeaderboardError::Status(response.status().as_u16()));
            }
            Ok(response.json().await?)
        }
    }

    impl LeaderboardService for HttpLeaderboard {
        fn submit_score(&mut self, name: &str, score: i64) -> Result<String, LeaderboardError> {
            let body = ScoreSubmission::new(name, score)?;
            Self::block_on(self.submit_async(&body))?
        }

        fn fetch_top_scores(&self, limit: usize) -> Result<Vec<ScoreEntry>, LeaderboardError> {
            let mut entries = Self::block_on(self.fetch_async())??;
            entries.sort_by(|a, b| b.score.cmp(&a.score));
            entries.truncate(limit.min(MAX_LEADERBOARD));
            Ok(entries)
        }
    }
}

#[cfg(feature = "http")]
pub use http::HttpLeaderboard;
