//! Core data types shared across the matching and crawl pipelines.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user-supplied query, before synonym expansion and embedding.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawQuery {
    /// Terms that must all be present.
    #[serde(default)]
    pub must: Vec<String>,

    /// Terms of which at least one is required when `must` is empty.
    #[serde(default)]
    pub optional: Vec<String>,

    /// Terms whose presence disqualifies an item.
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Expand each term set through the domain synonym table.
    #[serde(default)]
    pub use_synonyms: bool,

    /// Layer the embedding-similarity gate on top of lexical matching.
    #[serde(default)]
    pub use_semantic: bool,

    /// Free-text description of the feature being hunted for; embedded
    /// eagerly when semantic mode is on.
    #[serde(default)]
    pub feature_text: String,
}

/// Decision for a single evaluated item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResult {
    pub is_match: bool,

    /// Human-readable trace of which rule fired. Audit only, never used
    /// for control flow.
    pub explanation: String,

    /// 0 when lexical matching failed, 1 for a lexical-only match,
    /// otherwise the semantic similarity.
    pub score: f32,
}

impl MatchResult {
    pub fn no_match(explanation: impl Into<String>) -> Self {
        Self {
            is_match: false,
            explanation: explanation.into(),
            score: 0.0,
        }
    }
}

/// A discovered forum thread or comment.
///
/// Threads are identified by `url`; comments by `(url, body)` since the
/// source does not expose stable comment ids.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForumItem {
    /// Thread title. Absent for comments.
    #[serde(default)]
    pub title: Option<String>,

    /// Thread description or comment body.
    pub body: String,

    pub url: String,

    /// Title of the parent thread, for comments.
    #[serde(default)]
    pub thread_title: Option<String>,

    /// URL of the parent thread, for comments.
    #[serde(default)]
    pub thread_url: Option<String>,

    /// Posting time where the source exposes one.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    /// Why this item matched.
    pub explanation: String,

    pub score: f32,
}

impl ForumItem {
    /// Deduplication key for comments.
    pub fn comment_key(&self) -> (String, String) {
        (self.url.clone(), self.body.clone())
    }
}
