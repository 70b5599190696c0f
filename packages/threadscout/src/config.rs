//! Environment-driven configuration with documented defaults.

use std::time::Duration;

const DEFAULT_THREAD_CONCURRENCY: usize = 2;
const DEFAULT_PAGE_CONCURRENCY: usize = 3;
const DEFAULT_MATCH_CONCURRENCY: usize = 4;
const DEFAULT_SEMANTIC_THRESHOLD: f32 = 0.78;
const DEFAULT_HTTP_TIMEOUT_MS: u64 = 20_000;
const DEFAULT_SUBDOMAIN: &str = "adobeexpress";
const DEFAULT_FORUM_PATH: &str = "/forums/951181-adobe-express";
const DEFAULT_EMBED_MODEL: &str = "text-embedding-3-small";

/// Runtime configuration for a crawl.
///
/// Every knob has a default; `from_env` overrides from the recognized
/// environment variables.
#[derive(Debug, Clone)]
pub struct ScoutConfig {
    /// Concurrent threads processed during comment extraction
    /// (`THREADS_CONCURRENCY`).
    pub thread_concurrency: usize,

    /// Concurrent page fetches within one thread
    /// (`COMMENTS_PAGE_CONCURRENCY`).
    pub page_concurrency: usize,

    /// Concurrent item evaluations within one listing page
    /// (`MATCH_CONCURRENCY`). Only observable in semantic mode, where
    /// each evaluation is a network round trip.
    pub match_concurrency: usize,

    /// Minimum cosine similarity for the semantic gate
    /// (`SEMANTIC_THRESHOLD`).
    pub semantic_threshold: f32,

    /// Per-request HTTP timeout (`HTTP_TIMEOUT_MS`).
    pub http_timeout: Duration,

    /// Forum host subdomain (`UV_SUBDOMAIN`).
    pub subdomain: String,

    /// Root listing path for thread discovery (`UV_FORUM_PATH`).
    pub forum_path: String,

    /// Embedding model identifier (`OPENAI_EMBED_MODEL`).
    pub embedding_model: String,
}

impl Default for ScoutConfig {
    fn default() -> Self {
        Self {
            thread_concurrency: DEFAULT_THREAD_CONCURRENCY,
            page_concurrency: DEFAULT_PAGE_CONCURRENCY,
            match_concurrency: DEFAULT_MATCH_CONCURRENCY,
            semantic_threshold: DEFAULT_SEMANTIC_THRESHOLD,
            http_timeout: Duration::from_millis(DEFAULT_HTTP_TIMEOUT_MS),
            subdomain: DEFAULT_SUBDOMAIN.to_string(),
            forum_path: DEFAULT_FORUM_PATH.to_string(),
            embedding_model: DEFAULT_EMBED_MODEL.to_string(),
        }
    }
}

impl ScoutConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read configuration from the environment, falling back to defaults
    /// for anything absent or unparseable.
    pub fn from_env() -> Self {
        // Pick up a local .env if present
        let _ = dotenvy::dotenv();

        let mut config = Self::default();
        if let Some(n) = env_parse::<usize>("THREADS_CONCURRENCY") {
            config.thread_concurrency = n.max(1);
        }
        if let Some(n) = env_parse::<usize>("COMMENTS_PAGE_CONCURRENCY") {
            config.page_concurrency = n.max(1);
        }
        if let Some(n) = env_parse::<usize>("MATCH_CONCURRENCY") {
            config.match_concurrency = n.max(1);
        }
        if let Some(t) = env_parse::<f32>("SEMANTIC_THRESHOLD") {
            config.semantic_threshold = t;
        }
        if let Some(ms) = env_parse::<u64>("HTTP_TIMEOUT_MS") {
            config.http_timeout = Duration::from_millis(ms);
        }
        if let Ok(sub) = std::env::var("UV_SUBDOMAIN") {
            if !sub.is_empty() {
                config.subdomain = sub;
            }
        }
        if let Ok(path) = std::env::var("UV_FORUM_PATH") {
            if !path.is_empty() {
                config.forum_path = path;
            }
        }
        if let Ok(model) = std::env::var("OPENAI_EMBED_MODEL") {
            if !model.is_empty() {
                config.embedding_model = model;
            }
        }
        config
    }

    /// Base URL of the HTML forum site.
    pub fn base_url(&self) -> String {
        format!("https://{}.uservoice.com", self.subdomain)
    }

    pub fn with_thread_concurrency(mut self, n: usize) -> Self {
        self.thread_concurrency = n.max(1);
        self
    }

    pub fn with_page_concurrency(mut self, n: usize) -> Self {
        self.page_concurrency = n.max(1);
        self
    }

    pub fn with_semantic_threshold(mut self, threshold: f32) -> Self {
        self.semantic_threshold = threshold;
        self
    }

    pub fn with_subdomain(mut self, subdomain: impl Into<String>) -> Self {
        self.subdomain = subdomain.into();
        self
    }

    pub fn with_forum_path(mut self, path: impl Into<String>) -> Self {
        self.forum_path = path.into();
        self
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ScoutConfig::default();
        assert_eq!(config.thread_concurrency, 2);
        assert_eq!(config.page_concurrency, 3);
        assert!((config.semantic_threshold - 0.78).abs() < f32::EPSILON);
        assert_eq!(config.http_timeout, Duration::from_millis(20_000));
        assert_eq!(config.base_url(), "https://adobeexpress.uservoice.com");
    }

    #[test]
    fn builders_clamp_concurrency() {
        let config = ScoutConfig::new()
            .with_thread_concurrency(0)
            .with_page_concurrency(8);
        assert_eq!(config.thread_concurrency, 1);
        assert_eq!(config.page_concurrency, 8);
    }
}
