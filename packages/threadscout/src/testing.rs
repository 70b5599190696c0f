//! Testing utilities including mock implementations.
//!
//! Useful for exercising the matcher and crawl pipelines without real
//! network or embedding calls.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use async_trait::async_trait;

use crate::ai::Embedder;
use crate::crawl::client::PageFetcher;
use crate::error::{Result, ScoutError};
use crate::events::{CrawlObserver, CrawlProgress, ScoutEvent};

/// A mock embedder returning deterministic vectors.
///
/// Unknown texts get a cheap byte-derived vector so similarity is stable
/// across calls; specific texts can be pinned with [`with_vector`].
///
/// [`with_vector`]: MockEmbedder::with_vector
#[derive(Default)]
pub struct MockEmbedder {
    vectors: RwLock<HashMap<String, Vec<f32>>>,
    fail: bool,
    calls: AtomicUsize,
}

impl MockEmbedder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pin the vector returned for an exact text.
    pub fn with_vector(self, text: impl Into<String>, vector: Vec<f32>) -> Self {
        self.vectors.write().unwrap().insert(text.into(), vector);
        self
    }

    /// Make every call fail, simulating an unavailable backend.
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    /// Number of embed calls made so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn derive_vector(text: &str) -> Vec<f32> {
        let mut v = [0.0f32; 8];
        for (i, b) in text.bytes().enumerate() {
            v[i % 8] += f32::from(b) / 255.0;
        }
        v.to_vec()
    }
}

#[async_trait]
impl Embedder for MockEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(ScoutError::Embedding("mock backend down".to_string()));
        }
        if let Some(vector) = self.vectors.read().unwrap().get(text) {
            return Ok(vector.clone());
        }
        Ok(Self::derive_vector(text))
    }
}

/// A mock page fetcher serving canned HTML by path.
#[derive(Default)]
pub struct MockFetcher {
    pages: HashMap<String, String>,
    fetches: Mutex<Vec<String>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `html` for `path`.
    pub fn with_page(mut self, path: impl Into<String>, html: impl Into<String>) -> Self {
        self.pages.insert(path.into(), html.into());
        self
    }

    /// Paths fetched so far, in request order.
    pub fn fetched_paths(&self) -> Vec<String> {
        self.fetches.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageFetcher for MockFetcher {
    async fn fetch_page(&self, path: &str) -> Result<String> {
        self.fetches.lock().unwrap().push(path.to_string());
        self.pages
            .get(path)
            .cloned()
            .ok_or_else(|| ScoutError::Parse(format!("no fixture for {path}")))
    }
}

/// Observer that records everything it sees, for assertions.
#[derive(Default)]
pub struct CollectingObserver {
    events: Mutex<Vec<ScoutEvent>>,
    progress: Mutex<Vec<CrawlProgress>>,
}

impl CollectingObserver {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<ScoutEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn progress(&self) -> Vec<CrawlProgress> {
        self.progress.lock().unwrap().clone()
    }
}

impl CrawlObserver for CollectingObserver {
    fn on_event(&self, event: ScoutEvent) {
        self.events.lock().unwrap().push(event);
    }

    fn on_progress(&self, progress: CrawlProgress) {
        self.progress.lock().unwrap().push(progress);
    }
}
