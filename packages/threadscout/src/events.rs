//! Crawl events and progress snapshots.
//!
//! The crawler pushes facts through a [`CrawlObserver`]; how they are
//! fanned out to clients (SSE, channels, logs) is the caller's concern.

use serde::Serialize;

use crate::types::ForumItem;

/// Events produced while crawling (facts about what happened).
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScoutEvent {
    /// A relevant thread was found.
    Thread { item: ForumItem },

    /// A relevant comment was found.
    Comment { item: ForumItem },

    /// A thread was processed and had no comments at all.
    ThreadNoComments {
        thread_title: String,
        thread_url: String,
    },

    /// A thread had comments but none matched.
    ThreadNoMatches {
        thread_title: String,
        thread_url: String,
    },
}

/// Which stage of the pipeline a progress snapshot belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CrawlPhase {
    #[default]
    Discover,
    Comments,
}

/// Point-in-time crawl counters.
///
/// Counters never decrease within one crawl run, but snapshots from
/// concurrent workers may interleave; consumers should rely on monotonic
/// non-decrease only, not strict ordering.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct CrawlProgress {
    pub phase: CrawlPhase,

    /// Pages handled so far in the current unit of work.
    pub page_index: usize,

    /// Pages known for the current unit of work (discovered-so-far during
    /// thread discovery, exact within a thread).
    pub total_pages: usize,

    /// Threads handled so far during comment extraction.
    pub thread_index: usize,

    /// Threads parsed off the most recent listing page.
    pub page_threads: usize,

    pub scanned_threads: usize,
    pub scanned_comments: usize,
    pub total_relevant: usize,

    /// Items-per-first-page times pages seen so far.
    pub estimated_total_threads: usize,
}

/// Observer for crawl output. Implementations must be cheap and
/// non-blocking; they are invoked inline from crawl workers.
pub trait CrawlObserver: Send + Sync {
    fn on_event(&self, _event: ScoutEvent) {}
    fn on_progress(&self, _progress: CrawlProgress) {}
}

/// Observer that discards everything.
pub struct NullObserver;

impl CrawlObserver for NullObserver {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_serialize_with_snake_case_tags() {
        let event = ScoutEvent::ThreadNoComments {
            thread_title: "t".into(),
            thread_url: "https://x/1".into(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "thread_no_comments");
        assert_eq!(json["thread_url"], "https://x/1");
    }

    #[test]
    fn progress_defaults_to_discover_phase() {
        let progress = CrawlProgress::default();
        assert_eq!(progress.phase, CrawlPhase::Discover);
        assert_eq!(progress.total_relevant, 0);
    }
}
