//! Thread discovery: walk the forum listing pages and match every row.

use std::collections::HashSet;

use futures::stream::{self, StreamExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::config::ScoutConfig;
use crate::crawl::client::PageFetcher;
use crate::crawl::parse::{next_page_path, parse_threads};
use crate::error::{Result, ScoutError};
use crate::events::{CrawlObserver, CrawlPhase, CrawlProgress, ScoutEvent};
use crate::matcher::{match_item, QueryContext};
use crate::types::ForumItem;

/// Walk the forum listing from the configured root path, match every
/// thread row, and emit matches as they are found.
///
/// Pagination follows the "next page" link; a visited-path set guarantees
/// termination even when the site's pagination links form a cycle.
/// Matches are deduplicated by URL within the run. One progress snapshot
/// is emitted per listing page.
pub async fn find_relevant_threads<F: PageFetcher>(
    fetcher: &F,
    context: &QueryContext,
    config: &ScoutConfig,
    observer: &dyn CrawlObserver,
    cancel: &CancellationToken,
) -> Result<Vec<ForumItem>> {
    let base_url = config.base_url();
    let mut found: Vec<ForumItem> = Vec::new();
    let mut seen_urls: HashSet<String> = HashSet::new();
    let mut visited: HashSet<String> = HashSet::new();

    let mut path = config.forum_path.clone();
    let mut scanned_threads = 0usize;
    let mut estimated_per_page = 0usize;
    let mut discovered_pages = 0usize;

    info!(forum_path = %path, "Starting thread discovery");

    while !visited.contains(&path) {
        if cancel.is_cancelled() {
            return Err(ScoutError::Cancelled);
        }
        visited.insert(path.clone());

        let html = fetcher.fetch_page(&path).await?;
        discovered_pages += 1;

        let threads = parse_threads(&html, &base_url);
        if discovered_pages == 1 {
            estimated_per_page = threads.len();
        }
        scanned_threads += threads.len();
        debug!(path = %path, rows = threads.len(), "Parsed listing page");

        // Evaluate the page's rows with bounded concurrency; emission
        // order across workers is unspecified, dedup order is first-wins.
        let evaluated: Vec<_> = stream::iter(threads.iter())
            .map(|thread| async move {
                if cancel.is_cancelled() {
                    return (thread, None);
                }
                let text = format!("{} {}", thread.title, thread.description);
                (thread, Some(match_item(&text, context).await))
            })
            .buffer_unordered(config.match_concurrency)
            .collect()
            .await;
        if cancel.is_cancelled() {
            return Err(ScoutError::Cancelled);
        }

        for (thread, result) in evaluated {
            let result = match result {
                Some(result) => result,
                None => continue,
            };
            if result.is_match && seen_urls.insert(thread.url.clone()) {
                let item = ForumItem {
                    title: Some(thread.title.clone()),
                    body: thread.description.clone(),
                    url: thread.url.clone(),
                    thread_title: None,
                    thread_url: None,
                    created_at: None,
                    explanation: result.explanation,
                    score: result.score,
                };
                found.push(item.clone());
                observer.on_event(ScoutEvent::Thread { item });
            }
        }

        observer.on_progress(CrawlProgress {
            phase: CrawlPhase::Discover,
            page_index: discovered_pages,
            total_pages: discovered_pages,
            page_threads: threads.len(),
            scanned_threads,
            total_relevant: found.len(),
            estimated_total_threads: estimated_per_page * discovered_pages,
            ..Default::default()
        });

        match next_page_path(&html, &base_url) {
            Some(next) => path = next,
            None => break,
        }
    }

    info!(
        pages = discovered_pages,
        scanned = scanned_threads,
        relevant = found.len(),
        "Thread discovery completed"
    );
    Ok(found)
}
