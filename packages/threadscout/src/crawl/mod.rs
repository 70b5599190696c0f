//! HTML crawl pipeline: client, DOM extraction, thread discovery, and
//! comment extraction.

pub mod client;
pub mod comments;
pub mod parse;
pub mod threads;

pub use client::{ForumClient, PageFetcher};
pub use comments::extract_relevant_comments;
pub use threads::find_relevant_threads;

use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;

use crate::config::ScoutConfig;
use crate::error::Result;
use crate::events::CrawlObserver;
use crate::matcher::QueryContext;
use crate::types::ForumItem;

/// Discover relevant threads using an opaque session cookie.
///
/// Convenience wrapper that builds the HTTP client; use
/// [`find_relevant_threads`] directly to inject a custom fetcher.
pub async fn crawl_threads(
    credential: &str,
    context: &QueryContext,
    config: &ScoutConfig,
    observer: &dyn CrawlObserver,
    cancel: &CancellationToken,
) -> Result<Vec<ForumItem>> {
    let client = ForumClient::new(credential, config)?;
    find_relevant_threads(&client, context, config, observer, cancel).await
}

/// Extract relevant comments from the given threads using an opaque
/// session cookie.
pub async fn crawl_comments(
    credential: &str,
    threads: &[ForumItem],
    context: &QueryContext,
    since: Option<DateTime<Utc>>,
    config: &ScoutConfig,
    observer: &dyn CrawlObserver,
    cancel: &CancellationToken,
) -> Result<Vec<ForumItem>> {
    let client = ForumClient::new(credential, config)?;
    extract_relevant_comments(&client, threads, context, since, config, observer, cancel).await
}
