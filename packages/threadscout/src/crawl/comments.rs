//! Comment extraction across matched threads.
//!
//! Threads are processed with bounded concurrency, and pages within one
//! thread with their own bound. All shared run state sits behind a mutex
//! so the pipeline stays correct on a multi-threaded runtime.

use std::collections::HashSet;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use futures::stream::{self, TryStreamExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::config::ScoutConfig;
use crate::crawl::client::PageFetcher;
use crate::crawl::parse::{
    parse_comments, thread_page_path, to_relative, total_thread_pages, ParsedComment,
};
use crate::error::{Result, ScoutError};
use crate::events::{CrawlObserver, CrawlPhase, CrawlProgress, ScoutEvent};
use crate::matcher::{match_item, QueryContext};
use crate::types::{ForumItem, MatchResult};

#[derive(Default)]
struct RunState {
    relevant: Vec<ForumItem>,
    emitted: HashSet<(String, String)>,
    scanned_comments: usize,
    processed_threads: usize,
}

#[derive(Default)]
struct ThreadState {
    pages_processed: usize,
    comments_total: usize,
    matches: usize,
}

/// Walk the given threads' comment pages and emit every relevant comment.
///
/// Matching runs a three-tier relaxation per comment: the body against
/// the full context; if must terms exist and failed, the body against a
/// context with must folded into optional; finally the thread title
/// concatenated with the body against the original context. The first
/// passing tier's explanation wins.
///
/// Comments older than `since` (when their timestamp is known) are
/// skipped. Comments are deduplicated by `(url, body)` across the whole
/// run. After each thread, a `thread_no_comments` or `thread_no_matches`
/// status event is emitted when applicable.
pub async fn extract_relevant_comments<F: PageFetcher>(
    fetcher: &F,
    threads: &[ForumItem],
    context: &QueryContext,
    since: Option<DateTime<Utc>>,
    config: &ScoutConfig,
    observer: &dyn CrawlObserver,
    cancel: &CancellationToken,
) -> Result<Vec<ForumItem>> {
    let extraction = CommentExtraction {
        fetcher,
        context,
        relaxed: (!context.must.is_empty()).then(|| context.relaxed()),
        since,
        config,
        observer,
        cancel,
        base_url: config.base_url(),
        state: Mutex::new(RunState::default()),
    };
    extraction.run(threads).await
}

struct CommentExtraction<'a, F: PageFetcher> {
    fetcher: &'a F,
    context: &'a QueryContext,
    relaxed: Option<QueryContext>,
    since: Option<DateTime<Utc>>,
    config: &'a ScoutConfig,
    observer: &'a dyn CrawlObserver,
    cancel: &'a CancellationToken,
    base_url: String,
    state: Mutex<RunState>,
}

impl<F: PageFetcher> CommentExtraction<'_, F> {
    async fn run(&self, threads: &[ForumItem]) -> Result<Vec<ForumItem>> {
        info!(threads = threads.len(), "Starting comment extraction");

        stream::iter(threads.iter().map(Ok::<_, ScoutError>))
            .try_for_each_concurrent(self.config.thread_concurrency, |thread| async move {
                self.process_thread(thread).await
            })
            .await?;

        let state = self.state.lock().expect("crawl state mutex");
        info!(
            threads = state.processed_threads,
            scanned = state.scanned_comments,
            relevant = state.relevant.len(),
            "Comment extraction completed"
        );
        Ok(state.relevant.clone())
    }

    async fn process_thread(&self, thread: &ForumItem) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Err(ScoutError::Cancelled);
        }

        let rel = to_relative(&thread.url, &self.base_url);
        let first_html = self.fetcher.fetch_page(&rel).await?;
        let total_pages = total_thread_pages(&first_html);
        debug!(thread = %thread.url, total_pages, "Discovered thread pagination");

        let thread_state = Mutex::new(ThreadState::default());
        {
            let thread_state = &thread_state;
            let rel = rel.as_str();
            let first_html = first_html.as_str();
            stream::iter((1..=total_pages).map(Ok::<_, ScoutError>))
                .try_for_each_concurrent(self.config.page_concurrency, |page| async move {
                    self.process_page(thread, rel, first_html, page, total_pages, thread_state)
                        .await
                })
                .await?;
        }

        let summary = thread_state.into_inner().expect("thread state mutex");
        let thread_title = thread.title.clone().unwrap_or_default();
        if summary.comments_total == 0 {
            self.observer.on_event(ScoutEvent::ThreadNoComments {
                thread_title,
                thread_url: thread.url.clone(),
            });
        } else if summary.matches == 0 {
            self.observer.on_event(ScoutEvent::ThreadNoMatches {
                thread_title,
                thread_url: thread.url.clone(),
            });
        }

        self.state.lock().expect("crawl state mutex").processed_threads += 1;
        Ok(())
    }

    async fn process_page(
        &self,
        thread: &ForumItem,
        rel: &str,
        first_html: &str,
        page: usize,
        total_pages: usize,
        thread_state: &Mutex<ThreadState>,
    ) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Err(ScoutError::Cancelled);
        }

        let path = thread_page_path(rel, page);
        let fetched;
        let html = if page == 1 {
            first_html
        } else {
            fetched = self.fetcher.fetch_page(&path).await?;
            fetched.as_str()
        };

        let comments = parse_comments(html, &path, &self.base_url);
        let thread_title = thread.title.as_deref().unwrap_or("");
        let mut page_matches = 0usize;

        for comment in &comments {
            if self.cancel.is_cancelled() {
                return Err(ScoutError::Cancelled);
            }
            if let (Some(cutoff), Some(created)) = (self.since, comment.created_at) {
                if created < cutoff {
                    continue;
                }
            }

            let result = self.match_comment(thread_title, &comment.body).await;
            if !result.is_match {
                continue;
            }

            let emitted = {
                let mut state = self.state.lock().expect("crawl state mutex");
                if state.emitted.insert((comment.url.clone(), comment.body.clone())) {
                    let item = self.to_item(thread, comment, result);
                    state.relevant.push(item.clone());
                    Some(item)
                } else {
                    None
                }
            };
            if let Some(item) = emitted {
                page_matches += 1;
                self.observer.on_event(ScoutEvent::Comment { item });
            }
        }

        let progress = {
            let mut state = self.state.lock().expect("crawl state mutex");
            state.scanned_comments += comments.len();
            let mut per_thread = thread_state.lock().expect("thread state mutex");
            per_thread.comments_total += comments.len();
            per_thread.matches += page_matches;
            per_thread.pages_processed += 1;
            CrawlProgress {
                phase: CrawlPhase::Comments,
                thread_index: state.processed_threads + 1,
                page_index: per_thread.pages_processed,
                total_pages,
                scanned_comments: state.scanned_comments,
                total_relevant: state.relevant.len(),
                ..Default::default()
            }
        };
        self.observer.on_progress(progress);
        Ok(())
    }

    /// Three-tier relaxation; the first passing tier wins.
    async fn match_comment(&self, thread_title: &str, body: &str) -> MatchResult {
        let mut result = match_item(body, self.context).await;
        if !result.is_match {
            if let Some(relaxed) = &self.relaxed {
                result = match_item(body, relaxed).await;
            }
        }
        if !result.is_match {
            result = match_item(&format!("{} {}", thread_title, body), self.context).await;
        }
        result
    }

    fn to_item(&self, thread: &ForumItem, comment: &ParsedComment, result: MatchResult) -> ForumItem {
        ForumItem {
            title: None,
            body: comment.body.clone(),
            url: comment.url.clone(),
            thread_title: thread.title.clone(),
            thread_url: Some(thread.url.clone()),
            created_at: comment.created_at,
            explanation: result.explanation,
            score: result.score,
        }
    }
}
