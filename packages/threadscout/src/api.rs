//! API-mode crawling for environments holding a privileged access token.
//!
//! Pages through the structured suggestions/comments endpoints instead of
//! scraping HTML, but feeds the identical matcher and emits the identical
//! event and progress shapes, so callers are source-agnostic.

use std::collections::HashSet;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use futures::stream::{self, TryStreamExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use uservoice_client::{Suggestion, SuggestionComment, UserVoiceClient};

use crate::config::ScoutConfig;
use crate::error::{Result, ScoutError};
use crate::events::{CrawlObserver, CrawlPhase, CrawlProgress, ScoutEvent};
use crate::matcher::{match_item, QueryContext};
use crate::types::ForumItem;

/// Map a suggestion record into the shared item shape.
fn suggestion_to_item(suggestion: &Suggestion, client: &UserVoiceClient) -> ForumItem {
    ForumItem {
        title: Some(suggestion.title.clone()),
        body: suggestion.body().to_string(),
        url: client.suggestion_url(suggestion.id),
        thread_title: None,
        thread_url: None,
        created_at: suggestion.updated_at,
        explanation: String::new(),
        score: 0.0,
    }
}

/// Suggestion id encoded in a thread URL minted by [`suggestion_to_item`].
fn suggestion_id_from_url(url: &str) -> Option<u64> {
    url.rsplit('/').next()?.parse().ok()
}

/// Discover relevant threads through the structured API.
///
/// Pages through the suggestions endpoint (stopping on an empty page or
/// the reported last page), matching each record the same way the HTML
/// crawler does and deduplicating by URL.
pub async fn find_relevant_threads_api(
    client: &UserVoiceClient,
    context: &QueryContext,
    updated_after: Option<DateTime<Utc>>,
    observer: &dyn CrawlObserver,
    cancel: &CancellationToken,
) -> Result<Vec<ForumItem>> {
    let mut found: Vec<ForumItem> = Vec::new();
    let mut seen_urls: HashSet<String> = HashSet::new();
    let mut scanned_threads = 0usize;
    let mut estimated_per_page = 0usize;
    let mut page = 1u32;

    info!("Starting API thread discovery");

    loop {
        if cancel.is_cancelled() {
            return Err(ScoutError::Cancelled);
        }
        let chunk = client.suggestions_page(page, updated_after).await?;
        let last = chunk.suggestions.is_empty()
            || chunk
                .pagination
                .map(|p| p.page >= p.total_pages)
                .unwrap_or(false);
        if page == 1 {
            estimated_per_page = chunk.suggestions.len();
        }
        scanned_threads += chunk.suggestions.len();

        for suggestion in &chunk.suggestions {
            if cancel.is_cancelled() {
                return Err(ScoutError::Cancelled);
            }
            let text = format!("{} {}", suggestion.title, suggestion.body());
            let result = match_item(&text, context).await;
            let mut item = suggestion_to_item(suggestion, client);
            if result.is_match && seen_urls.insert(item.url.clone()) {
                item.explanation = result.explanation;
                item.score = result.score;
                found.push(item.clone());
                observer.on_event(ScoutEvent::Thread { item });
            }
        }

        observer.on_progress(CrawlProgress {
            phase: CrawlPhase::Discover,
            page_index: page as usize,
            total_pages: page as usize,
            page_threads: chunk.suggestions.len(),
            scanned_threads,
            total_relevant: found.len(),
            estimated_total_threads: estimated_per_page * page as usize,
            ..Default::default()
        });

        if last {
            break;
        }
        page += 1;
    }

    info!(
        pages = page,
        scanned = scanned_threads,
        relevant = found.len(),
        "API thread discovery completed"
    );
    Ok(found)
}

#[derive(Default)]
struct ApiRunState {
    relevant: Vec<ForumItem>,
    emitted: HashSet<(String, String)>,
    scanned_comments: usize,
    processed_threads: usize,
}

/// Extract relevant comments for the given threads through the
/// structured API, with bounded thread concurrency.
///
/// Applies the same three-tier relaxation and `(url, body)` run-scoped
/// deduplication as the HTML crawler. Comments older than `since` are
/// skipped; API records always carry timestamps, so the cutoff is exact
/// here.
pub async fn extract_relevant_comments_api(
    client: &UserVoiceClient,
    threads: &[ForumItem],
    context: &QueryContext,
    since: Option<DateTime<Utc>>,
    config: &ScoutConfig,
    observer: &dyn CrawlObserver,
    cancel: &CancellationToken,
) -> Result<Vec<ForumItem>> {
    let relaxed = (!context.must.is_empty()).then(|| context.relaxed());
    let state = Mutex::new(ApiRunState::default());

    info!(threads = threads.len(), "Starting API comment extraction");

    {
        let state = &state;
        let relaxed = relaxed.as_ref();
        stream::iter(threads.iter().map(Ok::<_, ScoutError>))
            .try_for_each_concurrent(config.thread_concurrency, |thread| async move {
                process_suggestion_comments(
                    client, thread, context, relaxed, since, observer, cancel, state,
                )
                .await
            })
            .await?;
    }

    let state = state.into_inner().expect("crawl state mutex");
    info!(
        threads = state.processed_threads,
        scanned = state.scanned_comments,
        relevant = state.relevant.len(),
        "API comment extraction completed"
    );
    Ok(state.relevant)
}

#[allow(clippy::too_many_arguments)]
async fn process_suggestion_comments(
    client: &UserVoiceClient,
    thread: &ForumItem,
    context: &QueryContext,
    relaxed: Option<&QueryContext>,
    since: Option<DateTime<Utc>>,
    observer: &dyn CrawlObserver,
    cancel: &CancellationToken,
    state: &Mutex<ApiRunState>,
) -> Result<()> {
    if cancel.is_cancelled() {
        return Err(ScoutError::Cancelled);
    }

    let suggestion_id = match suggestion_id_from_url(&thread.url) {
        Some(id) => id,
        None => {
            debug!(url = %thread.url, "Thread URL carries no suggestion id, skipping");
            return Ok(());
        }
    };

    let mut comments_total = 0usize;
    let mut matches = 0usize;
    let mut page = 1u32;
    let thread_title = thread.title.as_deref().unwrap_or("");

    loop {
        if cancel.is_cancelled() {
            return Err(ScoutError::Cancelled);
        }
        let chunk = client.comments_page(suggestion_id, page).await?;
        let last = chunk.comments.is_empty()
            || chunk
                .pagination
                .map(|p| p.page >= p.total_pages)
                .unwrap_or(false);
        comments_total += chunk.comments.len();

        for comment in &chunk.comments {
            if cancel.is_cancelled() {
                return Err(ScoutError::Cancelled);
            }
            if let (Some(cutoff), Some(created)) = (since, comment.created_at) {
                if created < cutoff {
                    continue;
                }
            }

            let body = comment.body_text();
            let mut result = match_item(body, context).await;
            if !result.is_match {
                if let Some(relaxed) = relaxed {
                    result = match_item(body, relaxed).await;
                }
            }
            if !result.is_match {
                result = match_item(&format!("{} {}", thread_title, body), context).await;
            }
            if !result.is_match {
                continue;
            }

            let item = comment_to_item(comment, thread, result.explanation, result.score);
            let emitted = {
                let mut state = state.lock().expect("crawl state mutex");
                if state.emitted.insert((item.url.clone(), item.body.clone())) {
                    state.relevant.push(item.clone());
                    true
                } else {
                    false
                }
            };
            if emitted {
                matches += 1;
                observer.on_event(ScoutEvent::Comment { item });
            }
        }

        let progress = {
            let mut state = state.lock().expect("crawl state mutex");
            state.scanned_comments += chunk.comments.len();
            CrawlProgress {
                phase: CrawlPhase::Comments,
                thread_index: state.processed_threads + 1,
                page_index: page as usize,
                total_pages: chunk
                    .pagination
                    .map(|p| p.total_pages as usize)
                    .unwrap_or(page as usize),
                scanned_comments: state.scanned_comments,
                total_relevant: state.relevant.len(),
                ..Default::default()
            }
        };
        observer.on_progress(progress);

        if last {
            break;
        }
        page += 1;
    }

    if comments_total == 0 {
        observer.on_event(ScoutEvent::ThreadNoComments {
            thread_title: thread_title.to_string(),
            thread_url: thread.url.clone(),
        });
    } else if matches == 0 {
        observer.on_event(ScoutEvent::ThreadNoMatches {
            thread_title: thread_title.to_string(),
            thread_url: thread.url.clone(),
        });
    }

    state.lock().expect("crawl state mutex").processed_threads += 1;
    Ok(())
}

fn comment_to_item(
    comment: &SuggestionComment,
    thread: &ForumItem,
    explanation: String,
    score: f32,
) -> ForumItem {
    ForumItem {
        title: None,
        body: comment.body_text().to_string(),
        url: comment
            .link()
            .map(str::to_string)
            .unwrap_or_else(|| thread.url.clone()),
        thread_title: thread.title.clone(),
        thread_url: Some(thread.url.clone()),
        created_at: comment.created_at,
        explanation,
        score,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suggestion_id_round_trips_through_url() {
        let client = UserVoiceClient::new("acme", "tok").unwrap();
        let suggestion: Suggestion =
            serde_json::from_str(r#"{"id": 314, "title": "Allow exports"}"#).unwrap();
        let item = suggestion_to_item(&suggestion, &client);
        assert_eq!(item.url, "https://acme.uservoice.com/suggestions/314");
        assert_eq!(suggestion_id_from_url(&item.url), Some(314));
    }

    #[test]
    fn non_numeric_url_yields_no_id()  {
        assert_eq!(suggestion_id_from_url("https://acme.uservoice.com/forums/x"), None);
    }
}
