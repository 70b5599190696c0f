//! Pure UserVoice v2 REST API client.
//!
//! A minimal bearer-token client for the UserVoice API. Supports listing
//! suggestions (forum threads) and their comments with page-based
//! pagination.
//!
//! # Example
//!
//! ```rust,ignore
//! use uservoice_client::UserVoiceClient;
//!
//! let client = UserVoiceClient::new("adobeexpress", "api-token")?;
//!
//! let suggestions = client.list_suggestions(None).await?;
//! for s in &suggestions {
//!     println!("{}: {}", s.id, s.title);
//! }
//! ```

pub mod error;
pub mod types;

pub use error::{Result, UserVoiceError};
pub use types::{CommentsPage, Pagination, Suggestion, SuggestionComment, SuggestionsPage};

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Records returned per page. The API caps at 100.
pub const PER_PAGE: u32 = 100;

pub struct UserVoiceClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl UserVoiceClient {
    /// Build a client for `https://<subdomain>.uservoice.com/api/v2`.
    pub fn new(subdomain: &str, token: impl Into<String>) -> Result<Self> {
        Self::with_timeout(subdomain, token, Duration::from_secs(30))
    }

    /// Build a client with a custom request timeout.
    pub fn with_timeout(
        subdomain: &str,
        token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: format!("https://{}.uservoice.com/api/v2", subdomain),
            token: token.into(),
        })
    }

    /// Override the base URL (for tests and proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(String, String)]) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        let resp = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .query(query)
            .send()
            .await?;

        let status = resp.status();
        if status.as_u16() == 401 || status.as_u16() == 403 {
            return Err(UserVoiceError::Auth {
                status: status.as_u16(),
            });
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(UserVoiceError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        Ok(resp.json().await?)
    }

    /// Fetch one page of suggestions, optionally bounded to those updated
    /// after a cutoff.
    pub async fn suggestions_page(
        &self,
        page: u32,
        updated_after: Option<DateTime<Utc>>,
    ) -> Result<SuggestionsPage> {
        let mut query = vec![
            ("page".to_string(), page.to_string()),
            ("per_page".to_string(), PER_PAGE.to_string()),
        ];
        if let Some(cutoff) = updated_after {
            query.push(("updated_after".to_string(), cutoff.to_rfc3339()));
        }
        self.get_json("/suggestions", &query).await
    }

    /// Fetch one page of comments for a suggestion.
    pub async fn comments_page(&self, suggestion_id: u64, page: u32) -> Result<CommentsPage> {
        let query = vec![
            ("suggestion".to_string(), suggestion_id.to_string()),
            ("page".to_string(), page.to_string()),
            ("per_page".to_string(), PER_PAGE.to_string()),
        ];
        self.get_json("/comments", &query).await
    }

    /// List all suggestions, walking pages until an empty page or the
    /// reported last page.
    pub async fn list_suggestions(
        &self,
        updated_after: Option<DateTime<Utc>>,
    ) -> Result<Vec<Suggestion>> {
        let mut out = Vec::new();
        let mut page = 1;
        loop {
            let chunk = self.suggestions_page(page, updated_after).await?;
            let done = chunk.suggestions.is_empty() || is_last_page(chunk.pagination);
            out.extend(chunk.suggestions);
            if done {
                break;
            }
            page += 1;
        }
        tracing::debug!(count = out.len(), "Listed suggestions");
        Ok(out)
    }

    /// List all comments on a suggestion.
    pub async fn list_comments(&self, suggestion_id: u64) -> Result<Vec<SuggestionComment>> {
        let mut out = Vec::new();
        let mut page = 1;
        loop {
            let chunk = self.comments_page(suggestion_id, page).await?;
            let done = chunk.comments.is_empty() || is_last_page(chunk.pagination);
            out.extend(chunk.comments);
            if done {
                break;
            }
            page += 1;
        }
        tracing::debug!(suggestion_id, count = out.len(), "Listed comments");
        Ok(out)
    }

    /// Public web URL for a suggestion id.
    pub fn suggestion_url(&self, id: u64) -> String {
        let web_base = self.base_url.trim_end_matches("/api/v2");
        format!("{}/suggestions/{}", web_base, id)
    }
}

fn is_last_page(pagination: Option<Pagination>) -> bool {
    match pagination {
        Some(p) => p.page >= p.total_pages,
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suggestion_url_strips_api_path() {
        let client = UserVoiceClient::new("acme", "tok").unwrap();
        assert_eq!(
            client.suggestion_url(42),
            "https://acme.uservoice.com/suggestions/42"
        );
    }

    #[test]
    fn last_page_detection() {
        assert!(is_last_page(Some(Pagination {
            page: 3,
            total_pages: 3
        })));
        assert!(!is_last_page(Some(Pagination {
            page: 1,
            total_pages: 3
        })));
        assert!(!is_last_page(None));
    }
}
