//! HTTP access to the HTML forum, behind a trait to allow mocking.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::{debug, warn};

use crate::config::ScoutConfig;
use crate::error::{Result, ScoutError};

/// GET retries for transient failures.
const MAX_RETRIES: u32 = 3;

/// Base backoff delay, doubled per attempt.
const RETRY_BASE_DELAY_MS: u64 = 500;

/// Fetches forum pages by site-relative path.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_page(&self, path: &str) -> Result<String>;
}

/// Authenticated client for the HTML forum site.
///
/// Carries the opaque session cookie verbatim; how it was obtained is
/// not this crate's concern.
pub struct ForumClient {
    client: reqwest::Client,
    base_url: String,
    cookie: String,
}

impl ForumClient {
    pub fn new(cookie: impl Into<String>, config: &ScoutConfig) -> Result<Self> {
        // Browser-like headers keep the forum from serving the bot page
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::ACCEPT,
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8"
                .parse()
                .expect("static header value"),
        );
        headers.insert(
            reqwest::header::ACCEPT_LANGUAGE,
            "en-US,en;q=0.9".parse().expect("static header value"),
        );

        let client = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .user_agent(
                "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
                 (KHTML, like Gecko) Chrome/125.0.0.0 Safari/537.36",
            )
            .default_headers(headers)
            .build()
            .map_err(ScoutError::http)?;

        Ok(Self {
            client,
            base_url: config.base_url(),
            cookie: cookie.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET a site-relative path, retrying transient failures with
    /// exponential backoff. 401/403 abort immediately: a dead credential
    /// will not recover by retrying.
    async fn get_with_retry(&self, path: &str) -> Result<String> {
        let url = format!("{}{}", self.base_url, path);
        let mut attempt = 0;

        loop {
            let outcome = self
                .client
                .get(&url)
                .header(reqwest::header::COOKIE, &self.cookie)
                .send()
                .await;

            match outcome {
                Ok(response) => {
                    let status = response.status();
                    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
                        return Err(ScoutError::Auth(format!(
                            "{} responded {}; provide a valid cookie",
                            url, status
                        )));
                    }
                    if status.is_client_error() {
                        return Err(ScoutError::Http(Box::new(std::io::Error::new(
                            std::io::ErrorKind::Other,
                            format!("HTTP {} for {}", status, url),
                        ))));
                    }
                    if status.is_server_error() {
                        if attempt >= MAX_RETRIES {
                            return Err(ScoutError::RetriesExhausted {
                                url,
                                attempts: attempt + 1,
                            });
                        }
                        warn!(url = %url, status = %status, attempt, "Server error, retrying");
                    } else {
                        return response.text().await.map_err(ScoutError::http);
                    }
                }
                Err(err) => {
                    if attempt >= MAX_RETRIES {
                        warn!(url = %url, error = %err, "Request failed, retries exhausted");
                        return Err(ScoutError::RetriesExhausted {
                            url,
                            attempts: attempt + 1,
                        });
                    }
                    debug!(url = %url, error = %err, attempt, "Request failed, retrying");
                }
            }

            attempt += 1;
            let delay = RETRY_BASE_DELAY_MS * 2u64.pow(attempt);
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
    }
}

#[async_trait]
impl PageFetcher for ForumClient {
    async fn fetch_page(&self, path: &str) -> Result<String> {
        // Tolerate absolute URLs on our own host
        let relative = path.strip_prefix(&self.base_url).unwrap_or(path);
        self.get_with_retry(relative).await
    }
}
