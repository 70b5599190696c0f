//! Keyword and semantic relevance scanning for forum threads and
//! comments.
//!
//! Takes a paginated, untrusted, partially-structured corpus (HTML forum
//! pages or the structured API) and a multi-criteria query
//! (must/optional/exclude term sets, synonym expansion, an optional
//! embedding-similarity gate) and produces a deduplicated, explainable
//! stream of matching items under bounded concurrency.
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use threadscout::{
//!     build_query_context, crawl::crawl_threads, NullObserver, RawQuery, ScoutConfig,
//! };
//! use tokio_util::sync::CancellationToken;
//!
//! let config = ScoutConfig::from_env();
//! let query = RawQuery {
//!     must: vec!["brand kit".into()],
//!     use_synonyms: true,
//!     ..Default::default()
//! };
//! let context = build_query_context(&query, None, config.semantic_threshold).await;
//!
//! let matches = crawl_threads(
//!     &cookie,
//!     &context,
//!     &config,
//!     &NullObserver,
//!     &CancellationToken::new(),
//! )
//! .await?;
//! ```
//!
//! # Modules
//!
//! - [`matcher`] - normalization, query context, lexical and semantic gates
//! - [`crawl`] - HTML crawl pipeline (client, parsing, threads, comments)
//! - [`api`] - structured-API crawl pipeline with the same contracts
//! - [`ai`] - embedding provider abstraction
//! - [`events`] - crawl events, progress snapshots, observer trait
//! - [`testing`] - mock fetcher/embedder/observer for tests

pub mod ai;
pub mod api;
pub mod config;
pub mod crawl;
pub mod error;
pub mod events;
pub mod matcher;
pub mod testing;
pub mod types;

pub use ai::{Embedder, OpenAiEmbedder};
pub use config::ScoutConfig;
pub use error::{Result, ScoutError};
pub use events::{CrawlObserver, CrawlPhase, CrawlProgress, NullObserver, ScoutEvent};
pub use matcher::{build_query_context, match_item, QueryContext};
pub use types::{ForumItem, MatchResult, RawQuery};
