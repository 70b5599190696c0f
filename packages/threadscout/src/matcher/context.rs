//! Query context construction: synonym expansion, term compilation, and
//! eager feature-text embedding.

use std::fmt;
use std::sync::Arc;

use regex::Regex;

use crate::ai::Embedder;
use crate::matcher::normalize::normalize_basic;
use crate::matcher::synonyms::expand_terms;
use crate::types::RawQuery;

/// A query term compiled into its matching pattern.
///
/// Multi-word terms match as literal phrases with flexible interior
/// whitespace; single words match on word boundaries. All regex
/// metacharacters in the term are escaped, so pathological user input
/// cannot inject patterns.
#[derive(Debug, Clone)]
pub struct CompiledTerm {
    text: String,
    pattern: Regex,
}

impl CompiledTerm {
    pub fn new(term: &str) -> Self {
        let words: Vec<String> = term.split_whitespace().map(regex::escape).collect();
        let source = if words.len() > 1 {
            format!("(?i){}", words.join(r"\s+"))
        } else {
            format!(r"(?i)\b{}\b", words.first().cloned().unwrap_or_default())
        };
        // The escaped source is always a valid pattern
        let pattern = Regex::new(&source).expect("escaped term pattern");
        Self {
            text: term.to_string(),
            pattern,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// First word of the term, lowercased; used for proximity positions.
    pub fn first_word(&self) -> String {
        self.text
            .split_whitespace()
            .next()
            .unwrap_or("")
            .to_lowercase()
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }
}

impl fmt::Display for CompiledTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Immutable matching context for one crawl job.
///
/// Built once per job; concurrent workers hold read-only references.
#[derive(Clone)]
pub struct QueryContext {
    pub must: Vec<CompiledTerm>,
    pub optional: Vec<CompiledTerm>,
    pub exclude: Vec<CompiledTerm>,
    pub use_synonyms: bool,
    pub use_semantic: bool,
    pub feature_text: String,
    /// Present only when semantic mode is on and the eager embedding
    /// call succeeded.
    pub feature_embedding: Option<Vec<f32>>,
    pub semantic_threshold: f32,
    pub(crate) embedder: Option<Arc<dyn Embedder>>,
}

impl fmt::Debug for QueryContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryContext")
            .field("must", &self.must)
            .field("optional", &self.optional)
            .field("exclude", &self.exclude)
            .field("use_synonyms", &self.use_synonyms)
            .field("use_semantic", &self.use_semantic)
            .field("feature_text", &self.feature_text)
            .field("has_feature_embedding", &self.feature_embedding.is_some())
            .field("has_embedder", &self.embedder.is_some())
            .finish()
    }
}

impl QueryContext {
    /// Relaxed variant for the comment fallback pass: must terms folded
    /// into optional, deduplicated, so only one of must∪optional is
    /// required.
    pub fn relaxed(&self) -> Self {
        let mut optional = self.optional.clone();
        for term in &self.must {
            if !optional.iter().any(|t| t.text() == term.text()) {
                optional.push(term.clone());
            }
        }
        Self {
            must: Vec::new(),
            optional,
            ..self.clone()
        }
    }
}

fn compile_terms(terms: &[String], use_synonyms: bool) -> Vec<CompiledTerm> {
    let cleaned: Vec<String> = terms
        .iter()
        .map(|t| normalize_basic(t))
        .filter(|t| !t.is_empty())
        .collect();
    expand_terms(&cleaned, use_synonyms)
        .iter()
        .map(|t| CompiledTerm::new(t))
        .collect()
}

/// Expand a raw query into an immutable matching context.
///
/// Async because semantic mode embeds the feature description eagerly.
/// Embedding failures are swallowed: the context simply carries no
/// feature embedding and the semantic gate falls back to composing one
/// from the query terms at evaluation time.
pub async fn build_query_context(
    query: &RawQuery,
    embedder: Option<Arc<dyn Embedder>>,
    semantic_threshold: f32,
) -> QueryContext {
    let must = compile_terms(&query.must, query.use_synonyms);
    let optional = compile_terms(&query.optional, query.use_synonyms);
    let exclude = compile_terms(&query.exclude, query.use_synonyms);
    let feature_text = normalize_basic(&query.feature_text);

    let embedder = if query.use_semantic { embedder } else { None };

    let mut feature_embedding = None;
    if let (Some(embedder), false) = (embedder.as_deref(), feature_text.is_empty()) {
        match embedder.embed(&feature_text).await {
            Ok(vector) => feature_embedding = Some(vector),
            Err(err) => {
                tracing::warn!(error = %err, "Feature embedding failed, continuing without it");
            }
        }
    }

    QueryContext {
        must,
        optional,
        exclude,
        use_synonyms: query.use_synonyms,
        use_semantic: query.use_semantic,
        feature_text,
        feature_embedding,
        semantic_threshold,
        embedder,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_word_terms_match_whole_words() {
        let term = CompiledTerm::new("crop");
        assert!(term.is_match("please let me crop images"));
        assert!(term.is_match("Crop tool"));
        assert!(!term.is_match("cropping tool"));
    }

    #[test]
    fn phrases_match_with_flexible_whitespace() {
        let term = CompiledTerm::new("brand kit");
        assert!(term.is_match("our brand  kit is great"));
        assert!(term.is_match("Brand\nKit"));
        assert!(!term.is_match("brand new kit bag"));
    }

    #[test]
    fn metacharacters_are_escaped() {
        let term = CompiledTerm::new("c++ (beta)");
        assert!(term.is_match("support c++ (beta) please"));
        assert!(!term.is_match("support cpp beta please"));
    }

    #[tokio::test]
    async fn empty_terms_are_dropped() {
        let query = RawQuery {
            must: vec!["  ".into(), "export".into(), String::new()],
            ..Default::default()
        };
        let ctx = build_query_context(&query, None, 0.78).await;
        assert_eq!(ctx.must.len(), 1);
        assert_eq!(ctx.must[0].text(), "export");
    }

    #[tokio::test]
    async fn relaxed_folds_must_into_optional() {
        let query = RawQuery {
            must: vec!["brand kit".into()],
            optional: vec!["logo".into()],
            ..Default::default()
        };
        let ctx = build_query_context(&query, None, 0.78).await;
        let relaxed = ctx.relaxed();
        assert!(relaxed.must.is_empty());
        let texts: Vec<&str> = relaxed.optional.iter().map(|t| t.text()).collect();
        assert_eq!(texts, vec!["logo", "brand kit"]);
    }

    #[tokio::test]
    async fn semantic_off_drops_embedder() {
        let query = RawQuery {
            use_semantic: false,
            ..Default::default()
        };
        let ctx = build_query_context(
            &query,
            Some(std::sync::Arc::new(crate::testing::MockEmbedder::new())),
            0.78,
        )
        .await;
        assert!(ctx.embedder.is_none());
    }
}
