//! Relevance matching: normalization, query context, lexical gating, and
//! the optional semantic gate, composed into a per-item decision.

pub mod context;
pub mod lexical;
pub mod normalize;
pub mod semantic;
pub mod synonyms;

pub use context::{build_query_context, CompiledTerm, QueryContext};
pub use lexical::{lexical_match, LexicalOutcome};
pub use normalize::{normalize, NormalizedText};
pub use semantic::{cosine_similarity, semantic_gate, SemanticOutcome};
pub use synonyms::expand_terms;

use crate::types::MatchResult;

/// Decide whether one piece of text matches the query context.
///
/// Lexical failure short-circuits with score 0. A lexical pass with
/// semantic mode off scores 1; otherwise the semantic similarity is the
/// score and both gates must pass.
pub async fn match_item(text: &str, ctx: &QueryContext) -> MatchResult {
    let normalized = normalize(text);
    let lexical = lexical_match(&normalized, ctx);
    if !lexical.pass {
        return MatchResult::no_match(lexical.reasons.join(" | "));
    }
    if !ctx.use_semantic {
        return MatchResult {
            is_match: true,
            explanation: lexical.reasons.join(" | "),
            score: 1.0,
        };
    }

    let semantic = semantic_gate(text, ctx).await;
    let mut reasons = lexical.reasons;
    if semantic.pass {
        reasons.push(format!("Semantic score {:.2}", semantic.score));
    } else {
        reasons.push(format!(
            "Semantic score {:.2} below threshold",
            semantic.score
        ));
    }
    MatchResult {
        is_match: semantic.pass,
        explanation: reasons.join(" | "),
        score: semantic.score,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockEmbedder;
    use crate::types::RawQuery;
    use std::sync::Arc;

    #[tokio::test]
    async fn lexical_only_match_scores_one() {
        let query = RawQuery {
            must: vec!["export".into()],
            ..Default::default()
        };
        let ctx = build_query_context(&query, None, 0.78).await;
        let result = match_item("bulk export is missing", &ctx).await;
        assert!(result.is_match);
        assert_eq!(result.score, 1.0);
        assert_eq!(result.explanation, "Must hit: export");
    }

    #[tokio::test]
    async fn exclusion_wins_regardless_of_other_terms() {
        let query = RawQuery {
            must: vec!["export".into()],
            optional: vec!["pdf".into()],
            exclude: vec!["android".into()],
            ..Default::default()
        };
        let ctx = build_query_context(&query, None, 0.78).await;
        let result = match_item("android export to pdf", &ctx).await;
        assert!(!result.is_match);
        assert_eq!(result.score, 0.0);
        assert_eq!(result.explanation, "Excluded: android");
    }

    #[tokio::test]
    async fn semantic_mode_without_backend_never_matches() {
        let query = RawQuery {
            must: vec!["export".into()],
            use_semantic: true,
            ..Default::default()
        };
        let ctx = build_query_context(&query, None, 0.78).await;
        let result = match_item("export everything now", &ctx).await;
        assert!(!result.is_match);
        assert!(result.explanation.contains("below threshold"));
    }

    #[tokio::test]
    async fn semantic_score_becomes_item_score() {
        let embedder = Arc::new(
            MockEmbedder::new()
                .with_vector("sharing templates", vec![1.0, 0.0])
                .with_vector("please allow template sharing", vec![0.95, 0.05]),
        );
        let query = RawQuery {
            must: vec!["template".into()],
            use_semantic: true,
            feature_text: "sharing templates".into(),
            ..Default::default()
        };
        let ctx = build_query_context(&query, Some(embedder), 0.78).await;
        let result = match_item("please allow template sharing", &ctx).await;
        assert!(result.is_match);
        assert!(result.score > 0.9 && result.score < 1.0);
        assert!(result.explanation.starts_with("Must hit: template"));
        assert!(result.explanation.contains("Semantic score"));
    }
}
