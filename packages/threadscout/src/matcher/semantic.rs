//! Embedding-similarity gate layered on top of lexical matching.

use crate::matcher::context::QueryContext;

/// Input budget for a single embedding call.
const MAX_EMBED_CHARS: usize = 8000;

/// Outcome of the semantic gate.
#[derive(Debug, Clone, Copy)]
pub struct SemanticOutcome {
    pub pass: bool,
    pub score: f32,
}

impl SemanticOutcome {
    fn fail() -> Self {
        Self {
            pass: false,
            score: 0.0,
        }
    }
}

/// Evaluate the semantic gate for one item.
///
/// A no-op (pass, score 0) when semantic mode is off. With semantic mode
/// on but no embedding backend configured, the gate fails closed: a
/// misconfigured job yields zero semantic matches rather than a crash,
/// so monitoring must watch explanations, not errors.
///
/// Query-side embedding priority: the precomputed feature-description
/// embedding, else an on-demand embedding of the joined must+optional
/// terms. Item text is truncated before embedding to bound cost.
pub async fn semantic_gate(text: &str, ctx: &QueryContext) -> SemanticOutcome {
    if !ctx.use_semantic {
        return SemanticOutcome {
            pass: true,
            score: 0.0,
        };
    }
    let embedder = match ctx.embedder.as_deref() {
        Some(embedder) => embedder,
        None => return SemanticOutcome::fail(),
    };

    let query_embedding = match &ctx.feature_embedding {
        Some(vector) => vector.clone(),
        None => {
            let intent: Vec<&str> = ctx
                .must
                .iter()
                .chain(ctx.optional.iter())
                .map(|t| t.text())
                .collect();
            if intent.is_empty() {
                return SemanticOutcome::fail();
            }
            match embedder.embed(&intent.join(", ")).await {
                Ok(vector) => vector,
                Err(err) => {
                    tracing::debug!(error = %err, "Query embedding failed");
                    return SemanticOutcome::fail();
                }
            }
        }
    };

    let truncated: String = text.chars().take(MAX_EMBED_CHARS).collect();
    let item_embedding = match embedder.embed(&truncated).await {
        Ok(vector) => vector,
        Err(err) => {
            tracing::debug!(error = %err, "Item embedding failed");
            return SemanticOutcome::fail();
        }
    };

    let score = cosine_similarity(&query_embedding, &item_embedding);
    SemanticOutcome {
        pass: score >= ctx.semantic_threshold,
        score,
    }
}

/// Cosine similarity between two vectors.
///
/// Returns 0 for mismatched lengths or a zero-norm operand.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}
