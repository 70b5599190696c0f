//! Keyword gating: exclude / must / optional evaluation plus the
//! informational proximity bonus.

use crate::matcher::context::{CompiledTerm, QueryContext};
use crate::matcher::normalize::NormalizedText;

/// Token window within which two distinct terms earn a proximity bonus.
const PROXIMITY_WINDOW: usize = 6;

/// Outcome of the lexical pass.
#[derive(Debug, Clone)]
pub struct LexicalOutcome {
    pub pass: bool,
    /// Ordered trace of the rules that fired.
    pub reasons: Vec<String>,
}

impl LexicalOutcome {
    fn fail(reason: String) -> Self {
        Self {
            pass: false,
            reasons: vec![reason],
        }
    }
}

/// Evaluate the term sets against normalized text.
///
/// Order matters and each step short-circuits:
/// 1. any exclude hit fails immediately;
/// 2. every must term is required, first miss fails;
/// 3. when must is empty and optional terms exist, at least one optional
///    hit is required (optional acts as a disjunction only then);
/// 4. a proximity bonus is recorded for reporting but never gates.
pub fn lexical_match(normalized: &NormalizedText, ctx: &QueryContext) -> LexicalOutcome {
    for term in &ctx.exclude {
        if term.is_match(&normalized.plain) {
            return LexicalOutcome::fail(format!("Excluded: {}", term.text()));
        }
    }

    let mut reasons = Vec::new();
    for term in &ctx.must {
        if !term.is_match(&normalized.plain) {
            return LexicalOutcome::fail(format!("Missing must: {}", term.text()));
        }
        reasons.push(format!("Must hit: {}", term.text()));
    }

    let optional_hits: Vec<&str> = ctx
        .optional
        .iter()
        .filter(|term| term.is_match(&normalized.plain))
        .map(|term| term.text())
        .collect();
    if !ctx.optional.is_empty() && optional_hits.is_empty() && ctx.must.is_empty() {
        return LexicalOutcome::fail("No optional keywords matched".to_string());
    }
    if !optional_hits.is_empty() {
        reasons.push(format!("Optional hits: {}", optional_hits.join(", ")));
    }

    let all_terms: Vec<&CompiledTerm> = ctx.must.iter().chain(ctx.optional.iter()).collect();
    let bonus = proximity_bonus(&normalized.tokens, &all_terms);
    if bonus > 0 {
        reasons.push(format!("Proximity bonus: {}", bonus));
    }

    LexicalOutcome { pass: true, reasons }
}

/// Best proximity score over all pairs of distinct terms.
///
/// Term occurrences are located by each term's first word only; a pair at
/// token distance `d <= PROXIMITY_WINDOW` scores `window - d + 1`.
pub fn proximity_bonus(tokens: &[String], terms: &[&CompiledTerm]) -> usize {
    let mut positions: Vec<(usize, Vec<usize>)> = Vec::new();
    for (term_idx, term) in terms.iter().enumerate() {
        let first = term.first_word();
        if first.is_empty() {
            continue;
        }
        let occurrences: Vec<usize> = tokens
            .iter()
            .enumerate()
            .filter(|(_, tok)| tok.as_str() == first)
            .map(|(i, _)| i)
            .collect();
        if !occurrences.is_empty() {
            positions.push((term_idx, occurrences));
        }
    }

    let mut best = 0;
    for i in 0..positions.len() {
        for j in (i + 1)..positions.len() {
            for &a in &positions[i].1 {
                for &b in &positions[j].1 {
                    let dist = a.abs_diff(b);
                    if dist <= PROXIMITY_WINDOW {
                        best = best.max(PROXIMITY_WINDOW - dist + 1);
                    }
                }
            }
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::normalize::normalize;
    use crate::types::RawQuery;

    async fn ctx(must: &[&str], optional: &[&str], exclude: &[&str]) -> QueryContext {
        let query = RawQuery {
            must: must.iter().map(|s| s.to_string()).collect(),
            optional: optional.iter().map(|s| s.to_string()).collect(),
            exclude: exclude.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        };
        crate::matcher::build_query_context(&query, None, 0.78).await
    }

    #[tokio::test]
    async fn exclude_beats_everything() {
        let ctx = ctx(&["export"], &["pdf"], &["beta"]).await;
        let norm = normalize("the beta export to pdf works");
        let outcome = lexical_match(&norm, &ctx);
        assert!(!outcome.pass);
        assert_eq!(outcome.reasons, vec!["Excluded: beta"]);
    }

    #[tokio::test]
    async fn missing_must_fails_even_with_optional_hits() {
        let ctx = ctx(&["brand kit"], &["logo"], &[]).await;
        let norm = normalize("our logo looks great");
        let outcome = lexical_match(&norm, &ctx);
        assert!(!outcome.pass);
        assert_eq!(outcome.reasons, vec!["Missing must: brand kit"]);
    }

    #[tokio::test]
    async fn optional_disjunction_applies_only_without_must() {
        // No must terms: at least one optional hit required
        let ctx_opt = ctx(&[], &["logo", "font"], &[]).await;
        let miss = lexical_match(&normalize("nothing relevant here today"), &ctx_opt);
        assert!(!miss.pass);
        assert_eq!(miss.reasons, vec!["No optional keywords matched"]);

        let hit = lexical_match(&normalize("change the font size"), &ctx_opt);
        assert!(hit.pass);

        // Must terms present: unmatched optionals do not fail the item
        let ctx_must = ctx(&["export"], &["logo"], &[]).await;
        let outcome = lexical_match(&normalize("export to mp4 is broken"), &ctx_must);
        assert!(outcome.pass);
        assert_eq!(outcome.reasons, vec!["Must hit: export"]);
    }

    #[tokio::test]
    async fn records_must_and_optional_hits() {
        let ctx = ctx(&["export"], &["pdf", "png"], &[]).await;
        let norm = normalize("export as pdf or png please");
        let outcome = lexical_match(&norm, &ctx);
        assert!(outcome.pass);
        assert!(outcome.reasons.contains(&"Must hit: export".to_string()));
        assert!(outcome
            .reasons
            .contains(&"Optional hits: pdf, png".to_string()));
    }

    #[tokio::test]
    async fn proximity_bonus_scores_close_pairs() {
        let ctx = ctx(&["export"], &["pdf"], &[]).await;
        // "export" at 0, "pdf" at 2: distance 2 -> 6 - 2 + 1 = 5
        let norm = normalize("export the pdf now");
        let outcome = lexical_match(&norm, &ctx);
        assert!(outcome
            .reasons
            .contains(&"Proximity bonus: 5".to_string()));
    }

    #[tokio::test]
    async fn proximity_needs_two_distinct_terms() {
        let ctx = ctx(&["export"], &[], &[]).await;
        let norm = normalize("export export export");
        let outcome = lexical_match(&norm, &ctx);
        assert!(outcome.pass);
        assert!(!outcome.reasons.iter().any(|r| r.starts_with("Proximity")));
    }
}
