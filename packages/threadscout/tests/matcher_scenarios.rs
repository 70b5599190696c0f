//! Scenario and property tests for the matcher stack.

use std::sync::Arc;

use proptest::prelude::*;

use threadscout::matcher::{build_query_context, expand_terms, match_item};
use threadscout::testing::MockEmbedder;
use threadscout::RawQuery;

#[tokio::test]
async fn synonym_expansion_does_not_invent_matches() {
    // "brand kit" expands to its table entries; "branding" is a separate
    // key, so text mentioning only "branding" must not match.
    let query = RawQuery {
        must: vec!["brand kit".into()],
        use_synonyms: true,
        ..Default::default()
    };
    let ctx = build_query_context(&query, None, 0.78).await;

    let texts: Vec<&str> = ctx.must.iter().map(|t| t.text()).collect();
    assert_eq!(
        texts,
        vec![
            "brand kit",
            "brand assets",
            "brand styles",
            "brand guidelines",
            "brand library",
            "branding kit",
        ]
    );

    let result = match_item("Our branding supports custom logos", &ctx).await;
    assert!(!result.is_match);

    let result = match_item("Please add brand guidelines support", &ctx).await;
    assert!(result.is_match);
}

#[tokio::test]
async fn exclusion_overrides_all_other_signals() {
    let query = RawQuery {
        must: vec!["export".into()],
        optional: vec!["pdf".into()],
        exclude: vec!["mobile".into()],
        use_semantic: true,
        ..Default::default()
    };
    let embedder = Arc::new(MockEmbedder::new());
    let ctx = build_query_context(&query, Some(embedder), 0.0).await;

    // Threshold zero would pass any similarity, but exclusion still wins
    let result = match_item("mobile export to pdf", &ctx).await;
    assert!(!result.is_match);
    assert_eq!(result.explanation, "Excluded: mobile");
}

#[tokio::test]
async fn semantic_misconfiguration_yields_zero_matches() {
    let query = RawQuery {
        must: vec!["export".into()],
        use_semantic: true,
        ..Default::default()
    };
    // Semantic mode on, no backend: fails closed per item
    let ctx = build_query_context(&query, None, 0.78).await;
    for text in ["export everything", "the export button", "export export"] {
        let result = match_item(text, &ctx).await;
        assert!(!result.is_match);
    }
}

proptest! {
    #[test]
    fn expansion_keeps_inputs_and_never_duplicates(
        terms in proptest::collection::vec("[a-z]{1,12}( [a-z]{1,12})?", 0..8)
    ) {
        let expanded = expand_terms(&terms, true);
        for term in &terms {
            prop_assert!(expanded.contains(term));
        }
        let mut unique = expanded.clone();
        unique.sort();
        unique.dedup();
        prop_assert_eq!(unique.len(), expanded.len());
    }

    #[test]
    fn disabled_expansion_is_order_preserving_dedup(
        terms in proptest::collection::vec("[a-z]{1,10}", 0..10)
    ) {
        let expanded = expand_terms(&terms, false);
        let mut seen = std::collections::HashSet::new();
        let expected: Vec<String> = terms
            .iter()
            .filter(|t| seen.insert((*t).clone()))
            .cloned()
            .collect();
        prop_assert_eq!(expanded, expected);
    }
}
