//! Equivalence expansion integration tests
//!
//! Test coverage:
//! - Canonicalize vs all-combinations reconciliation (fixed and open fields)
//! - Version merging after reconciliation
//! - Version-scoped equivalence classes
//! - Delta alias collapse
//! - Reasoner facade with configured reconcile mode

mod support;

use strata_core::{
    DeltaMaterializedOptions, QueryPattern, Term, Triple, VersionMaterializedOptions,
};
use strata_reasoner::{
    Equivalence, EquivalenceConfig, QueryStats, Reasoner, ReasonerConfig, Reconcile, RuleSet,
    ScopedQuery,
};
use strata_vocab::{ex, owl};
use support::{single, sorted, store_from};

const NAME: &str = "http://example.org/name";
const AGE: &str = "http://example.org/age";

fn a_name() -> QueryPattern {
    QueryPattern::from_strs(Some("A"), Some(NAME), None)
}

/// v0: A sameAs B, B name "X"
async fn linked() -> Equivalence {
    let store = store_from(vec![(
        0,
        vec![
            Triple::addition("A", owl::SAME_AS, "B"),
            Triple::addition("B", NAME, "\"X\""),
        ],
    )])
    .await;
    Equivalence::new(single(store), EquivalenceConfig::default())
}

#[tokio::test]
async fn canonicalize_rewrites_to_queried_term() {
    let equivalence = linked().await;

    let result = equivalence
        .search_version_materialized(
            &a_name(),
            &VersionMaterializedOptions::new(0),
            Reconcile::Canonicalize,
        )
        .await
        .unwrap();

    assert_eq!(result.triples, vec![Triple::new("A", NAME, "\"X\"")]);
    let d = &result.diagnostics;
    assert_eq!(d.combinations, 2);
    assert_eq!(d.raw_rows, 1);
    // 2 identity predicates x 2 directions for each of the two fixed fields,
    // plus one query per combination
    assert_eq!(d.sub_queries, 10);
}

#[tokio::test]
async fn all_combinations_emits_every_alias() {
    let equivalence = linked().await;

    let result = equivalence
        .search_version_materialized(
            &a_name(),
            &VersionMaterializedOptions::new(0),
            Reconcile::AllCombinations,
        )
        .await
        .unwrap();

    assert_eq!(
        sorted(result.triples),
        vec![Triple::new("A", NAME, "\"X\""), Triple::new("B", NAME, "\"X\"")]
    );
}

#[tokio::test]
async fn all_combinations_expands_open_subjects() {
    let equivalence = linked().await;

    let result = equivalence
        .search_version_materialized(
            &QueryPattern::from_strs(None, Some(NAME), None),
            &VersionMaterializedOptions::new(0),
            Reconcile::AllCombinations,
        )
        .await
        .unwrap();

    assert_eq!(
        sorted(result.triples),
        vec![Triple::new("A", NAME, "\"X\""), Triple::new("B", NAME, "\"X\"")]
    );
}

#[tokio::test]
async fn canonicalize_leaves_open_fields_alone() {
    let equivalence = linked().await;

    let result = equivalence
        .search_version_materialized(
            &QueryPattern::from_strs(None, Some(NAME), None),
            &VersionMaterializedOptions::new(0),
            Reconcile::Canonicalize,
        )
        .await
        .unwrap();

    assert_eq!(result.triples, vec![Triple::new("B", NAME, "\"X\"")]);
}

#[tokio::test]
async fn unlinked_terms_query_literally() {
    let equivalence = linked().await;
    let result = equivalence
        .search_version_materialized(
            &QueryPattern::from_strs(Some("C"), None, None),
            &VersionMaterializedOptions::new(0),
            Reconcile::Canonicalize,
        )
        .await
        .unwrap();
    assert!(result.triples.is_empty());
    assert_eq!(result.diagnostics.combinations, 1);
}

#[tokio::test]
async fn version_search_merges_reconciled_rows() {
    let store = store_from(vec![
        (0, vec![Triple::addition("B", NAME, "\"X\"")]),
        (1, vec![Triple::addition("A", owl::SAME_AS, "B")]),
        (2, vec![Triple::addition("A", NAME, "\"X\"")]),
    ])
    .await;
    let equivalence = Equivalence::new(single(store), EquivalenceConfig::default());

    let result = equivalence
        .search_version(&a_name(), Reconcile::Canonicalize)
        .await
        .unwrap();

    assert_eq!(
        result.triples,
        vec![Triple::versioned("A", NAME, "\"X\"", [0, 1, 2])]
    );
    assert_eq!(result.diagnostics.raw_rows, 2);
}

#[tokio::test]
async fn classes_follow_the_version_scope() {
    let store = store_from(vec![
        (0, vec![Triple::addition("B", NAME, "\"X\"")]),
        (1, vec![Triple::addition("A", owl::SAME_AS, "B")]),
    ])
    .await;
    let equivalence = Equivalence::new(single(store), EquivalenceConfig::default());
    let stats = QueryStats::new();
    let a = Term::new("A");

    let before = equivalence
        .equivalence_class(Some(&a), Some(0), &stats)
        .await
        .unwrap();
    assert_eq!(before, vec![Some(a.clone())]);

    let after = equivalence
        .equivalence_class(Some(&a), Some(1), &stats)
        .await
        .unwrap();
    assert_eq!(after, vec![Some(a.clone()), Some(Term::new("B"))]);

    assert_eq!(
        equivalence.equivalence_class(None, Some(1), &stats).await.unwrap(),
        vec![None]
    );

    // Links are not resolved before they exist
    let result = equivalence
        .search_version_materialized(
            &a_name(),
            &VersionMaterializedOptions::new(0),
            Reconcile::Canonicalize,
        )
        .await
        .unwrap();
    assert!(result.triples.is_empty());
}

#[tokio::test]
async fn links_are_symmetric() {
    let equivalence = linked().await;
    let stats = QueryStats::new();
    let class = equivalence
        .equivalence_class(Some(&Term::new("B")), Some(0), &stats)
        .await
        .unwrap();
    assert_eq!(class, vec![Some(Term::new("B")), Some(Term::new("A"))]);
}

/// v0: http name "Ruben"
/// v1: http becomes https, the name moves to https, https gains an age
async fn renamed() -> strata_core::MemoryStore {
    store_from(vec![
        (0, vec![Triple::addition("http", NAME, "\"Ruben\"")]),
        (
            1,
            vec![
                Triple::deletion("http", NAME, "\"Ruben\""),
                Triple::addition("http", ex::BECOMES, "https"),
                Triple::addition("https", NAME, "\"Ruben\""),
                Triple::addition("https", AGE, "30"),
            ],
        ),
    ])
    .await
}

#[tokio::test]
async fn delta_collapses_aliased_changes() {
    let equivalence = Equivalence::new(single(renamed().await), EquivalenceConfig::default());

    let result = equivalence
        .search_delta_materialized(
            &QueryPattern::from_strs(Some("http"), None, None),
            &DeltaMaterializedOptions::new(0, 1),
        )
        .await
        .unwrap();

    // Every change touches a term linked by the rename, the link included
    assert!(result.triples.is_empty());
    assert_eq!(result.diagnostics.raw_rows, 4);
    assert_eq!(result.diagnostics.aliased_rows, 4);
}

#[tokio::test]
async fn delta_without_identity_predicates_keeps_every_change() {
    let config = EquivalenceConfig::new(Vec::<Term>::new());
    let equivalence = Equivalence::new(single(renamed().await), config);

    let result = equivalence
        .search_delta_materialized(&QueryPattern::any(), &DeltaMaterializedOptions::new(0, 1))
        .await
        .unwrap();

    assert_eq!(result.triples.len(), 4);
    assert_eq!(result.diagnostics.aliased_rows, 0);
    assert_eq!(result.diagnostics.sub_queries, 1);
}

#[tokio::test]
async fn reasoner_uses_configured_reconcile() {
    let store = store_from(vec![(
        0,
        vec![
            Triple::addition("A", owl::SAME_AS, "B"),
            Triple::addition("B", NAME, "\"X\""),
        ],
    )])
    .await;
    let config = ReasonerConfig::from_json_str(r#"{"reconcile": "allCombinations"}"#).unwrap();
    let reasoner = Reasoner::with_config(single(store), RuleSet::new(), config);

    let (spans, _guard) = support::tracing::init_test_tracing();
    let result = reasoner
        .search_equivalent(&a_name(), &ScopedQuery::new(VersionMaterializedOptions::new(0)))
        .await
        .unwrap();

    assert_eq!(result.triples.len(), 2);
    assert!(spans.has_span("equivalence_search"));
}
