//! Shared fixtures for strata-reasoner integration tests
#![allow(dead_code)]

pub mod tracing;

use std::sync::Arc;
use strata_core::{MemoryStore, Triple, Version, VersionedStore};
use strata_reasoner::{QueryAdapter, Rule, RuleSet};
use strata_vocab::{rdf, rdfs};

pub const TYPE: &str = rdf::TYPE;
pub const SUB_CLASS_OF: &str = rdfs::SUB_CLASS_OF;

/// Build an in-memory store from `(version, changeset)` pairs
pub async fn store_from(changesets: Vec<(Version, Vec<Triple>)>) -> MemoryStore {
    let store = MemoryStore::new();
    for (version, triples) in changesets {
        store
            .append(version, &triples)
            .await
            .expect("fixture changeset should append");
    }
    store
}

pub fn single(store: MemoryStore) -> QueryAdapter {
    QueryAdapter::single(Arc::new(store))
}

/// Only the subclass entailment
pub fn subclass_rules() -> RuleSet {
    RuleSet::from_rules(vec![Rule::rdfs_subclass()]).expect("subclass rule is valid")
}

/// `bobby a Cat`, `Cat ⊑ Animal ⊑ Thing`, plus an unrelated label
pub async fn animals() -> MemoryStore {
    store_from(vec![(
        0,
        vec![
            Triple::addition("bobby", TYPE, "Cat"),
            Triple::addition("bobby", "label", "\"Bobby\""),
            Triple::addition("Cat", SUB_CLASS_OF, "Animal"),
            Triple::addition("Animal", SUB_CLASS_OF, "Thing"),
        ],
    )])
    .await
}

/// Sort by (subject, predicate, object) for order-insensitive comparison
pub fn sorted(mut triples: Vec<Triple>) -> Vec<Triple> {
    triples.sort_by(|a, b| a.key().cmp(&b.key()));
    triples
}

/// Objects of the triples, sorted
pub fn objects(triples: &[Triple]) -> Vec<String> {
    let mut objects: Vec<String> = triples.iter().map(|t| t.object.to_string()).collect();
    objects.sort();
    objects
}

/// Install a fmt subscriber honoring `RUST_LOG`; later calls are no-ops
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
