//! MemoryStore behind the `VersionedStore` trait object

use std::sync::Arc;
use strata_core::{
    Annotation, DeltaMaterializedOptions, Error, MemoryStore, QueryPattern, Triple,
    VersionMaterializedOptions, VersionedStore,
};

const CHANGESETS: &str = r#"{
    "0": [
        {"subject": "bobby", "predicate": "type", "object": "Cat", "addition": true},
        {"subject": "Cat", "predicate": "subClassOf", "object": "Animal", "addition": true}
    ],
    "2": [
        {"subject": "bobby", "predicate": "type", "object": "Cat", "addition": false},
        {"subject": "bobby", "predicate": "type", "object": "Tiger", "addition": true}
    ]
}"#;

async fn shared() -> Arc<dyn VersionedStore> {
    Arc::new(MemoryStore::from_json_str(CHANGESETS).await.unwrap())
}

#[tokio::test]
async fn skipped_versions_hold_previous_state() {
    let store = shared().await;
    assert_eq!(store.max_version(), 2);

    let bobby = QueryPattern::from_strs(Some("bobby"), Some("type"), None);
    let v1 = store
        .search_version_materialized(&bobby, &VersionMaterializedOptions::new(1))
        .await
        .unwrap();
    assert_eq!(v1, vec![Triple::new("bobby", "type", "Cat")]);

    let versions = store.search_version(&bobby).await.unwrap();
    assert_eq!(
        versions,
        vec![
            Triple::versioned("bobby", "type", "Cat", [0, 1]),
            Triple::versioned("bobby", "type", "Tiger", [2]),
        ]
    );
}

#[tokio::test]
async fn delta_is_antisymmetric() {
    let store = shared().await;
    let bobby = QueryPattern::from_strs(Some("bobby"), None, None);

    let forward = store
        .search_delta_materialized(&bobby, &DeltaMaterializedOptions::new(0, 2))
        .await
        .unwrap();
    let backward = store
        .search_delta_materialized(&bobby, &DeltaMaterializedOptions::new(2, 0))
        .await
        .unwrap();

    assert_eq!(forward.len(), 2);
    for (f, b) in forward.iter().zip(&backward) {
        assert!(f.same_fact(b));
        assert_eq!(f.annotation.addition(), b.annotation.addition().map(|a| !a));
    }
    assert_eq!(
        store
            .count_delta_materialized(&bobby, &DeltaMaterializedOptions::new(1, 1))
            .await
            .unwrap(),
        0
    );
}

#[tokio::test]
async fn triples_round_trip_through_json() {
    let triple = Triple::versioned("bobby", "type", "Cat", [0, 3]);
    let json = serde_json::to_string(&triple).unwrap();
    assert!(json.contains("\"versions\":[0,3]"));
    let back: Triple = serde_json::from_str(&json).unwrap();
    assert_eq!(back, triple);

    let both = r#"{"subject": "a", "predicate": "p", "object": "b",
                   "addition": true, "versions": [0]}"#;
    assert!(serde_json::from_str::<Triple>(both).is_err());

    let plain: Triple =
        serde_json::from_str(r#"{"subject": "a", "predicate": "p", "object": "b"}"#).unwrap();
    assert_eq!(plain.annotation, Annotation::None);
}

#[tokio::test]
async fn closed_store_rejects_queries() {
    let store = shared().await;
    store.close().await.unwrap();
    let err = store
        .search_version(&QueryPattern::any())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Closed));
}
