//! In-memory versioned triple store
//!
//! Stores one changeset per version and materializes states by replaying
//! changesets. Intended for tests and small datasets; query cost is linear in
//! the number of stored changes.
//!
//! Semantics:
//! - `append` accepts the current max version (extending its changeset) or
//!   any newer version. Gaps are allowed: a skipped version holds the state
//!   of the version before it.
//! - Asserting a fact that already holds, or retracting a fact that does not
//!   hold, is a no-op and is not counted.
//! - Results are ordered by (subject, predicate, object).

use crate::error::{Error, Result};
use crate::store::VersionedStore;
use crate::term::Term;
use crate::triple::{Annotation, QueryPattern, Triple};
use crate::version::{
    DeltaMaterializedOptions, Version, VersionMaterializedOptions, VersionSet, NO_VERSION,
};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

type Fact = (Term, Term, Term);

#[derive(Debug, Clone)]
struct Change {
    fact: Fact,
    addition: bool,
}

#[derive(Debug, Default)]
struct Inner {
    changesets: BTreeMap<Version, Vec<Change>>,
    closed: bool,
}

impl Inner {
    fn check_open(&self) -> Result<()> {
        if self.closed {
            Err(Error::Closed)
        } else {
            Ok(())
        }
    }

    fn max_version(&self) -> Version {
        self.changesets.keys().next_back().copied().unwrap_or(NO_VERSION)
    }

    /// Replay all changesets up to and including `version`
    fn materialize(&self, version: Version) -> BTreeSet<Fact> {
        let mut state = BTreeSet::new();
        if version < 0 {
            return state;
        }
        for changes in self.changesets.range(..=version).map(|(_, c)| c) {
            apply(&mut state, changes);
        }
        state
    }
}

fn apply(state: &mut BTreeSet<Fact>, changes: &[Change]) {
    for change in changes {
        if change.addition {
            state.insert(change.fact.clone());
        } else {
            state.remove(&change.fact);
        }
    }
}

fn to_triple(fact: &Fact, annotation: Annotation) -> Triple {
    Triple {
        subject: fact.0.clone(),
        predicate: fact.1.clone(),
        object: fact.2.clone(),
        annotation,
    }
}

/// A simple in-memory versioned triple store
///
/// Cloning shares the underlying data (`Arc<RwLock<...>>`), so a clone can
/// be handed to several adapters.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a store from a JSON document mapping versions to changesets
    ///
    /// ```json
    /// { "0": [{"subject": "bobby", "predicate": "type", "object": "Cat", "addition": true}] }
    /// ```
    pub async fn from_json_str(json: &str) -> Result<Self> {
        let changesets: BTreeMap<Version, Vec<Triple>> = serde_json::from_str(json)?;
        let store = Self::new();
        for (version, triples) in changesets {
            store.append(version, &triples).await?;
        }
        Ok(store)
    }

    /// Total number of stored changes across all versions
    pub fn change_count(&self) -> usize {
        self.inner.read().changesets.values().map(Vec::len).sum()
    }
}

#[async_trait]
impl VersionedStore for MemoryStore {
    async fn search_version_materialized(
        &self,
        pattern: &QueryPattern,
        opts: &VersionMaterializedOptions,
    ) -> Result<Vec<Triple>> {
        let inner = self.inner.read();
        inner.check_open()?;
        let limit = opts.limit.unwrap_or(usize::MAX);
        Ok(inner
            .materialize(opts.version)
            .iter()
            .filter(|fact| pattern.matches(*fact))
            .take(limit)
            .map(|fact| to_triple(fact, Annotation::None))
            .collect())
    }

    async fn search_delta_materialized(
        &self,
        pattern: &QueryPattern,
        opts: &DeltaMaterializedOptions,
    ) -> Result<Vec<Triple>> {
        let inner = self.inner.read();
        inner.check_open()?;
        let start = inner.materialize(opts.version_start);
        let end = inner.materialize(opts.version_end);

        let mut changes: Vec<(&Fact, bool)> = end
            .difference(&start)
            .map(|fact| (fact, true))
            .chain(start.difference(&end).map(|fact| (fact, false)))
            .filter(|(fact, _)| pattern.matches(*fact))
            .collect();
        changes.sort();

        Ok(changes
            .into_iter()
            .map(|(fact, addition)| to_triple(fact, Annotation::Addition(addition)))
            .collect())
    }

    async fn search_version(&self, pattern: &QueryPattern) -> Result<Vec<Triple>> {
        let inner = self.inner.read();
        inner.check_open()?;

        let mut state = BTreeSet::new();
        let mut versions: BTreeMap<Fact, VersionSet> = BTreeMap::new();
        let mut changesets = inner.changesets.iter().peekable();
        while let Some((&version, changes)) = changesets.next() {
            apply(&mut state, changes);
            // State holds until the next stored changeset
            let until = changesets.peek().map_or(version + 1, |(&next, _)| next);
            for fact in state.iter().filter(|fact| pattern.matches(*fact)) {
                let set = versions.entry(fact.clone()).or_default();
                set.extend(version..until);
            }
        }

        Ok(versions
            .into_iter()
            .map(|(fact, set)| to_triple(&fact, Annotation::Versions(set)))
            .collect())
    }

    async fn append(&self, version: Version, triples: &[Triple]) -> Result<usize> {
        let mut inner = self.inner.write();
        inner.check_open()?;

        let max = inner.max_version();
        if version < 0 || version < max {
            return Err(Error::InvalidVersion { version, max });
        }

        // Validate everything before touching state
        let mut pending = Vec::with_capacity(triples.len());
        for triple in triples {
            let addition = triple.annotation.addition().ok_or_else(|| {
                Error::invalid_triple(format!("missing addition flag: {}", triple))
            })?;
            if triple.subject.is_variable()
                || triple.predicate.is_variable()
                || triple.object.is_variable()
            {
                return Err(Error::invalid_triple(format!(
                    "variables cannot be stored: {}",
                    triple
                )));
            }
            pending.push(Change {
                fact: triple.key(),
                addition,
            });
        }

        let mut state = inner.materialize(version);
        let mut stored = Vec::with_capacity(pending.len());
        for change in pending {
            let effective = if change.addition {
                state.insert(change.fact.clone())
            } else {
                state.remove(&change.fact)
            };
            if effective {
                stored.push(change);
            }
        }

        let count = stored.len();
        inner.changesets.entry(version).or_default().extend(stored);
        tracing::trace!(version, stored = count, "appended changeset");
        Ok(count)
    }

    fn max_version(&self) -> Version {
        self.inner.read().max_version()
    }

    async fn close(&self) -> Result<()> {
        self.inner.write().closed = true;
        Ok(())
    }
}
