//! Frontier and per-mode answer accumulators for the fixpoint loop.
//!
//! The frontier holds the triples first seen in the previous round and is
//! indexed by predicate so rule triggering only visits triples that can
//! match a body pattern. The accumulators merge each round's conclusions
//! into the answer according to the query mode and hand back the next
//! frontier.

use crate::adapter::QueryMode;
use crate::rule::Rule;
use hashbrown::{HashMap, HashSet};
use strata_core::{Annotation, Term, Triple, VersionSet};

type Key = (Term, Term, Term);

/// Predicate-indexed set of triples awaiting rule triggering
#[derive(Debug, Default)]
pub struct Frontier {
    /// All triples, in insertion order
    triples: Vec<Triple>,
    /// Index by predicate -> list of triple indices
    by_p: HashMap<Term, Vec<usize>>,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, triple: Triple) {
        let idx = self.triples.len();
        self.by_p.entry(triple.predicate.clone()).or_default().push(idx);
        self.triples.push(triple);
    }

    /// Triples that could trigger `rule`
    ///
    /// When every body predicate is constant only triples with one of those
    /// predicates are returned; otherwise the whole frontier.
    pub fn candidates<'a>(&'a self, rule: &Rule) -> Vec<&'a Triple> {
        let Some(predicates) = rule.body_predicates() else {
            return self.triples.iter().collect();
        };
        let mut indices: Vec<usize> = predicates
            .into_iter()
            .filter_map(|p| self.by_p.get(p))
            .flatten()
            .copied()
            .collect();
        indices.sort_unstable();
        indices.dedup();
        indices.into_iter().map(|i| &self.triples[i]).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    pub fn len(&self) -> usize {
        self.triples.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Triple> {
        self.triples.iter()
    }
}

/// Outcome of merging one round of conclusions
#[derive(Debug, Default)]
pub struct Absorbed {
    /// Triples (or version additions) not seen before
    pub frontier: Frontier,
    /// Retractions removed from a delta answer this round
    pub suppressed: usize,
}

/// Answer accumulator, one variant per query mode
#[derive(Debug)]
pub enum Accumulator {
    Materialized(MaterializedAnswer),
    Delta(DeltaAnswer),
    Versioned(VersionedAnswer),
}

impl Accumulator {
    pub fn for_mode(mode: QueryMode) -> Self {
        match mode {
            QueryMode::VersionMaterialized => {
                Accumulator::Materialized(MaterializedAnswer::default())
            }
            QueryMode::DeltaMaterialized => Accumulator::Delta(DeltaAnswer::default()),
            QueryMode::Version => Accumulator::Versioned(VersionedAnswer::default()),
        }
    }

    /// Add the seed rows to the answer and return the first frontier
    pub fn seed(&mut self, rows: Vec<Triple>) -> Frontier {
        match self {
            Accumulator::Materialized(answer) => answer.absorb(rows),
            Accumulator::Delta(answer) => answer.seed(rows),
            Accumulator::Versioned(answer) => answer.absorb(rows),
        }
    }

    /// Merge one round of conclusions
    pub fn absorb(&mut self, inferred: Vec<Triple>) -> Absorbed {
        match self {
            Accumulator::Materialized(answer) => Absorbed {
                frontier: answer.absorb(inferred),
                suppressed: 0,
            },
            Accumulator::Delta(answer) => answer.absorb(inferred),
            Accumulator::Versioned(answer) => Absorbed {
                frontier: answer.absorb(inferred),
                suppressed: 0,
            },
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Accumulator::Materialized(answer) => answer.triples.len(),
            Accumulator::Delta(answer) => answer.triples.len(),
            Accumulator::Versioned(answer) => answer.order.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn into_triples(self) -> Vec<Triple> {
        match self {
            Accumulator::Materialized(answer) => answer.triples,
            Accumulator::Delta(answer) => answer.triples,
            Accumulator::Versioned(answer) => answer.into_triples(),
        }
    }
}

/// Point-in-time answer: deduplicated union, seed rows first
#[derive(Debug, Default)]
pub struct MaterializedAnswer {
    triples: Vec<Triple>,
    seen: HashSet<Triple>,
}

impl MaterializedAnswer {
    fn absorb(&mut self, rows: Vec<Triple>) -> Frontier {
        let mut frontier = Frontier::new();
        for triple in rows {
            if self.seen.insert(triple.clone()) {
                self.triples.push(triple.clone());
                frontier.push(triple);
            }
        }
        frontier
    }
}

/// Delta answer: the seed rows, minus retractions that remain derivable
///
/// Inferred triples are tracked only to drive the loop and to suppress
/// retractions; they are not part of the delta.
#[derive(Debug, Default)]
pub struct DeltaAnswer {
    triples: Vec<Triple>,
    seen: HashSet<Triple>,
    /// Facts known to hold: seed assertions plus everything inferred
    known: HashSet<Key>,
}

impl DeltaAnswer {
    fn seed(&mut self, rows: Vec<Triple>) -> Frontier {
        let mut frontier = Frontier::new();
        for triple in rows {
            if !self.seen.insert(triple.clone()) {
                continue;
            }
            if triple.is_addition() && self.known.insert(triple.key()) {
                frontier.push(triple.clone());
            }
            self.triples.push(triple);
        }
        frontier
    }

    fn absorb(&mut self, inferred: Vec<Triple>) -> Absorbed {
        let round: HashSet<Key> = inferred.iter().map(Triple::key).collect();

        let before = self.triples.len();
        self.triples
            .retain(|t| !(t.is_deletion() && round.contains(&t.key())));
        let suppressed = before - self.triples.len();

        let mut frontier = Frontier::new();
        for triple in inferred {
            if self.known.insert(triple.key()) {
                frontier.push(triple);
            }
        }
        Absorbed {
            frontier,
            suppressed,
        }
    }
}

/// Version-query answer: one entry per fact, versions unioned
#[derive(Debug, Default)]
pub struct VersionedAnswer {
    order: Vec<Key>,
    versions: HashMap<Key, VersionSet>,
}

impl VersionedAnswer {
    /// Merge rows; the frontier receives new facts with all their versions
    /// and known facts with only the versions they gained.
    fn absorb(&mut self, rows: Vec<Triple>) -> Frontier {
        let mut frontier = Frontier::new();
        for triple in rows {
            let Annotation::Versions(versions) = &triple.annotation else {
                continue;
            };
            if versions.is_empty() {
                continue;
            }
            let key = triple.key();
            match self.versions.get_mut(&key) {
                Some(existing) => {
                    let added = existing.union_with(versions);
                    if !added.is_empty() {
                        frontier.push(triple.with_annotation(Annotation::Versions(added)));
                    }
                }
                None => {
                    self.order.push(key.clone());
                    self.versions.insert(key, versions.clone());
                    frontier.push(triple);
                }
            }
        }
        frontier
    }

    fn into_triples(mut self) -> Vec<Triple> {
        self.order
            .into_iter()
            .filter_map(|key| {
                let versions = self.versions.remove(&key)?;
                Some(Triple {
                    subject: key.0,
                    predicate: key.1,
                    object: key.2,
                    annotation: Annotation::Versions(versions),
                })
            })
            .collect()
    }
}

/// Merge version-annotated rows by fact, unioning their versions
pub fn merge_versions(rows: Vec<Triple>) -> Vec<Triple> {
    let mut answer = VersionedAnswer::default();
    answer.absorb(rows);
    answer.into_triples()
}
