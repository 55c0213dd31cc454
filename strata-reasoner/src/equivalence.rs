//! Equivalence expansion over identity links
//!
//! Identity predicates (`owl:sameAs`, `ex:becomes` by default) link terms
//! that denote the same thing. A query pattern is expanded by replacing each
//! concrete field with every term one identity hop away, all combinations are
//! dispatched concurrently, and the merged rows are reconciled back to the
//! caller's terms.
//!
//! Classes are computed per query and never cached: they depend on the
//! version scope and the store may grow between queries.

use std::time::Instant;

use futures::future::try_join_all;
use futures::try_join;
use hashbrown::{HashMap, HashSet};
use strata_core::{
    DeltaMaterializedOptions, Position, QueryPattern, Term, Triple, Version,
    VersionMaterializedOptions,
};
use tracing::Instrument;

use crate::accumulate::merge_versions;
use crate::adapter::{QueryAdapter, QueryMode, QueryStats, Scope, ScopedQuery};
use crate::config::{EquivalenceConfig, Reconcile};
use crate::diagnostics::{ExpansionDiagnostics, Expanded};
use crate::error::{ReasonerError, Result};

/// Equivalence class of one query field; `None` is the wildcard
pub type Class = Vec<Option<Term>>;

/// Classes of the values found in the fields a query left open
pub type ValueClasses = HashMap<Term, Class>;

/// Per-field classes and their cross product
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Expansion {
    pub combinations: Vec<QueryPattern>,
    pub subjects: Class,
    pub predicates: Class,
    pub objects: Class,
}

impl Expansion {
    /// Build the cross product of the three classes
    pub fn from_classes(subjects: Class, predicates: Class, objects: Class) -> Self {
        let mut combinations =
            Vec::with_capacity(subjects.len() * predicates.len() * objects.len());
        for s in &subjects {
            for p in &predicates {
                for o in &objects {
                    combinations.push(QueryPattern {
                        subject: s.clone(),
                        predicate: p.clone(),
                        object: o.clone(),
                    });
                }
            }
        }
        Self {
            combinations,
            subjects,
            predicates,
            objects,
        }
    }

    pub fn class(&self, position: Position) -> &Class {
        match position {
            Position::Subject => &self.subjects,
            Position::Predicate => &self.predicates,
            Position::Object => &self.objects,
        }
    }
}

/// Equivalence expansion engine
#[derive(Clone, Debug)]
pub struct Equivalence {
    adapter: QueryAdapter,
    config: EquivalenceConfig,
}

impl Equivalence {
    pub fn new(adapter: QueryAdapter, config: EquivalenceConfig) -> Self {
        Self { adapter, config }
    }

    pub fn identity_predicates(&self) -> &[Term] {
        &self.config.identity_predicates
    }

    /// The term plus every term linked to it by an identity predicate
    ///
    /// Links are looked up point-in-time at `version` when given, across all
    /// versions otherwise. The term itself comes first.
    pub async fn equivalence_class(
        &self,
        term: Option<&Term>,
        version: Option<Version>,
        stats: &QueryStats,
    ) -> Result<Class> {
        let Some(term) = term else {
            return Ok(vec![None]);
        };
        let scoped = match version {
            Some(version) => ScopedQuery::new(VersionMaterializedOptions::new(version)),
            None => ScopedQuery::version(),
        };

        let lookups = self.config.identity_predicates.iter().flat_map(|predicate| {
            let forward = QueryPattern::new(Some(term.clone()), Some(predicate.clone()), None);
            let backward = QueryPattern::new(None, Some(predicate.clone()), Some(term.clone()));
            [(forward, Position::Object), (backward, Position::Subject)]
        });
        let results = try_join_all(lookups.map(|(pattern, endpoint)| {
            let scoped = &scoped;
            async move {
                let rows = self.adapter.search(&pattern, scoped, stats).await?;
                Ok::<_, ReasonerError>(
                    rows.into_iter()
                        .map(|row| row.get(endpoint).clone())
                        .collect::<Vec<_>>(),
                )
            }
        }))
        .await?;

        let mut seen: HashSet<Term> = HashSet::new();
        seen.insert(term.clone());
        let mut class = vec![Some(term.clone())];
        for linked in results.into_iter().flatten() {
            if seen.insert(linked.clone()) {
                class.push(Some(linked));
            }
        }
        tracing::trace!(%term, size = class.len(), "equivalence class");
        Ok(class)
    }

    /// Per-field classes of `pattern` and their cross product
    pub async fn expand(
        &self,
        pattern: &QueryPattern,
        version: Option<Version>,
        stats: &QueryStats,
    ) -> Result<Expansion> {
        let (subjects, predicates, objects) = try_join!(
            self.equivalence_class(pattern.subject.as_ref(), version, stats),
            self.equivalence_class(pattern.predicate.as_ref(), version, stats),
            self.equivalence_class(pattern.object.as_ref(), version, stats),
        )?;
        Ok(Expansion::from_classes(subjects, predicates, objects))
    }

    /// Classes of the distinct values `rows` hold in the fields `pattern`
    /// leaves open, looked up concurrently under the same scope as `expand`
    pub async fn value_classes(
        &self,
        rows: &[Triple],
        pattern: &QueryPattern,
        version: Option<Version>,
        stats: &QueryStats,
    ) -> Result<ValueClasses> {
        let mut seen: HashSet<&Term> = HashSet::new();
        let mut values: Vec<&Term> = Vec::new();
        for position in Position::ALL {
            if pattern.get(position).is_some() {
                continue;
            }
            for row in rows {
                let value = row.get(position);
                if seen.insert(value) {
                    values.push(value);
                }
            }
        }
        let classes = try_join_all(
            values
                .iter()
                .map(|&value| self.equivalence_class(Some(value), version, stats)),
        )
        .await?;
        Ok(values.into_iter().cloned().zip(classes).collect())
    }

    /// Query every combination concurrently and concatenate the rows
    pub async fn dispatch(
        &self,
        combinations: &[QueryPattern],
        scoped: &ScopedQuery,
        stats: &QueryStats,
    ) -> Result<Vec<Triple>> {
        let results = try_join_all(
            combinations
                .iter()
                .map(|combination| self.adapter.search(combination, scoped, stats)),
        )
        .await?;
        Ok(results.into_iter().flatten().collect())
    }

    /// Point-in-time search with identity links scoped to `opts.version`
    pub async fn search_version_materialized(
        &self,
        pattern: &QueryPattern,
        opts: &VersionMaterializedOptions,
        reconcile: Reconcile,
    ) -> Result<Expanded> {
        let scoped = ScopedQuery::new(*opts);
        self.search(pattern, &scoped, Some(opts.version), Some(reconcile))
            .await
    }

    /// Version search; rows equal after reconciliation have their versions unioned
    pub async fn search_version(
        &self,
        pattern: &QueryPattern,
        reconcile: Reconcile,
    ) -> Result<Expanded> {
        self.search(pattern, &ScopedQuery::version(), None, Some(reconcile))
            .await
    }

    /// Delta search with rows implied by aliasing collapsed
    pub async fn search_delta_materialized(
        &self,
        pattern: &QueryPattern,
        opts: &DeltaMaterializedOptions,
    ) -> Result<Expanded> {
        let scoped = ScopedQuery::new(*opts);
        self.search(pattern, &scoped, None, None).await
    }

    /// Search in whatever mode `scoped` names
    ///
    /// Point-in-time searches scope identity links to the dataset version.
    pub async fn search_scoped(
        &self,
        pattern: &QueryPattern,
        scoped: &ScopedQuery,
        reconcile: Reconcile,
    ) -> Result<Expanded> {
        match scoped.dataset {
            Scope::VersionMaterialized(opts) => {
                self.search(pattern, scoped, Some(opts.version), Some(reconcile))
                    .await
            }
            Scope::DeltaMaterialized(_) => self.search(pattern, scoped, None, None).await,
            Scope::Version => self.search(pattern, scoped, None, Some(reconcile)).await,
        }
    }

    async fn search(
        &self,
        pattern: &QueryPattern,
        scoped: &ScopedQuery,
        class_version: Option<Version>,
        reconcile: Option<Reconcile>,
    ) -> Result<Expanded> {
        let mode = scoped.mode()?;
        let span = tracing::debug_span!(
            "equivalence_search",
            %mode,
            %pattern,
            combinations = tracing::field::Empty,
            rows = tracing::field::Empty
        );
        async {
            let span = tracing::Span::current();
            let start = Instant::now();
            let stats = QueryStats::new();

            let expansion = self.expand(pattern, class_version, &stats).await?;
            span.record("combinations", expansion.combinations.len());

            let rows = self.dispatch(&expansion.combinations, scoped, &stats).await?;
            let raw_rows = rows.len();

            let value_classes = match reconcile {
                Some(Reconcile::AllCombinations) if mode != QueryMode::DeltaMaterialized => {
                    self.value_classes(&rows, pattern, class_version, &stats).await?
                }
                _ => ValueClasses::new(),
            };

            let mut aliased_rows = 0;
            let triples = match (mode, reconcile) {
                (QueryMode::DeltaMaterialized, _) | (_, None) => {
                    let rows = dedup(rows);
                    let before = rows.len();
                    let kept = collapse_aliases(rows, &self.config);
                    aliased_rows = before - kept.len();
                    kept
                }
                (QueryMode::Version, Some(reconcile)) => merge_versions(reconcile_rows(
                    rows,
                    &expansion,
                    &value_classes,
                    pattern,
                    reconcile,
                )),
                (QueryMode::VersionMaterialized, Some(reconcile)) => {
                    reconcile_rows(rows, &expansion, &value_classes, pattern, reconcile)
                }
            };
            span.record("rows", triples.len());
            tracing::debug!(
                combinations = expansion.combinations.len(),
                raw_rows,
                aliased_rows,
                rows = triples.len(),
                "equivalence search complete"
            );

            let diagnostics = ExpansionDiagnostics {
                combinations: expansion.combinations.len(),
                raw_rows,
                aliased_rows,
                sub_queries: stats.sub_queries(),
                duration: start.elapsed(),
            };
            Ok::<_, ReasonerError>(Expanded {
                triples,
                diagnostics,
            })
        }
        .instrument(span)
        .await
    }
}

/// Map expanded rows back to the caller's terms
///
/// - `Canonicalize`: every field the original query fixed is rewritten to
///   the queried term.
/// - `AllCombinations`: per field (subject, then predicate, then object), a
///   row is replaced by one copy per member of its value's class. Fixed
///   fields use the field's class from `expansion` (rows whose value is not
///   in it are kept as is); open fields use the value's class from
///   `value_classes`.
///
/// The output is deduplicated by full structural equality.
pub fn reconcile_rows(
    rows: Vec<Triple>,
    expansion: &Expansion,
    value_classes: &ValueClasses,
    original: &QueryPattern,
    reconcile: Reconcile,
) -> Vec<Triple> {
    match reconcile {
        Reconcile::Canonicalize => dedup(
            rows.into_iter()
                .map(|mut row| {
                    for position in Position::ALL {
                        if let Some(term) = original.get(position) {
                            row.set(position, term.clone());
                        }
                    }
                    row
                })
                .collect(),
        ),
        Reconcile::AllCombinations => {
            let mut rows = rows;
            for position in Position::ALL {
                let fixed = original.get(position).is_some();
                let field_class: Vec<&Term> = expansion.class(position).iter().flatten().collect();
                let mut next = Vec::with_capacity(rows.len());
                for row in rows {
                    let class: Vec<&Term> = if fixed {
                        if field_class.contains(&row.get(position)) {
                            field_class.clone()
                        } else {
                            Vec::new()
                        }
                    } else {
                        value_classes
                            .get(row.get(position))
                            .map(|class| class.iter().flatten().collect())
                            .unwrap_or_default()
                    };
                    if class.len() < 2 {
                        next.push(row);
                        continue;
                    }
                    for member in class {
                        let mut copy = row.clone();
                        copy.set(position, member.clone());
                        next.push(copy);
                    }
                }
                rows = next;
            }
            dedup(rows)
        }
    }
}

/// Drop delta rows implied by aliasing
///
/// Every row whose predicate is an identity predicate links its subject and
/// object. A row with at least one linked term marks every row (itself
/// included) whose subject, predicate or object is equal to or linked with
/// the same field of that row. Marked rows are removed, identity rows
/// included. Without identity rows the input is returned unchanged.
pub fn collapse_aliases(rows: Vec<Triple>, config: &EquivalenceConfig) -> Vec<Triple> {
    let removed = aliased_rows(&rows, config);
    rows.into_iter()
        .zip(removed)
        .filter_map(|(row, removed)| (!removed).then_some(row))
        .collect()
}

/// Flags the rows `collapse_aliases` drops
fn aliased_rows(rows: &[Triple], config: &EquivalenceConfig) -> Vec<bool> {
    let mut removed = vec![false; rows.len()];
    let mut links: HashMap<&Term, HashSet<&Term>> = HashMap::new();
    for row in rows.iter().filter(|row| config.is_identity(&row.predicate)) {
        links.entry(&row.subject).or_default().insert(&row.object);
        links.entry(&row.object).or_default().insert(&row.subject);
    }
    if links.is_empty() {
        return removed;
    }

    for row in rows {
        if !Position::ALL
            .iter()
            .any(|&position| links.contains_key(row.get(position)))
        {
            continue;
        }
        for (other, flag) in rows.iter().zip(removed.iter_mut()) {
            if *flag {
                continue;
            }
            *flag = Position::ALL.iter().any(|&position| {
                let (a, b) = (row.get(position), other.get(position));
                a == b || links.get(a).map_or(false, |linked| linked.contains(b))
            });
        }
    }
    removed
}

/// Deduplicate by full structural equality, keeping first occurrences
fn dedup(rows: Vec<Triple>) -> Vec<Triple> {
    let mut seen: HashSet<Triple> = HashSet::with_capacity(rows.len());
    rows.into_iter()
        .filter(|row| seen.insert(row.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn class(terms: &[&str]) -> Class {
        terms.iter().map(|t| Some(Term::new(*t))).collect()
    }

    #[test]
    fn test_expansion_cross_product() {
        let expansion =
            Expansion::from_classes(class(&["A", "B"]), vec![None], class(&["x", "y", "z"]));
        assert_eq!(expansion.combinations.len(), 6);
        assert_eq!(
            expansion.combinations[0],
            QueryPattern::from_strs(Some("A"), None, Some("x"))
        );
        assert_eq!(
            expansion.combinations[5],
            QueryPattern::from_strs(Some("B"), None, Some("z"))
        );
    }

    #[test]
    fn test_canonicalize_rewrites_queried_fields() {
        let original = QueryPattern::from_strs(Some("A"), Some("name"), None);
        let expansion = Expansion::from_classes(class(&["A", "B"]), class(&["name"]), vec![None]);
        let rows = vec![Triple::new("B", "name", "\"X\""), Triple::new("A", "name", "\"X\"")];
        let reconciled = reconcile_rows(
            rows,
            &expansion,
            &ValueClasses::new(),
            &original,
            Reconcile::Canonicalize,
        );
        assert_eq!(reconciled, vec![Triple::new("A", "name", "\"X\"")]);
    }

    #[test]
    fn test_all_combinations_multiplies_rows() {
        let original = QueryPattern::from_strs(Some("A"), Some("name"), None);
        let expansion = Expansion::from_classes(class(&["A", "B"]), class(&["name"]), vec![None]);
        let rows = vec![Triple::new("B", "name", "\"X\"")];
        let reconciled = reconcile_rows(
            rows,
            &expansion,
            &ValueClasses::new(),
            &original,
            Reconcile::AllCombinations,
        );
        assert_eq!(
            reconciled,
            vec![Triple::new("A", "name", "\"X\""), Triple::new("B", "name", "\"X\"")]
        );
    }

    #[test]
    fn test_all_combinations_is_cumulative() {
        let original = QueryPattern::from_strs(Some("A"), None, Some("x"));
        let expansion = Expansion::from_classes(class(&["A", "B"]), vec![None], class(&["x", "y"]));
        let rows = vec![Triple::new("A", "p", "x")];
        let reconciled = reconcile_rows(
            rows,
            &expansion,
            &ValueClasses::new(),
            &original,
            Reconcile::AllCombinations,
        );
        assert_eq!(reconciled.len(), 4);
    }

    #[test]
    fn test_all_combinations_expands_open_fields() {
        let original = QueryPattern::from_strs(None, Some("name"), None);
        let expansion = Expansion::from_classes(vec![None], class(&["name"]), vec![None]);
        let value_classes: ValueClasses = [
            (Term::new("B"), class(&["B", "A"])),
            (Term::new("\"X\""), class(&["\"X\""])),
        ]
        .into_iter()
        .collect();
        let rows = vec![Triple::new("B", "name", "\"X\""), Triple::new("C", "name", "\"Z\"")];
        let reconciled = reconcile_rows(
            rows,
            &expansion,
            &value_classes,
            &original,
            Reconcile::AllCombinations,
        );
        assert_eq!(
            reconciled,
            vec![
                Triple::new("B", "name", "\"X\""),
                Triple::new("A", "name", "\"X\""),
                Triple::new("C", "name", "\"Z\""),
            ]
        );
    }

    #[test]
    fn test_collapse_removes_rows_sharing_a_linked_subject() {
        let config = EquivalenceConfig::new(["becomes"]);
        let rows = vec![
            Triple::deletion("http", "name", "\"Ruben\""),
            Triple::addition("http", "becomes", "https"),
            Triple::addition("https", "name", "\"Ruben\""),
        ];
        assert!(collapse_aliases(rows, &config).is_empty());
    }

    #[test]
    fn test_collapse_reaches_rows_sharing_any_field() {
        let config = EquivalenceConfig::new(["sameAs"]);
        let rows = vec![
            Triple::addition("A", "sameAs", "B"),
            Triple::addition("B", "name", "\"X\""),
            // shares only the predicate with a row naming B
            Triple::addition("D", "name", "\"Y\""),
            Triple::addition("D", "age", "3"),
        ];
        assert_eq!(
            collapse_aliases(rows, &config),
            vec![Triple::addition("D", "age", "3")]
        );
    }

    #[test]
    fn test_collapse_without_links_is_identity() {
        let config = EquivalenceConfig::default();
        let rows = vec![
            Triple::addition("A", "name", "\"X\""),
            Triple::deletion("B", "name", "\"X\""),
        ];
        assert_eq!(collapse_aliases(rows.clone(), &config), rows);
    }
}
