//! Forward-chaining fixpoint over a versioned store
//!
//! One run answers one query pattern:
//! 1. Select the rules whose heads can produce the pattern and specialize them
//! 2. Seed the answer with the literal query
//! 3. Repeatedly trigger rules with the frontier, evaluate what remains of
//!    their bodies against the store and instantiate their heads, until a
//!    round yields nothing new
//! 4. Merge conclusions into the answer per query mode
//!
//! Only triples never seen before enter the frontier, so the loop stops once
//! the closure over the store's finite term universe is reached.

use std::time::Instant;

use futures::future::try_join_all;
use hashbrown::HashSet;
use strata_core::{Annotation, Pattern, QueryPattern, Triple};
use tracing::Instrument;

use crate::accumulate::{Accumulator, Frontier};
use crate::adapter::{QueryAdapter, QueryMode, QueryStats, ScopedQuery};
use crate::diagnostics::{InferenceDiagnostics, Inferred};
use crate::error::{ReasonerError, Result};
use crate::rule::{Rule, RuleSet};
use crate::unify::{bind_rule, instantiate, pattern_binding, Binding};

/// A rule specialized by a frontier triple, with its unresolved body
#[derive(Debug)]
struct Triggered {
    rule: Rule,
    /// Body patterns that are not yet ground
    residual: Vec<Pattern>,
    /// Annotation of the triggering triple
    annotation: Annotation,
}

/// Run inference for `pattern` to fixpoint
pub async fn run_fixpoint(
    adapter: &QueryAdapter,
    rules: &RuleSet,
    pattern: &QueryPattern,
    scoped: &ScopedQuery,
) -> Result<Inferred> {
    let mode = scoped.mode()?;
    let span = tracing::debug_span!(
        "infer",
        %mode,
        %pattern,
        rules = tracing::field::Empty,
        rounds = tracing::field::Empty,
        inferred = tracing::field::Empty
    );
    async {
        let span = tracing::Span::current();
        let start = Instant::now();
        let stats = QueryStats::new();
        let mut diagnostics = InferenceDiagnostics::default();

        let applicable = rules.applicable(pattern);
        span.record("rules", applicable.len());

        let seed = adapter.search(pattern, scoped, &stats).await?;
        let mut answer = Accumulator::for_mode(mode);
        let mut frontier = answer.seed(seed);

        let body_scope = scoped.body();
        let mut rounds = 0;
        let mut inferred = 0;

        while !frontier.is_empty() && !applicable.is_empty() {
            rounds += 1;
            let conclusions = apply_round(
                adapter,
                &applicable,
                &frontier,
                &body_scope,
                mode,
                &stats,
                &mut diagnostics,
            )
            .await?;
            let produced = conclusions.len();

            let absorbed = answer.absorb(conclusions);
            diagnostics.deletions_suppressed += absorbed.suppressed;
            inferred += absorbed.frontier.len();

            tracing::debug!(
                round = rounds,
                frontier = frontier.len(),
                produced,
                new = absorbed.frontier.len(),
                suppressed = absorbed.suppressed,
                "fixpoint round"
            );
            frontier = absorbed.frontier;
        }

        span.record("rounds", rounds);
        span.record("inferred", inferred);

        diagnostics.rounds = rounds;
        diagnostics.facts_inferred = inferred;
        diagnostics.sub_queries = stats.sub_queries();
        diagnostics.duration = start.elapsed();

        Ok::<_, ReasonerError>(Inferred::new(answer.into_triples(), diagnostics))
    }
    .instrument(span)
    .await
}

/// One round: trigger, evaluate residual bodies, instantiate heads
async fn apply_round(
    adapter: &QueryAdapter,
    rules: &[Rule],
    frontier: &Frontier,
    body_scope: &ScopedQuery,
    mode: QueryMode,
    stats: &QueryStats,
    diagnostics: &mut InferenceDiagnostics,
) -> Result<Vec<Triple>> {
    let triggered = trigger_rules(rules, frontier, diagnostics);

    // Fail before issuing any store call
    if let Some(t) = triggered.iter().find(|t| t.residual.len() > 1) {
        return Err(ReasonerError::UnsupportedBody {
            rule: t.rule.label(),
            remaining: t.residual.len(),
        });
    }

    let queries = triggered
        .iter()
        .filter(|t| t.residual.len() == 1)
        .map(|t| {
            let query = QueryPattern::from_pattern(&t.residual[0]);
            async move { adapter.search(&query, body_scope, stats).await }
        });
    let mut rows = try_join_all(queries).await?.into_iter();

    let mut conclusions = Vec::new();
    for t in &triggered {
        match t.residual.first() {
            None => {
                if let Some(annotation) = conclusion_annotation(mode, &t.annotation, None) {
                    fire(&t.rule, &Binding::new().with_annotation(annotation), &mut conclusions);
                }
            }
            Some(body) => {
                for row in rows.next().unwrap_or_default() {
                    let Some(binding) = pattern_binding(body, &row) else {
                        continue;
                    };
                    let Some(annotation) =
                        conclusion_annotation(mode, &t.annotation, Some(&row.annotation))
                    else {
                        tracing::trace!(rule = %t.rule.label(), %row, "no common versions");
                        continue;
                    };
                    fire(&t.rule, &binding.with_annotation(annotation), &mut conclusions);
                }
            }
        }
    }
    Ok(conclusions)
}

/// Match every frontier triple against every rule body
///
/// Instantiations that specialize to the same rule with the same trigger
/// annotation are evaluated once.
fn trigger_rules(
    rules: &[Rule],
    frontier: &Frontier,
    diagnostics: &mut InferenceDiagnostics,
) -> Vec<Triggered> {
    let mut seen: HashSet<(Rule, Annotation)> = HashSet::new();
    let mut triggered = Vec::new();

    for rule in rules {
        for triple in frontier.candidates(rule) {
            let Some(binding) = rule.trigger(triple) else {
                continue;
            };
            let specialized = bind_rule(rule, &binding);
            let annotation = binding.annotation().clone();
            if !seen.insert((specialized.clone(), annotation.clone())) {
                continue;
            }
            diagnostics.record_rule_fired(&rule.label());

            let residual: Vec<Pattern> = specialized
                .from
                .iter()
                .filter(|p| !p.is_materialized())
                .cloned()
                .collect();
            triggered.push(Triggered {
                rule: specialized,
                residual,
                annotation,
            });
        }
    }
    triggered
}

/// Instantiate every head pattern of `rule`
fn fire(rule: &Rule, binding: &Binding, out: &mut Vec<Triple>) {
    for head in &rule.to {
        match instantiate(head, binding) {
            Some(triple) => out.push(triple),
            None => tracing::trace!(rule = %rule.label(), %head, "unbound head variable"),
        }
    }
}

/// Annotation attached to a conclusion
///
/// Point-in-time and delta conclusions carry none. Version-query conclusions
/// hold in the versions where both the trigger and the body row hold; None
/// means there is no such version and nothing is concluded.
fn conclusion_annotation(
    mode: QueryMode,
    trigger: &Annotation,
    row: Option<&Annotation>,
) -> Option<Annotation> {
    if mode != QueryMode::Version {
        return Some(Annotation::None);
    }
    let versions = match (trigger.versions(), row.and_then(Annotation::versions)) {
        (Some(t), Some(r)) => t.intersection(r),
        (Some(t), None) => t.clone(),
        (None, Some(r)) => r.clone(),
        (None, None) => return None,
    };
    if versions.is_empty() {
        None
    } else {
        Some(Annotation::Versions(versions))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_core::VersionSet;

    #[test]
    fn test_conclusion_annotation_point_in_time() {
        assert_eq!(
            conclusion_annotation(QueryMode::VersionMaterialized, &Annotation::None, None),
            Some(Annotation::None)
        );
        assert_eq!(
            conclusion_annotation(
                QueryMode::DeltaMaterialized,
                &Annotation::Addition(true),
                Some(&Annotation::None)
            ),
            Some(Annotation::None)
        );
    }

    #[test]
    fn test_conclusion_annotation_intersects_versions() {
        let trigger = Annotation::Versions([0, 1, 2].into_iter().collect());
        let row = Annotation::Versions([1, 2, 3].into_iter().collect());
        let expected: VersionSet = [1, 2].into_iter().collect();
        assert_eq!(
            conclusion_annotation(QueryMode::Version, &trigger, Some(&row)),
            Some(Annotation::Versions(expected))
        );

        let disjoint = Annotation::Versions([5].into_iter().collect());
        assert_eq!(conclusion_annotation(QueryMode::Version, &trigger, Some(&disjoint)), None);
        assert_eq!(
            conclusion_annotation(QueryMode::Version, &trigger, None),
            Some(trigger.clone())
        );
    }

    #[test]
    fn test_trigger_rules_dedups_and_reduces() {
        let rule = Rule::new(
            "subclass",
            vec![Pattern::new("?c", "subClassOf", "?d"), Pattern::new("?x", "type", "?c")],
            vec![Pattern::new("?x", "type", "?d")],
        );
        let mut frontier = Frontier::new();
        frontier.push(Triple::new("bobby", "type", "Cat"));
        frontier.push(Triple::new("bobby", "type", "Cat"));
        frontier.push(Triple::new("Cat", "subClassOf", "Animal"));

        let mut diagnostics = InferenceDiagnostics::default();
        let triggered = trigger_rules(&[rule], &frontier, &mut diagnostics);
        assert_eq!(triggered.len(), 2);
        assert_eq!(diagnostics.triggered, 2);
        assert_eq!(triggered[0].residual, vec![Pattern::new("Cat", "subClassOf", "?d")]);
        assert_eq!(triggered[1].residual, vec![Pattern::new("?x", "type", "Cat")]);
    }

    #[test]
    fn test_fire_skips_unbound_heads() {
        let rule = Rule::new(
            "unsafe",
            vec![Pattern::new("?x", "p", "?y")],
            vec![Pattern::new("?x", "q", "?z"), Pattern::new("?x", "r", "b")],
        );
        let binding: Binding = [(strata_core::Term::new("?x"), strata_core::Term::new("a"))]
            .into_iter()
            .collect();
        let mut out = Vec::new();
        fire(&bind_rule(&rule, &binding), &Binding::new(), &mut out);
        assert_eq!(out, vec![Triple::new("a", "r", "b")]);
    }
}
