//! Diagnostics returned alongside inference and expansion results

use std::time::Duration;
use strata_core::Triple;

/// What happened during one fixpoint run
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InferenceDiagnostics {
    /// Number of rounds performed (the last one produced nothing new)
    pub rounds: usize,
    /// Distinct rule instantiations triggered by frontier triples
    pub triggered: usize,
    /// Triples (or version additions) inferred beyond the seed
    pub facts_inferred: usize,
    /// Delta retractions dropped because they remain derivable
    pub deletions_suppressed: usize,
    /// Store calls issued, including the seed query
    pub sub_queries: usize,
    /// Wall-clock duration
    pub duration: Duration,
    /// Count of how many times each rule was triggered
    pub rules_fired: hashbrown::HashMap<String, usize>,
}

impl InferenceDiagnostics {
    /// Record that a rule was triggered
    pub fn record_rule_fired(&mut self, rule_name: &str) {
        self.triggered += 1;
        *self.rules_fired.entry(rule_name.to_string()).or_insert(0) += 1;
    }
}

/// Inference result: answer triples plus diagnostics
#[derive(Clone, Debug)]
pub struct Inferred {
    pub triples: Vec<Triple>,
    pub diagnostics: InferenceDiagnostics,
}

impl Inferred {
    pub fn new(triples: Vec<Triple>, diagnostics: InferenceDiagnostics) -> Self {
        Self {
            triples,
            diagnostics,
        }
    }

    pub fn len(&self) -> usize {
        self.triples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }
}

/// What happened during one equivalence search
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExpansionDiagnostics {
    /// Concrete query combinations dispatched
    pub combinations: usize,
    /// Rows returned by the store before reconciliation
    pub raw_rows: usize,
    /// Rows removed by the delta alias filter
    pub aliased_rows: usize,
    /// Store calls issued, class lookups included
    pub sub_queries: usize,
    pub duration: Duration,
}

/// Equivalence search result: reconciled triples plus diagnostics
#[derive(Clone, Debug)]
pub struct Expanded {
    pub triples: Vec<Triple>,
    pub diagnostics: ExpansionDiagnostics,
}
