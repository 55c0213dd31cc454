//! # Strata Reasoner
//!
//! Rule inference and equivalence expansion over a versioned triple store.
//!
//! This crate provides:
//! - Pattern unification and binding merging ([`unify`])
//! - Rules and JSON-loadable rule sets ([`rule`])
//! - A forward-chaining fixpoint over point-in-time, delta and version
//!   queries, with deletion suppression for deltas ([`fixpoint`])
//! - Equivalence expansion over `owl:sameAs` / `ex:becomes` links with
//!   canonicalizing or all-combinations reconciliation ([`equivalence`])
//! - A query adapter over one store or a dataset + language store pair
//!   ([`adapter`])
//!
//! The two engines are independent: [`Reasoner::infer`] never expands
//! equivalences and [`Equivalence`] never applies rules.
//!
//! ## Example
//!
//! ```ignore
//! use strata_reasoner::{QueryAdapter, Reasoner, RuleSet};
//! use strata_core::{QueryPattern, VersionMaterializedOptions};
//!
//! let reasoner = Reasoner::new(QueryAdapter::single(store), RuleSet::rdfs());
//! let result = reasoner
//!     .infer_version_materialized(&pattern, &VersionMaterializedOptions::new(3))
//!     .await?;
//! for triple in &result.triples { println!("{}", triple); }
//! ```

pub mod accumulate;
pub mod adapter;
pub mod config;
pub mod diagnostics;
pub mod equivalence;
pub mod error;
pub mod fixpoint;
pub mod rule;
pub mod unify;

// Re-exports for convenience
pub use adapter::{QueryAdapter, QueryMode, QueryStats, Scope, ScopedQuery};
pub use config::{EquivalenceConfig, Reconcile, ReasonerConfig};
pub use diagnostics::{ExpansionDiagnostics, Expanded, InferenceDiagnostics, Inferred};
pub use equivalence::{Equivalence, Expansion};
pub use error::{ReasonerError, Result};
pub use fixpoint::run_fixpoint;
pub use rule::{Rule, RuleSet};
pub use unify::Binding;

use strata_core::{DeltaMaterializedOptions, QueryPattern, VersionMaterializedOptions};

/// Rule inference and equivalence expansion over one adapter
#[derive(Clone, Debug)]
pub struct Reasoner {
    adapter: QueryAdapter,
    rules: RuleSet,
    config: ReasonerConfig,
}

impl Reasoner {
    /// Create a reasoner with the default configuration
    pub fn new(adapter: QueryAdapter, rules: RuleSet) -> Self {
        Self::with_config(adapter, rules, ReasonerConfig::default())
    }

    pub fn with_config(adapter: QueryAdapter, rules: RuleSet, config: ReasonerConfig) -> Self {
        Self {
            adapter,
            rules,
            config,
        }
    }

    pub fn adapter(&self) -> &QueryAdapter {
        &self.adapter
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn config(&self) -> &ReasonerConfig {
        &self.config
    }

    /// Answer `pattern` with rule inference in the mode `scoped` names
    pub async fn infer(&self, pattern: &QueryPattern, scoped: &ScopedQuery) -> Result<Inferred> {
        run_fixpoint(&self.adapter, &self.rules, pattern, scoped).await
    }

    /// Point-in-time inference; `opts.limit` bounds the seed query only
    pub async fn infer_version_materialized(
        &self,
        pattern: &QueryPattern,
        opts: &VersionMaterializedOptions,
    ) -> Result<Inferred> {
        self.infer(pattern, &ScopedQuery::new(*opts)).await
    }

    /// Delta inference; retractions that remain derivable are dropped
    pub async fn infer_delta_materialized(
        &self,
        pattern: &QueryPattern,
        opts: &DeltaMaterializedOptions,
    ) -> Result<Inferred> {
        self.infer(pattern, &ScopedQuery::new(*opts)).await
    }

    /// Version-query inference; conclusions carry the versions they hold in
    pub async fn infer_version(&self, pattern: &QueryPattern) -> Result<Inferred> {
        self.infer(pattern, &ScopedQuery::version()).await
    }

    /// Equivalence engine over the same adapter, using the configured
    /// identity predicates
    pub fn equivalence(&self) -> Equivalence {
        Equivalence::new(self.adapter.clone(), self.config.equivalence())
    }

    /// Equivalence search in the mode `scoped` names, using the configured
    /// reconcile mode
    pub async fn search_equivalent(
        &self,
        pattern: &QueryPattern,
        scoped: &ScopedQuery,
    ) -> Result<Expanded> {
        self.equivalence()
            .search_scoped(pattern, scoped, self.config.reconcile)
            .await
    }

    pub async fn close(&self) -> Result<()> {
        self.adapter.close().await
    }
}
