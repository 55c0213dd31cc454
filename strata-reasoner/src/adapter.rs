//! Versioned query adapter
//!
//! Gives the engines one interface over the three query modes and over a
//! single store or a dataset store paired with a language (schema) store.
//! In dual mode each store is queried with its own scope, both calls run
//! concurrently and their rows are concatenated.

use crate::error::{ReasonerError, Result};
use futures::try_join;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use strata_core::{
    DeltaMaterializedOptions, QueryPattern, Triple, Version, VersionMaterializedOptions,
    VersionedStore,
};

/// Query mode tag without options
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum QueryMode {
    VersionMaterialized,
    DeltaMaterialized,
    Version,
}

impl fmt::Display for QueryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            QueryMode::VersionMaterialized => "version-materialized",
            QueryMode::DeltaMaterialized => "delta-materialized",
            QueryMode::Version => "version",
        })
    }
}

/// Query mode plus its options
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Scope {
    VersionMaterialized(VersionMaterializedOptions),
    DeltaMaterialized(DeltaMaterializedOptions),
    Version,
}

impl Scope {
    pub fn mode(&self) -> QueryMode {
        match self {
            Scope::VersionMaterialized(_) => QueryMode::VersionMaterialized,
            Scope::DeltaMaterialized(_) => QueryMode::DeltaMaterialized,
            Scope::Version => QueryMode::Version,
        }
    }

    /// Scope used to evaluate residual rule bodies
    ///
    /// - point-in-time: same version, no limit
    /// - delta: point-in-time at `version_end`
    /// - version query: unchanged
    pub fn body_scope(&self) -> Scope {
        match self {
            Scope::VersionMaterialized(opts) => {
                Scope::VersionMaterialized(VersionMaterializedOptions::new(opts.version))
            }
            Scope::DeltaMaterialized(opts) => {
                Scope::VersionMaterialized(VersionMaterializedOptions::new(opts.version_end))
            }
            Scope::Version => Scope::Version,
        }
    }
}

impl From<VersionMaterializedOptions> for Scope {
    fn from(opts: VersionMaterializedOptions) -> Self {
        Scope::VersionMaterialized(opts)
    }
}

impl From<DeltaMaterializedOptions> for Scope {
    fn from(opts: DeltaMaterializedOptions) -> Self {
        Scope::DeltaMaterialized(opts)
    }
}

/// Per-store scopes for one query
///
/// The language scope defaults to the dataset scope. It may name a
/// different version but must use the same mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScopedQuery {
    pub dataset: Scope,
    pub language: Option<Scope>,
}

impl ScopedQuery {
    pub fn new(dataset: impl Into<Scope>) -> Self {
        Self {
            dataset: dataset.into(),
            language: None,
        }
    }

    pub fn version() -> Self {
        Self::new(Scope::Version)
    }

    pub fn with_language(mut self, language: impl Into<Scope>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn language_scope(&self) -> Scope {
        self.language.unwrap_or(self.dataset)
    }

    /// Query mode, validated across both scopes
    pub fn mode(&self) -> Result<QueryMode> {
        let dataset = self.dataset.mode();
        let language = self.language_scope().mode();
        if dataset != language {
            return Err(ReasonerError::ScopeMismatch { dataset, language });
        }
        Ok(dataset)
    }

    /// Scopes for evaluating residual rule bodies
    pub fn body(&self) -> ScopedQuery {
        ScopedQuery {
            dataset: self.dataset.body_scope(),
            language: self.language.map(|scope| scope.body_scope()),
        }
    }
}

impl From<Scope> for ScopedQuery {
    fn from(scope: Scope) -> Self {
        ScopedQuery::new(scope)
    }
}

/// Sub-query counter for one top-level operation
///
/// Shared by reference across concurrently polled store calls.
#[derive(Debug, Default)]
pub struct QueryStats {
    sub_queries: AtomicUsize,
}

impl QueryStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self) {
        self.sub_queries.fetch_add(1, Ordering::Relaxed);
    }

    pub fn sub_queries(&self) -> usize {
        self.sub_queries.load(Ordering::Relaxed)
    }
}

/// Store backend(s) the engines query through
#[derive(Clone, Debug)]
pub enum QueryAdapter {
    Single(Arc<dyn VersionedStore>),
    Dual {
        dataset: Arc<dyn VersionedStore>,
        language: Arc<dyn VersionedStore>,
    },
}

impl QueryAdapter {
    pub fn single(store: Arc<dyn VersionedStore>) -> Self {
        QueryAdapter::Single(store)
    }

    pub fn dual(dataset: Arc<dyn VersionedStore>, language: Arc<dyn VersionedStore>) -> Self {
        QueryAdapter::Dual { dataset, language }
    }

    pub fn is_dual(&self) -> bool {
        matches!(self, QueryAdapter::Dual { .. })
    }

    /// Rows matching `pattern` under `scoped`
    pub async fn search(
        &self,
        pattern: &QueryPattern,
        scoped: &ScopedQuery,
        stats: &QueryStats,
    ) -> Result<Vec<Triple>> {
        scoped.mode()?;
        match self {
            QueryAdapter::Single(store) => {
                search_store(store.as_ref(), pattern, &scoped.dataset, stats).await
            }
            QueryAdapter::Dual { dataset, language } => {
                let language_scope = scoped.language_scope();
                let (mut rows, language_rows) = try_join!(
                    search_store(dataset.as_ref(), pattern, &scoped.dataset, stats),
                    search_store(language.as_ref(), pattern, &language_scope, stats),
                )?;
                rows.extend(language_rows);
                Ok(rows)
            }
        }
    }

    /// Number of rows matching `pattern` under `scoped`
    pub async fn count(
        &self,
        pattern: &QueryPattern,
        scoped: &ScopedQuery,
        stats: &QueryStats,
    ) -> Result<usize> {
        scoped.mode()?;
        match self {
            QueryAdapter::Single(store) => {
                count_store(store.as_ref(), pattern, &scoped.dataset, stats).await
            }
            QueryAdapter::Dual { dataset, language } => {
                let language_scope = scoped.language_scope();
                let (a, b) = try_join!(
                    count_store(dataset.as_ref(), pattern, &scoped.dataset, stats),
                    count_store(language.as_ref(), pattern, &language_scope, stats),
                )?;
                Ok(a + b)
            }
        }
    }

    /// Highest version of the dataset store
    pub fn max_version(&self) -> Version {
        match self {
            QueryAdapter::Single(store) => store.max_version(),
            QueryAdapter::Dual { dataset, .. } => dataset.max_version(),
        }
    }

    pub async fn close(&self) -> Result<()> {
        match self {
            QueryAdapter::Single(store) => store.close().await?,
            QueryAdapter::Dual { dataset, language } => {
                try_join!(dataset.close(), language.close())?;
            }
        }
        Ok(())
    }
}

async fn search_store(
    store: &dyn VersionedStore,
    pattern: &QueryPattern,
    scope: &Scope,
    stats: &QueryStats,
) -> Result<Vec<Triple>> {
    stats.record();
    let rows = match scope {
        Scope::VersionMaterialized(opts) => store.search_version_materialized(pattern, opts).await?,
        Scope::DeltaMaterialized(opts) => store.search_delta_materialized(pattern, opts).await?,
        Scope::Version => store.search_version(pattern).await?,
    };
    tracing::trace!(%pattern, mode = %scope.mode(), rows = rows.len(), "store search");
    Ok(rows)
}

async fn count_store(
    store: &dyn VersionedStore,
    pattern: &QueryPattern,
    scope: &Scope,
    stats: &QueryStats,
) -> Result<usize> {
    stats.record();
    let count = match scope {
        Scope::VersionMaterialized(opts) => store.count_version_materialized(pattern, opts).await?,
        Scope::DeltaMaterialized(opts) => store.count_delta_materialized(pattern, opts).await?,
        Scope::Version => store.count_version(pattern).await?,
    };
    Ok(count)
}
