//! Versioned triple store contract
//!
//! This module defines the interface the reasoning engines need from a
//! versioned triple store. The persistent engine itself lives outside this
//! workspace; apps provide their own implementation. [`MemoryStore`] is the
//! in-memory implementation used for tests and small datasets.
//!
//! The trait is runtime-agnostic and uses `async_trait` for async support.
//!
//! ## Query modes
//!
//! - **Version materialized**: the dataset as it stood at one version.
//! - **Delta materialized**: facts added/removed between two versions,
//!   annotated with `Annotation::Addition`.
//! - **Version query**: all facts across all versions, annotated with
//!   `Annotation::Versions`.
//!
//! ## Example
//!
//! ```ignore
//! use strata_core::{VersionedStore, QueryPattern, VersionMaterializedOptions};
//!
//! let rows = store
//!     .search_version_materialized(&QueryPattern::any(), &VersionMaterializedOptions::new(3))
//!     .await?;
//! ```
//!
//! [`MemoryStore`]: crate::memory::MemoryStore

use crate::error::Result;
use crate::triple::{QueryPattern, Triple};
use crate::version::{DeltaMaterializedOptions, Version, VersionMaterializedOptions};
use async_trait::async_trait;
use std::fmt::Debug;

/// Versioned triple store operations
///
/// Count operations default to counting search rows; stores with cheaper
/// cardinality estimates should override them.
#[async_trait]
pub trait VersionedStore: Debug + Send + Sync {
    /// Triples matching `pattern` that hold at `opts.version`
    ///
    /// Returned triples carry no annotation.
    async fn search_version_materialized(
        &self,
        pattern: &QueryPattern,
        opts: &VersionMaterializedOptions,
    ) -> Result<Vec<Triple>>;

    /// Triples matching `pattern` that differ between the two versions
    ///
    /// Returned triples carry `Annotation::Addition`.
    async fn search_delta_materialized(
        &self,
        pattern: &QueryPattern,
        opts: &DeltaMaterializedOptions,
    ) -> Result<Vec<Triple>>;

    /// Triples matching `pattern` in any version
    ///
    /// Returned triples carry `Annotation::Versions` (never empty).
    async fn search_version(&self, pattern: &QueryPattern) -> Result<Vec<Triple>>;

    async fn count_version_materialized(
        &self,
        pattern: &QueryPattern,
        opts: &VersionMaterializedOptions,
    ) -> Result<usize> {
        Ok(self.search_version_materialized(pattern, opts).await?.len())
    }

    async fn count_delta_materialized(
        &self,
        pattern: &QueryPattern,
        opts: &DeltaMaterializedOptions,
    ) -> Result<usize> {
        Ok(self.search_delta_materialized(pattern, opts).await?.len())
    }

    async fn count_version(&self, pattern: &QueryPattern) -> Result<usize> {
        Ok(self.search_version(pattern).await?.len())
    }

    /// Append a changeset to `version`
    ///
    /// Every triple must carry `Annotation::Addition`. Returns the number of
    /// triples actually stored (no-op changes are not counted).
    async fn append(&self, version: Version, triples: &[Triple]) -> Result<usize>;

    /// Highest ingested version, or `-1` if the store is empty
    fn max_version(&self) -> Version;

    /// Release resources. Later calls fail.
    async fn close(&self) -> Result<()>;
}
