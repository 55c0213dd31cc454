//! Version numbers, version sets and query option shapes
//!
//! Versions are dense integers starting at 0. `-1` stands for the state
//! before the first version (an empty dataset), which is also what
//! `max_version()` reports for an empty store.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// A dataset version
pub type Version = i64;

/// Version reported by an empty store
pub const NO_VERSION: Version = -1;

/// Deduplicated set of versions in which a triple holds
///
/// Ordered for deterministic output; order carries no meaning.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionSet(BTreeSet<Version>);

impl VersionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, version: Version) -> bool {
        self.0.insert(version)
    }

    pub fn contains(&self, version: Version) -> bool {
        self.0.contains(&version)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Version> + '_ {
        self.0.iter().copied()
    }

    /// Union `other` into `self`, returning the versions that were new.
    pub fn union_with(&mut self, other: &VersionSet) -> VersionSet {
        let mut added = VersionSet::new();
        for v in other.iter() {
            if self.0.insert(v) {
                added.0.insert(v);
            }
        }
        added
    }

    /// Versions present in both sets
    pub fn intersection(&self, other: &VersionSet) -> VersionSet {
        VersionSet(self.0.intersection(&other.0).copied().collect())
    }
}

impl FromIterator<Version> for VersionSet {
    fn from_iter<I: IntoIterator<Item = Version>>(iter: I) -> Self {
        VersionSet(iter.into_iter().collect())
    }
}

impl Extend<Version> for VersionSet {
    fn extend<I: IntoIterator<Item = Version>>(&mut self, iter: I) {
        self.0.extend(iter)
    }
}

impl fmt::Display for VersionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for v in self.iter() {
            if !first {
                f.write_str(",")?;
            }
            write!(f, "{}", v)?;
            first = false;
        }
        Ok(())
    }
}

/// Options for point-in-time (version-materialized) queries
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionMaterializedOptions {
    /// Version to materialize the dataset at
    pub version: Version,
    /// Maximum number of result rows
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

impl VersionMaterializedOptions {
    pub fn new(version: Version) -> Self {
        Self {
            version,
            limit: None,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Options for delta-materialized queries
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeltaMaterializedOptions {
    /// Version the delta starts from (`-1` for "from nothing")
    pub version_start: Version,
    /// Version the delta ends at
    pub version_end: Version,
}

impl DeltaMaterializedOptions {
    pub fn new(version_start: Version, version_end: Version) -> Self {
        Self {
            version_start,
            version_end,
        }
    }
}
