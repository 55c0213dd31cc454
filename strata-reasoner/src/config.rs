//! Reasoner configuration
//!
//! All fields are optional in JSON; missing fields take their defaults.
//!
//! ```json
//! {
//!   "identityPredicates": ["http://www.w3.org/2002/07/owl#sameAs"],
//!   "reconcile": "allCombinations"
//! }
//! ```
//!
//! `from_env_or_default` reads the file named by `STRATA_CONFIG` (if set)
//! and lets `STRATA_RECONCILE` override the reconcile mode.

use crate::error::{ReasonerError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use strata_core::Term;
use strata_vocab::identity;

/// Environment variable naming a JSON config file
pub const CONFIG_PATH_ENV: &str = "STRATA_CONFIG";
/// Environment variable overriding [`ReasonerConfig::reconcile`]
pub const RECONCILE_ENV: &str = "STRATA_RECONCILE";

/// How results of an expanded query are mapped back to the caller's terms
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Reconcile {
    /// Rewrite every field the query fixed back to the queried term
    #[default]
    Canonicalize,
    /// Emit a copy of each result for every equivalent term
    AllCombinations,
}

impl fmt::Display for Reconcile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Reconcile::Canonicalize => "canonicalize",
            Reconcile::AllCombinations => "allCombinations",
        })
    }
}

impl FromStr for Reconcile {
    type Err = ReasonerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "canonicalize" => Ok(Reconcile::Canonicalize),
            "allcombinations" => Ok(Reconcile::AllCombinations),
            other => Err(ReasonerError::config(format!(
                "unknown reconcile mode '{}' (expected canonicalize or allCombinations)",
                other
            ))),
        }
    }
}

/// Equivalence expansion settings
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EquivalenceConfig {
    /// Predicates treated as identity links
    pub identity_predicates: Vec<Term>,
}

impl Default for EquivalenceConfig {
    fn default() -> Self {
        Self {
            identity_predicates: identity::DEFAULT_PREDICATES
                .iter()
                .map(|p| Term::new(*p))
                .collect(),
        }
    }
}

impl EquivalenceConfig {
    pub fn new(identity_predicates: impl IntoIterator<Item = impl Into<Term>>) -> Self {
        Self {
            identity_predicates: identity_predicates.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_identity(&self, predicate: &Term) -> bool {
        self.identity_predicates.contains(predicate)
    }
}

/// Top-level reasoner configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReasonerConfig {
    /// Predicates treated as identity links
    pub identity_predicates: Vec<Term>,
    /// Default reconcile mode for equivalence searches
    pub reconcile: Reconcile,
}

impl Default for ReasonerConfig {
    fn default() -> Self {
        Self {
            identity_predicates: EquivalenceConfig::default().identity_predicates,
            reconcile: Reconcile::default(),
        }
    }
}

impl ReasonerConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Defaults, or the file named by `STRATA_CONFIG`, with environment overrides
    pub fn from_env_or_default() -> Result<Self> {
        let config = match std::env::var_os(CONFIG_PATH_ENV) {
            Some(path) => Self::from_path(path)?,
            None => Self::default(),
        };
        config.with_overrides(|var| std::env::var(var).ok())
    }

    /// Apply overrides from a variable lookup
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(val) = lookup(RECONCILE_ENV) {
            if !val.is_empty() {
                self.reconcile = val.parse()?;
            }
        }
        Ok(self)
    }

    pub fn equivalence(&self) -> EquivalenceConfig {
        EquivalenceConfig {
            identity_predicates: self.identity_predicates.clone(),
        }
    }

    fn validate(&self) -> Result<()> {
        if let Some(p) = self.identity_predicates.iter().find(|p| p.is_variable()) {
            return Err(ReasonerError::config(format!(
                "identity predicate '{}' is a variable",
                p
            )));
        }
        Ok(())
    }
}
