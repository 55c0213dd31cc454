//! Terms - opaque string identifiers for IRIs, literals and variables
//!
//! A term is a *variable* iff its first character is `?` or `_`
//! (the latter covers blank-node style names such as `_:b0`).
//! Everything else is a constant: an IRI or a literal such as `"Bobby"`.
//!
//! Terms use `Arc<str>` so cloning a term while instantiating rules,
//! building bindings and deduplicating results never copies string data.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

/// An opaque string identifier (IRI, literal, or variable)
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Term(Arc<str>);

impl Term {
    /// Create a new term
    pub fn new(value: impl AsRef<str>) -> Self {
        Term(Arc::from(value.as_ref()))
    }

    /// The raw string value
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check if this term is a variable (`?x` or `_x`)
    #[inline]
    pub fn is_variable(&self) -> bool {
        is_variable(&self.0)
    }

    /// Check if this term is a constant (IRI or literal)
    #[inline]
    pub fn is_constant(&self) -> bool {
        !self.is_variable()
    }
}

/// Check if a raw string names a variable
#[inline]
pub fn is_variable(value: &str) -> bool {
    matches!(value.as_bytes().first(), Some(b'?') | Some(b'_'))
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Term {
    fn from(value: &str) -> Self {
        Term::new(value)
    }
}

impl From<String> for Term {
    fn from(value: String) -> Self {
        Term(Arc::from(value))
    }
}

impl From<&String> for Term {
    fn from(value: &String) -> Self {
        Term::new(value)
    }
}

impl AsRef<str> for Term {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Term {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for Term {
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl PartialEq<&str> for Term {
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}
