//! Triples, patterns and query patterns
//!
//! - [`Triple`]: a subject-predicate-object fact with a mode-dependent
//!   [`Annotation`] (nothing, an addition flag, or a version set).
//! - [`Pattern`]: three terms, any of which may be a variable. Used for rule
//!   bodies and heads.
//! - [`QueryPattern`]: the store-facing form with optional fields, where
//!   `None` is a wildcard.
//!
//! ## JSON shape
//!
//! Triples serialize as `{subject, predicate, object}` plus either
//! `addition` or `versions`, never both.

use crate::term::Term;
use crate::version::VersionSet;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Positional access to subject, predicate and object
///
/// Implemented by [`Pattern`], [`Triple`] and bare `(s, p, o)` tuples so
/// unification can treat a stored fact as a fully ground pattern.
pub trait Spo {
    fn subject(&self) -> &Term;
    fn predicate(&self) -> &Term;
    fn object(&self) -> &Term;
}

/// Position of a term within a triple
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Position {
    Subject,
    Predicate,
    Object,
}

impl Position {
    pub const ALL: [Position; 3] = [Position::Subject, Position::Predicate, Position::Object];

    /// Fresh variable used when a wildcard has to be materialized
    pub fn wildcard_var(self) -> &'static str {
        match self {
            Position::Subject => "?s",
            Position::Predicate => "?p",
            Position::Object => "?o",
        }
    }
}

/// Mode-dependent metadata carried by a triple
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Annotation {
    /// Point-in-time results carry no metadata
    #[default]
    None,
    /// Delta results: `true` = assertion, `false` = retraction
    Addition(bool),
    /// Version-query results: the versions the triple holds in
    Versions(VersionSet),
}

impl Annotation {
    pub fn is_none(&self) -> bool {
        matches!(self, Annotation::None)
    }

    pub fn addition(&self) -> Option<bool> {
        match self {
            Annotation::Addition(a) => Some(*a),
            _ => None,
        }
    }

    pub fn versions(&self) -> Option<&VersionSet> {
        match self {
            Annotation::Versions(v) => Some(v),
            _ => None,
        }
    }
}

/// A triple pattern whose fields may be variables
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Pattern {
    pub subject: Term,
    pub predicate: Term,
    pub object: Term,
}

impl Pattern {
    pub fn new(
        subject: impl Into<Term>,
        predicate: impl Into<Term>,
        object: impl Into<Term>,
    ) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object: object.into(),
        }
    }

    /// True iff no field is a variable
    pub fn is_materialized(&self) -> bool {
        !self.subject.is_variable() && !self.predicate.is_variable() && !self.object.is_variable()
    }

    pub fn get(&self, position: Position) -> &Term {
        match position {
            Position::Subject => &self.subject,
            Position::Predicate => &self.predicate,
            Position::Object => &self.object,
        }
    }

    /// Convert into a fact with the given annotation
    pub fn into_triple(self, annotation: Annotation) -> Triple {
        Triple {
            subject: self.subject,
            predicate: self.predicate,
            object: self.object,
            annotation,
        }
    }
}

impl Spo for Pattern {
    fn subject(&self) -> &Term {
        &self.subject
    }
    fn predicate(&self) -> &Term {
        &self.predicate
    }
    fn object(&self) -> &Term {
        &self.object
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}.", self.subject, self.predicate, self.object)
    }
}

/// A fact, optionally annotated with an addition flag or a version set
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "TripleRepr", into = "TripleRepr")]
pub struct Triple {
    pub subject: Term,
    pub predicate: Term,
    pub object: Term,
    pub annotation: Annotation,
}

impl Triple {
    /// Create an unannotated triple
    pub fn new(
        subject: impl Into<Term>,
        predicate: impl Into<Term>,
        object: impl Into<Term>,
    ) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object: object.into(),
            annotation: Annotation::None,
        }
    }

    /// Create an assertion (`addition = true`)
    pub fn addition(
        subject: impl Into<Term>,
        predicate: impl Into<Term>,
        object: impl Into<Term>,
    ) -> Self {
        Self::new(subject, predicate, object).with_annotation(Annotation::Addition(true))
    }

    /// Create a retraction (`addition = false`)
    pub fn deletion(
        subject: impl Into<Term>,
        predicate: impl Into<Term>,
        object: impl Into<Term>,
    ) -> Self {
        Self::new(subject, predicate, object).with_annotation(Annotation::Addition(false))
    }

    /// Create a version-annotated triple
    pub fn versioned(
        subject: impl Into<Term>,
        predicate: impl Into<Term>,
        object: impl Into<Term>,
        versions: impl IntoIterator<Item = crate::version::Version>,
    ) -> Self {
        Self::new(subject, predicate, object)
            .with_annotation(Annotation::Versions(versions.into_iter().collect()))
    }

    pub fn with_annotation(mut self, annotation: Annotation) -> Self {
        self.annotation = annotation;
        self
    }

    /// Structural key ignoring the annotation
    pub fn key(&self) -> (Term, Term, Term) {
        (self.subject.clone(), self.predicate.clone(), self.object.clone())
    }

    /// True if both triples state the same fact, ignoring annotations
    pub fn same_fact(&self, other: &Triple) -> bool {
        self.subject == other.subject
            && self.predicate == other.predicate
            && self.object == other.object
    }

    pub fn is_deletion(&self) -> bool {
        self.annotation.addition() == Some(false)
    }

    pub fn is_addition(&self) -> bool {
        self.annotation.addition() == Some(true)
    }

    pub fn get(&self, position: Position) -> &Term {
        match position {
            Position::Subject => &self.subject,
            Position::Predicate => &self.predicate,
            Position::Object => &self.object,
        }
    }

    pub fn set(&mut self, position: Position, term: Term) {
        match position {
            Position::Subject => self.subject = term,
            Position::Predicate => self.predicate = term,
            Position::Object => self.object = term,
        }
    }
}

impl Spo for Triple {
    fn subject(&self) -> &Term {
        &self.subject
    }
    fn predicate(&self) -> &Term {
        &self.predicate
    }
    fn object(&self) -> &Term {
        &self.object
    }
}

impl Spo for (Term, Term, Term) {
    fn subject(&self) -> &Term {
        &self.0
    }
    fn predicate(&self) -> &Term {
        &self.1
    }
    fn object(&self) -> &Term {
        &self.2
    }
}

impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.annotation {
            Annotation::None => write!(f, "{} {} {}.", self.subject, self.predicate, self.object),
            Annotation::Addition(a) => write!(
                f,
                "{} {} {} {}.",
                if *a { '+' } else { '-' },
                self.subject,
                self.predicate,
                self.object
            ),
            Annotation::Versions(v) => write!(
                f,
                "{} {} {}. @{}",
                self.subject, self.predicate, self.object, v
            ),
        }
    }
}

/// Wire representation with optional annotation fields
#[derive(Serialize, Deserialize)]
struct TripleRepr {
    subject: Term,
    predicate: Term,
    object: Term,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    addition: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    versions: Option<VersionSet>,
}

impl TryFrom<TripleRepr> for Triple {
    type Error = String;

    fn try_from(repr: TripleRepr) -> std::result::Result<Self, Self::Error> {
        let annotation = match (repr.addition, repr.versions) {
            (Some(_), Some(_)) => {
                return Err("a triple cannot carry both `addition` and `versions`".to_string())
            }
            (Some(a), None) => Annotation::Addition(a),
            (None, Some(v)) => Annotation::Versions(v),
            (None, None) => Annotation::None,
        };
        Ok(Triple {
            subject: repr.subject,
            predicate: repr.predicate,
            object: repr.object,
            annotation,
        })
    }
}

impl From<Triple> for TripleRepr {
    fn from(triple: Triple) -> Self {
        let (addition, versions) = match triple.annotation {
            Annotation::None => (None, None),
            Annotation::Addition(a) => (Some(a), None),
            Annotation::Versions(v) => (None, Some(v)),
        };
        TripleRepr {
            subject: triple.subject,
            predicate: triple.predicate,
            object: triple.object,
            addition,
            versions,
        }
    }
}

/// Store-facing pattern: `None` fields are wildcards
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct QueryPattern {
    pub subject: Option<Term>,
    pub predicate: Option<Term>,
    pub object: Option<Term>,
}

impl QueryPattern {
    /// Build a query pattern; variable terms are treated as wildcards.
    pub fn new(subject: Option<Term>, predicate: Option<Term>, object: Option<Term>) -> Self {
        fn ground(term: Option<Term>) -> Option<Term> {
            term.filter(Term::is_constant)
        }
        Self {
            subject: ground(subject),
            predicate: ground(predicate),
            object: ground(object),
        }
    }

    /// Match everything
    pub fn any() -> Self {
        Self::default()
    }

    /// Convenience constructor from optional string slices
    pub fn from_strs(subject: Option<&str>, predicate: Option<&str>, object: Option<&str>) -> Self {
        Self::new(subject.map(Term::new), predicate.map(Term::new), object.map(Term::new))
    }

    /// Derive the store query for a (partially bound) pattern
    pub fn from_pattern(pattern: &Pattern) -> Self {
        Self::new(
            Some(pattern.subject.clone()),
            Some(pattern.predicate.clone()),
            Some(pattern.object.clone()),
        )
    }

    pub fn get(&self, position: Position) -> Option<&Term> {
        match position {
            Position::Subject => self.subject.as_ref(),
            Position::Predicate => self.predicate.as_ref(),
            Position::Object => self.object.as_ref(),
        }
    }

    /// Pattern with wildcards materialized as `?s`, `?p`, `?o`
    pub fn to_pattern(&self) -> Pattern {
        let field = |position: Position| {
            self.get(position)
                .cloned()
                .unwrap_or_else(|| Term::new(position.wildcard_var()))
        };
        Pattern {
            subject: field(Position::Subject),
            predicate: field(Position::Predicate),
            object: field(Position::Object),
        }
    }

    /// True if the triple matches every concrete field
    pub fn matches(&self, triple: &impl Spo) -> bool {
        self.subject.as_ref().map_or(true, |s| s == triple.subject())
            && self.predicate.as_ref().map_or(true, |p| p == triple.predicate())
            && self.object.as_ref().map_or(true, |o| o == triple.object())
    }
}

impl fmt::Display for QueryPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_pattern())
    }
}
