//! Pattern unification and variable bindings
//!
//! Matching is one-directional: variables on the left-hand side bind to
//! constants on the right-hand side. A variable on the right matches
//! anything without binding, which is how head patterns unify against a
//! query pattern whose wildcards were materialized as `?s ?p ?o`.

use crate::rule::Rule;
use hashbrown::HashMap;
use strata_core::{Annotation, Pattern, Spo, Term, Triple};

/// Assignment of rule variables to constants
///
/// Optionally carries the annotation of the triple that produced it, which
/// is attached to every triple instantiated from the binding.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Binding {
    values: HashMap<Term, Term>,
    annotation: Annotation,
}

impl Binding {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binding with a single variable
    pub fn single(var: Term, value: Term) -> Self {
        let mut b = Self::new();
        b.values.insert(var, value);
        b
    }

    pub fn get(&self, var: &Term) -> Option<&Term> {
        self.values.get(var)
    }

    /// Bind `var` unless already bound. Returns false on a conflicting value.
    pub fn bind(&mut self, var: Term, value: Term) -> bool {
        match self.values.get(&var) {
            Some(existing) => *existing == value,
            None => {
                self.values.insert(var, value);
                true
            }
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Term, &Term)> {
        self.values.iter()
    }

    pub fn annotation(&self) -> &Annotation {
        &self.annotation
    }

    pub fn with_annotation(mut self, annotation: Annotation) -> Self {
        self.annotation = annotation;
        self
    }

    /// Resolve a term: bound variables become their value
    pub fn resolve(&self, term: &Term) -> Term {
        if term.is_variable() {
            self.values.get(term).cloned().unwrap_or_else(|| term.clone())
        } else {
            term.clone()
        }
    }
}

impl FromIterator<(Term, Term)> for Binding {
    fn from_iter<I: IntoIterator<Item = (Term, Term)>>(iter: I) -> Self {
        Binding {
            values: iter.into_iter().collect(),
            annotation: Annotation::None,
        }
    }
}

/// Match a single term
///
/// - `t1` variable: succeeds; binds `t1 → t2` only when `t2` is a constant.
/// - `t1` constant: succeeds (empty binding) iff `t2` is a variable or equal.
pub fn term_match(t1: &Term, t2: &Term) -> Option<Binding> {
    if t1.is_variable() {
        if t2.is_variable() {
            return Some(Binding::new());
        }
        return Some(Binding::single(t1.clone(), t2.clone()));
    }
    if t2.is_variable() || t1 == t2 {
        Some(Binding::new())
    } else {
        None
    }
}

/// Match two patterns field by field (subject, predicate, object)
///
/// Fails fast on the first mismatching field. A variable repeated in `p1`
/// must bind the same value in every position.
pub fn match_patterns<A, B>(p1: &A, p2: &B) -> Option<Binding>
where
    A: Spo + ?Sized,
    B: Spo + ?Sized,
{
    let s = term_match(p1.subject(), p2.subject())?;
    let p = term_match(p1.predicate(), p2.predicate())?;
    let o = term_match(p1.object(), p2.object())?;
    bindings_compatible(&[s, p, o])
}

/// Merge bindings, failing if any variable is bound to two different values
///
/// Keeps the first value seen per variable. The carried annotation is the
/// first non-empty annotation.
pub fn bindings_compatible(bindings: &[Binding]) -> Option<Binding> {
    let mut acc = Binding::new();
    for binding in bindings {
        for (var, value) in binding.iter() {
            if !acc.bind(var.clone(), value.clone()) {
                return None;
            }
        }
        if acc.annotation.is_none() && !binding.annotation.is_none() {
            acc.annotation = binding.annotation.clone();
        }
    }
    Some(acc)
}

/// Rewrite a pattern under a binding
pub fn bind_pattern(pattern: &Pattern, binding: &Binding) -> Pattern {
    Pattern {
        subject: binding.resolve(&pattern.subject),
        predicate: binding.resolve(&pattern.predicate),
        object: binding.resolve(&pattern.object),
    }
}

/// Specialize a rule: every body and head pattern rewritten under `binding`
pub fn bind_rule(rule: &Rule, binding: &Binding) -> Rule {
    Rule {
        name: rule.name.clone(),
        from: rule.from.iter().map(|p| bind_pattern(p, binding)).collect(),
        to: rule.to.iter().map(|p| bind_pattern(p, binding)).collect(),
    }
}

/// Instantiate a head pattern as a triple carrying the binding's annotation
///
/// Returns None if a variable is left unbound.
pub fn instantiate(pattern: &Pattern, binding: &Binding) -> Option<Triple> {
    let bound = bind_pattern(pattern, binding);
    if !bound.is_materialized() {
        return None;
    }
    Some(bound.into_triple(binding.annotation.clone()))
}

/// True iff no field of the pattern is a variable
#[inline]
pub fn is_pattern_materialized(pattern: &Pattern) -> bool {
    pattern.is_materialized()
}

/// Binding produced by a store row returned for `pattern`
///
/// Every variable of the pattern is bound to the row's value; the row's
/// annotation is carried along. Rows that bind a repeated variable to two
/// different values yield None.
pub fn pattern_binding(pattern: &Pattern, row: &Triple) -> Option<Binding> {
    match_patterns(pattern, row).map(|b| b.with_annotation(row.annotation.clone()))
}
