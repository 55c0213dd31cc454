//! Rules and rule sets
//!
//! A rule is a pair of pattern lists: when every body (`from`) pattern holds,
//! every head (`to`) pattern holds. Variables are scoped to the rule.
//!
//! Rule sets are loaded from the structured JSON form:
//!
//! ```json
//! [
//!   {
//!     "name": "subclass",
//!     "from": [
//!       {"subject": "?c", "predicate": "rdfs:subClassOf", "object": "?d"},
//!       {"subject": "?x", "predicate": "rdf:type", "object": "?c"}
//!     ],
//!     "to": [{"subject": "?x", "predicate": "rdf:type", "object": "?d"}]
//!   }
//! ]
//! ```

use crate::error::{ReasonerError, Result};
use crate::unify::{bind_rule, bindings_compatible, match_patterns, Binding};
use serde::{Deserialize, Serialize};
use std::path::Path;
use strata_core::{Pattern, QueryPattern, Term, Triple};
use strata_vocab::{rdf, rdfs};

/// A Horn-like rule: body patterns entail head patterns
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rule {
    /// Rule name for diagnostics
    #[serde(default)]
    pub name: String,
    /// Body patterns
    pub from: Vec<Pattern>,
    /// Head patterns
    pub to: Vec<Pattern>,
}

impl Rule {
    pub fn new(name: impl Into<String>, from: Vec<Pattern>, to: Vec<Pattern>) -> Self {
        Self {
            name: name.into(),
            from,
            to,
        }
    }

    /// `?c rdfs:subClassOf ?d, ?x rdf:type ?c => ?x rdf:type ?d`
    pub fn rdfs_subclass() -> Self {
        Rule::new(
            "rdfs9",
            vec![
                Pattern::new("?c", rdfs::SUB_CLASS_OF, "?d"),
                Pattern::new("?x", rdf::TYPE, "?c"),
            ],
            vec![Pattern::new("?x", rdf::TYPE, "?d")],
        )
    }

    /// `?p rdfs:subPropertyOf ?q, ?x ?p ?y => ?x ?q ?y`
    pub fn rdfs_subproperty() -> Self {
        Rule::new(
            "rdfs7",
            vec![
                Pattern::new("?p", rdfs::SUB_PROPERTY_OF, "?q"),
                Pattern::new("?x", "?p", "?y"),
            ],
            vec![Pattern::new("?x", "?q", "?y")],
        )
    }

    /// `?c rdfs:subClassOf ?d, ?d rdfs:subClassOf ?e => ?c rdfs:subClassOf ?e`
    pub fn rdfs_subclass_transitive() -> Self {
        Rule::new(
            "rdfs11",
            vec![
                Pattern::new("?c", rdfs::SUB_CLASS_OF, "?d"),
                Pattern::new("?d", rdfs::SUB_CLASS_OF, "?e"),
            ],
            vec![Pattern::new("?c", rdfs::SUB_CLASS_OF, "?e")],
        )
    }

    /// Display name, falling back to the rule's shape when unnamed
    pub fn label(&self) -> String {
        if !self.name.is_empty() {
            return self.name.clone();
        }
        let heads: Vec<String> = self.to.iter().map(|p| p.to_string()).collect();
        format!("=> {}", heads.join(" "))
    }

    /// Specialize this rule for a query pattern
    ///
    /// Every head pattern must unify with the query pattern (wildcards
    /// materialized as `?s ?p ?o`) and the head bindings must agree.
    /// Returns None when the rule cannot contribute to the query.
    pub fn specialize_for(&self, query: &QueryPattern) -> Option<Rule> {
        if self.to.is_empty() {
            return None;
        }
        let target = query.to_pattern();
        let mut head_bindings = Vec::with_capacity(self.to.len());
        for head in &self.to {
            head_bindings.push(match_patterns(head, &target)?);
        }
        let binding = bindings_compatible(&head_bindings)?;
        Some(bind_rule(self, &binding))
    }

    /// Match a frontier triple against the body
    ///
    /// The rule is triggered if at least one body pattern matches and every
    /// matching body pattern yields a compatible binding. The returned
    /// binding carries the triple's annotation.
    pub fn trigger(&self, triple: &Triple) -> Option<Binding> {
        let matches: Vec<Binding> = self
            .from
            .iter()
            .filter_map(|pattern| match_patterns(pattern, triple))
            .collect();
        if matches.is_empty() {
            return None;
        }
        let binding = bindings_compatible(&matches)?;
        Some(binding.with_annotation(triple.annotation.clone()))
    }

    /// Constant predicates of the body, or None if any body predicate is a variable
    pub fn body_predicates(&self) -> Option<Vec<&Term>> {
        let mut predicates = Vec::with_capacity(self.from.len());
        for pattern in &self.from {
            if pattern.predicate.is_variable() {
                return None;
            }
            predicates.push(&pattern.predicate);
        }
        Some(predicates)
    }

    fn validate(&self) -> Result<()> {
        if self.from.is_empty() {
            return Err(ReasonerError::invalid_rule(format!(
                "rule '{}' has an empty body",
                self.label()
            )));
        }
        if self.to.is_empty() {
            return Err(ReasonerError::invalid_rule(format!(
                "rule '{}' has an empty head",
                self.label()
            )));
        }
        Ok(())
    }
}

/// Ordered, immutable collection of rules
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a rule set, rejecting rules with an empty body or head
    pub fn from_rules(rules: Vec<Rule>) -> Result<Self> {
        for rule in &rules {
            rule.validate()?;
        }
        Ok(Self { rules })
    }

    /// The RDFS subclass and subproperty entailments
    pub fn rdfs() -> Self {
        Self {
            rules: vec![Rule::rdfs_subclass(), Rule::rdfs_subproperty()],
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let rules: Vec<Rule> = serde_json::from_str(json)?;
        Self::from_rules(rules)
    }

    pub fn from_json_value(value: serde_json::Value) -> Result<Self> {
        let rules: Vec<Rule> = serde_json::from_value(value)?;
        Self::from_rules(rules)
    }

    /// Load rules from a JSON file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn push(&mut self, rule: Rule) -> Result<()> {
        rule.validate()?;
        self.rules.push(rule);
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rules whose heads can produce triples matching `query`, specialized
    /// with the head bindings
    pub fn applicable(&self, query: &QueryPattern) -> Vec<Rule> {
        self.rules
            .iter()
            .filter_map(|rule| {
                let specialized = rule.specialize_for(query);
                if specialized.is_none() {
                    tracing::trace!(rule = %rule.label(), %query, "rule not applicable");
                }
                specialized
            })
            .collect()
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a Rule;
    type IntoIter = std::slice::Iter<'a, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}
