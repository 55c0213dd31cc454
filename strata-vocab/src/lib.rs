//! RDF Vocabulary Constants for Strata
//!
//! This crate provides a centralized location for the vocabulary IRIs the
//! Strata crates refer to by name.
//!
//! # Organization
//!
//! Constants are organized by vocabulary:
//! - `rdf` - RDF vocabulary (http://www.w3.org/1999/02/22-rdf-syntax-ns#)
//! - `rdfs` - RDFS vocabulary (http://www.w3.org/2000/01/rdf-schema#)
//! - `owl` - OWL vocabulary (http://www.w3.org/2002/07/owl#)
//! - `ex` - example vocabulary (http://example.org/), home of `ex:becomes`
//! - `identity` - the default identity predicates used for equivalence

/// RDF vocabulary constants
pub mod rdf {
    /// RDF namespace IRI
    pub const NS: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";

    /// rdf:type IRI
    pub const TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
}

/// RDFS vocabulary constants
pub mod rdfs {
    /// RDFS namespace IRI
    pub const NS: &str = "http://www.w3.org/2000/01/rdf-schema#";

    /// rdfs:subClassOf IRI
    pub const SUB_CLASS_OF: &str = "http://www.w3.org/2000/01/rdf-schema#subClassOf";

    /// rdfs:subPropertyOf IRI
    pub const SUB_PROPERTY_OF: &str = "http://www.w3.org/2000/01/rdf-schema#subPropertyOf";
}

/// OWL vocabulary constants
pub mod owl {
    /// OWL namespace IRI
    pub const NS: &str = "http://www.w3.org/2002/07/owl#";

    /// owl:sameAs IRI
    pub const SAME_AS: &str = "http://www.w3.org/2002/07/owl#sameAs";
}

/// Example vocabulary constants
pub mod ex {
    /// Example namespace IRI
    pub const NS: &str = "http://example.org/";

    /// ex:becomes IRI
    ///
    /// Like owl:sameAs, but with temporal semantics: the subject is replaced
    /// by the object from the version the link is asserted in.
    pub const BECOMES: &str = "http://example.org/becomes";
}

/// Identity predicates
pub mod identity {
    /// Predicates treated as identity links unless configured otherwise.
    pub const DEFAULT_PREDICATES: [&str; 2] = [super::owl::SAME_AS, super::ex::BECOMES];

}
