//! Knowledge Graph - Deduplicated set of triples
//!
//! Builders each return a complete [`Graph`]; the orchestrator only merges
//! them. Backed by an ordered set, so duplicate statements collapse and
//! iteration order is deterministic regardless of which builder finished
//! first.

pub mod list;
pub mod triple;

pub use list::build_list;
pub use triple::{Datatype, Literal, Term, Triple};

use crate::iri::Iri;
use crate::vocab::rdf;
use std::collections::{BTreeSet, HashSet};

/// Immutable-by-convention set of triples.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Graph {
    triples: BTreeSet<Triple>,
}

impl Graph {
    /// Create a new empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a triple; returns false if it was already present
    pub fn insert(&mut self, triple: Triple) -> bool {
        self.triples.insert(triple)
    }

    /// `subject rdf:type class`
    pub fn add_type(&mut self, subject: &Iri, class: &'static str) {
        self.insert(Triple::new(subject.clone(), rdf::TYPE, Iri::from(class)));
    }

    /// Relationship to another entity
    pub fn add_link(&mut self, subject: &Iri, predicate: &'static str, object: &Iri) {
        self.insert(Triple::new(subject.clone(), predicate, object.clone()));
    }

    /// Relationship in both directions: `child --up--> parent` and
    /// `parent --down--> child`
    pub fn add_bidirectional(
        &mut self,
        child: &Iri,
        up: &'static str,
        parent: &Iri,
        down: &'static str,
    ) {
        self.add_link(child, up, parent);
        self.add_link(parent, down, child);
    }

    /// Literal property
    pub fn add_literal(&mut self, subject: &Iri, predicate: &'static str, value: Literal) {
        self.insert(Triple::new(subject.clone(), predicate, value));
    }

    /// Literal property, only when a value is present
    pub fn add_optional(
        &mut self,
        subject: &Iri,
        predicate: &'static str,
        value: Option<Literal>,
    ) {
        if let Some(value) = value {
            self.add_literal(subject, predicate, value);
        }
    }

    /// Merge another graph into this one
    pub fn merge(&mut self, other: Graph) {
        self.triples.extend(other.triples);
    }

    pub fn len(&self) -> usize {
        self.triples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    pub fn contains(&self, triple: &Triple) -> bool {
        self.triples.contains(triple)
    }

    /// True if `subject rdf:type class` is present
    pub fn has_type(&self, subject: &Iri, class: &str) -> bool {
        self.objects(subject, rdf::TYPE)
            .any(|o| o.as_iri().is_some_and(|iri| iri.as_str() == class))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Triple> {
        self.triples.iter()
    }

    /// Objects of `subject predicate ?o`
    pub fn objects<'a>(
        &'a self,
        subject: &'a Iri,
        predicate: &'a str,
    ) -> impl Iterator<Item = &'a Term> + 'a {
        self.triples
            .iter()
            .filter(move |t| &t.subject == subject && t.predicate.as_str() == predicate)
            .map(|t| &t.object)
    }

    /// First literal object of `subject predicate ?o`
    pub fn literal(&self, subject: &Iri, predicate: &str) -> Option<&Literal> {
        self.triples
            .iter()
            .filter(|t| &t.subject == subject && t.predicate.as_str() == predicate)
            .find_map(|t| t.object.as_literal())
    }

    /// All subjects typed with `class`
    pub fn subjects_of_type(&self, class: &str) -> Vec<&Iri> {
        self.triples
            .iter()
            .filter(|t| {
                t.predicate.as_str() == rdf::TYPE
                    && t.object.as_iri().is_some_and(|o| o.as_str() == class)
            })
            .map(|t| &t.subject)
            .collect()
    }

    /// Triples whose subject is `subject`
    pub fn about<'a>(&'a self, subject: &'a Iri) -> impl Iterator<Item = &'a Triple> + 'a {
        self.triples.iter().filter(move |t| &t.subject == subject)
    }

    /// Get statistics about the graph
    pub fn stats(&self) -> GraphStats {
        let subjects: HashSet<&Iri> = self.triples.iter().map(|t| &t.subject).collect();
        let typed: HashSet<&Iri> = self
            .triples
            .iter()
            .filter(|t| t.predicate.as_str() == rdf::TYPE)
            .map(|t| &t.subject)
            .collect();
        let relationships = self.triples.iter().filter(|t| t.is_relationship()).count();

        GraphStats {
            total_triples: self.triples.len(),
            subjects: subjects.len(),
            typed_entities: typed.len(),
            relationships,
            literals: self.triples.len() - relationships,
        }
    }
}

impl IntoIterator for Graph {
    type Item = Triple;
    type IntoIter = std::collections::btree_set::IntoIter<Triple>;

    fn into_iter(self) -> Self::IntoIter {
        self.triples.into_iter()
    }
}

impl FromIterator<Triple> for Graph {
    fn from_iter<I: IntoIterator<Item = Triple>>(iter: I) -> Self {
        Self {
            triples: iter.into_iter().collect(),
        }
    }
}

impl Extend<Triple> for Graph {
    fn extend<I: IntoIterator<Item = Triple>>(&mut self, iter: I) {
        self.triples.extend(iter);
    }
}

/// Statistics about a graph
#[derive(Debug, Clone, serde::Serialize)]
pub struct GraphStats {
    pub total_triples: usize,
    pub subjects: usize,
    pub typed_entities: usize,
    pub relationships: usize,
    pub literals: usize,
}

impl std::fmt::Display for GraphStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Graph Statistics:")?;
        writeln!(f, "  Triples: {}", self.total_triples)?;
        writeln!(f, "  Subjects: {} (typed: {})", self.subjects, self.typed_entities)?;
        writeln!(
            f,
            "  Objects: {} relationships, {} literals",
            self.relationships, self.literals
        )
    }
}
