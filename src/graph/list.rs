//! Ordered lists encoded as RDF collections
//!
//! A triple store has no notion of sequence, so parameter and clause lists
//! are written as linked cells: every cell carries `rdf:first` (the item) and
//! `rdf:rest` (the next cell, or `rdf:nil` for the last). `n` items produce
//! exactly `2n` triples; the empty list is `rdf:nil` and produces none. The
//! caller attaches the returned head with its own predicate.

use super::{Graph, Term, Triple};
use crate::iri::Iri;
use crate::vocab::rdf;

/// Build an RDF list owned by `owner`, cells named `{owner}/{label}/cell/{i}`.
///
/// Returns the head term and the list triples.
pub fn build_list(owner: &Iri, label: &str, items: &[Term]) -> (Term, Graph) {
    let mut graph = Graph::new();
    if items.is_empty() {
        return (Term::Iri(Iri::from(rdf::NIL)), graph);
    }

    let cells: Vec<Iri> = (0..items.len())
        .map(|i| Iri::for_list_cell(owner, label, i))
        .collect();

    for (i, item) in items.iter().enumerate() {
        let rest = cells
            .get(i + 1)
            .cloned()
            .unwrap_or_else(|| Iri::from(rdf::NIL));
        graph.insert(Triple::new(cells[i].clone(), rdf::FIRST, item.clone()));
        graph.insert(Triple::new(cells[i].clone(), rdf::REST, rest));
    }

    (Term::Iri(cells[0].clone()), graph)
}

/// Read a list back into its items, following `rdf:rest` from `head`
pub fn read_list(graph: &Graph, head: &Term) -> Vec<Term> {
    let mut items = Vec::new();
    let mut current = head.as_iri().cloned();
    while let Some(cell) = current {
        if cell.as_str() == rdf::NIL {
            break;
        }
        match graph.objects(&cell, rdf::FIRST).next() {
            Some(item) => items.push(item.clone()),
            None => break,
        }
        current = graph
            .objects(&cell, rdf::REST)
            .next()
            .and_then(Term::as_iri)
            .cloned();
    }
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Literal;

    fn owner() -> Iri {
        Iri::new("https://example.org/code#M/f/2/clause/0")
    }

    #[test]
    fn test_empty_list_is_nil() {
        let (head, graph) = build_list(&owner(), "params", &[]);
        assert_eq!(head, Term::Iri(Iri::from(rdf::NIL)));
        assert!(graph.is_empty());
    }

    #[test]
    fn test_list_triple_count() {
        let items: Vec<Term> = (0..3).map(|i| Term::Literal(Literal::integer(i))).collect();
        let (head, graph) = build_list(&owner(), "params", &items);
        assert_eq!(graph.len(), 6);
        assert_eq!(read_list(&graph, &head), items);
    }

    #[test]
    fn test_last_cell_points_to_nil() {
        let items = vec![Term::Literal(Literal::string("only"))];
        let (head, graph) = build_list(&owner(), "params", &items);
        let cell = head.as_iri().unwrap();
        let rest: Vec<_> = graph.objects(cell, rdf::REST).collect();
        assert_eq!(rest, vec![&Term::Iri(Iri::from(rdf::NIL))]);
    }
}
