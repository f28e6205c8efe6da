//! Anonymous function entities
//!
//! An `fn` has no name, so its IRI takes the next value of the threaded
//! counter under the enclosing function.

use super::{add_location, function_iri, BuildOutput, Built, BuilderKind, EntityBuilder};
use crate::context::BuildContext;
use crate::extract::{ClosureRecord, ModuleAnalysis};
use crate::graph::{Graph, Literal};
use crate::iri::Iri;
use crate::vocab::structure;
use crate::Result;

pub struct ClosureBuilder;

impl EntityBuilder for ClosureBuilder {
    fn kind(&self) -> BuilderKind {
        BuilderKind::Closures
    }

    fn build(&self, analysis: &ModuleAnalysis, ctx: &BuildContext) -> Result<BuildOutput> {
        ctx.require_module()?;
        let mut graph = Graph::new();
        let mut ctx = ctx.clone();
        for record in &analysis.closures {
            let (built, next) = build_closure(record, ctx)?;
            graph.merge(built.graph);
            ctx = next;
        }
        Ok(BuildOutput { graph, context: ctx })
    }
}

pub fn build_closure(record: &ClosureRecord, ctx: BuildContext) -> Result<(Built, BuildContext)> {
    let function = function_iri(ctx.require_module()?, &record.owner);
    let (n, ctx) = ctx.next_counter();
    let iri = Iri::for_anonymous(&function, "anon", n);
    let mut graph = Graph::new();

    graph.add_type(&iri, structure::ANONYMOUS_FUNCTION);
    graph.add_literal(&iri, structure::ARITY, Literal::count(record.arity));
    graph.add_literal(&iri, structure::CLAUSE_COUNT, Literal::count(record.clause_count));
    graph.add_literal(
        &iri,
        structure::HAS_CAPTURES,
        Literal::boolean(record.analysis.has_captures),
    );
    for name in record.analysis.names() {
        graph.add_literal(&iri, structure::CAPTURES_VARIABLE, Literal::string(name));
    }

    graph.add_bidirectional(
        &iri,
        structure::ANONYMOUS_FUNCTION_OF,
        &function,
        structure::HAS_ANONYMOUS_FUNCTION,
    );
    let clause = Iri::for_clause(&function, record.clause_index);
    graph.add_bidirectional(
        &iri,
        structure::DEFINED_IN_CLAUSE,
        &clause,
        structure::CONTAINS_ANONYMOUS_FUNCTION,
    );

    add_location(&mut graph, &iri, record.location, &ctx);
    Ok((Built { iri, graph }, ctx))
}
