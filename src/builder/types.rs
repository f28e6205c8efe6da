//! Type and spec entities
//!
//! `@type`/`@typep`/`@opaque` become type entities keyed by `name/arity`.
//! Each `@spec` becomes its own entity, indexed among specs for the same
//! function, linked to the function it describes.

use super::{add_location, function_iri, BuildOutput, Built, BuilderKind, EntityBuilder};
use crate::context::BuildContext;
use crate::extract::{ModuleAnalysis, SpecRecord, TypeRecord, TypeVisibility};
use crate::graph::{build_list, Graph, Literal, Term, Triple};
use crate::iri::Iri;
use crate::vocab::structure;
use crate::Result;

pub struct TypeBuilder;

impl EntityBuilder for TypeBuilder {
    fn kind(&self) -> BuilderKind {
        BuilderKind::Types
    }

    fn build(&self, analysis: &ModuleAnalysis, ctx: &BuildContext) -> Result<BuildOutput> {
        ctx.require_module()?;
        let mut graph = Graph::new();
        for record in &analysis.types {
            graph.merge(build_type(record, ctx)?.graph);
        }
        for record in &analysis.specs {
            graph.merge(build_spec(record, ctx)?.graph);
        }
        Ok(BuildOutput::unchanged(graph, ctx))
    }
}

pub fn build_type(record: &TypeRecord, ctx: &BuildContext) -> Result<Built> {
    let module = ctx.require_module()?;
    let iri = Iri::for_type(module, &record.name, record.arity());
    let mut graph = Graph::new();

    let class = match record.visibility {
        TypeVisibility::Public => structure::PUBLIC_TYPE,
        TypeVisibility::Private => structure::PRIVATE_TYPE,
        TypeVisibility::Opaque => structure::OPAQUE_TYPE,
    };
    graph.add_type(&iri, class);
    graph.add_literal(&iri, structure::TYPE_NAME, Literal::string(record.name.as_str()));
    graph.add_literal(&iri, structure::ARITY, Literal::count(record.arity()));
    for param in &record.params {
        graph.add_literal(&iri, structure::TYPE_PARAMETER, Literal::string(param.as_str()));
    }
    graph.add_literal(
        &iri,
        structure::TYPE_EXPRESSION,
        Literal::string(record.definition.as_str()),
    );
    graph.add_bidirectional(&iri, structure::TYPE_OF, module, structure::HAS_TYPE);
    add_location(&mut graph, &iri, record.location, ctx);

    Ok(Built { iri, graph })
}

pub fn build_spec(record: &SpecRecord, ctx: &BuildContext) -> Result<Built> {
    let module = ctx.require_module()?;
    let iri = Iri::for_spec(module, &record.key.name, record.key.arity, record.index);
    let function = function_iri(module, &record.key);
    let mut graph = Graph::new();

    graph.add_type(&iri, structure::FUNCTION_SPEC);
    graph.add_bidirectional(&iri, structure::SPEC_FOR, &function, structure::HAS_SPEC);
    graph.add_link(&iri, structure::DECLARED_IN, module);
    graph.add_literal(
        &iri,
        structure::RETURN_TYPE,
        Literal::string(record.return_type.as_str()),
    );

    let items: Vec<Term> = record
        .param_types
        .iter()
        .map(|t| Term::Literal(Literal::string(t.as_str())))
        .collect();
    let (head, list) = build_list(&iri, "param_types", &items);
    graph.insert(Triple::new(iri.clone(), structure::HAS_PARAMETER_TYPES, head));
    graph.merge(list);

    add_location(&mut graph, &iri, record.location, ctx);
    Ok(Built { iri, graph })
}
