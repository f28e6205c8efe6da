//! Protocol and protocol implementation entities
//!
//! A protocol reuses its module IRI; its functions are named like regular
//! functions. An implementation is identified by protocol and data type
//! (`{protocol}/impl/{type}`) and points at the module holding its code.

use super::{add_doc, add_location, function_iri, BuildOutput, BuilderKind, EntityBuilder};
use crate::context::BuildContext;
use crate::extract::{ImplRecord, ModuleAnalysis, ProtocolRecord};
use crate::graph::{Graph, Literal};
use crate::iri::Iri;
use crate::vocab::structure;
use crate::Result;

pub struct ProtocolBuilder;

impl EntityBuilder for ProtocolBuilder {
    fn kind(&self) -> BuilderKind {
        BuilderKind::Protocols
    }

    fn build(&self, analysis: &ModuleAnalysis, ctx: &BuildContext) -> Result<BuildOutput> {
        let module = ctx.require_module()?;
        let mut graph = Graph::new();
        if let Some(protocol) = &analysis.protocol {
            build_protocol(&mut graph, module, protocol, ctx);
        }
        if let Some(implementation) = &analysis.implementation {
            build_implementation(&mut graph, module, implementation, analysis, ctx);
        }
        Ok(BuildOutput::unchanged(graph, ctx))
    }
}

fn build_protocol(graph: &mut Graph, module: &Iri, protocol: &ProtocolRecord, ctx: &BuildContext) {
    graph.add_type(module, structure::PROTOCOL);
    graph.add_literal(
        module,
        structure::FALLBACK_TO_ANY,
        Literal::boolean(protocol.fallback_to_any),
    );

    for function in &protocol.functions {
        let iri = function_iri(module, &function.key);
        graph.add_type(&iri, structure::PROTOCOL_FUNCTION);
        graph.add_literal(&iri, structure::FUNCTION_NAME, Literal::string(function.key.name.as_str()));
        graph.add_literal(&iri, structure::ARITY, Literal::count(function.key.arity));
        graph.add_bidirectional(
            &iri,
            structure::DEFINED_IN_MODULE,
            module,
            structure::DEFINES_PROTOCOL_FUNCTION,
        );
        add_doc(graph, &iri, structure::DOCSTRING, function.doc.as_ref());
        add_location(graph, &iri, function.location, ctx);
    }
}

fn build_implementation(
    graph: &mut Graph,
    module: &Iri,
    implementation: &ImplRecord,
    analysis: &ModuleAnalysis,
    ctx: &BuildContext,
) {
    let protocol = ctx.module_iri_for(&implementation.protocol.to_string());
    let for_type = implementation.for_type.to_string();
    let iri = Iri::for_implementation(&protocol, &for_type);

    graph.add_type(&iri, structure::PROTOCOL_IMPLEMENTATION);
    graph.add_bidirectional(
        &iri,
        structure::IMPLEMENTS_PROTOCOL,
        &protocol,
        structure::HAS_IMPLEMENTATION,
    );
    graph.add_literal(&iri, structure::FOR_DATA_TYPE, Literal::string(for_type.as_str()));
    graph.add_link(&iri, structure::FOR_MODULE, &ctx.module_iri_for(&for_type));
    graph.add_link(&iri, structure::DEFINED_IN_MODULE, module);
    for function in &analysis.functions {
        graph.add_link(
            &iri,
            structure::IMPLEMENTATION_FUNCTION,
            &function_iri(module, &function.key),
        );
    }
    add_location(graph, &iri, analysis.location, ctx);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Meta, SyntaxNode as N};
    use crate::builder::test_support::{attr, ctx_for, def, module_iri};
    use crate::extract::analyze_source;

    fn protocol_node() -> N {
        N::form(
            "defprotocol",
            Meta::spanning(1, 6),
            vec![
                N::aliases(&["Size"]),
                N::do_keyword(N::block(vec![
                    attr("fallback_to_any", N::Boolean(true)),
                    attr("doc", N::string("Counts")),
                    N::call("def", vec![N::call("size", vec![N::var("data")])]),
                ])),
            ],
        )
    }

    fn impl_node() -> N {
        N::form(
            "defimpl",
            Meta::spanning(8, 12),
            vec![
                N::aliases(&["Size"]),
                N::keyword(vec![("for", N::aliases(&["Map"]))]),
                N::do_keyword(N::block(vec![def(
                    "def",
                    "size",
                    vec![N::var("map")],
                    N::remote(N::aliases(&["Kernel"]), "map_size", vec![N::var("map")]),
                )])),
            ],
        )
    }

    #[test]
    fn test_protocol_entity() {
        let analysis = analyze_source(&protocol_node()).remove(0);
        let graph = ProtocolBuilder.build(&analysis, &ctx_for("Size")).unwrap().graph;

        let protocol = module_iri("Size");
        assert!(graph.has_type(&protocol, structure::PROTOCOL));
        assert_eq!(
            graph.literal(&protocol, structure::FALLBACK_TO_ANY),
            Some(&Literal::boolean(true))
        );
        let function = Iri::for_function(&protocol, "size", 1);
        assert!(graph.has_type(&function, structure::PROTOCOL_FUNCTION));
        assert_eq!(
            graph.literal(&function, structure::DOCSTRING),
            Some(&Literal::string("Counts"))
        );
    }

    #[test]
    fn test_implementation_entity() {
        let analysis = analyze_source(&impl_node()).remove(0);
        assert_eq!(analysis.name.to_string(), "Size.Map");
        let graph = ProtocolBuilder
            .build(&analysis, &ctx_for("Size.Map"))
            .unwrap()
            .graph;

        let protocol = module_iri("Size");
        let iri = Iri::for_implementation(&protocol, "Map");
        assert!(graph.has_type(&iri, structure::PROTOCOL_IMPLEMENTATION));
        assert!(graph
            .objects(&protocol, structure::HAS_IMPLEMENTATION)
            .any(|o| o.as_iri() == Some(&iri)));
        assert!(graph
            .objects(&iri, structure::FOR_MODULE)
            .any(|o| o.as_iri() == Some(&module_iri("Map"))));
        let size = Iri::for_function(&module_iri("Size.Map"), "size", 1);
        assert!(graph
            .objects(&iri, structure::IMPLEMENTATION_FUNCTION)
            .any(|o| o.as_iri() == Some(&size)));
    }
}
