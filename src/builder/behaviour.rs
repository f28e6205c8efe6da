//! Behaviour entities
//!
//! A module declaring callbacks is a behaviour; the behaviour reuses the
//! module IRI. Optional callbacks carry `OptionalCallback` on top of their
//! callback class, so marking a callback optional adds exactly one triple.

use super::{add_location, BuildOutput, Built, BuilderKind, EntityBuilder};
use crate::context::BuildContext;
use crate::extract::{CallbackRecord, ModuleAnalysis};
use crate::graph::{Graph, Literal};
use crate::iri::Iri;
use crate::vocab::structure;
use crate::Result;

pub struct BehaviourBuilder;

impl EntityBuilder for BehaviourBuilder {
    fn kind(&self) -> BuilderKind {
        BuilderKind::Behaviours
    }

    fn build(&self, analysis: &ModuleAnalysis, ctx: &BuildContext) -> Result<BuildOutput> {
        let module = ctx.require_module()?;
        let mut graph = Graph::new();

        if !analysis.callbacks.is_empty() {
            graph.add_type(module, structure::BEHAVIOUR);
        }
        for record in &analysis.callbacks {
            graph.merge(build_callback(record, ctx)?.graph);
        }
        for behaviour in &analysis.behaviours {
            let target = ctx.module_iri_for(&behaviour.to_string());
            graph.add_link(module, structure::IMPLEMENTS_BEHAVIOUR, &target);
        }
        Ok(BuildOutput::unchanged(graph, ctx))
    }
}

pub fn build_callback(record: &CallbackRecord, ctx: &BuildContext) -> Result<Built> {
    let module = ctx.require_module()?;
    let iri = Iri::for_callback(module, &record.key.name, record.key.arity);
    let mut graph = Graph::new();

    let class = if record.is_macro {
        structure::MACRO_CALLBACK_SPEC
    } else {
        structure::CALLBACK_SPEC
    };
    graph.add_type(&iri, class);
    if record.optional {
        graph.add_type(&iri, structure::OPTIONAL_CALLBACK);
    }
    graph.add_literal(&iri, structure::FUNCTION_NAME, Literal::string(record.key.name.as_str()));
    graph.add_literal(&iri, structure::ARITY, Literal::count(record.key.arity));
    graph.add_literal(
        &iri,
        structure::CALLBACK_SIGNATURE,
        Literal::string(record.signature.as_str()),
    );
    graph.add_bidirectional(&iri, structure::CALLBACK_OF, module, structure::DEFINES_CALLBACK);
    add_location(&mut graph, &iri, record.location, ctx);

    Ok(Built { iri, graph })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::SyntaxNode as N;
    use crate::builder::test_support::{analysis, attr, ctx_for, module_iri, module_node};
    use crate::extract::FunctionKey;
    use crate::scope::ModulePath;

    fn callback(optional: bool) -> CallbackRecord {
        CallbackRecord {
            key: FunctionKey::new("handle", 2),
            is_macro: false,
            optional,
            signature: "handle(term(), state()) :: {:ok, state()}".into(),
            location: None,
        }
    }

    #[test]
    fn test_optional_callback_adds_one_type_triple() {
        let ctx = ctx_for("Plugin");
        let required = build_callback(&callback(false), &ctx).unwrap();
        let optional = build_callback(&callback(true), &ctx).unwrap();
        assert_eq!(optional.graph.len(), required.graph.len() + 1);
        assert!(optional.graph.has_type(&optional.iri, structure::CALLBACK_SPEC));
        assert!(optional.graph.has_type(&optional.iri, structure::OPTIONAL_CALLBACK));
        assert!(!required.graph.has_type(&required.iri, structure::OPTIONAL_CALLBACK));
    }

    #[test]
    fn test_behaviour_module_and_implementations() {
        let mut analysis = crate::extract::ModuleAnalysis::new(
            ModulePath::parse("Plugin"),
            crate::extract::ModuleKind::Module,
        );
        analysis.callbacks.push(callback(false));
        analysis.behaviours.push(ModulePath::parse("Base"));
        let graph = BehaviourBuilder.build(&analysis, &ctx_for("Plugin")).unwrap().graph;

        let module = module_iri("Plugin");
        assert!(graph.has_type(&module, structure::BEHAVIOUR));
        assert!(graph
            .objects(&module, structure::IMPLEMENTS_BEHAVIOUR)
            .any(|o| o.as_iri() == Some(&module_iri("Base"))));
        assert_eq!(graph.objects(&module, structure::DEFINES_CALLBACK).count(), 1);
    }

    #[test]
    fn test_plain_module_is_not_a_behaviour() {
        let node = module_node(&["M"], vec![attr("behaviour", N::aliases(&["GenServer"]))]);
        let graph = BehaviourBuilder
            .build(&analysis(&node), &ctx_for("M"))
            .unwrap()
            .graph;
        assert!(!graph.has_type(&module_iri("M"), structure::BEHAVIOUR));
        assert_eq!(graph.len(), 1);
    }
}
