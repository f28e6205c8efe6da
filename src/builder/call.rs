//! Call site entities
//!
//! Each call site gets an anonymous IRI under its caller. When the callee
//! is resolved, the call links to the callee function IRI, whether or not
//! that function is part of the analysed code.

use super::{add_location, function_iri, BuildOutput, Built, BuilderKind, EntityBuilder};
use crate::context::BuildContext;
use crate::extract::{CallKind, CallRecord, ModuleAnalysis};
use crate::graph::{Graph, Literal};
use crate::iri::Iri;
use crate::vocab::code;
use crate::Result;

pub struct CallBuilder;

impl EntityBuilder for CallBuilder {
    fn kind(&self) -> BuilderKind {
        BuilderKind::Calls
    }

    fn build(&self, analysis: &ModuleAnalysis, ctx: &BuildContext) -> Result<BuildOutput> {
        ctx.require_module()?;
        let own_module = analysis.name.to_string();
        let mut graph = Graph::new();
        let mut ctx = ctx.clone();
        for record in &analysis.calls {
            let (built, next) = build_call(record, &own_module, ctx)?;
            graph.merge(built.graph);
            ctx = next;
        }
        Ok(BuildOutput { graph, context: ctx })
    }
}

pub fn build_call(
    record: &CallRecord,
    own_module: &str,
    ctx: BuildContext,
) -> Result<(Built, BuildContext)> {
    let caller = function_iri(ctx.require_module()?, &record.owner);
    let (n, ctx) = ctx.next_counter();
    let iri = Iri::for_anonymous(&caller, "call", n);
    let mut graph = Graph::new();

    let class = match record.kind {
        CallKind::Local => code::LOCAL_CALL,
        CallKind::Remote => code::REMOTE_CALL,
        CallKind::Dynamic => code::DYNAMIC_CALL,
    };
    graph.add_type(&iri, class);
    graph.add_bidirectional(&iri, code::CALLER, &caller, code::CONTAINS_CALL);
    graph.add_optional(&iri, code::CALL_NAME, record.name.as_deref().map(Literal::string));
    graph.add_literal(&iri, code::CALL_ARITY, Literal::count(record.arity));
    graph.add_optional(
        &iri,
        code::RECEIVER_TEXT,
        record.receiver.as_deref().map(Literal::string),
    );

    if let Some(module) = &record.module {
        let name = module.to_string();
        let module_iri = ctx.module_iri_for(&name);
        graph.add_link(&iri, code::CALLED_MODULE, &module_iri);
        if let Some(function) = &record.name {
            let callee = Iri::for_function(&module_iri, function, record.arity);
            graph.add_link(&iri, code::CALLS_FUNCTION, &callee);
        }
        if let Some(known) = ctx.is_known_module(&name) {
            let external = !known && name != own_module;
            graph.add_literal(&iri, code::IS_EXTERNAL, Literal::boolean(external));
        }
    }

    add_location(&mut graph, &iri, record.location, &ctx);
    Ok((Built { iri, graph }, ctx))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::SyntaxNode as N;
    use crate::builder::test_support::{analysis, ctx_for, def, module_iri, module_node};
    use crate::extract::FunctionKey;
    use crate::scope::ModulePath;
    use pretty_assertions::assert_eq;

    fn remote(module: &str) -> CallRecord {
        CallRecord {
            owner: FunctionKey::new("f", 1),
            kind: CallKind::Remote,
            module: Some(ModulePath::parse(module)),
            name: Some("get".into()),
            arity: 2,
            receiver: None,
            location: None,
        }
    }

    #[test]
    fn test_local_and_remote_targets() {
        // def f(x), do: g()
        // defp g, do: M2.h()
        let node = module_node(
            &["M"],
            vec![
                def("def", "f", vec![N::var("x")], N::call("g", vec![])),
                def("defp", "g", vec![], N::remote(N::aliases(&["M2"]), "h", vec![])),
            ],
        );
        let analysis = analysis(&node);
        let out = CallBuilder.build(&analysis, &ctx_for("M")).unwrap();
        assert_eq!(out.context.counter(), 2);

        let m = module_iri("M");
        let f = Iri::for_function(&m, "f", 1);
        let g = Iri::for_function(&m, "g", 0);
        let first = Iri::for_anonymous(&f, "call", 0);
        let second = Iri::for_anonymous(&g, "call", 1);

        assert!(out.graph.has_type(&first, code::LOCAL_CALL));
        assert!(out.graph.objects(&first, code::CALLS_FUNCTION).any(|o| o.as_iri() == Some(&g)));
        assert!(out.graph.has_type(&second, code::REMOTE_CALL));
        let h = Iri::for_function(&module_iri("M2"), "h", 0);
        assert!(out.graph.objects(&second, code::CALLS_FUNCTION).any(|o| o.as_iri() == Some(&h)));
        assert!(out.graph.objects(&g, code::CONTAINS_CALL).any(|o| o.as_iri() == Some(&second)));
    }

    #[test]
    fn test_external_flag_needs_whitelist() {
        let (built, _) = build_call(&remote("Repo"), "M", ctx_for("M")).unwrap();
        assert!(built.graph.literal(&built.iri, code::IS_EXTERNAL).is_none());

        let ctx = ctx_for("M").with_known_modules(["MyApp.Repo"]);
        let (built, _) = build_call(&remote("Repo"), "M", ctx.clone()).unwrap();
        assert_eq!(
            built.graph.literal(&built.iri, code::IS_EXTERNAL),
            Some(&Literal::boolean(true))
        );

        let (built, _) = build_call(&remote("MyApp.Repo"), "M", ctx.clone()).unwrap();
        assert_eq!(
            built.graph.literal(&built.iri, code::IS_EXTERNAL),
            Some(&Literal::boolean(false))
        );

        // the module being analysed is internal even when not listed
        let (built, _) = build_call(&remote("M"), "M", ctx).unwrap();
        assert_eq!(
            built.graph.literal(&built.iri, code::IS_EXTERNAL),
            Some(&Literal::boolean(false))
        );
    }

    #[test]
    fn test_dynamic_call_has_no_target() {
        let record = CallRecord {
            owner: FunctionKey::new("f", 1),
            kind: CallKind::Dynamic,
            module: None,
            name: None,
            arity: 1,
            receiver: Some("fun".into()),
            location: None,
        };
        let (built, ctx) = build_call(&record, "M", ctx_for("M")).unwrap();
        assert_eq!(ctx.counter(), 1);
        assert!(built.graph.has_type(&built.iri, code::DYNAMIC_CALL));
        assert_eq!(built.graph.objects(&built.iri, code::CALLS_FUNCTION).count(), 0);
        assert_eq!(
            built.graph.literal(&built.iri, code::RECEIVER_TEXT),
            Some(&Literal::string("fun"))
        );
    }
}
