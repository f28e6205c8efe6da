//! Entity builders
//!
//! Each builder turns one family of extracted records into triples:
//! 1. Compute the entity IRI
//! 2. Emit the single most specific `rdf:type`
//! 3. Emit scalar properties only for data that is present
//! 4. Link to the parent entity in both directions
//! 5. Attach a source location when both a location and a file are known
//!
//! Builders are pure: the same records and context always give the same
//! graph. Builders that mint anonymous IRIs consume the context's counter
//! and hand the advanced context back.

pub mod attribute;
pub mod behaviour;
pub mod call;
pub mod closure;
pub mod control_flow;
pub mod directive;
pub mod function;
pub mod module;
pub mod otp;
pub mod protocol;
pub mod quote;
pub mod structs;
pub mod types;

use crate::ast::SourceLocation;
use crate::context::BuildContext;
use crate::extract::{Doc, FunctionKey, ModuleAnalysis};
use crate::graph::{Graph, Literal};
use crate::iri::Iri;
use crate::vocab::{code, structure};
use crate::Result;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// The builder families, in the order their graphs are merged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BuilderKind {
    Module,
    Directives,
    Functions,
    Closures,
    Attributes,
    Protocols,
    Behaviours,
    Structs,
    Exceptions,
    Types,
    Otp,
    Calls,
    ControlFlow,
    Quotes,
}

impl BuilderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BuilderKind::Module => "module",
            BuilderKind::Directives => "directives",
            BuilderKind::Functions => "functions",
            BuilderKind::Closures => "closures",
            BuilderKind::Attributes => "attributes",
            BuilderKind::Protocols => "protocols",
            BuilderKind::Behaviours => "behaviours",
            BuilderKind::Structs => "structs",
            BuilderKind::Exceptions => "exceptions",
            BuilderKind::Types => "types",
            BuilderKind::Otp => "otp",
            BuilderKind::Calls => "calls",
            BuilderKind::ControlFlow => "control_flow",
            BuilderKind::Quotes => "quotes",
        }
    }

    /// Builders that must succeed before anything else runs
    pub fn is_module_phase(&self) -> bool {
        matches!(self, BuilderKind::Module | BuilderKind::Directives)
    }
}

impl fmt::Display for BuilderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entity and every triple describing it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Built {
    pub iri: Iri,
    pub graph: Graph,
}

/// Result of running one builder over a module
#[derive(Debug, Clone)]
pub struct BuildOutput {
    pub graph: Graph,
    /// Context after the run; carries the advanced counter
    pub context: BuildContext,
}

impl BuildOutput {
    /// Output of a builder that mints no anonymous IRIs
    pub fn unchanged(graph: Graph, ctx: &BuildContext) -> Self {
        Self {
            graph,
            context: ctx.clone(),
        }
    }
}

/// A builder for one family of entities
///
/// `ctx` always has the analysed module as its innermost module; builders
/// call [`BuildContext::require_module`] and fail with
/// [`crate::Error::MissingContext`] otherwise.
pub trait EntityBuilder: Send + Sync {
    fn kind(&self) -> BuilderKind;

    fn build(&self, analysis: &ModuleAnalysis, ctx: &BuildContext) -> Result<BuildOutput>;
}

/// Registry of entity builders
#[derive(Default, Clone)]
pub struct BuilderRegistry {
    builders: Vec<Arc<dyn EntityBuilder>>,
}

impl BuilderRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a builder; a later builder of the same kind replaces the
    /// earlier one
    pub fn register(&mut self, builder: impl EntityBuilder + 'static) {
        let builder: Arc<dyn EntityBuilder> = Arc::new(builder);
        match self.builders.iter_mut().find(|b| b.kind() == builder.kind()) {
            Some(slot) => *slot = builder,
            None => self.builders.push(builder),
        }
    }

    pub fn get(&self, kind: BuilderKind) -> Option<&Arc<dyn EntityBuilder>> {
        self.builders.iter().find(|b| b.kind() == kind)
    }

    pub fn builders(&self) -> &[Arc<dyn EntityBuilder>] {
        &self.builders
    }

    pub fn module_phase(&self) -> impl Iterator<Item = &Arc<dyn EntityBuilder>> {
        self.builders.iter().filter(|b| b.kind().is_module_phase())
    }

    pub fn entity_phase(&self) -> impl Iterator<Item = &Arc<dyn EntityBuilder>> {
        self.builders.iter().filter(|b| !b.kind().is_module_phase())
    }
}

impl fmt::Debug for BuilderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.builders.iter().map(|b| b.kind()))
            .finish()
    }
}

/// Create a default registry with all built-in builders
pub fn default_registry() -> BuilderRegistry {
    let mut registry = BuilderRegistry::new();
    registry.register(module::ModuleBuilder);
    registry.register(directive::DirectiveBuilder);
    registry.register(function::FunctionBuilder);
    registry.register(closure::ClosureBuilder);
    registry.register(attribute::AttributeBuilder);
    registry.register(protocol::ProtocolBuilder);
    registry.register(behaviour::BehaviourBuilder);
    registry.register(structs::StructBuilder);
    registry.register(structs::ExceptionBuilder);
    registry.register(types::TypeBuilder);
    registry.register(otp::OtpBuilder);
    registry.register(call::CallBuilder);
    registry.register(control_flow::ControlFlowBuilder);
    registry.register(quote::QuoteBuilder);
    registry
}

// ----------------------------------------------------------------------
// Shared triple helpers
// ----------------------------------------------------------------------

/// Source location sub-entity, only when both a location and a file exist
pub(crate) fn add_location(
    graph: &mut Graph,
    subject: &Iri,
    location: Option<SourceLocation>,
    ctx: &BuildContext,
) {
    let (Some(location), Some(file)) = (location, ctx.file_iri()) else {
        return;
    };
    let iri = Iri::for_location(&file, location.start_line, location.end_line);
    graph.add_type(&iri, code::SOURCE_LOCATION);
    graph.add_literal(&iri, code::START_LINE, Literal::integer(location.start_line.into()));
    graph.add_literal(&iri, code::END_LINE, Literal::integer(location.end_line.into()));
    graph.add_link(&iri, code::IN_SOURCE_FILE, &file);
    graph.add_link(subject, code::HAS_SOURCE_LOCATION, &iri);
}

/// `docstring` for text, `isDocHidden` for `@doc false`
pub(crate) fn add_doc(graph: &mut Graph, subject: &Iri, predicate: &'static str, doc: Option<&Doc>) {
    match doc {
        Some(Doc::Text(text)) => graph.add_literal(subject, predicate, Literal::string(text.as_str())),
        Some(Doc::Hidden) => graph.add_literal(subject, structure::IS_DOC_HIDDEN, Literal::boolean(true)),
        None => {}
    }
}

/// IRI of a function of the current module
pub(crate) fn function_iri(module: &Iri, key: &FunctionKey) -> Iri {
    Iri::for_function(module, &key.name, key.arity)
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::ast::{Meta, SyntaxNode};
    use crate::context::BuildContext;
    use crate::extract::{analyze_source, ModuleAnalysis};
    use crate::iri::Iri;

    pub fn module_node(segments: &[&str], body: Vec<SyntaxNode>) -> SyntaxNode {
        SyntaxNode::form(
            "defmodule",
            Meta::spanning(1, 40),
            vec![
                SyntaxNode::aliases(segments),
                SyntaxNode::do_keyword(SyntaxNode::block(body)),
            ],
        )
    }

    pub fn def(kind: &str, name: &str, params: Vec<SyntaxNode>, body: SyntaxNode) -> SyntaxNode {
        SyntaxNode::form(
            kind,
            Meta::spanning(3, 5),
            vec![SyntaxNode::call(name, params), SyntaxNode::do_keyword(body)],
        )
    }

    pub fn attr(name: &str, value: SyntaxNode) -> SyntaxNode {
        SyntaxNode::form(
            "@",
            Meta::at(2),
            vec![SyntaxNode::call(name, vec![value])],
        )
    }

    /// Context positioned inside `module`, with a file
    pub fn ctx_for(module: &str) -> BuildContext {
        let ctx = BuildContext::default().with_file_path("lib/app.ex");
        let iri = ctx.module_iri_for(module);
        ctx.with_module(iri)
    }

    pub fn module_iri(module: &str) -> Iri {
        BuildContext::default().module_iri_for(module)
    }

    /// First module analysed from `root`
    pub fn analysis(root: &SyntaxNode) -> ModuleAnalysis {
        analyze_source(root).remove(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Meta;
    use crate::extract::ModuleKind;
    use crate::scope::ModulePath;

    struct Fixed(BuilderKind);

    impl EntityBuilder for Fixed {
        fn kind(&self) -> BuilderKind {
            self.0
        }

        fn build(&self, _analysis: &ModuleAnalysis, ctx: &BuildContext) -> Result<BuildOutput> {
            Ok(BuildOutput::unchanged(Graph::new(), ctx))
        }
    }

    #[test]
    fn test_registry_phases() {
        let registry = default_registry();
        assert_eq!(registry.builders().len(), 14);
        assert_eq!(registry.module_phase().count(), 2);
        assert_eq!(registry.entity_phase().count(), 12);
        assert!(registry.get(BuilderKind::Quotes).is_some());
    }

    #[test]
    fn test_register_replaces_same_kind() {
        let mut registry = BuilderRegistry::new();
        registry.register(Fixed(BuilderKind::Calls));
        registry.register(Fixed(BuilderKind::Calls));
        assert_eq!(registry.builders().len(), 1);
    }

    #[test]
    fn test_location_requires_file() {
        let subject = Iri::new("https://example.org/code#M");
        let location = SourceLocation::of(&crate::ast::SyntaxNode::var("x").at(Meta::spanning(2, 4)));

        let mut without_file = Graph::new();
        add_location(&mut without_file, &subject, location, &BuildContext::default());
        assert!(without_file.is_empty());

        let mut without_location = Graph::new();
        let ctx = BuildContext::default().with_file_path("lib/m.ex");
        add_location(&mut without_location, &subject, None, &ctx);
        assert!(without_location.is_empty());

        let mut graph = Graph::new();
        add_location(&mut graph, &subject, location, &ctx);
        assert_eq!(graph.len(), 5);
        let iri = Iri::new("https://example.org/code#file/lib/m.ex/L2-4");
        assert!(graph.has_type(&iri, code::SOURCE_LOCATION));
    }

    #[test]
    fn test_builders_require_module_context() {
        let analysis = ModuleAnalysis::new(ModulePath::parse("M"), ModuleKind::Module);
        let registry = default_registry();
        for builder in registry.builders() {
            let err = builder.build(&analysis, &BuildContext::default());
            assert!(
                matches!(err, Err(crate::Error::MissingContext(_))),
                "{} accepted a context without module",
                builder.kind()
            );
        }
    }
}
