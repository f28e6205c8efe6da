//! Struct and exception entities
//!
//! A struct has no identity apart from its module, so both entities reuse
//! the module IRI. An exception carries only the Exception class. Fields hang off the module
//! as `{module}/field/{name}`.

use super::{BuildOutput, BuilderKind, EntityBuilder};
use crate::context::BuildContext;
use crate::extract::{ModuleAnalysis, StructRecord};
use crate::graph::{Graph, Literal};
use crate::iri::Iri;
use crate::vocab::structure;
use crate::Result;

/// `defstruct` modules
pub struct StructBuilder;

/// `defexception` modules
pub struct ExceptionBuilder;

impl EntityBuilder for StructBuilder {
    fn kind(&self) -> BuilderKind {
        BuilderKind::Structs
    }

    fn build(&self, analysis: &ModuleAnalysis, ctx: &BuildContext) -> Result<BuildOutput> {
        let module = ctx.require_module()?;
        let mut graph = Graph::new();
        if let Some(record) = analysis.struct_def.as_ref().filter(|s| !s.exception) {
            graph.add_type(module, structure::STRUCT);
            add_fields(&mut graph, module, record, ctx);
        }
        Ok(BuildOutput::unchanged(graph, ctx))
    }
}

impl EntityBuilder for ExceptionBuilder {
    fn kind(&self) -> BuilderKind {
        BuilderKind::Exceptions
    }

    fn build(&self, analysis: &ModuleAnalysis, ctx: &BuildContext) -> Result<BuildOutput> {
        let module = ctx.require_module()?;
        let mut graph = Graph::new();
        if let Some(record) = analysis.struct_def.as_ref().filter(|s| s.exception) {
            graph.add_type(module, structure::EXCEPTION);
            graph.add_literal(
                module,
                structure::HAS_CUSTOM_MESSAGE,
                Literal::boolean(record.custom_message),
            );
            graph.add_optional(
                module,
                structure::DEFAULT_MESSAGE,
                record.default_message.as_deref().map(Literal::string),
            );
            add_fields(&mut graph, module, record, ctx);
        }
        Ok(BuildOutput::unchanged(graph, ctx))
    }
}

fn add_fields(graph: &mut Graph, module: &Iri, record: &StructRecord, ctx: &BuildContext) {
    for field in &record.fields {
        let iri = Iri::for_field(module, &field.name);
        graph.add_type(&iri, structure::STRUCT_FIELD);
        graph.add_literal(&iri, structure::FIELD_NAME, Literal::string(field.name.as_str()));
        graph.add_literal(&iri, structure::IS_ENFORCED, Literal::boolean(field.enforced));
        graph.add_optional(
            &iri,
            structure::DEFAULT_VALUE,
            field.default.as_deref().map(Literal::string),
        );
        graph.add_bidirectional(&iri, structure::FIELD_OF, module, structure::HAS_FIELD);
    }
    for protocol in &record.derives {
        let protocol_iri = ctx.module_iri_for(&protocol.to_string());
        graph.add_link(module, structure::DERIVES_PROTOCOL, &protocol_iri);
    }
}
