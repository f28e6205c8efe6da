//! Module attribute entities

use super::{add_location, BuildOutput, Built, BuilderKind, EntityBuilder};
use crate::context::BuildContext;
use crate::extract::{AttributeRecord, ModuleAnalysis};
use crate::graph::{Graph, Literal};
use crate::iri::Iri;
use crate::vocab::structure;
use crate::Result;

pub struct AttributeBuilder;

impl EntityBuilder for AttributeBuilder {
    fn kind(&self) -> BuilderKind {
        BuilderKind::Attributes
    }

    fn build(&self, analysis: &ModuleAnalysis, ctx: &BuildContext) -> Result<BuildOutput> {
        ctx.require_module()?;
        let mut graph = Graph::new();
        for record in &analysis.attributes {
            graph.merge(build_attribute(record, ctx)?.graph);
        }
        Ok(BuildOutput::unchanged(graph, ctx))
    }
}

/// Class for an attribute name; unknown names are plain module attributes
pub fn attribute_class(name: &str) -> &'static str {
    match name {
        "doc" => structure::DOC_ATTRIBUTE,
        "moduledoc" => structure::MODULEDOC_ATTRIBUTE,
        "typedoc" => structure::TYPEDOC_ATTRIBUTE,
        "behaviour" | "behavior" => structure::BEHAVIOUR_ATTRIBUTE,
        "impl" => structure::IMPL_ATTRIBUTE,
        "derive" => structure::DERIVE_ATTRIBUTE,
        "enforce_keys" => structure::ENFORCE_KEYS_ATTRIBUTE,
        "compile" => structure::COMPILE_ATTRIBUTE,
        "deprecated" => structure::DEPRECATED_ATTRIBUTE,
        "since" => structure::SINCE_ATTRIBUTE,
        "dialyzer" => structure::DIALYZER_ATTRIBUTE,
        "external_resource" => structure::EXTERNAL_RESOURCE_ATTRIBUTE,
        _ => structure::MODULE_ATTRIBUTE,
    }
}

pub fn build_attribute(record: &AttributeRecord, ctx: &BuildContext) -> Result<Built> {
    let module = ctx.require_module()?;
    let iri = Iri::for_attribute(module, &record.name, record.index);
    let mut graph = Graph::new();

    graph.add_type(&iri, attribute_class(&record.name));
    graph.add_literal(&iri, structure::ATTRIBUTE_NAME, Literal::string(record.name.as_str()));
    graph.add_optional(
        &iri,
        structure::ATTRIBUTE_VALUE,
        record.value.as_deref().map(Literal::string),
    );
    graph.add_bidirectional(&iri, structure::ATTRIBUTE_OF, module, structure::HAS_ATTRIBUTE);
    add_location(&mut graph, &iri, record.location, ctx);

    Ok(Built { iri, graph })
}
