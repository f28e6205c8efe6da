//! Module entities: the module itself, its documentation, nesting links and
//! the source file it was read from.

use super::{add_doc, add_location, BuildOutput, BuilderKind, EntityBuilder};
use crate::context::BuildContext;
use crate::extract::ModuleAnalysis;
use crate::graph::{Graph, Literal};
use crate::vocab::{code, structure};
use crate::Result;

pub struct ModuleBuilder;

impl EntityBuilder for ModuleBuilder {
    fn kind(&self) -> BuilderKind {
        BuilderKind::Module
    }

    fn build(&self, analysis: &ModuleAnalysis, ctx: &BuildContext) -> Result<BuildOutput> {
        let iri = ctx.require_module()?.clone();
        let mut graph = Graph::new();

        let class = if analysis.parent.is_some() {
            structure::NESTED_MODULE
        } else {
            structure::MODULE
        };
        graph.add_type(&iri, class);
        graph.add_literal(
            &iri,
            structure::MODULE_NAME,
            Literal::string(analysis.name.to_string()),
        );
        add_doc(&mut graph, &iri, structure::MODULEDOC, analysis.moduledoc.as_ref());

        if let Some(parent) = &analysis.parent {
            let parent_iri = ctx.module_iri_for(&parent.to_string());
            graph.add_bidirectional(
                &iri,
                structure::PARENT_MODULE,
                &parent_iri,
                structure::HAS_NESTED_MODULE,
            );
        }
        for nested in &analysis.nested {
            let nested_iri = ctx.module_iri_for(&nested.to_string());
            graph.add_bidirectional(
                &nested_iri,
                structure::PARENT_MODULE,
                &iri,
                structure::HAS_NESTED_MODULE,
            );
        }

        if let (Some(file), Some(path)) = (ctx.file_iri(), ctx.file_path.as_deref()) {
            graph.add_type(&file, code::SOURCE_FILE);
            graph.add_literal(&file, code::FILE_PATH, Literal::string(path));
            if let Some(at) = ctx.analyzed_at {
                graph.add_literal(&file, code::ANALYZED_AT, Literal::datetime(at));
            }
            graph.add_link(&iri, code::DEFINED_IN_FILE, &file);
        }
        add_location(&mut graph, &iri, analysis.location, ctx);

        Ok(BuildOutput::unchanged(graph, ctx))
    }
}
