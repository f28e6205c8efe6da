//! Directive entities (`alias`, `import`, `require`, `use`)
//!
//! IRIs are indexed per directive kind, so adding an `import` never shifts
//! the identity of an `alias`. `directiveOrder` is the 1-based position
//! among all of the module's directives.

use super::{add_location, BuildOutput, Built, BuilderKind, EntityBuilder};
use crate::ast::DirectiveTag;
use crate::context::BuildContext;
use crate::extract::ModuleAnalysis;
use crate::graph::{Graph, Literal};
use crate::iri::Iri;
use crate::scope::{Directive, DirectiveKind, ImportSelector};
use crate::vocab::structure;
use crate::Result;
use std::collections::HashMap;

pub struct DirectiveBuilder;

impl EntityBuilder for DirectiveBuilder {
    fn kind(&self) -> BuilderKind {
        BuilderKind::Directives
    }

    fn build(&self, analysis: &ModuleAnalysis, ctx: &BuildContext) -> Result<BuildOutput> {
        ctx.require_module()?;
        let mut graph = Graph::new();
        let mut per_kind: HashMap<DirectiveTag, usize> = HashMap::new();
        for (position, directive) in analysis.directives.iter().enumerate() {
            let slot = per_kind.entry(directive.tag()).or_default();
            let built = build_directive(directive, *slot, position, ctx)?;
            *slot += 1;
            graph.merge(built.graph);
        }
        Ok(BuildOutput::unchanged(graph, ctx))
    }
}

/// Build one directive; `index` is its position among directives of the
/// same kind, `position` among all directives of the module (both 0-based)
pub fn build_directive(
    directive: &Directive,
    index: usize,
    position: usize,
    ctx: &BuildContext,
) -> Result<Built> {
    let module = ctx.require_module()?;
    let tag = directive.tag();
    let iri = Iri::for_directive(module, tag.as_str(), index);
    let mut graph = Graph::new();

    let class = match tag {
        DirectiveTag::Alias => structure::MODULE_ALIAS,
        DirectiveTag::Import => structure::IMPORT,
        DirectiveTag::Require => structure::REQUIRE,
        DirectiveTag::Use => structure::USE,
    };
    graph.add_type(&iri, class);
    graph.add_bidirectional(&iri, structure::DIRECTIVE_OF, module, structure::HAS_DIRECTIVE);

    let source = directive.source.to_string();
    graph.add_link(&iri, structure::DIRECTIVE_TARGET, &ctx.module_iri_for(&source));
    graph.add_literal(&iri, structure::SOURCE_MODULE_NAME, Literal::string(source));
    graph.add_literal(&iri, structure::DIRECTIVE_ORDER, Literal::count(position + 1));
    graph.add_literal(
        &iri,
        structure::LEXICAL_SCOPE,
        Literal::string(directive.scope.as_str()),
    );
    graph.add_literal(
        &iri,
        structure::IS_MULTI_TARGET,
        Literal::boolean(directive.is_multi()),
    );

    match &directive.kind {
        DirectiveKind::Alias { as_name, explicit } => {
            graph.add_literal(&iri, structure::ALIAS_NAME, Literal::string(as_name.as_str()));
            graph.add_literal(&iri, structure::IS_EXPLICIT_ALIAS, Literal::boolean(*explicit));
        }
        DirectiveKind::Require { as_name } => {
            graph.add_optional(
                &iri,
                structure::ALIAS_NAME,
                as_name.as_deref().map(Literal::string),
            );
        }
        DirectiveKind::Import { selector } => match selector {
            ImportSelector::All => {}
            ImportSelector::Only(refs) => {
                for r in refs {
                    graph.add_literal(&iri, structure::IMPORTS_FUNCTION, Literal::string(r.to_string()));
                }
            }
            ImportSelector::Except(refs) => {
                for r in refs {
                    graph.add_literal(&iri, structure::EXCLUDES_FUNCTION, Literal::string(r.to_string()));
                }
            }
            ImportSelector::Category(category) => {
                graph.add_literal(&iri, structure::IMPORT_CATEGORY, Literal::string(category.as_str()));
            }
        },
        DirectiveKind::Use { options } => {
            for option in options {
                let text = match &option.key {
                    Some(key) => format!("{key}: {}", option.value),
                    None => option.value.clone(),
                };
                graph.add_literal(&iri, structure::USE_OPTION, Literal::string(text));
            }
        }
    }

    add_location(&mut graph, &iri, directive.location, ctx);
    Ok(Built { iri, graph })
}
