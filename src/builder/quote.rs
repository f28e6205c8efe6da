//! Quote entities with their unquotes and hygiene escapes

use super::{add_location, function_iri, BuildOutput, Built, BuilderKind, EntityBuilder};
use crate::context::BuildContext;
use crate::extract::{ModuleAnalysis, QuoteRecord};
use crate::graph::{Graph, Literal};
use crate::iri::Iri;
use crate::vocab::{code, structure};
use crate::Result;

pub struct QuoteBuilder;

impl EntityBuilder for QuoteBuilder {
    fn kind(&self) -> BuilderKind {
        BuilderKind::Quotes
    }

    fn build(&self, analysis: &ModuleAnalysis, ctx: &BuildContext) -> Result<BuildOutput> {
        ctx.require_module()?;
        let mut graph = Graph::new();
        let mut ctx = ctx.clone();
        for record in &analysis.quotes {
            let (built, next) = build_quote(record, ctx)?;
            graph.merge(built.graph);
            ctx = next;
        }
        Ok(BuildOutput { graph, context: ctx })
    }
}

pub fn build_quote(record: &QuoteRecord, ctx: BuildContext) -> Result<(Built, BuildContext)> {
    let function = function_iri(ctx.require_module()?, &record.owner);
    let (n, ctx) = ctx.next_counter();
    let iri = Iri::for_anonymous(&function, "quote", n);
    let mut graph = Graph::new();

    graph.add_type(&iri, structure::QUOTED_EXPRESSION);
    graph.add_bidirectional(&iri, structure::QUOTED_IN, &function, structure::CONTAINS_QUOTE);
    graph.add_literal(&iri, structure::KEEPS_LOCATION, Literal::boolean(record.keeps_location));
    graph.add_literal(&iri, structure::UNQUOTE_COUNT, Literal::count(record.unquotes.len()));
    graph.add_optional(
        &iri,
        structure::QUOTE_CONTEXT,
        record.context.as_deref().map(Literal::string),
    );
    for name in &record.bind_quoted {
        graph.add_literal(&iri, structure::BIND_QUOTED_VARIABLE, Literal::string(name.as_str()));
    }

    for (index, unquote) in record.unquotes.iter().enumerate() {
        let unquote_iri = Iri::for_nested(&iri, "unquote", index);
        graph.add_type(&unquote_iri, structure::UNQUOTE_EXPRESSION);
        graph.add_literal(&unquote_iri, structure::IS_SPLICING, Literal::boolean(unquote.splicing));
        graph.add_literal(
            &unquote_iri,
            code::EXPRESSION_TEXT,
            Literal::string(unquote.text.as_str()),
        );
        graph.add_bidirectional(&unquote_iri, structure::UNQUOTE_OF, &iri, structure::HAS_UNQUOTE);
        add_location(&mut graph, &unquote_iri, unquote.location, &ctx);
    }

    for (index, escape) in record.hygiene.iter().enumerate() {
        let escape_iri = Iri::for_nested(&iri, "hygiene", index);
        graph.add_type(&escape_iri, structure::HYGIENE_VIOLATION);
        graph.add_literal(
            &escape_iri,
            structure::VIOLATION_TYPE,
            Literal::string(escape.kind.as_str()),
        );
        graph.add_literal(&escape_iri, structure::VARIABLE_NAME, Literal::string(escape.name.as_str()));
        graph.add_bidirectional(
            &escape_iri,
            structure::HYGIENE_VIOLATION_OF,
            &iri,
            structure::HAS_HYGIENE_VIOLATION,
        );
        add_location(&mut graph, &escape_iri, escape.location, &ctx);
    }

    add_location(&mut graph, &iri, record.location, &ctx);
    Ok((Built { iri, graph }, ctx))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::test_support::{ctx_for, module_iri};
    use crate::extract::{FunctionKey, HygieneKind, HygieneRecord, UnquoteRecord};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_quote_with_unquotes_and_hygiene() {
        let record = QuoteRecord {
            owner: FunctionKey::new("__using__", 1),
            bind_quoted: vec!["opts".into()],
            keeps_location: true,
            context: None,
            unquotes: vec![
                UnquoteRecord {
                    splicing: false,
                    text: "name".into(),
                    location: None,
                },
                UnquoteRecord {
                    splicing: true,
                    text: "args".into(),
                    location: None,
                },
            ],
            hygiene: vec![HygieneRecord {
                kind: HygieneKind::Var,
                name: "acc".into(),
                location: None,
            }],
            location: None,
        };
        let (built, ctx) = build_quote(&record, ctx_for("M").with_counter(3)).unwrap();
        assert_eq!(ctx.counter(), 4);

        let function = Iri::for_function(&module_iri("M"), "__using__", 1);
        assert_eq!(built.iri, Iri::for_anonymous(&function, "quote", 3));
        assert_eq!(
            built.graph.literal(&built.iri, structure::UNQUOTE_COUNT),
            Some(&Literal::integer(2))
        );
        let splice = Iri::for_nested(&built.iri, "unquote", 1);
        assert_eq!(
            built.graph.literal(&splice, structure::IS_SPLICING),
            Some(&Literal::boolean(true))
        );
        let escape = Iri::for_nested(&built.iri, "hygiene", 0);
        assert_eq!(
            built.graph.literal(&escape, structure::VIOLATION_TYPE),
            Some(&Literal::string("var!"))
        );
        assert!(built.graph.literal(&built.iri, structure::QUOTE_CONTEXT).is_none());
        assert!(built
            .graph
            .objects(&escape, structure::HYGIENE_VIOLATION_OF)
            .any(|o| o.as_iri() == Some(&built.iri)));
        assert!(built
            .graph
            .objects(&built.iri, structure::HAS_HYGIENE_VIOLATION)
            .any(|o| o.as_iri() == Some(&escape)));
    }
}
