//! Function, clause and parameter entities
//!
//! One function entity per `name/arity`, one clause entity per clause in
//! source order and one parameter entity per position. Clause and parameter
//! order is kept twice: as 1-based ordinal literals and as RDF lists.

use super::{add_doc, add_location, function_iri, BuildOutput, Built, BuilderKind, EntityBuilder};
use crate::ast::DefKind;
use crate::context::BuildContext;
use crate::extract::{ClauseRecord, FunctionRecord, ImplMarker, ModuleAnalysis, ParamRecord};
use crate::graph::{build_list, Graph, Literal, Term, Triple};
use crate::iri::Iri;
use crate::vocab::structure;
use crate::Result;

pub struct FunctionBuilder;

impl EntityBuilder for FunctionBuilder {
    fn kind(&self) -> BuilderKind {
        BuilderKind::Functions
    }

    fn build(&self, analysis: &ModuleAnalysis, ctx: &BuildContext) -> Result<BuildOutput> {
        ctx.require_module()?;
        let mut graph = Graph::new();
        for record in &analysis.functions {
            graph.merge(build_function(record, ctx)?.graph);
        }
        Ok(BuildOutput::unchanged(graph, ctx))
    }
}

/// Most specific class for a definition
pub fn function_class(record: &FunctionRecord) -> &'static str {
    match record.kind {
        DefKind::Defdelegate => structure::DELEGATED_FUNCTION,
        kind if kind.is_guard() => structure::GUARD_FUNCTION,
        DefKind::Defmacro => structure::PUBLIC_MACRO,
        DefKind::Defmacrop => structure::PRIVATE_MACRO,
        kind if kind.is_private() => structure::PRIVATE_FUNCTION,
        _ => structure::PUBLIC_FUNCTION,
    }
}

pub fn build_function(record: &FunctionRecord, ctx: &BuildContext) -> Result<Built> {
    let module = ctx.require_module()?;
    let iri = function_iri(module, &record.key);
    let mut graph = Graph::new();

    graph.add_type(&iri, function_class(record));
    graph.add_literal(&iri, structure::FUNCTION_NAME, Literal::string(record.key.name.as_str()));
    graph.add_literal(&iri, structure::ARITY, Literal::count(record.key.arity));
    if record.min_arity < record.key.arity {
        graph.add_literal(&iri, structure::MIN_ARITY, Literal::count(record.min_arity));
    }

    let contains = if record.kind.is_macro() {
        structure::CONTAINS_MACRO
    } else {
        structure::CONTAINS_FUNCTION
    };
    graph.add_bidirectional(&iri, structure::BELONGS_TO, module, contains);
    add_doc(&mut graph, &iri, structure::DOCSTRING, record.doc.as_ref());

    if let Some(delegate) = &record.delegate {
        let target_module = ctx.module_iri_for(&delegate.module.to_string());
        let target = Iri::for_function(&target_module, &delegate.function, record.key.arity);
        graph.add_link(&iri, structure::DELEGATES_TO, &target);
    }

    if let Some(marker) = &record.impl_marker {
        graph.add_literal(&iri, structure::IS_CALLBACK_IMPLEMENTATION, Literal::boolean(true));
        if let ImplMarker::Behaviour(behaviour) = marker {
            let behaviour_iri = ctx.module_iri_for(&behaviour.to_string());
            let callback = Iri::for_callback(&behaviour_iri, &record.key.name, record.key.arity);
            graph.add_link(&iri, structure::IMPLEMENTS_CALLBACK, &callback);
        }
    }

    let mut clause_terms = Vec::with_capacity(record.clauses.len());
    for (index, clause) in record.clauses.iter().enumerate() {
        let built = build_clause(&iri, clause, index, ctx);
        clause_terms.push(Term::Iri(built.iri));
        graph.merge(built.graph);
    }
    let (head, list) = build_list(&iri, "clauses", &clause_terms);
    graph.insert(Triple::new(iri.clone(), structure::HAS_CLAUSES, head));
    graph.merge(list);

    add_location(&mut graph, &iri, record.location, ctx);
    Ok(Built { iri, graph })
}

fn build_clause(function: &Iri, clause: &ClauseRecord, index: usize, ctx: &BuildContext) -> Built {
    let iri = Iri::for_clause(function, index);
    let mut graph = Graph::new();

    graph.add_type(&iri, structure::FUNCTION_CLAUSE);
    graph.add_literal(&iri, structure::CLAUSE_ORDER, Literal::count(index + 1));
    graph.add_bidirectional(&iri, structure::CLAUSE_OF, function, structure::HAS_CLAUSE);
    graph.add_literal(&iri, structure::IS_BODYLESS, Literal::boolean(clause.bodyless));
    graph.add_literal(&iri, structure::HAS_GUARD, Literal::boolean(clause.guard.is_some()));
    graph.add_optional(
        &iri,
        structure::GUARD_EXPRESSION,
        clause.guard.as_deref().map(Literal::string),
    );

    let mut param_terms = Vec::with_capacity(clause.params.len());
    for (position, param) in clause.params.iter().enumerate() {
        let param_iri = Iri::for_parameter(&iri, position);
        graph.merge(build_parameter(&param_iri, &iri, param, position));
        param_terms.push(Term::Iri(param_iri));
    }
    let (head, list) = build_list(&iri, "params", &param_terms);
    graph.insert(Triple::new(iri.clone(), structure::HAS_PARAMETERS, head));
    graph.merge(list);

    add_location(&mut graph, &iri, clause.location, ctx);
    Built { iri, graph }
}

fn build_parameter(iri: &Iri, clause: &Iri, param: &ParamRecord, position: usize) -> Graph {
    let mut graph = Graph::new();
    let class = if param.default.is_some() {
        structure::DEFAULT_PARAMETER
    } else if param.is_pattern {
        structure::PATTERN_PARAMETER
    } else {
        structure::PARAMETER
    };
    graph.add_type(iri, class);
    graph.add_literal(iri, structure::PARAMETER_POSITION, Literal::count(position + 1));
    graph.add_bidirectional(iri, structure::PARAMETER_OF, clause, structure::HAS_PARAMETER);
    graph.add_optional(iri, structure::PARAMETER_NAME, param.name.as_deref().map(Literal::string));
    graph.add_optional(iri, structure::DEFAULT_VALUE, param.default.as_deref().map(Literal::string));
    if param.is_pattern {
        graph.add_literal(iri, structure::PATTERN_TEXT, Literal::string(param.text.as_str()));
    }
    graph
}
