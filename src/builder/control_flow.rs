//! Control-flow entities (`if`, `unless`, `case`, `cond`, `with`, `for`,
//! `try`, `receive`)
//!
//! With deep expressions enabled, the condition or subject becomes its own
//! expression entity, also minted from the threaded counter.

use super::{add_location, function_iri, BuildOutput, Built, BuilderKind, EntityBuilder};
use crate::ast::BlockKind;
use crate::context::BuildContext;
use crate::extract::{ControlFlowRecord, ModuleAnalysis};
use crate::graph::{Graph, Literal};
use crate::iri::Iri;
use crate::vocab::code;
use crate::Result;

pub struct ControlFlowBuilder;

impl EntityBuilder for ControlFlowBuilder {
    fn kind(&self) -> BuilderKind {
        BuilderKind::ControlFlow
    }

    fn build(&self, analysis: &ModuleAnalysis, ctx: &BuildContext) -> Result<BuildOutput> {
        ctx.require_module()?;
        let mut graph = Graph::new();
        let mut ctx = ctx.clone();
        for record in &analysis.control_flow {
            let (built, next) = build_control_flow(record, ctx)?;
            graph.merge(built.graph);
            ctx = next;
        }
        Ok(BuildOutput { graph, context: ctx })
    }
}

pub fn block_class(kind: BlockKind) -> &'static str {
    match kind {
        BlockKind::If => code::IF_EXPRESSION,
        BlockKind::Unless => code::UNLESS_EXPRESSION,
        BlockKind::Case => code::CASE_EXPRESSION,
        BlockKind::Cond => code::COND_EXPRESSION,
        BlockKind::With => code::WITH_EXPRESSION,
        BlockKind::For => code::FOR_COMPREHENSION,
        BlockKind::Try => code::TRY_EXPRESSION,
        BlockKind::Receive => code::RECEIVE_EXPRESSION,
    }
}

pub fn build_control_flow(
    record: &ControlFlowRecord,
    ctx: BuildContext,
) -> Result<(Built, BuildContext)> {
    let function = function_iri(ctx.require_module()?, &record.owner);
    let (n, mut ctx) = ctx.next_counter();
    let iri = Iri::for_anonymous(&function, "cf", n);
    let mut graph = Graph::new();

    graph.add_type(&iri, block_class(record.kind));
    graph.add_bidirectional(&iri, code::CONTROL_FLOW_OF, &function, code::CONTAINS_CONTROL_FLOW);
    graph.add_literal(&iri, code::BRANCH_COUNT, Literal::count(record.branch_count));
    graph.add_literal(&iri, code::NESTING_DEPTH, Literal::count(record.nesting_depth));
    graph.add_literal(&iri, code::HAS_ELSE, Literal::boolean(record.has_else));
    if record.kind == BlockKind::Try {
        graph.add_literal(&iri, code::HAS_RESCUE, Literal::boolean(record.has_rescue));
        graph.add_literal(&iri, code::HAS_CATCH, Literal::boolean(record.has_catch));
    }
    if matches!(record.kind, BlockKind::Try | BlockKind::Receive) {
        graph.add_literal(&iri, code::HAS_AFTER, Literal::boolean(record.has_after));
    }

    if let Some(condition) = record.condition.as_ref().filter(|_| ctx.deep_expressions) {
        let (m, next) = ctx.next_counter();
        ctx = next;
        let expression = Iri::for_anonymous(&function, "expr", m);
        graph.add_type(&expression, code::EXPRESSION);
        graph.add_literal(
            &expression,
            code::EXPRESSION_TEXT,
            Literal::string(condition.text.as_str()),
        );
        graph.add_literal(&expression, code::EXPRESSION_KIND, Literal::string(condition.kind));
        graph.add_bidirectional(&expression, code::CONDITION_OF, &iri, code::HAS_CONDITION);
    }

    add_location(&mut graph, &iri, record.location, &ctx);
    Ok((Built { iri, graph }, ctx))
}
