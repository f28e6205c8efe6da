//! OTP entities: behaviour patterns, supervision trees and ETS tables
//!
//! Pattern IRIs are `{module}/otp/{pattern}`. A supervision tree hangs off
//! the dynamic supervisor pattern when the module has one and off
//! `{module}/otp/supervisor` otherwise.

use super::{add_location, function_iri, BuildOutput, BuilderKind, EntityBuilder};
use crate::context::BuildContext;
use crate::extract::{EtsTableRecord, ModuleAnalysis, OtpKind, OtpPatternRecord, SupervisorRecord};
use crate::graph::{Graph, Literal};
use crate::iri::Iri;
use crate::vocab::otp;
use crate::Result;

pub struct OtpBuilder;

impl EntityBuilder for OtpBuilder {
    fn kind(&self) -> BuilderKind {
        BuilderKind::Otp
    }

    fn build(&self, analysis: &ModuleAnalysis, ctx: &BuildContext) -> Result<BuildOutput> {
        let module = ctx.require_module()?;
        let mut graph = Graph::new();

        for pattern in &analysis.otp.patterns {
            build_pattern(&mut graph, module, pattern);
        }
        if let Some(supervisor) = &analysis.otp.supervisor {
            let dynamic = analysis
                .otp
                .patterns
                .iter()
                .any(|p| p.kind == OtpKind::DynamicSupervisor);
            let kind = if dynamic {
                OtpKind::DynamicSupervisor
            } else {
                OtpKind::Supervisor
            };
            build_supervisor(&mut graph, module, kind, supervisor, ctx);
        }
        for (index, table) in analysis.otp.ets_tables.iter().enumerate() {
            build_ets_table(&mut graph, module, index, table, ctx);
        }

        Ok(BuildOutput::unchanged(graph, ctx))
    }
}

pub fn pattern_class(kind: OtpKind) -> &'static str {
    match kind {
        OtpKind::GenServer => otp::GEN_SERVER,
        OtpKind::Supervisor => otp::SUPERVISOR,
        OtpKind::DynamicSupervisor => otp::DYNAMIC_SUPERVISOR,
        OtpKind::Agent => otp::AGENT,
        OtpKind::Task => otp::TASK,
        OtpKind::Application => otp::APPLICATION,
    }
}

fn pattern_iri(module: &Iri, kind: OtpKind) -> Iri {
    Iri::for_otp_pattern(module, kind.as_str())
}

fn build_pattern(graph: &mut Graph, module: &Iri, pattern: &OtpPatternRecord) {
    let iri = pattern_iri(module, pattern.kind);
    graph.add_type(&iri, pattern_class(pattern.kind));
    graph.add_bidirectional(&iri, otp::PATTERN_OF, module, otp::IMPLEMENTS_OTP_PATTERN);
    for option in &pattern.use_options {
        let text = match &option.key {
            Some(key) => format!("{key}: {}", option.value),
            None => option.value.clone(),
        };
        graph.add_literal(&iri, otp::USE_OPTION, Literal::string(text));
    }
    for callback in &pattern.callbacks {
        graph.add_link(&iri, otp::IMPLEMENTS_OTP_CALLBACK, &function_iri(module, callback));
    }
}

fn build_supervisor(
    graph: &mut Graph,
    module: &Iri,
    kind: OtpKind,
    supervisor: &SupervisorRecord,
    ctx: &BuildContext,
) {
    let iri = pattern_iri(module, kind);
    graph.add_type(&iri, pattern_class(kind));
    graph.add_bidirectional(&iri, otp::PATTERN_OF, module, otp::IMPLEMENTS_OTP_PATTERN);
    graph.add_optional(
        &iri,
        otp::SUPERVISION_STRATEGY,
        supervisor.strategy.as_deref().map(Literal::string),
    );

    for (index, child) in supervisor.children.iter().enumerate() {
        let child_iri = Iri::for_child_spec(&iri, index);
        graph.add_type(&child_iri, otp::CHILD_SPEC);
        graph.add_literal(&child_iri, otp::CHILD_ORDER, Literal::count(index + 1));
        graph.add_literal(&child_iri, otp::CHILD_SPEC_TEXT, Literal::string(child.text.as_str()));
        if let Some(child_module) = &child.module {
            let target = ctx.module_iri_for(&child_module.to_string());
            graph.add_link(&child_iri, otp::CHILD_MODULE, &target);
        }
        graph.add_bidirectional(&child_iri, otp::CHILD_OF, &iri, otp::HAS_CHILD);
    }
}

fn build_ets_table(
    graph: &mut Graph,
    module: &Iri,
    index: usize,
    table: &EtsTableRecord,
    ctx: &BuildContext,
) {
    let iri = Iri::for_ets_table(module, index);
    graph.add_type(&iri, otp::ETS_TABLE);
    graph.add_literal(&iri, otp::TABLE_NAME, Literal::string(table.name.as_str()));
    graph.add_literal(&iri, otp::TABLE_TYPE, Literal::string(table.table_type.as_str()));
    graph.add_literal(&iri, otp::TABLE_ACCESS, Literal::string(table.access.as_str()));
    graph.add_literal(&iri, otp::IS_NAMED_TABLE, Literal::boolean(table.named));
    graph.add_bidirectional(&iri, otp::OWNED_BY, module, otp::OWNS_TABLE);
    graph.add_link(&iri, otp::CREATED_IN, &function_iri(module, &table.owner));
    add_location(graph, &iri, table.location, ctx);
}
