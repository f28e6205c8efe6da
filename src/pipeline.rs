//! Pipeline - phased orchestration of the entity builders
//!
//! Per module:
//! 1. Module phase: the module and directive builders run in order on the
//!    calling thread. Any failure aborts the run.
//! 2. Entity phase: every other builder is queued on a crossbeam channel and
//!    picked up by a bounded pool of worker threads. A builder that errors,
//!    panics or overruns its time bound contributes no triples and is listed
//!    in the [`BuildReport`]; the rest still run.
//! 3. Aggregate: graphs are merged into one deduplicated set.
//!
//! `Error::MissingContext` is never absorbed into the report: it means the
//! pipeline itself is wrong, and the run fails.

use crate::ast::SyntaxNode;
use crate::builder::{default_registry, BuildOutput, BuilderKind, BuilderRegistry, EntityBuilder};
use crate::context::BuildContext;
use crate::extract::{self, ExtractOptions, ModuleAnalysis};
use crate::graph::Graph;
use crate::scope::DEFAULT_MAX_NESTING_DEPTH;
use crate::{Error, Result};
use crossbeam::channel::{self, Receiver, RecvTimeoutError, Sender};
use serde::Serialize;
use std::any::Any;
use std::collections::{HashMap, HashSet};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Default time bound for one builder
pub const DEFAULT_BUILDER_TIMEOUT: Duration = Duration::from_secs(30);

/// Default upper bound on entity-phase workers
pub const DEFAULT_MAX_WORKERS: usize = 8;

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub max_workers: usize,
    pub builder_timeout: Duration,
    pub max_nesting_depth: usize,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            max_workers: DEFAULT_MAX_WORKERS,
            builder_timeout: DEFAULT_BUILDER_TIMEOUT,
            max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
        }
    }
}

/// Why a builder contributed nothing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum FailureReason {
    Error(String),
    Panic(String),
    Timeout,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuilderFailure {
    pub builder: BuilderKind,
    pub module: String,
    pub reason: FailureReason,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuilderRun {
    pub builder: BuilderKind,
    pub module: String,
    pub triples: usize,
}

/// Which builders ran, and which failed and why
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BuildReport {
    pub modules: Vec<String>,
    pub completed: Vec<BuilderRun>,
    pub failures: Vec<BuilderFailure>,
}

impl BuildReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// Failed builder kinds for one module
    pub fn failed_kinds(&self, module: &str) -> Vec<BuilderKind> {
        self.failures
            .iter()
            .filter(|f| f.module == module)
            .map(|f| f.builder)
            .collect()
    }

    pub fn merge(&mut self, other: BuildReport) {
        self.modules.extend(other.modules);
        self.completed.extend(other.completed);
        self.failures.extend(other.failures);
    }
}

/// Graph, report and the context to continue from
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    pub graph: Graph,
    pub report: BuildReport,
    /// Input context with the counter advanced past every minted IRI
    pub context: BuildContext,
}

pub struct Pipeline {
    options: PipelineOptions,
    registry: Arc<BuilderRegistry>,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(PipelineOptions::default())
    }
}

impl Pipeline {
    pub fn new(options: PipelineOptions) -> Self {
        Self {
            options,
            registry: Arc::new(default_registry()),
        }
    }

    pub fn with_registry(mut self, registry: BuilderRegistry) -> Self {
        self.registry = Arc::new(registry);
        self
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Build every module of a source tree. The counter starts at zero and
    /// carries over from one module to the next.
    pub fn run_source(&self, root: &SyntaxNode, ctx: &BuildContext) -> Result<ExtractionResult> {
        let started = Instant::now();
        let analyses = extract::analyze_source_with(
            root,
            &ExtractOptions {
                max_nesting_depth: self.options.max_nesting_depth,
            },
        );

        let mut graph = Graph::new();
        let mut report = BuildReport::default();
        let mut ctx = ctx.reset_counter();
        for analysis in &analyses {
            let result = self.run_module(analysis, &ctx)?;
            graph.merge(result.graph);
            report.merge(result.report);
            ctx = result.context;
        }

        tracing::info!(
            "Built {} modules into {} triples in {:?} ({} builder failures)",
            analyses.len(),
            graph.len(),
            started.elapsed(),
            report.failures.len()
        );
        Ok(ExtractionResult {
            graph,
            report,
            context: ctx,
        })
    }

    /// Build one module, starting from the counter carried by `ctx`
    pub fn run_module(&self, analysis: &ModuleAnalysis, ctx: &BuildContext) -> Result<ExtractionResult> {
        let module = analysis.name.to_string();
        let module_ctx = ctx.with_module(ctx.module_iri_for(&module));
        let mut graph = Graph::new();
        let mut report = BuildReport {
            modules: vec![module.clone()],
            ..Default::default()
        };
        let mut counter = module_ctx.counter();

        for builder in self.registry.module_phase() {
            let output = run_inline(builder.as_ref(), analysis, &module_ctx.with_counter(counter))
                .map_err(|e| module_phase_error(e, builder.kind(), &module))?;
            counter = counter.max(output.context.counter());
            report.completed.push(BuilderRun {
                builder: builder.kind(),
                module: module.clone(),
                triples: output.graph.len(),
            });
            graph.merge(output.graph);
        }

        let entity_ctx = module_ctx.with_counter(counter);
        let builders: Vec<Arc<dyn EntityBuilder>> = self.registry.entity_phase().cloned().collect();
        let outcomes = self.fan_out(builders, analysis, &entity_ctx)?;

        for (kind, outcome) in outcomes {
            match outcome {
                Ok(output) => {
                    counter = counter.max(output.context.counter());
                    report.completed.push(BuilderRun {
                        builder: kind,
                        module: module.clone(),
                        triples: output.graph.len(),
                    });
                    graph.merge(output.graph);
                }
                Err(reason) => {
                    tracing::warn!("{} builder failed for {}: {:?}", kind, module, reason);
                    report.failures.push(BuilderFailure {
                        builder: kind,
                        module: module.clone(),
                        reason,
                    });
                }
            }
        }

        tracing::debug!("Module {} built: {} triples", module, graph.len());
        Ok(ExtractionResult {
            graph,
            report,
            context: ctx.with_counter(counter),
        })
    }

    /// Run the entity-phase builders on worker threads. Outcomes come back
    /// sorted by builder kind.
    fn fan_out(
        &self,
        builders: Vec<Arc<dyn EntityBuilder>>,
        analysis: &ModuleAnalysis,
        ctx: &BuildContext,
    ) -> Result<Vec<(BuilderKind, std::result::Result<BuildOutput, FailureReason>)>> {
        if builders.is_empty() {
            return Ok(Vec::new());
        }

        let (job_tx, job_rx) = channel::unbounded::<Arc<dyn EntityBuilder>>();
        let (event_tx, event_rx) = channel::unbounded::<WorkerEvent>();
        let pool = WorkerPool {
            jobs: job_rx,
            events: event_tx,
            analysis: Arc::new(analysis.clone()),
            ctx: ctx.clone(),
        };

        let mut pending = builders.len();
        let workers = self.options.max_workers.clamp(1, pending);
        for builder in builders {
            // the receiver is held by `pool`, so sending cannot fail
            let _ = job_tx.send(builder);
        }
        drop(job_tx);
        for _ in 0..workers {
            pool.spawn()?;
        }

        let timeout = self.options.builder_timeout;
        let mut deadlines: HashMap<BuilderKind, Instant> = HashMap::new();
        let mut timed_out: HashSet<BuilderKind> = HashSet::new();
        let mut outcomes = Vec::with_capacity(pending);

        while pending > 0 {
            let event = match deadlines.values().min() {
                Some(deadline) => {
                    event_rx.recv_timeout(deadline.saturating_duration_since(Instant::now()))
                }
                None => event_rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
            };
            match event {
                Ok(WorkerEvent::Started { kind, at }) => {
                    deadlines.insert(kind, at + timeout);
                }
                Ok(WorkerEvent::Finished { kind, result }) => {
                    if timed_out.contains(&kind) {
                        tracing::debug!("Dropping late result of {} builder", kind);
                        continue;
                    }
                    deadlines.remove(&kind);
                    pending -= 1;
                    let outcome = match result {
                        Ok(Ok(output)) => Ok(output),
                        Ok(Err(Error::MissingContext(what))) => return Err(Error::MissingContext(what)),
                        Ok(Err(e)) => Err(FailureReason::Error(e.to_string())),
                        Err(payload) => Err(FailureReason::Panic(panic_message(payload.as_ref()))),
                    };
                    outcomes.push((kind, outcome));
                }
                Err(RecvTimeoutError::Timeout) => {
                    let now = Instant::now();
                    let expired: Vec<BuilderKind> = deadlines
                        .iter()
                        .filter(|(_, deadline)| **deadline <= now)
                        .map(|(kind, _)| *kind)
                        .collect();
                    for kind in expired {
                        deadlines.remove(&kind);
                        timed_out.insert(kind);
                        pending -= 1;
                        outcomes.push((kind, Err(FailureReason::Timeout)));
                        // the stuck worker is abandoned; keep the pool at size
                        pool.spawn()?;
                    }
                }
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        outcomes.sort_by_key(|(kind, _)| *kind);
        Ok(outcomes)
    }
}

type BuildResult = thread::Result<Result<BuildOutput>>;

enum WorkerEvent {
    Started { kind: BuilderKind, at: Instant },
    Finished { kind: BuilderKind, result: BuildResult },
}

/// Shared inputs every worker of one fan-out needs
struct WorkerPool {
    jobs: Receiver<Arc<dyn EntityBuilder>>,
    events: Sender<WorkerEvent>,
    analysis: Arc<ModuleAnalysis>,
    ctx: BuildContext,
}

impl WorkerPool {
    fn spawn(&self) -> Result<()> {
        let jobs = self.jobs.clone();
        let events = self.events.clone();
        let analysis = Arc::clone(&self.analysis);
        let ctx = self.ctx.clone();

        thread::Builder::new()
            .name("exgraph-builder".to_string())
            .spawn(move || {
                for builder in jobs.iter() {
                    let kind = builder.kind();
                    let started = WorkerEvent::Started {
                        kind,
                        at: Instant::now(),
                    };
                    if events.send(started).is_err() {
                        break;
                    }
                    let result =
                        panic::catch_unwind(AssertUnwindSafe(|| builder.build(&analysis, &ctx)));
                    if events.send(WorkerEvent::Finished { kind, result }).is_err() {
                        break;
                    }
                }
            })?;
        Ok(())
    }
}

fn run_inline(
    builder: &dyn EntityBuilder,
    analysis: &ModuleAnalysis,
    ctx: &BuildContext,
) -> std::result::Result<BuildOutput, ModulePhaseFailure> {
    match panic::catch_unwind(AssertUnwindSafe(|| builder.build(analysis, ctx))) {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(e)) => Err(ModulePhaseFailure::Error(e)),
        Err(payload) => Err(ModulePhaseFailure::Panic(panic_message(payload.as_ref()))),
    }
}

enum ModulePhaseFailure {
    Error(Error),
    Panic(String),
}

fn module_phase_error(failure: ModulePhaseFailure, builder: BuilderKind, module: &str) -> Error {
    let reason = match failure {
        ModulePhaseFailure::Error(Error::MissingContext(what)) => return Error::MissingContext(what),
        ModulePhaseFailure::Error(e) => e.to_string(),
        ModulePhaseFailure::Panic(message) => format!("panicked: {message}"),
    };
    Error::BuilderFailed {
        builder,
        module: module.to_string(),
        reason,
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
