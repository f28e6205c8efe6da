//! # exgraph - Elixir code knowledge graph extraction
//!
//! Turns an already-parsed Elixir syntax tree into a deduplicated set of
//! RDF-style triples describing modules, functions, clauses, directives,
//! closures, control flow and OTP structure.
//!
//! exgraph provides:
//! - A serde-readable syntax tree model with shape classification
//! - Scope-aware directive tracking with multi-target expansion
//! - Closure (free variable) analysis for anonymous functions
//! - Deterministic IRI minting and triple assembly
//! - A phased pipeline that fans entity builders out over worker threads

pub mod ast;
pub mod builder;
pub mod closure;
pub mod config;
pub mod context;
pub mod extract;
pub mod graph;
pub mod iri;
pub mod pipeline;
pub mod scope;
pub mod vocab;

// Re-exports for convenient access
pub use context::BuildContext;
pub use graph::{Graph, Literal, Term, Triple};
pub use iri::Iri;
pub use pipeline::{BuildReport, ExtractionResult, Pipeline, PipelineOptions};

/// Result type alias for exgraph operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for exgraph operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid IRI: {0}")]
    InvalidIri(String),

    /// A builder was invoked without context it cannot work without. This is
    /// a caller bug and is never degraded into a partial result.
    #[error("Missing build context: {0}")]
    MissingContext(&'static str),

    /// A module-phase builder failed; the module cannot be built without it
    #[error("{builder} builder failed for {module}: {reason}")]
    BuilderFailed {
        builder: builder::BuilderKind,
        module: String,
        reason: String,
    },

    #[error("Directive error: {0}")]
    Directive(#[from] scope::DirectiveError),

    #[error("Extraction error: {0}")]
    Extract(#[from] extract::ExtractError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
