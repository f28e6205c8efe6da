//! Record extraction
//!
//! Turns a source tree into one [`ModuleAnalysis`] per module definition.
//! Nested modules are flattened into their own analyses with a parent link.
//! Extraction is best effort: a malformed definition is logged and skipped,
//! the rest of the module is still analysed.

mod body;
mod definition;
mod module;
mod otp;
pub mod records;
mod typespec;

pub use records::*;

use crate::ast::{classify, Shape, ShapeError, SyntaxNode};
use crate::scope::{DirectiveError, DEFAULT_MAX_NESTING_DEPTH};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error(transparent)]
    Shape(#[from] ShapeError),

    #[error(transparent)]
    Directive(#[from] DirectiveError),

    #[error("Not a module definition: {0}")]
    NotAModule(String),
}

/// Extraction settings
#[derive(Debug, Clone, Copy)]
pub struct ExtractOptions {
    /// Bound on multi-target directive nesting
    pub max_nesting_depth: usize,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
        }
    }
}

/// Analyse every module defined in `root` with default options
pub fn analyze_source(root: &SyntaxNode) -> Vec<ModuleAnalysis> {
    analyze_source_with(root, &ExtractOptions::default())
}

/// Analyse every module defined in `root`.
///
/// Modules are returned in definition order, each parent before its nested
/// modules.
pub fn analyze_source_with(root: &SyntaxNode, options: &ExtractOptions) -> Vec<ModuleAnalysis> {
    let mut out = Vec::new();
    collect_modules(root, options, &mut out);
    tracing::debug!("Extracted {} modules", out.len());
    out
}

fn collect_modules(node: &SyntaxNode, options: &ExtractOptions, out: &mut Vec<ModuleAnalysis>) {
    match classify(node) {
        Shape::ModuleDef(_) | Shape::ProtocolDecl(_) | Shape::ImplDecl(_) => {
            match module::analyze(node, None, options) {
                Ok(modules) => out.extend(modules),
                Err(e) => tracing::warn!("Skipping module at line {:?}: {}", node.line(), e),
            }
        }
        _ => {
            for child in node.children() {
                collect_modules(child, options, out);
            }
        }
    }
}

/// Analyse a single `defmodule`/`defprotocol`/`defimpl` node and the modules
/// nested in it
pub fn analyze_module(
    node: &SyntaxNode,
    options: &ExtractOptions,
) -> Result<Vec<ModuleAnalysis>, ExtractError> {
    module::analyze(node, None, options)
}
