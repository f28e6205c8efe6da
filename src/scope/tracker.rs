//! Scope Tracker - Lexical scope aware directive collection
//!
//! Walks statements pre-order, left to right, tracking which lexical scope
//! is active:
//! 1. Function definitions switch to `Function` for their body
//! 2. Block constructs switch to `Block`, except at module level where the
//!    scope stays `Module`
//! 3. Directives are emitted with the active scope
//! 4. Everything else is descended into unchanged
//!
//! Nested `defmodule` bodies are not entered; they are tracked separately
//! for their own module.

use super::directive::{self, Directive, DirectiveOptions, ModulePath};
use super::multi::DEFAULT_MAX_NESTING_DEPTH;
use super::{DirectiveError, Scope};
use crate::ast::{classify, Shape, SyntaxNode};
use serde::Serialize;

/// A directive node that could not be extracted
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedNode {
    pub line: Option<u32>,
    pub scope: Scope,
    #[serde(serialize_with = "serialize_error")]
    pub error: DirectiveError,
}

fn serialize_error<S: serde::Serializer>(
    error: &DirectiveError,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(error)
}

/// Directives in traversal order plus the nodes that were skipped
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TrackResult {
    pub directives: Vec<Directive>,
    pub skipped: Vec<SkippedNode>,
}

/// Collects directives from a module body
#[derive(Debug, Clone)]
pub struct ScopeTracker {
    current_module: Option<ModulePath>,
    max_nesting_depth: usize,
}

impl Default for ScopeTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeTracker {
    pub fn new() -> Self {
        Self {
            current_module: None,
            max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
        }
    }

    /// Module whose body is tracked, for `__MODULE__` expansion
    pub fn with_module(mut self, module: ModulePath) -> Self {
        self.current_module = Some(module);
        self
    }

    pub fn with_max_depth(mut self, max_nesting_depth: usize) -> Self {
        self.max_nesting_depth = max_nesting_depth;
        self
    }

    /// Directives of a module body, malformed ones skipped
    pub fn track(&self, statements: &[SyntaxNode]) -> Vec<Directive> {
        self.track_with_errors(statements).directives
    }

    /// Directives of a module body together with what was skipped
    pub fn track_with_errors(&self, statements: &[SyntaxNode]) -> TrackResult {
        self.track_in(statements, Scope::Module)
    }

    /// Track starting from an arbitrary scope, e.g. a single function body
    pub fn track_in(&self, statements: &[SyntaxNode], scope: Scope) -> TrackResult {
        let mut result = TrackResult::default();
        for statement in statements {
            self.visit(statement, scope, &mut result);
        }
        result
    }

    fn visit(&self, node: &SyntaxNode, scope: Scope, result: &mut TrackResult) {
        match classify(node) {
            Shape::Directive(tag, _) => {
                let options = DirectiveOptions {
                    current_module: self.current_module.as_ref(),
                    max_nesting_depth: self.max_nesting_depth,
                };
                match directive::extract(node, scope, &options) {
                    Ok(directives) => result.directives.extend(directives),
                    Err(error) => {
                        match &error {
                            DirectiveError::MaxNestingDepthExceeded { .. } => tracing::warn!(
                                "Skipping {} at line {:?}: {}",
                                tag.as_str(),
                                node.line(),
                                error
                            ),
                            _ => tracing::debug!(
                                "Skipping {} at line {:?}: {}",
                                tag.as_str(),
                                node.line(),
                                error
                            ),
                        }
                        result.skipped.push(SkippedNode {
                            line: node.line(),
                            scope,
                            error,
                        });
                    }
                }
            }
            Shape::FunctionDef(_, form) => {
                for arg in form.args() {
                    self.visit(arg, Scope::Function, result);
                }
            }
            Shape::BlockConstruct(_, form) => {
                let inner = match scope {
                    Scope::Module => Scope::Module,
                    Scope::Function | Scope::Block => Scope::Block,
                };
                for arg in form.args() {
                    self.visit(arg, inner, result);
                }
            }
            Shape::ModuleDef(_) | Shape::ProtocolDecl(_) | Shape::ImplDecl(_) => {}
            _ => {
                for child in node.children() {
                    self.visit(child, scope, result);
                }
            }
        }
    }
}
