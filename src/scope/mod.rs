//! Lexical scope and directive resolution
//!
//! The tracker walks a module body and records every `alias`, `import`,
//! `require` and `use` together with the lexical scope it occurred in. The
//! resolver then answers "what does this short name refer to" from the
//! perspective of a given scope.

pub mod directive;
pub mod multi;
pub mod resolver;
pub mod tracker;

pub use directive::{Directive, DirectiveKind, ImportCategory, ImportSelector, ModulePath};
pub use multi::{MultiDirectiveGroup, MultiTarget, DEFAULT_MAX_NESTING_DEPTH};
pub use resolver::AliasResolver;
pub use tracker::{ScopeTracker, SkippedNode, TrackResult};

use serde::{Deserialize, Serialize};

/// The kind of lexical region a directive or binding is active in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// Module body; visible to the rest of the module
    Module,
    /// Function body; visible until the end of the function
    Function,
    /// Block construct inside a function
    Block,
}

impl Scope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Module => "module",
            Scope::Function => "function",
            Scope::Block => "block",
        }
    }
}

/// Errors raised while extracting directives
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DirectiveError {
    #[error("not a directive: {0}")]
    NotADirective(String),

    #[error("multi-target nesting depth {depth} exceeds maximum {max}")]
    MaxNestingDepthExceeded { depth: usize, max: usize },

    #[error("invalid directive target: {0}")]
    InvalidTarget(String),
}
