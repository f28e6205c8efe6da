//! Build context shared by every entity builder
//!
//! A `BuildContext` is never mutated in place by a builder: the `with_*`
//! methods return a modified copy, and the expression counter is advanced by
//! consuming the context and handing back a new one. A builder that mints
//! anonymous IRIs returns its final context next to its graph, and the caller
//! threads it into the next call.

use crate::iri::{Iri, DEFAULT_BASE};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::sync::Arc;

/// Configuration and position for one builder invocation.
#[derive(Debug, Clone)]
pub struct BuildContext {
    /// Namespace every entity IRI starts with
    pub base_iri: Iri,
    /// Path of the source file being analysed, relative to the project root
    pub file_path: Option<String>,
    /// Enclosing module IRIs, outermost first
    pub module_chain: Vec<Iri>,
    /// Emit condition/subject expressions for control-flow entities
    pub deep_expressions: bool,
    /// Modules considered internal; `None` disables the internal/external
    /// distinction entirely
    pub known_modules: Option<Arc<HashSet<String>>>,
    /// Timestamp recorded on source file entities
    pub analyzed_at: Option<DateTime<Utc>>,
    counter: u64,
}

impl Default for BuildContext {
    fn default() -> Self {
        Self::new(Iri::new(DEFAULT_BASE))
    }
}

impl BuildContext {
    pub fn new(base_iri: Iri) -> Self {
        Self {
            base_iri,
            file_path: None,
            module_chain: Vec::new(),
            deep_expressions: false,
            known_modules: None,
            analyzed_at: None,
            counter: 0,
        }
    }

    pub fn with_file_path(&self, path: impl Into<String>) -> Self {
        Self {
            file_path: Some(path.into()),
            ..self.clone()
        }
    }

    /// Enter a module: its IRI becomes the innermost entry of the chain
    pub fn with_module(&self, module: Iri) -> Self {
        let mut module_chain = self.module_chain.clone();
        module_chain.push(module);
        Self {
            module_chain,
            ..self.clone()
        }
    }

    pub fn with_deep_expressions(&self, enabled: bool) -> Self {
        Self {
            deep_expressions: enabled,
            ..self.clone()
        }
    }

    pub fn with_known_modules<I, S>(&self, modules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            known_modules: Some(Arc::new(modules.into_iter().map(Into::into).collect())),
            ..self.clone()
        }
    }

    pub fn with_analyzed_at(&self, at: DateTime<Utc>) -> Self {
        Self {
            analyzed_at: Some(at),
            ..self.clone()
        }
    }

    /// Same context with the counter set to `value`
    pub fn with_counter(&self, value: u64) -> Self {
        Self {
            counter: value,
            ..self.clone()
        }
    }

    /// Start of an independent run: counter back to zero
    pub fn reset_counter(&self) -> Self {
        self.with_counter(0)
    }

    pub fn counter(&self) -> u64 {
        self.counter
    }

    /// Take the next counter value, returning it with the advanced context
    pub fn next_counter(self) -> (u64, Self) {
        let n = self.counter;
        (
            n,
            Self {
                counter: n + 1,
                ..self
            },
        )
    }

    /// Innermost enclosing module, if any
    pub fn module_iri(&self) -> Option<&Iri> {
        self.module_chain.last()
    }

    /// Innermost enclosing module; builders that hang entities off a module
    /// call this first
    pub fn require_module(&self) -> Result<&Iri> {
        self.module_iri()
            .ok_or(Error::MissingContext("no enclosing module"))
    }

    /// IRI of the current source file
    pub fn file_iri(&self) -> Option<Iri> {
        self.file_path
            .as_deref()
            .map(|path| Iri::for_file(&self.base_iri, path))
    }

    /// IRI of a module by its full dotted name
    pub fn module_iri_for(&self, name: &str) -> Iri {
        Iri::for_module(&self.base_iri, name)
    }

    /// `Some(true)` when a whitelist exists and names the module, `None` when
    /// no whitelist was configured
    pub fn is_known_module(&self, name: &str) -> Option<bool> {
        self.known_modules
            .as_ref()
            .map(|known| known.contains(name))
    }
}
