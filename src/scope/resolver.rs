//! Alias Resolver - Resolves short module names to full module paths
//!
//! Resolution algorithm:
//! 1. Walk outward through the scope chain (innermost first)
//! 2. Within a scope, the first alias for a name wins
//! 3. Replace the first segment of the reference with the alias target
//! 4. If no alias matches, the reference is already fully qualified
//!
//! Local calls are resolved against `import ..., only: [...]` lists the same
//! way, innermost scope first.
//!
//! Function bodies are resolved while they are walked: scopes are entered
//! and left around block constructs and each directive is declared when it
//! is reached, so a reference only sees directives that precede it in an
//! enclosing scope.

use super::directive::{Directive, DirectiveKind, ImportSelector, ModulePath};
use super::Scope;
use crate::ast::SyntaxNode;
use indexmap::IndexMap;

/// Aliases and imports declared in one lexical scope
#[derive(Debug, Clone)]
struct AliasScope {
    kind: Scope,
    aliases: IndexMap<String, ModulePath>,
    imports: Vec<(ModulePath, ImportSelector)>,
}

impl AliasScope {
    fn new(kind: Scope) -> Self {
        Self {
            kind,
            aliases: IndexMap::new(),
            imports: Vec::new(),
        }
    }

    fn from_directives<'a>(kind: Scope, directives: impl Iterator<Item = &'a Directive>) -> Self {
        let mut scope = Self::new(kind);
        for directive in directives {
            scope.declare(directive);
        }
        scope
    }

    fn declare(&mut self, directive: &Directive) {
        if let Some(name) = directive.alias_name() {
            self.aliases
                .entry(name.to_string())
                .or_insert_with(|| directive.source.clone());
        }
        if let DirectiveKind::Import { selector } = &directive.kind {
            self.imports
                .push((directive.source.clone(), selector.clone()));
        }
    }
}

/// Scope-aware alias resolution
#[derive(Debug, Clone)]
pub struct AliasResolver {
    /// Outermost first
    chain: Vec<AliasScope>,
}

impl AliasResolver {
    /// Resolver for module-level references; only module-scoped directives
    /// are visible.
    pub fn new(directives: &[Directive]) -> Self {
        Self {
            chain: vec![AliasScope::from_directives(
                Scope::Module,
                directives.iter().filter(|d| d.scope == Scope::Module),
            )],
        }
    }

    /// Open a lexical scope (function body, block construct); directives
    /// declared from here on are dropped again by [`AliasResolver::leave`].
    pub fn enter(&mut self, kind: Scope) {
        self.chain.push(AliasScope::new(kind));
    }

    /// Close the innermost scope opened with [`AliasResolver::enter`]. The
    /// module scope is never closed.
    pub fn leave(&mut self) {
        if self.chain.len() > 1 {
            self.chain.pop();
        }
    }

    /// Make a directive visible to every later lookup in the innermost scope
    pub fn declare(&mut self, directive: &Directive) {
        if let Some(scope) = self.chain.last_mut() {
            scope.declare(directive);
        }
    }

    /// Resolver for a nested module: the enclosing module's aliases stay
    /// visible beneath the nested module's own.
    pub fn nested(&self, directives: &[Directive]) -> Self {
        let mut chain = self.chain.clone();
        chain.push(AliasScope::from_directives(
            Scope::Module,
            directives.iter().filter(|d| d.scope == Scope::Module),
        ));
        Self { chain }
    }

    /// Innermost scope kind
    pub fn scope(&self) -> Scope {
        self.chain.last().map(|s| s.kind).unwrap_or(Scope::Module)
    }

    /// Full module an alias name refers to, if aliased
    pub fn lookup(&self, name: &str) -> Option<&ModulePath> {
        self.chain
            .iter()
            .rev()
            .find_map(|scope| scope.aliases.get(name))
    }

    /// Resolve a module reference: the first segment is expanded through the
    /// alias table; Erlang modules are returned unchanged.
    pub fn resolve(&self, path: &ModulePath) -> ModulePath {
        if path.is_erlang() {
            return path.clone();
        }
        match path.first().and_then(|first| self.lookup(first)) {
            Some(target) => path.replace_head(target),
            None => path.clone(),
        }
    }

    /// Resolve a module reference node (`__aliases__`, atom, `__MODULE__`)
    pub fn resolve_node(
        &self,
        node: &SyntaxNode,
        current: Option<&ModulePath>,
    ) -> Option<ModulePath> {
        let path = ModulePath::from_node(node, current)?;
        // `__MODULE__.X` is already absolute
        if node.is_form("__MODULE__")
            || node
                .alias_segments()
                .is_some_and(|s| s.first().map(String::as_str) == Some("__MODULE__"))
        {
            return Some(path);
        }
        Some(self.resolve(&path))
    }

    /// Module that provides a local call through an explicit `only:` import
    pub fn import_for(&self, name: &str, arity: usize) -> Option<&ModulePath> {
        self.chain.iter().rev().find_map(|scope| {
            scope
                .imports
                .iter()
                .find(|(_, selector)| selector.names(name, arity))
                .map(|(module, _)| module)
        })
    }
}
