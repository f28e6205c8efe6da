//! Module definition walker
//!
//! Handles `defmodule`, `defprotocol` and `defimpl`. The module body is
//! visited statement by statement; `@doc`/`@impl` attach to the next
//! definition, clauses with the same `name/arity` are grouped, and function
//! bodies are scanned once every definition is known so local calls can be
//! resolved against the whole module.

use super::body::{self, BodyFacts, ModuleScope};
use super::definition::{self, ParsedDef};
use super::records::{
    AttributeRecord, CallbackRecord, DelegateTarget, Doc, FieldRecord, FunctionKey,
    FunctionRecord, ImplMarker, ImplRecord, ModuleAnalysis, ModuleKind, ProtocolFunctionRecord,
    ProtocolRecord, SpecRecord, StructRecord, TypeVisibility,
};
use super::{otp, typespec, ExtractError, ExtractOptions};
use crate::ast::render::to_source;
use crate::ast::{classify, DefKind, Form, Shape, ShapeError, SourceLocation, SyntaxNode};
use crate::scope::{AliasResolver, ModulePath, ScopeTracker};
use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};

/// The module a nested definition appears in
pub(super) struct Enclosing<'a> {
    pub name: &'a ModulePath,
    pub resolver: &'a AliasResolver,
}

pub(super) fn analyze(
    node: &SyntaxNode,
    enclosing: Option<&Enclosing<'_>>,
    options: &ExtractOptions,
) -> Result<Vec<ModuleAnalysis>, ExtractError> {
    match classify(node) {
        Shape::ModuleDef(form) => {
            let name = module_name(form, node, enclosing)?;
            let analysis = ModuleAnalysis::new(name, ModuleKind::Module);
            walk(analysis, node, do_body(form, node)?, enclosing, options)
        }
        Shape::ProtocolDecl(form) => {
            let name = module_name(form, node, enclosing)?;
            let mut analysis = ModuleAnalysis::new(name, ModuleKind::Protocol);
            analysis.protocol = Some(ProtocolRecord {
                functions: Vec::new(),
                fallback_to_any: false,
            });
            walk(analysis, node, do_body(form, node)?, enclosing, options)
        }
        Shape::ImplDecl(form) => implementations(form, node, enclosing, options),
        _ => Err(ExtractError::NotAModule(to_source(node))),
    }
}

/// `defimpl P, for: [A, B]` defines one module per target type
fn implementations(
    form: &Form,
    node: &SyntaxNode,
    enclosing: Option<&Enclosing<'_>>,
    options: &ExtractOptions,
) -> Result<Vec<ModuleAnalysis>, ExtractError> {
    let protocol_node = form
        .arg(0)
        .ok_or_else(|| ShapeError::new("protocol name", node))?;
    let protocol = resolve_module(protocol_node, enclosing)
        .ok_or_else(|| ShapeError::new("protocol name", protocol_node))?;

    let pairs: Vec<(&str, &SyntaxNode)> = form.args()[1..]
        .iter()
        .filter_map(SyntaxNode::as_keyword)
        .flatten()
        .collect();
    let body = pairs
        .iter()
        .find(|(k, _)| *k == "do")
        .map(|(_, v)| *v)
        .ok_or_else(|| ShapeError::new("do block", node))?;

    let targets: Vec<ModulePath> = match pairs.iter().find(|(k, _)| *k == "for") {
        Some((_, target)) => match target.as_list() {
            Some(items) => items
                .iter()
                .filter_map(|t| resolve_module(t, enclosing))
                .collect(),
            None => resolve_module(target, enclosing).into_iter().collect(),
        },
        None => enclosing.map(|e| e.name.clone()).into_iter().collect(),
    };
    if targets.is_empty() {
        return Err(ShapeError::new("`for:` target", node).into());
    }

    let mut out = Vec::new();
    for for_type in targets {
        let mut analysis =
            ModuleAnalysis::new(protocol.join(&for_type), ModuleKind::Implementation);
        analysis.implementation = Some(ImplRecord {
            protocol: protocol.clone(),
            for_type,
        });
        out.extend(walk(analysis, node, body, enclosing, options)?);
    }
    Ok(out)
}

fn resolve_module(node: &SyntaxNode, enclosing: Option<&Enclosing<'_>>) -> Option<ModulePath> {
    match enclosing {
        Some(e) => e.resolver.resolve_node(node, Some(e.name)),
        None => ModulePath::from_node(node, None),
    }
}

/// Full name of a module: nested names are prefixed with the enclosing
/// module unless they start from `__MODULE__`
fn module_name(
    form: &Form,
    node: &SyntaxNode,
    enclosing: Option<&Enclosing<'_>>,
) -> Result<ModulePath, ShapeError> {
    let name_node = form
        .arg(0)
        .ok_or_else(|| ShapeError::new("module name", node))?;
    let current = enclosing.map(|e| e.name);
    let path = ModulePath::from_node(name_node, current)
        .ok_or_else(|| ShapeError::new("module name", name_node))?;
    let absolute = name_node.is_form("__MODULE__")
        || name_node
            .alias_segments()
            .is_some_and(|s| s.first().map(String::as_str) == Some("__MODULE__"));
    Ok(match enclosing {
        Some(e) if !absolute && !path.is_erlang() => e.name.join(&path),
        _ => path,
    })
}

fn do_body<'a>(form: &'a Form, node: &SyntaxNode) -> Result<&'a SyntaxNode, ShapeError> {
    form.do_block()
        .ok_or_else(|| ShapeError::new("do block", node))
}

fn walk(
    mut analysis: ModuleAnalysis,
    node: &SyntaxNode,
    body: &SyntaxNode,
    enclosing: Option<&Enclosing<'_>>,
    options: &ExtractOptions,
) -> Result<Vec<ModuleAnalysis>, ExtractError> {
    analysis.parent = enclosing.map(|e| e.name.clone());
    analysis.location = SourceLocation::of(node);

    let statements: &[SyntaxNode] = match body {
        SyntaxNode::Nil => &[],
        other => other.statements(),
    };
    let tracked = ScopeTracker::new()
        .with_module(analysis.name.clone())
        .with_max_depth(options.max_nesting_depth)
        .track_with_errors(statements);
    let resolver = match enclosing {
        Some(e) => e.resolver.nested(&tracked.directives),
        None => AliasResolver::new(&tracked.directives),
    };
    analysis.directives = tracked.directives;
    analysis.skipped_directives = tracked.skipped;

    let mut walker = ModuleWalker::new(analysis, &resolver);
    for statement in statements {
        walker.statement(statement);
    }
    walker.finish(options)
}

struct ModuleWalker<'a, 'r> {
    analysis: ModuleAnalysis,
    resolver: &'r AliasResolver,
    functions: IndexMap<FunctionKey, FunctionRecord>,
    bodies: Vec<(FunctionKey, usize, &'a SyntaxNode)>,
    nested: Vec<&'a SyntaxNode>,
    pending_doc: Option<Doc>,
    pending_impl: Option<ImplMarker>,
    attribute_counts: HashMap<String, usize>,
    spec_counts: HashMap<FunctionKey, usize>,
    enforce_keys: Vec<String>,
    derives: Vec<ModulePath>,
    optional_callbacks: Vec<FunctionKey>,
    struct_decl: Option<(&'a SyntaxNode, &'a Form, bool)>,
}

impl<'a, 'r> ModuleWalker<'a, 'r> {
    fn new(analysis: ModuleAnalysis, resolver: &'r AliasResolver) -> Self {
        Self {
            analysis,
            resolver,
            functions: IndexMap::new(),
            bodies: Vec::new(),
            nested: Vec::new(),
            pending_doc: None,
            pending_impl: None,
            attribute_counts: HashMap::new(),
            spec_counts: HashMap::new(),
            enforce_keys: Vec::new(),
            derives: Vec::new(),
            optional_callbacks: Vec::new(),
            struct_decl: None,
        }
    }

    fn resolve(&self, node: &SyntaxNode) -> Option<ModulePath> {
        self.resolver.resolve_node(node, Some(&self.analysis.name))
    }

    fn statement(&mut self, node: &'a SyntaxNode) {
        match classify(node) {
            Shape::Attribute {
                name,
                value: Some(value),
                ..
            } => self.attribute(name, value, node),
            Shape::FunctionDef(kind, form) => self.definition(kind, node, form),
            Shape::StructDecl(form) => self.struct_decl = Some((node, form, false)),
            Shape::ExceptionDecl(form) => self.struct_decl = Some((node, form, true)),
            Shape::ModuleDef(_) | Shape::ProtocolDecl(_) | Shape::ImplDecl(_) => {
                self.nested.push(node)
            }
            Shape::Block(statements) => {
                for statement in statements {
                    self.statement(statement);
                }
            }
            // `if Code.ensure_loaded?(...) do def ... end` at module level
            Shape::BlockConstruct(_, form) => {
                let blocks = form
                    .args()
                    .last()
                    .and_then(SyntaxNode::as_keyword)
                    .unwrap_or_default();
                for (_, block) in blocks {
                    for statement in block.statements() {
                        self.statement(statement);
                    }
                }
            }
            _ => {}
        }
    }

    fn attribute(&mut self, name: &str, value: &SyntaxNode, node: &SyntaxNode) {
        let location = SourceLocation::of(node);
        match name {
            "type" | "typep" | "opaque" => {
                let visibility = match name {
                    "type" => TypeVisibility::Public,
                    "typep" => TypeVisibility::Private,
                    _ => TypeVisibility::Opaque,
                };
                match typespec::parse_type(visibility, value, node) {
                    Ok(record) => self.analysis.types.push(record),
                    Err(e) => tracing::debug!("Skipping @{} in {}: {}", name, self.analysis.name, e),
                }
                return;
            }
            "spec" => {
                match typespec::parse_spec(value) {
                    Ok((key, param_types, return_type)) => {
                        let count = self.spec_counts.entry(key.clone()).or_insert(0);
                        let index = *count;
                        *count += 1;
                        self.analysis.specs.push(SpecRecord {
                            key,
                            param_types,
                            return_type,
                            index,
                            location,
                        });
                    }
                    Err(e) => tracing::debug!("Skipping @spec in {}: {}", self.analysis.name, e),
                }
                return;
            }
            "callback" | "macrocallback" => {
                match typespec::parse_spec(value) {
                    Ok((key, _, _)) => self.analysis.callbacks.push(CallbackRecord {
                        key,
                        is_macro: name == "macrocallback",
                        optional: false,
                        signature: to_source(value),
                        location,
                    }),
                    Err(e) => tracing::debug!("Skipping @{} in {}: {}", name, self.analysis.name, e),
                }
                return;
            }
            "moduledoc" => self.analysis.moduledoc = Some(doc_value(value)),
            "doc" => self.pending_doc = Some(doc_value(value)),
            "impl" => self.pending_impl = self.impl_marker(value),
            "behaviour" | "behavior" => {
                if let Some(path) = self.resolve(value) {
                    self.analysis.behaviours.push(path);
                }
            }
            "optional_callbacks" => self
                .optional_callbacks
                .extend(typespec::optional_callbacks(value)),
            "enforce_keys" => self.enforce_keys.extend(
                value
                    .as_list()
                    .unwrap_or_default()
                    .iter()
                    .filter_map(SyntaxNode::as_atom)
                    .map(str::to_string),
            ),
            "derive" => {
                let derived: Vec<ModulePath> = match value.as_list() {
                    Some(items) => items.iter().filter_map(|i| self.derived(i)).collect(),
                    None => self.derived(value).into_iter().collect(),
                };
                self.derives.extend(derived);
            }
            "fallback_to_any" => {
                if let Some(protocol) = self.analysis.protocol.as_mut() {
                    protocol.fallback_to_any = is_true(value);
                }
            }
            _ => {}
        }

        let count = self.attribute_counts.entry(name.to_string()).or_insert(0);
        let index = *count;
        *count += 1;
        self.analysis.attributes.push(AttributeRecord {
            name: name.to_string(),
            value: Some(to_source(value)),
            index,
            location,
        });
    }

    /// `@derive Inspect` or `@derive {Inspect, only: [...]}`
    fn derived(&self, node: &SyntaxNode) -> Option<ModulePath> {
        match node.tuple_items() {
            Some([protocol, ..]) => self.resolve(protocol),
            _ => self.resolve(node),
        }
    }

    fn impl_marker(&self, value: &SyntaxNode) -> Option<ImplMarker> {
        if is_true(value) {
            return Some(ImplMarker::Any);
        }
        match value {
            SyntaxNode::Boolean(false) => None,
            SyntaxNode::Atom(a) if a == "false" => None,
            other => self.resolve(other).map(ImplMarker::Behaviour),
        }
    }

    fn definition(&mut self, kind: DefKind, node: &'a SyntaxNode, form: &'a Form) {
        let parsed = match definition::parse(kind, node, form) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Skipping {} in {}: {}", kind.as_str(), self.analysis.name, e);
                self.pending_doc = None;
                self.pending_impl = None;
                return;
            }
        };
        let doc = self.pending_doc.take();
        let impl_marker = self.pending_impl.take();
        let ParsedDef {
            kind,
            key,
            min_arity,
            clause,
            body,
            delegate,
        } = parsed;

        if kind == DefKind::Def && body.is_none() {
            if let Some(protocol) = self.analysis.protocol.as_mut() {
                if !protocol.functions.iter().any(|f| f.key == key) {
                    protocol.functions.push(ProtocolFunctionRecord {
                        key,
                        doc,
                        location: clause.location,
                    });
                }
                return;
            }
        }

        let delegate = delegate.and_then(|(target, alias)| {
            Some(DelegateTarget {
                module: self.resolve(target)?,
                function: alias.unwrap_or_else(|| key.name.clone()),
            })
        });

        let record = self
            .functions
            .entry(key.clone())
            .or_insert_with(|| FunctionRecord {
                key: key.clone(),
                kind,
                min_arity,
                doc: None,
                impl_marker: None,
                delegate: None,
                clauses: Vec::new(),
                location: None,
            });
        if record.doc.is_none() {
            record.doc = doc;
        }
        if record.impl_marker.is_none() {
            record.impl_marker = impl_marker;
        }
        if delegate.is_some() {
            record.delegate = delegate;
        }
        record.min_arity = record.min_arity.min(min_arity);
        record.location = span(record.location, clause.location);
        let clause_index = record.clauses.len();
        record.clauses.push(clause);
        if let Some(body) = body {
            self.bodies.push((key, clause_index, body));
        }
    }

    fn finish(mut self, options: &ExtractOptions) -> Result<Vec<ModuleAnalysis>, ExtractError> {
        self.analysis.functions = std::mem::take(&mut self.functions).into_values().collect();

        for callback in &mut self.analysis.callbacks {
            callback.optional = self.optional_callbacks.contains(&callback.key);
        }

        if let Some((node, form, exception)) = self.struct_decl {
            self.analysis.struct_def = Some(self.struct_record(node, form, exception));
        }

        let facts = self.scan_bodies(options);
        self.analysis.calls = facts.calls;
        self.analysis.control_flow = facts.control_flow;
        self.analysis.closures = facts.closures;
        self.analysis.quotes = facts.quotes;
        self.analysis.otp.ets_tables = facts.ets_tables;
        self.analysis.otp.supervisor = facts.supervisor;
        self.analysis.otp.patterns = otp::detect_patterns(&self.analysis);

        let mut nested = Vec::new();
        {
            let enclosing = Enclosing {
                name: &self.analysis.name,
                resolver: self.resolver,
            };
            for node in &self.nested {
                match analyze(node, Some(&enclosing), options) {
                    Ok(modules) => nested.extend(modules),
                    Err(e) => tracing::warn!(
                        "Skipping nested module in {} at line {:?}: {}",
                        self.analysis.name,
                        node.line(),
                        e
                    ),
                }
            }
        }
        self.analysis.nested = nested
            .iter()
            .filter(|m| m.parent.as_ref() == Some(&self.analysis.name))
            .map(|m| m.name.clone())
            .collect();

        let mut out = Vec::with_capacity(nested.len() + 1);
        out.push(self.analysis);
        out.extend(nested);
        Ok(out)
    }

    fn scan_bodies(&self, options: &ExtractOptions) -> BodyFacts {
        let mut defined = HashSet::new();
        for function in &self.analysis.functions {
            for arity in function.min_arity..=function.key.arity {
                defined.insert(FunctionKey::new(function.key.name.clone(), arity));
            }
        }
        let scope = ModuleScope {
            module: &self.analysis.name,
            defined: &defined,
            max_nesting_depth: options.max_nesting_depth,
        };

        let mut facts = BodyFacts::default();
        for (owner, clause_index, clause_body) in &self.bodies {
            body::scan(&scope, self.resolver.clone(), owner, *clause_index, clause_body, &mut facts);
        }
        facts
    }

    fn struct_record(&self, node: &SyntaxNode, form: &Form, exception: bool) -> StructRecord {
        let fields: Vec<FieldRecord> = form
            .arg(0)
            .and_then(SyntaxNode::as_list)
            .unwrap_or_default()
            .iter()
            .filter_map(|item| {
                let (name, default) = match item {
                    SyntaxNode::Atom(name) => (name.clone(), None),
                    other => match other.tuple_items() {
                        Some([SyntaxNode::Atom(name), value]) => {
                            (name.clone(), Some(to_source(value)))
                        }
                        _ => return None,
                    },
                };
                Some(FieldRecord {
                    enforced: self.enforce_keys.contains(&name),
                    name,
                    default,
                })
            })
            .collect();
        let default_message = exception
            .then(|| {
                form.arg(0)
                    .and_then(|f| f.keyword_get("message"))
                    .and_then(SyntaxNode::as_str)
                    .map(str::to_string)
            })
            .flatten();
        StructRecord {
            fields,
            derives: self.derives.clone(),
            exception,
            custom_message: exception && self.analysis.defines("message", 1),
            default_message,
            location: SourceLocation::of(node),
        }
    }
}

fn is_true(value: &SyntaxNode) -> bool {
    matches!(value, SyntaxNode::Boolean(true)) || value.as_atom() == Some("true")
}

/// `@doc "text"`, `@doc false`, `@doc ~S"""..."""`
fn doc_value(value: &SyntaxNode) -> Doc {
    match value {
        SyntaxNode::String(text) => Doc::Text(text.clone()),
        SyntaxNode::Boolean(false) => Doc::Hidden,
        SyntaxNode::Atom(a) if a == "false" => Doc::Hidden,
        other => match sigil_text(other) {
            Some(text) => Doc::Text(text),
            None => Doc::Text(to_source(other)),
        },
    }
}

fn sigil_text(node: &SyntaxNode) -> Option<String> {
    let form = node.as_form()?;
    if !matches!(form.name(), Some("sigil_S" | "sigil_s")) {
        return None;
    }
    let binary = form.arg(0)?.as_form()?;
    if binary.name() != Some("<<>>") {
        return None;
    }
    Some(binary.args().iter().filter_map(SyntaxNode::as_str).collect())
}

fn span(a: Option<SourceLocation>, b: Option<SourceLocation>) -> Option<SourceLocation> {
    match (a, b) {
        (Some(a), Some(b)) => Some(SourceLocation::new(
            a.start_line.min(b.start_line),
            a.end_line.max(b.end_line),
        )),
        (a, b) => a.or(b),
    }
}
