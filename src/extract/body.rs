//! Function body scanning
//!
//! One pass over a clause body collects call sites, control-flow constructs,
//! anonymous functions, quotes and the OTP evidence that only shows up in
//! calls (`:ets.new`, `Supervisor.init`). Quoted code is not scanned for
//! calls; it is code being generated, not executed.

use super::records::{
    CallKind, CallRecord, ChildSpecRecord, ClosureRecord, ControlFlowRecord, EtsTableRecord,
    ExpressionRecord, FunctionKey, HygieneKind, HygieneRecord, QuoteRecord, SupervisorRecord,
    UnquoteRecord,
};
use crate::ast::render::to_source;
use crate::ast::{classify, BlockKind, CallShape, Form, Shape, SourceLocation, SyntaxNode};
use crate::closure;
use crate::scope::directive::{self, DirectiveOptions};
use crate::scope::{AliasResolver, ModulePath, Scope};
use std::collections::{HashMap, HashSet};

/// Everything collected from the bodies of one module
#[derive(Debug, Default)]
pub(crate) struct BodyFacts {
    pub calls: Vec<CallRecord>,
    pub control_flow: Vec<ControlFlowRecord>,
    pub closures: Vec<ClosureRecord>,
    pub quotes: Vec<QuoteRecord>,
    pub ets_tables: Vec<EtsTableRecord>,
    pub supervisor: Option<SupervisorRecord>,
}

/// Read-only module facts a scan needs
pub(crate) struct ModuleScope<'a> {
    pub module: &'a ModulePath,
    /// Every `name/arity` the module can answer, default arities included
    pub defined: &'a HashSet<FunctionKey>,
    pub max_nesting_depth: usize,
}

/// Scan one clause body. `resolver` is the module-level view; directives in
/// the body are declared into it as the walk reaches them.
pub(crate) fn scan(
    scope: &ModuleScope<'_>,
    mut resolver: AliasResolver,
    owner: &FunctionKey,
    clause_index: usize,
    body: &SyntaxNode,
    facts: &mut BodyFacts,
) {
    resolver.enter(Scope::Function);
    let mut scan = BodyScan {
        scope,
        resolver,
        owner,
        clause_index,
        bindings: HashMap::new(),
        facts,
    };
    scan.expr(body, 0);
}

struct BodyScan<'a, 's> {
    scope: &'s ModuleScope<'s>,
    resolver: AliasResolver,
    owner: &'s FunctionKey,
    clause_index: usize,
    /// `children = [...]` bindings seen so far in the clause
    bindings: HashMap<&'a str, &'a SyntaxNode>,
    facts: &'s mut BodyFacts,
}

impl<'a> BodyScan<'a, '_> {
    fn expr(&mut self, node: &'a SyntaxNode, depth: usize) {
        match classify(node) {
            Shape::Call(call) => self.call(node, call, 0, depth),
            Shape::BlockConstruct(kind, form) => {
                let record = self.control_flow(kind, node, form, depth + 1);
                self.facts.control_flow.push(record);
                self.resolver.enter(Scope::Block);
                for arg in form.args() {
                    self.expr(arg, depth + 1);
                }
                self.resolver.leave();
            }
            Shape::Directive(..) => self.directive(node),
            Shape::AnonymousFn(form) => {
                self.closure(node);
                for arg in form.args() {
                    self.expr(arg, depth);
                }
            }
            Shape::Quote(form) => {
                let record = self.quote(node, form);
                self.facts.quotes.push(record);
            }
            Shape::Operator("|>", form) => match form.args() {
                [lhs, rhs] => {
                    self.expr(lhs, depth);
                    match classify(rhs) {
                        Shape::Call(call) => self.call(rhs, call, 1, depth),
                        _ => self.expr(rhs, depth),
                    }
                }
                args => {
                    for arg in args {
                        self.expr(arg, depth);
                    }
                }
            },
            // `&name/arity` references a function without calling it
            Shape::Operator("&", form) if is_function_reference(form) => {}
            Shape::Match { pattern, value } => {
                if let (Some(name), Some(_)) = (pattern.as_variable(), value.as_list()) {
                    self.bindings.insert(name, value);
                }
                self.expr(value, depth);
            }
            Shape::Literal(_)
            | Shape::Variable(_)
            | Shape::Attribute { .. }
            | Shape::FunctionDef(..)
            | Shape::ModuleDef(_)
            | Shape::ProtocolDecl(_)
            | Shape::ImplDecl(_)
            | Shape::StructDecl(_)
            | Shape::ExceptionDecl(_) => {}
            _ => {
                for child in node.children() {
                    self.expr(child, depth);
                }
            }
        }
    }

    fn call(&mut self, node: &'a SyntaxNode, call: CallShape<'a>, piped: usize, depth: usize) {
        let location = SourceLocation::of(node);
        let arity = call.args().len() + piped;
        let (kind, module, name, receiver) = match call {
            CallShape::Local { name, .. } => {
                let key = FunctionKey::new(name, arity);
                let module = if self.scope.defined.contains(&key) {
                    Some(self.scope.module.clone())
                } else {
                    self.resolver.import_for(name, arity).cloned()
                };
                (CallKind::Local, module, Some(name), None)
            }
            CallShape::Remote { module, name, args } => {
                let resolved = self.resolver.resolve_node(module, Some(self.scope.module));
                if let Some(path) = &resolved {
                    self.otp_call(path, name, args, location);
                }
                (CallKind::Remote, resolved, Some(name), None)
            }
            CallShape::Dynamic { target, name, .. } => {
                self.expr(target, depth);
                (CallKind::Dynamic, None, name, Some(to_source(target)))
            }
        };
        self.facts.calls.push(CallRecord {
            owner: self.owner.clone(),
            kind,
            module,
            name: name.map(str::to_string),
            arity,
            receiver,
            location,
        });
        for arg in call.args() {
            self.expr(arg, depth);
        }
    }

    /// Extraction failures were already reported by the module's tracker
    fn directive(&mut self, node: &SyntaxNode) {
        let options = DirectiveOptions {
            current_module: Some(self.scope.module),
            max_nesting_depth: self.scope.max_nesting_depth,
        };
        if let Ok(directives) = directive::extract(node, self.resolver.scope(), &options) {
            for directive in &directives {
                self.resolver.declare(directive);
            }
        }
    }

    fn control_flow(
        &self,
        kind: BlockKind,
        node: &SyntaxNode,
        form: &Form,
        nesting_depth: usize,
    ) -> ControlFlowRecord {
        let (leading, blocks) = split_blocks(form.args());
        let has = |key: &str| blocks.iter().any(|(k, _)| *k == key);
        let arrows = |key: &str| {
            blocks
                .iter()
                .find(|(k, _)| *k == key)
                .map_or(0, |(_, v)| arrow_count(v))
        };
        let branch_count = match kind {
            BlockKind::If | BlockKind::Unless => 1 + usize::from(has("else")),
            BlockKind::Case | BlockKind::Cond | BlockKind::Receive => arrows("do"),
            BlockKind::With => 1 + arrows("else"),
            BlockKind::For => 1,
            BlockKind::Try => 1 + arrows("rescue") + arrows("catch") + arrows("else"),
        };
        let condition = match kind {
            BlockKind::If
            | BlockKind::Unless
            | BlockKind::Case
            | BlockKind::With
            | BlockKind::For => leading.first().map(|n| ExpressionRecord {
                text: to_source(n),
                kind: expression_kind(n),
            }),
            BlockKind::Cond | BlockKind::Try | BlockKind::Receive => None,
        };
        ControlFlowRecord {
            owner: self.owner.clone(),
            kind,
            branch_count,
            has_else: has("else"),
            has_rescue: has("rescue"),
            has_catch: has("catch"),
            has_after: has("after"),
            nesting_depth,
            condition,
            location: SourceLocation::of(node),
        }
    }

    fn closure(&mut self, node: &SyntaxNode) {
        match closure::fn_clauses(node) {
            Ok(clauses) => {
                let record = ClosureRecord {
                    owner: self.owner.clone(),
                    clause_index: self.clause_index,
                    arity: clauses.first().map_or(0, |c| c.arity()),
                    clause_count: clauses.len(),
                    analysis: closure::analyze_clauses(&clauses),
                    location: SourceLocation::of(node),
                };
                self.facts.closures.push(record);
            }
            Err(e) => tracing::debug!("Skipping anonymous function in {}: {}", self.owner, e),
        }
    }

    fn quote(&self, node: &SyntaxNode, form: &Form) -> QuoteRecord {
        let mut record = QuoteRecord {
            owner: self.owner.clone(),
            bind_quoted: Vec::new(),
            keeps_location: false,
            context: None,
            unquotes: Vec::new(),
            hygiene: Vec::new(),
            location: SourceLocation::of(node),
        };
        for pairs in form.args().iter().filter_map(SyntaxNode::as_keyword) {
            for (key, value) in pairs {
                match key {
                    "bind_quoted" => record.bind_quoted.extend(bound_names(value)),
                    "location" => record.keeps_location = value.as_atom() == Some("keep"),
                    "context" => record.context = Some(to_source(value)),
                    "do" => scan_quoted(value, &mut record),
                    _ => {}
                }
            }
        }
        record
    }

    fn otp_call(
        &mut self,
        module: &ModulePath,
        name: &str,
        args: &'a [SyntaxNode],
        location: Option<SourceLocation>,
    ) {
        match (module.to_string().as_str(), name, args) {
            (":ets", "new", [table, options]) => {
                let record = ets_table(table, options, self.owner, location);
                self.facts.ets_tables.push(record);
            }
            ("Supervisor", "init" | "start_link", [children, rest @ ..]) => {
                let children = self.child_specs(children);
                let strategy = rest.first().and_then(strategy);
                if children.is_some() || strategy.is_some() {
                    self.add_supervision(children.unwrap_or_default(), strategy);
                }
            }
            ("DynamicSupervisor", "init", [options]) => {
                self.add_supervision(Vec::new(), strategy(options));
            }
            _ => {}
        }
    }

    fn add_supervision(&mut self, children: Vec<ChildSpecRecord>, strategy: Option<String>) {
        let supervisor = self.facts.supervisor.get_or_insert_with(Default::default);
        supervisor.children.extend(children);
        if supervisor.strategy.is_none() {
            supervisor.strategy = strategy;
        }
    }

    /// Child specs from a literal list or a variable bound to one
    fn child_specs(&self, node: &'a SyntaxNode) -> Option<Vec<ChildSpecRecord>> {
        let list = match node.as_variable() {
            Some(name) => self.bindings.get(name).copied()?,
            None => node,
        };
        let items = list.as_list()?;
        Some(
            items
                .iter()
                .map(|child| ChildSpecRecord {
                    module: self.child_module(child),
                    text: to_source(child),
                })
                .collect(),
        )
    }

    fn child_module(&self, node: &SyntaxNode) -> Option<ModulePath> {
        if let Some(items) = node.tuple_items() {
            return items.first().and_then(|first| self.child_module(first));
        }
        match classify(node) {
            Shape::Call(CallShape::Remote {
                name: "child_spec",
                args,
                ..
            })
            | Shape::Call(CallShape::Local {
                name: "worker" | "supervisor",
                args,
            }) => args.first().and_then(|first| self.child_module(first)),
            Shape::Operator("%{}", form) => form.args().iter().find_map(|pair| {
                match pair.tuple_items() {
                    Some([SyntaxNode::Atom(key), start]) if key == "start" => start
                        .tuple_items()
                        .and_then(<[SyntaxNode]>::first)
                        .and_then(|m| self.child_module(m)),
                    _ => None,
                }
            }),
            _ => self.resolver.resolve_node(node, Some(self.scope.module)),
        }
    }
}

/// Positional arguments and the trailing `do`/`else`/... keyword blocks
fn split_blocks(args: &[SyntaxNode]) -> (&[SyntaxNode], Vec<(&str, &SyntaxNode)>) {
    if let Some((last, rest)) = args.split_last() {
        if let Some(pairs) = last.as_keyword() {
            if pairs.iter().any(|(k, _)| *k == "do") {
                return (rest, pairs);
            }
        }
    }
    (args, Vec::new())
}

fn arrow_count(node: &SyntaxNode) -> usize {
    node.as_list()
        .map_or(0, |items| items.iter().filter(|i| i.is_form("->")).count())
}

/// `&name/arity` or `&Mod.name/arity`
fn is_function_reference(form: &Form) -> bool {
    match form.args() {
        [inner] => inner
            .as_form()
            .filter(|f| f.name() == Some("/"))
            .is_some_and(|f| matches!(f.args(), [_, SyntaxNode::Integer(_)])),
        _ => false,
    }
}

/// Coarse classification of a condition or subject expression
pub(crate) fn expression_kind(node: &SyntaxNode) -> &'static str {
    match classify(node) {
        Shape::Literal(_) => "literal",
        Shape::Variable(_) => "variable",
        Shape::Call(_) => "call",
        Shape::Match { .. } => "match",
        Shape::Pin(_) => "pin",
        Shape::Collection(_) => "collection",
        Shape::Attribute { .. } => "attribute",
        Shape::AnonymousFn(_) => "anonymous_function",
        Shape::Operator(op, _) => match op {
            "==" | "!=" | "===" | "!==" | "<" | ">" | "<=" | ">=" => "comparison",
            "and" | "or" | "not" | "&&" | "||" | "!" => "boolean",
            "+" | "-" | "*" | "/" => "arithmetic",
            "<-" => "generator",
            _ => "operator",
        },
        _ => "other",
    }
}

fn bound_names(node: &SyntaxNode) -> Vec<String> {
    if let Some(pairs) = node.as_keyword() {
        return pairs.into_iter().map(|(k, _)| k.to_string()).collect();
    }
    node.as_list()
        .unwrap_or_default()
        .iter()
        .filter_map(|item| item.as_variable().or_else(|| item.as_atom()))
        .map(str::to_string)
        .collect()
}

fn scan_quoted(node: &SyntaxNode, record: &mut QuoteRecord) {
    match classify(node) {
        Shape::Unquote { splicing, expr } => record.unquotes.push(UnquoteRecord {
            splicing,
            text: expr.map(to_source).unwrap_or_default(),
            location: SourceLocation::of(node),
        }),
        // inner quotes own their unquotes
        Shape::Quote(_) => {}
        Shape::Call(CallShape::Local { name, args }) if name == "var!" || name == "alias!" => {
            let kind = if name == "var!" {
                HygieneKind::Var
            } else {
                HygieneKind::Alias
            };
            record.hygiene.push(HygieneRecord {
                kind,
                name: args.first().map(to_source).unwrap_or_default(),
                location: SourceLocation::of(node),
            });
        }
        _ => {
            for child in node.children() {
                scan_quoted(child, record);
            }
        }
    }
}

fn ets_table(
    table: &SyntaxNode,
    options: &SyntaxNode,
    owner: &FunctionKey,
    location: Option<SourceLocation>,
) -> EtsTableRecord {
    let flags: Vec<&str> = options
        .as_list()
        .unwrap_or_default()
        .iter()
        .filter_map(SyntaxNode::as_atom)
        .collect();
    let pick = |choices: &[&'static str], default: &'static str| {
        flags
            .iter()
            .find_map(|f| choices.iter().find(|c| **c == *f))
            .copied()
            .unwrap_or(default)
            .to_string()
    };
    EtsTableRecord {
        name: table
            .as_atom()
            .map_or_else(|| to_source(table), str::to_string),
        table_type: pick(&["set", "ordered_set", "bag", "duplicate_bag"], "set"),
        access: pick(&["public", "protected", "private"], "protected"),
        named: flags.contains(&"named_table"),
        owner: owner.clone(),
        location,
    }
}

fn strategy(options: &SyntaxNode) -> Option<String> {
    options
        .keyword_get("strategy")
        .and_then(SyntaxNode::as_atom)
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Meta, SyntaxNode as N};
    use crate::scope::directive::{FunctionRef, ImportSelector};
    use crate::scope::{Directive, DirectiveKind, Scope};

    fn run(body: N, directives: &[Directive], defined: &[(&str, usize)]) -> BodyFacts {
        let module = ModulePath::parse("App.Worker");
        let defined: HashSet<FunctionKey> = defined
            .iter()
            .map(|(n, a)| FunctionKey::new(*n, *a))
            .collect();
        let scope = ModuleScope {
            module: &module,
            defined: &defined,
            max_nesting_depth: 10,
        };
        let mut facts = BodyFacts::default();
        let owner = FunctionKey::new("run", 1);
        scan(
            &scope,
            AliasResolver::new(directives),
            &owner,
            0,
            &body,
            &mut facts,
        );
        facts
    }

    fn alias(source: &str) -> Directive {
        let source = ModulePath::parse(source);
        Directive {
            kind: DirectiveKind::Alias {
                as_name: source.last().to_string(),
                explicit: false,
            },
            source,
            location: None,
            scope: Scope::Module,
            multi_position: None,
        }
    }

    #[test]
    fn test_local_remote_and_dynamic_calls() {
        let body = N::block(vec![
            N::call("helper", vec![N::var("x")]),
            N::remote(N::aliases(&["Repo"]), "get", vec![N::var("id")]),
            N::apply_anonymous(N::var("fun"), vec![]),
            N::call("unknown", vec![]),
        ]);
        let facts = run(body, &[alias("App.Repo")], &[("helper", 1)]);
        let view: Vec<(CallKind, Option<String>, Option<String>, usize)> = facts
            .calls
            .iter()
            .map(|c| {
                (
                    c.kind,
                    c.module.as_ref().map(ToString::to_string),
                    c.name.clone(),
                    c.arity,
                )
            })
            .collect();
        assert_eq!(
            view,
            vec![
                (CallKind::Local, Some("App.Worker".into()), Some("helper".into()), 1),
                (CallKind::Remote, Some("App.Repo".into()), Some("get".into()), 1),
                (CallKind::Dynamic, None, None, 0),
                (CallKind::Local, None, Some("unknown".into()), 0),
            ]
        );
        assert_eq!(facts.calls[2].receiver.as_deref(), Some("fun"));
    }

    fn call_modules(facts: &BodyFacts) -> Vec<Option<String>> {
        facts
            .calls
            .iter()
            .map(|c| c.module.as_ref().map(ToString::to_string))
            .collect()
    }

    fn local_alias(segments: &[&str]) -> N {
        N::form("alias", Meta::at(2), vec![N::aliases(segments)])
    }

    #[test]
    fn test_block_alias_stays_in_block() {
        // if c do alias A.B; B.g() end; B.g()
        let body = N::block(vec![
            N::call(
                "if",
                vec![
                    N::var("c"),
                    N::do_keyword(N::block(vec![
                        local_alias(&["A", "B"]),
                        N::remote(N::aliases(&["B"]), "g", vec![]),
                    ])),
                ],
            ),
            N::remote(N::aliases(&["B"]), "g", vec![]),
        ]);
        let facts = run(body, &[], &[]);
        assert_eq!(
            call_modules(&facts),
            vec![Some("A.B".to_string()), Some("B".to_string())]
        );
    }

    #[test]
    fn test_alias_applies_only_after_it() {
        // X.g(); alias A.X; X.g()
        let body = N::block(vec![
            N::remote(N::aliases(&["X"]), "g", vec![]),
            local_alias(&["A", "X"]),
            N::remote(N::aliases(&["X"]), "g", vec![]),
        ]);
        let facts = run(body, &[], &[]);
        assert_eq!(
            call_modules(&facts),
            vec![Some("X".to_string()), Some("A.X".to_string())]
        );
    }

    #[test]
    fn test_function_alias_shadows_module_alias() {
        let body = N::block(vec![
            N::remote(N::aliases(&["Repo"]), "all", vec![]),
            local_alias(&["Other", "Repo"]),
            N::remote(N::aliases(&["Repo"]), "all", vec![]),
        ]);
        let facts = run(body, &[alias("App.Repo")], &[]);
        assert_eq!(
            call_modules(&facts),
            vec![Some("App.Repo".to_string()), Some("Other.Repo".to_string())]
        );
    }

    #[test]
    fn test_imported_local_call() {
        let import = Directive {
            kind: DirectiveKind::Import {
                selector: ImportSelector::Only(vec![FunctionRef {
                    name: "map".into(),
                    arity: 2,
                }]),
            },
            source: ModulePath::parse("Enum"),
            location: None,
            scope: Scope::Module,
            multi_position: None,
        };
        let body = N::call("map", vec![N::var("xs"), N::var("f")]);
        let facts = run(body, &[import], &[]);
        assert_eq!(facts.calls[0].module.as_ref().unwrap().to_string(), "Enum");
    }

    #[test]
    fn test_pipe_adds_arity() {
        let body = N::call(
            "|>",
            vec![
                N::var("xs"),
                N::remote(N::aliases(&["Enum"]), "map", vec![N::var("f")]),
            ],
        );
        let facts = run(body, &[], &[]);
        assert_eq!(facts.calls.len(), 1);
        assert_eq!(facts.calls[0].arity, 2);
    }

    #[test]
    fn test_function_reference_is_not_a_call() {
        let body = N::call(
            "&",
            vec![N::call("/", vec![N::call("helper", vec![]), N::int(1)])],
        );
        assert!(run(body, &[], &[("helper", 1)]).calls.is_empty());
    }

    #[test]
    fn test_control_flow_nesting_and_branches() {
        let inner = N::call(
            "case",
            vec![
                N::var("y"),
                N::do_keyword(N::list(vec![
                    N::call("->", vec![N::list(vec![N::atom("a")]), N::int(1)]),
                    N::call("->", vec![N::list(vec![N::var("_")]), N::int(2)]),
                ])),
            ],
        );
        let body = N::form(
            "if",
            Meta::at(4),
            vec![
                N::call("==", vec![N::var("x"), N::int(1)]),
                N::keyword(vec![("do", inner), ("else", N::Nil)]),
            ],
        );
        let facts = run(body, &[], &[]);
        let outer = &facts.control_flow[0];
        assert_eq!(outer.kind, BlockKind::If);
        assert_eq!(outer.nesting_depth, 1);
        assert_eq!(outer.branch_count, 2);
        assert!(outer.has_else);
        let condition = outer.condition.as_ref().unwrap();
        assert_eq!((condition.text.as_str(), condition.kind), ("x == 1", "comparison"));

        let case = &facts.control_flow[1];
        assert_eq!(case.kind, BlockKind::Case);
        assert_eq!(case.nesting_depth, 2);
        assert_eq!(case.branch_count, 2);
        assert_eq!(case.condition.as_ref().unwrap().kind, "variable");
    }

    #[test]
    fn test_closure_recorded_with_captures() {
        let closure = N::call(
            "fn",
            vec![N::call(
                "->",
                vec![
                    N::list(vec![N::var("x")]),
                    N::call("+", vec![N::var("x"), N::var("offset")]),
                ],
            )],
        );
        let facts = run(closure, &[], &[]);
        assert_eq!(facts.closures.len(), 1);
        let record = &facts.closures[0];
        assert_eq!((record.arity, record.clause_count), (1, 1));
        assert!(record.analysis.captures("offset"));
    }

    #[test]
    fn test_quote_options_unquotes_and_hygiene() {
        let quoted = N::block(vec![
            N::call("=", vec![N::call("var!", vec![N::var("acc")]), N::int(0)]),
            N::call("unquote", vec![N::var("body")]),
            N::call("log", vec![]),
        ]);
        let body = N::call(
            "quote",
            vec![
                N::keyword(vec![
                    ("bind_quoted", N::keyword(vec![("value", N::var("value"))])),
                    ("location", N::atom("keep")),
                ]),
                N::do_keyword(quoted),
            ],
        );
        let facts = run(body, &[], &[]);
        assert!(facts.calls.is_empty());
        let quote = &facts.quotes[0];
        assert_eq!(quote.bind_quoted, vec!["value"]);
        assert!(quote.keeps_location);
        assert_eq!(quote.unquotes.len(), 1);
        assert_eq!(quote.unquotes[0].text, "body");
        assert_eq!(quote.hygiene[0].kind, HygieneKind::Var);
        assert_eq!(quote.hygiene[0].name, "acc");
    }

    #[test]
    fn test_ets_table_options() {
        let body = N::remote(
            N::atom("ets"),
            "new",
            vec![
                N::atom("cache"),
                N::list(vec![N::atom("named_table"), N::atom("public"), N::atom("bag")]),
            ],
        );
        let facts = run(body, &[], &[]);
        let table = &facts.ets_tables[0];
        assert_eq!(table.name, "cache");
        assert_eq!(table.table_type, "bag");
        assert_eq!(table.access, "public");
        assert!(table.named);
    }

    #[test]
    fn test_supervisor_children_through_binding() {
        let body = N::block(vec![
            N::call(
                "=",
                vec![
                    N::var("children"),
                    N::list(vec![
                        N::aliases(&["Cache"]),
                        N::tuple(vec![N::aliases(&["Registry"]), N::keyword(vec![("keys", N::atom("unique"))])]),
                    ]),
                ],
            ),
            N::remote(
                N::aliases(&["Supervisor"]),
                "init",
                vec![
                    N::var("children"),
                    N::keyword(vec![("strategy", N::atom("one_for_one"))]),
                ],
            ),
        ]);
        let facts = run(body, &[alias("App.Cache")], &[]);
        let supervisor = facts.supervisor.unwrap();
        assert_eq!(supervisor.strategy.as_deref(), Some("one_for_one"));
        let modules: Vec<String> = supervisor
            .children
            .iter()
            .filter_map(|c| c.module.as_ref().map(ToString::to_string))
            .collect();
        assert_eq!(modules, vec!["App.Cache", "Registry"]);
    }
}
