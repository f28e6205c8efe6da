//! Closure Analyzer - Free variables of anonymous functions
//!
//! A variable is free in an `fn` when a clause body references it but the
//! clause binds it nowhere: not in its parameters, not in a pattern inside
//! the body (`=`, `<-`, inner `case`/`receive`/`fn` heads), and not as a pin
//! in its head. Each clause starts from an empty environment, so a binding
//! in one clause never hides a reference in another; the result is the union
//! over clauses in first-occurrence order.

use crate::ast::{classify, BlockKind, CallShape, Form, Shape, ShapeError, SyntaxNode};
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::HashSet;

/// A variable captured from the enclosing scope
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FreeVariable {
    pub name: String,
    /// Line of the first reference, when the tree carries positions
    pub first_line: Option<u32>,
    /// Number of references across all clauses
    pub occurrences: usize,
}

/// Result of analysing one anonymous function
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClosureAnalysis {
    pub free_variables: Vec<FreeVariable>,
    pub has_captures: bool,
}

impl ClosureAnalysis {
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.free_variables.iter().map(|v| v.name.as_str())
    }

    pub fn captures(&self, name: &str) -> bool {
        self.free_variables.iter().any(|v| v.name == name)
    }
}

/// One `params -> body` clause of an `fn`
#[derive(Debug, Clone, Copy)]
pub struct FnClause<'a> {
    pub params: &'a [SyntaxNode],
    pub guard: Option<&'a SyntaxNode>,
    pub body: &'a SyntaxNode,
}

impl FnClause<'_> {
    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

/// Clauses of an `fn` node
pub fn fn_clauses(node: &SyntaxNode) -> Result<Vec<FnClause<'_>>, ShapeError> {
    let form = match classify(node) {
        Shape::AnonymousFn(form) => form,
        _ => return Err(ShapeError::new("anonymous function", node)),
    };
    if form.args().is_empty() {
        return Err(ShapeError::new("anonymous function clause", node));
    }
    form.args()
        .iter()
        .map(|clause| arrow_parts(clause).ok_or_else(|| ShapeError::new("`->` clause", clause)))
        .collect()
}

/// Split a `->` form into head items, guard and body
fn arrow_parts(node: &SyntaxNode) -> Option<FnClause<'_>> {
    node.as_form()
        .filter(|f| f.name() == Some("->"))
        .and_then(arrow_parts_of_form)
}

/// `[a, b]` or `[when(a, b, guard)]`
fn split_when(head: &[SyntaxNode]) -> (&[SyntaxNode], Option<&SyntaxNode>) {
    match head {
        [single] if single.is_form("when") => {
            let args = single.as_form().map(Form::args).unwrap_or_default();
            match args.split_last() {
                Some((guard, params)) => (params, Some(guard)),
                None => (args, None),
            }
        }
        _ => (head, None),
    }
}

/// Analyse an `fn` node
pub fn analyze(node: &SyntaxNode) -> Result<ClosureAnalysis, ShapeError> {
    Ok(analyze_clauses(&fn_clauses(node)?))
}

/// Analyse already-split clauses
pub fn analyze_clauses(clauses: &[FnClause<'_>]) -> ClosureAnalysis {
    let mut collector = Collector::default();
    for clause in clauses {
        collector.clause(clause, &Env::new());
    }
    let free_variables: Vec<FreeVariable> = collector.free.into_values().collect();
    ClosureAnalysis {
        has_captures: !free_variables.is_empty(),
        free_variables,
    }
}

/// Underscore names and `__MODULE__`-style pseudo variables never capture
fn is_ignored(name: &str) -> bool {
    name.starts_with('_')
}

type Env = HashSet<String>;

#[derive(Default)]
struct Collector {
    free: IndexMap<String, FreeVariable>,
}

impl Collector {
    fn reference(&mut self, name: &str, line: Option<u32>) {
        self.free
            .entry(name.to_string())
            .and_modify(|v| v.occurrences += 1)
            .or_insert_with(|| FreeVariable {
                name: name.to_string(),
                first_line: line,
                occurrences: 1,
            });
    }

    fn clause(&mut self, clause: &FnClause<'_>, outer: &Env) {
        let mut env = outer.clone();
        for param in clause.params {
            self.pattern(param, &mut env, true);
        }
        if let Some(guard) = clause.guard {
            self.expr(guard, &mut env.clone());
        }
        self.expr(clause.body, &mut env);
    }

    /// Walk an expression, recording unbound references and adding bindings
    /// made by matches to `env`
    fn expr(&mut self, node: &SyntaxNode, env: &mut Env) {
        match classify(node) {
            Shape::Variable(name) => {
                if !is_ignored(name) && !env.contains(name) {
                    self.reference(name, node.line());
                }
            }
            Shape::Pin(inner) => self.expr(inner, env),
            Shape::Match { pattern, value } => {
                self.expr(value, env);
                self.pattern(pattern, env, false);
            }
            Shape::AnonymousFn(_) => match fn_clauses(node) {
                Ok(clauses) => {
                    for clause in &clauses {
                        self.clause(clause, env);
                    }
                }
                Err(_) => self.children(node, env),
            },
            Shape::BlockConstruct(kind, form) => self.block(kind, form, env),
            Shape::Quote(form) => {
                for arg in form.args() {
                    self.quoted(arg, env);
                }
            }
            Shape::Unquote { expr, .. } => {
                if let Some(expr) = expr {
                    self.expr(expr, env);
                }
            }
            Shape::Operator("&", form) if is_function_capture(form) => {}
            Shape::Operator("::", form) => {
                if let Some(value) = form.arg(0) {
                    self.expr(value, env);
                }
            }
            Shape::Operator("->", form) => self.arrow(form, env, true),
            Shape::Operator("<-", form) => self.generator(form, env),
            Shape::Operator("__aliases__", _)
            | Shape::Attribute { .. }
            | Shape::Directive(..)
            | Shape::Literal(_) => {}
            Shape::Call(call) => {
                if let CallShape::Dynamic { target, .. } = call {
                    self.expr(target, env);
                }
                for arg in call.args() {
                    self.expr(arg, env);
                }
            }
            Shape::Block(statements) | Shape::Collection(statements) => {
                for statement in statements {
                    self.expr(statement, env);
                }
            }
            _ => self.children(node, env),
        }
    }

    fn children(&mut self, node: &SyntaxNode, env: &mut Env) {
        for child in node.children() {
            self.expr(child, env);
        }
    }

    /// Bind the variables of a pattern. In a clause head (`head == true`) a
    /// pinned name counts as bound; elsewhere a pin is a reference.
    fn pattern(&mut self, node: &SyntaxNode, env: &mut Env, head: bool) {
        match classify(node) {
            Shape::Variable(name) => {
                if !is_ignored(name) {
                    env.insert(name.to_string());
                }
            }
            Shape::Pin(inner) => match inner.as_variable() {
                Some(name) if head => {
                    env.insert(name.to_string());
                }
                _ => self.expr(inner, env),
            },
            Shape::Match { pattern, value } => {
                self.pattern(pattern, env, head);
                self.pattern(value, env, head);
            }
            Shape::Operator("::", form) => {
                if let Some(value) = form.arg(0) {
                    self.pattern(value, env, head);
                }
            }
            Shape::Operator("when", form) => {
                if let Some((guard, patterns)) = form.args().split_last() {
                    for p in patterns {
                        self.pattern(p, env, head);
                    }
                    self.expr(guard, &mut env.clone());
                }
            }
            Shape::Operator("__aliases__", _)
            | Shape::Attribute { .. }
            | Shape::Unquote { .. }
            | Shape::Literal(_) => {}
            _ => {
                for child in node.children() {
                    self.pattern(child, env, head);
                }
            }
        }
    }

    /// `head -> body` with a fresh environment derived from `env`
    fn arrow(&mut self, form: &Form, env: &Env, patterns: bool) {
        let Some(clause) = arrow_parts_of_form(form) else {
            return;
        };
        let mut inner = env.clone();
        for item in clause.params {
            if patterns {
                self.pattern(item, &mut inner, false);
            } else {
                self.expr(item, &mut inner);
            }
        }
        if let Some(guard) = clause.guard {
            self.expr(guard, &mut inner.clone());
        }
        self.expr(clause.body, &mut inner);
    }

    /// Clause list (`do: [a -> x, b -> y]`) or a plain body
    fn clauses_or_body(&mut self, node: &SyntaxNode, env: &Env, patterns: bool) {
        match node.as_list() {
            Some(items) if !items.is_empty() && items.iter().all(|i| i.is_form("->")) => {
                for item in items {
                    if let Some(form) = item.as_form() {
                        self.arrow(form, env, patterns);
                    }
                }
            }
            _ => self.expr(node, &mut env.clone()),
        }
    }

    /// `pattern <- value` inside `with`/`for`: bindings go into `env`
    fn generator(&mut self, form: &Form, env: &mut Env) {
        if let [pattern, value] = form.args() {
            self.expr(value, env);
            self.pattern(pattern, env, false);
        }
    }

    fn block(&mut self, kind: BlockKind, form: &Form, env: &mut Env) {
        let (leading, options) = split_options(form.args());
        match kind {
            BlockKind::With | BlockKind::For => {
                let mut inner = env.clone();
                for item in leading {
                    match classify(item) {
                        Shape::Operator("<-", generator) => self.generator(generator, &mut inner),
                        _ => self.expr(item, &mut inner),
                    }
                }
                for (key, value) in options {
                    match key {
                        "do" => self.clauses_or_body(value, &inner, true),
                        "else" => self.clauses_or_body(value, env, true),
                        _ => self.expr(value, &mut env.clone()),
                    }
                }
            }
            BlockKind::Case | BlockKind::Receive | BlockKind::Try | BlockKind::If
            | BlockKind::Unless | BlockKind::Cond => {
                for item in leading {
                    self.expr(item, env);
                }
                for (key, value) in options {
                    let patterns = !matches!(
                        (kind, key),
                        (BlockKind::Cond, "do") | (BlockKind::Receive, "after")
                    );
                    self.clauses_or_body(value, env, patterns);
                }
            }
        }
    }

    /// Inside `quote`, only unquoted expressions are evaluated
    fn quoted(&mut self, node: &SyntaxNode, env: &mut Env) {
        match classify(node) {
            Shape::Unquote {
                expr: Some(expr), ..
            } => self.expr(expr, env),
            _ => {
                for child in node.children() {
                    self.quoted(child, env);
                }
            }
        }
    }
}

fn arrow_parts_of_form(form: &Form) -> Option<FnClause<'_>> {
    match form.args() {
        [SyntaxNode::List(head), body] => {
            let (params, guard) = split_when(head);
            Some(FnClause {
                params,
                guard,
                body,
            })
        }
        _ => None,
    }
}

/// Separate the trailing `do:`/`else:` keyword list from leading arguments
fn split_options(args: &[SyntaxNode]) -> (&[SyntaxNode], Vec<(&str, &SyntaxNode)>) {
    match args.split_last() {
        Some((last, leading)) => match last.as_keyword() {
            Some(pairs) if pairs.iter().any(|(k, _)| *k == "do") => (leading, pairs),
            _ => (args, Vec::new()),
        },
        None => (args, Vec::new()),
    }
}

/// `&name/arity` or `&Mod.name/arity`
fn is_function_capture(form: &Form) -> bool {
    match form.args() {
        [target] => target
            .as_form()
            .filter(|f| f.name() == Some("/"))
            .is_some_and(|slash| {
                matches!(slash.args(), [fun, SyntaxNode::Integer(_)]
                    if fun.as_variable().is_some() || matches!(classify(fun), Shape::Call(CallShape::Remote { .. })))
            }),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Meta, SyntaxNode as N};
    use pretty_assertions::assert_eq;

    fn clause(params: Vec<N>, body: N) -> N {
        N::call("->", vec![N::list(params), body])
    }

    fn fun(clauses: Vec<N>) -> N {
        N::call("fn", clauses)
    }

    fn op(name: &str, a: N, b: N) -> N {
        N::call(name, vec![a, b])
    }

    fn free(node: &N) -> Vec<String> {
        analyze(node).unwrap().names().map(String::from).collect()
    }

    #[test]
    fn test_no_captures() {
        let f = fun(vec![clause(vec![N::var("x")], op("+", N::var("x"), N::int(1)))]);
        let analysis = analyze(&f).unwrap();
        assert!(!analysis.has_captures);
        assert!(analysis.free_variables.is_empty());
    }

    #[test]
    fn test_repeated_reference_counted_once() {
        let body = op(
            "+",
            op("+", N::var("x"), N::var("y").at(Meta::at(4))),
            N::var("y"),
        );
        let f = fun(vec![clause(vec![N::var("x")], body)]);
        let analysis = analyze(&f).unwrap();
        assert!(analysis.has_captures);
        assert_eq!(
            analysis.free_variables,
            vec![FreeVariable {
                name: "y".into(),
                first_line: Some(4),
                occurrences: 2
            }]
        );
    }

    #[test]
    fn test_bindings_do_not_leak_between_clauses() {
        let f = fun(vec![
            clause(
                vec![N::tuple(vec![N::atom("ok"), N::var("v")])],
                N::var("v"),
            ),
            clause(vec![N::atom("error")], N::var("v")),
        ]);
        assert_eq!(free(&f), vec!["v"]);
    }

    #[test]
    fn test_pinned_head_counts_as_bound() {
        let f = fun(vec![clause(
            vec![N::call("^", vec![N::var("expected")])],
            N::var("expected"),
        )]);
        assert!(free(&f).is_empty());
    }

    #[test]
    fn test_body_match_binds() {
        let body = N::block(vec![
            op("=", N::var("y"), op("*", N::var("x"), N::int(2))),
            op("+", N::var("y"), N::var("z")),
        ]);
        let f = fun(vec![clause(vec![N::var("x")], body)]);
        assert_eq!(free(&f), vec!["z"]);
    }

    #[test]
    fn test_nested_fn_free_variables_propagate() {
        let inner = fun(vec![clause(
            vec![N::var("y")],
            op("+", op("+", N::var("x"), N::var("y")), N::var("w")),
        )]);
        let outer = fun(vec![clause(vec![N::var("x")], inner)]);
        assert_eq!(free(&outer), vec!["w"]);
    }

    #[test]
    fn test_case_clause_bindings() {
        let case = N::call(
            "case",
            vec![
                N::var("x"),
                N::do_keyword(N::list(vec![
                    clause(
                        vec![N::tuple(vec![N::atom("ok"), N::var("v")])],
                        N::var("v"),
                    ),
                    clause(vec![N::var("_")], N::var("default")),
                ])),
            ],
        );
        let f = fun(vec![clause(vec![N::var("x")], case)]);
        assert_eq!(free(&f), vec!["default"]);
    }

    #[test]
    fn test_with_generator_binds_for_do() {
        let with = N::call(
            "with",
            vec![
                op(
                    "<-",
                    N::tuple(vec![N::atom("ok"), N::var("a")]),
                    N::call("fetch", vec![N::var("src")]),
                ),
                N::do_keyword(N::var("a")),
            ],
        );
        let f = fun(vec![clause(vec![], with)]);
        assert_eq!(free(&f), vec!["src"]);
    }

    #[test]
    fn test_ignored_names_and_captures() {
        let body = N::block(vec![
            N::var("_unused"),
            N::var("__MODULE__"),
            N::call("&", vec![op("/", N::var("helper"), N::int(1))]),
            N::call("@", vec![N::var("timeout")]),
        ]);
        let f = fun(vec![clause(vec![], body)]);
        assert!(free(&f).is_empty());
    }

    #[test]
    fn test_guard_references() {
        let head = N::call(
            "when",
            vec![N::var("x"), op(">", N::var("x"), N::var("limit"))],
        );
        let f = fun(vec![clause(vec![head], N::var("x"))]);
        let clauses = fn_clauses(&f).unwrap();
        assert_eq!(clauses[0].arity(), 1);
        assert_eq!(free(&f), vec!["limit"]);
    }

    #[test]
    fn test_malformed() {
        assert!(analyze(&N::call("foo", vec![])).is_err());
        assert!(analyze(&fun(vec![N::int(1)])).is_err());
        assert!(analyze(&fun(vec![])).is_err());
    }
}
