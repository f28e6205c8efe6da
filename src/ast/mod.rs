//! Syntax tree input
//!
//! The tree handed to the core by an external parser. It mirrors the quoted
//! form of Elixir code: literals, lists, tuples and three-part forms
//! `{head, meta, args}`. A form whose `args` is `None` is a variable.
//!
//! The tree is read-only for the whole pipeline; nothing here mutates a node
//! after construction.

pub mod render;
pub mod shape;

use serde::{Deserialize, Serialize};

pub use shape::{classify, BlockKind, CallShape, DefKind, DirectiveTag, Shape};

/// Position metadata attached to a form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Meta {
    /// Starting line (1-indexed)
    #[serde(default)]
    pub line: Option<u32>,
    /// Ending line (1-indexed, inclusive), when the parser tracked it
    #[serde(default)]
    pub end_line: Option<u32>,
    #[serde(default)]
    pub column: Option<u32>,
}

impl Meta {
    pub fn at(line: u32) -> Self {
        Self {
            line: Some(line),
            end_line: None,
            column: None,
        }
    }

    pub fn spanning(line: u32, end_line: u32) -> Self {
        Self {
            line: Some(line),
            end_line: Some(end_line),
            column: None,
        }
    }
}

/// A node in the quoted syntax tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum SyntaxNode {
    Atom(String),
    Integer(i64),
    Float(f64),
    String(String),
    Boolean(bool),
    Nil,
    List(Vec<SyntaxNode>),
    /// Two-element tuples appear literally in quoted code; larger tuples
    /// are usually `{}` forms, both are accepted.
    Tuple(Vec<SyntaxNode>),
    Form(Form),
}

/// A `{head, meta, args}` form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Form {
    pub head: Head,
    #[serde(default)]
    pub meta: Meta,
    #[serde(default)]
    pub args: Option<Vec<SyntaxNode>>,
}

/// Head of a form: a plain name (`def`, `foo`, `+`) or a nested node such as
/// the `.` form of a remote call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Head {
    Name(String),
    Node(Box<SyntaxNode>),
}

impl Form {
    /// Name of the head, when the head is a plain name
    pub fn name(&self) -> Option<&str> {
        match &self.head {
            Head::Name(name) => Some(name.as_str()),
            Head::Node(_) => None,
        }
    }

    /// Head node, when the head is itself a node
    pub fn head_node(&self) -> Option<&SyntaxNode> {
        match &self.head {
            Head::Node(node) => Some(node),
            Head::Name(_) => None,
        }
    }

    pub fn args(&self) -> &[SyntaxNode] {
        self.args.as_deref().unwrap_or(&[])
    }

    pub fn arg(&self, index: usize) -> Option<&SyntaxNode> {
        self.args().get(index)
    }

    /// A name-headed form without an argument list is a variable reference
    pub fn is_variable(&self) -> bool {
        self.args.is_none() && matches!(self.head, Head::Name(_))
    }

    pub fn line(&self) -> Option<u32> {
        self.meta.line
    }

    /// Value stored under `key` in the trailing keyword list, typically
    /// `do`/`else`/`rescue` blocks.
    pub fn keyword_arg(&self, key: &str) -> Option<&SyntaxNode> {
        self.args().last().and_then(|last| last.keyword_get(key))
    }

    /// Body of a `do ... end` block, if any
    pub fn do_block(&self) -> Option<&SyntaxNode> {
        self.keyword_arg("do")
    }
}

impl SyntaxNode {
    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    pub fn atom(value: impl Into<String>) -> Self {
        SyntaxNode::Atom(value.into())
    }

    pub fn string(value: impl Into<String>) -> Self {
        SyntaxNode::String(value.into())
    }

    pub fn int(value: i64) -> Self {
        SyntaxNode::Integer(value)
    }

    pub fn list(items: Vec<SyntaxNode>) -> Self {
        SyntaxNode::List(items)
    }

    pub fn tuple(items: Vec<SyntaxNode>) -> Self {
        SyntaxNode::Tuple(items)
    }

    /// A form with a named head
    pub fn form(name: impl Into<String>, meta: Meta, args: Vec<SyntaxNode>) -> Self {
        SyntaxNode::Form(Form {
            head: Head::Name(name.into()),
            meta,
            args: Some(args),
        })
    }

    /// A local call or special form without position metadata
    pub fn call(name: impl Into<String>, args: Vec<SyntaxNode>) -> Self {
        Self::form(name, Meta::default(), args)
    }

    pub fn var(name: impl Into<String>) -> Self {
        SyntaxNode::Form(Form {
            head: Head::Name(name.into()),
            meta: Meta::default(),
            args: None,
        })
    }

    /// `A.B.C` alias reference
    pub fn aliases(segments: &[&str]) -> Self {
        Self::call(
            "__aliases__",
            segments.iter().map(|s| SyntaxNode::atom(*s)).collect(),
        )
    }

    /// `Module.fun(args)` where `module` is an alias or an Erlang atom
    pub fn remote(module: SyntaxNode, function: &str, args: Vec<SyntaxNode>) -> Self {
        SyntaxNode::Form(Form {
            head: Head::Node(Box::new(Self::call(
                ".",
                vec![module, SyntaxNode::atom(function)],
            ))),
            meta: Meta::default(),
            args: Some(args),
        })
    }

    /// `fun.(args)` anonymous function application
    pub fn apply_anonymous(target: SyntaxNode, args: Vec<SyntaxNode>) -> Self {
        SyntaxNode::Form(Form {
            head: Head::Node(Box::new(Self::call(".", vec![target]))),
            meta: Meta::default(),
            args: Some(args),
        })
    }

    /// Keyword list `[key: value, ...]`
    pub fn keyword(pairs: Vec<(&str, SyntaxNode)>) -> Self {
        SyntaxNode::List(
            pairs
                .into_iter()
                .map(|(k, v)| SyntaxNode::Tuple(vec![SyntaxNode::atom(k), v]))
                .collect(),
        )
    }

    /// `[do: body]`
    pub fn do_keyword(body: SyntaxNode) -> Self {
        Self::keyword(vec![("do", body)])
    }

    /// `__block__` holding several statements; a single statement is
    /// returned unwrapped the way the compiler quotes it.
    pub fn block(mut statements: Vec<SyntaxNode>) -> Self {
        if statements.len() == 1 {
            statements.remove(0)
        } else {
            Self::call("__block__", statements)
        }
    }

    /// Return a copy with position metadata set (forms only)
    pub fn at(mut self, meta: Meta) -> Self {
        if let SyntaxNode::Form(form) = &mut self {
            form.meta = meta;
        }
        self
    }

    // ------------------------------------------------------------------
    // Inspection
    // ------------------------------------------------------------------

    pub fn as_form(&self) -> Option<&Form> {
        match self {
            SyntaxNode::Form(form) => Some(form),
            _ => None,
        }
    }

    /// Head name of a form node
    pub fn form_name(&self) -> Option<&str> {
        self.as_form().and_then(Form::name)
    }

    pub fn is_form(&self, name: &str) -> bool {
        self.form_name() == Some(name)
    }

    pub fn as_atom(&self) -> Option<&str> {
        match self {
            SyntaxNode::Atom(a) => Some(a.as_str()),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            SyntaxNode::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[SyntaxNode]> {
        match self {
            SyntaxNode::List(items) => Some(items),
            _ => None,
        }
    }

    /// Elements of a tuple, accepting both literal two-tuples and `{}` forms
    pub fn tuple_items(&self) -> Option<&[SyntaxNode]> {
        match self {
            SyntaxNode::Tuple(items) => Some(items),
            SyntaxNode::Form(form) if form.name() == Some("{}") => Some(form.args()),
            _ => None,
        }
    }

    /// Variable name if this node is a variable reference
    pub fn as_variable(&self) -> Option<&str> {
        match self {
            SyntaxNode::Form(form) if form.is_variable() => form.name(),
            _ => None,
        }
    }

    /// Segments of an `__aliases__` form
    pub fn alias_segments(&self) -> Option<Vec<String>> {
        let form = self.as_form()?;
        if form.name() != Some("__aliases__") {
            return None;
        }
        form.args()
            .iter()
            .map(|seg| match seg {
                SyntaxNode::Atom(a) => Some(a.clone()),
                other if other.as_variable() == Some("__MODULE__") => {
                    Some("__MODULE__".to_string())
                }
                other if other.is_form("__MODULE__") => Some("__MODULE__".to_string()),
                _ => None,
            })
            .collect()
    }

    /// Interpret as a keyword list (`[{:atom, value}, ...]`)
    pub fn as_keyword(&self) -> Option<Vec<(&str, &SyntaxNode)>> {
        let items = self.as_list()?;
        items
            .iter()
            .map(|item| match item.tuple_items() {
                Some([SyntaxNode::Atom(key), value]) => Some((key.as_str(), value)),
                _ => None,
            })
            .collect()
    }

    /// Look up `key` in a keyword list
    pub fn keyword_get(&self, key: &str) -> Option<&SyntaxNode> {
        self.as_keyword()?
            .into_iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v)
    }

    /// Statements of a body: the arguments of a `__block__`, or the node
    /// itself as a single statement.
    pub fn statements(&self) -> &[SyntaxNode] {
        match self {
            SyntaxNode::Form(form) if form.name() == Some("__block__") => form.args(),
            other => std::slice::from_ref(other),
        }
    }

    pub fn meta(&self) -> Option<&Meta> {
        self.as_form().map(|f| &f.meta)
    }

    pub fn line(&self) -> Option<u32> {
        self.meta().and_then(|m| m.line)
    }

    /// Direct children in source order (head node first for forms)
    pub fn children(&self) -> Vec<&SyntaxNode> {
        match self {
            SyntaxNode::List(items) | SyntaxNode::Tuple(items) => items.iter().collect(),
            SyntaxNode::Form(form) => {
                let mut out = Vec::with_capacity(form.args().len() + 1);
                if let Some(head) = form.head_node() {
                    out.push(head);
                }
                out.extend(form.args().iter());
                out
            }
            _ => Vec::new(),
        }
    }

    /// Pre-order, left-to-right traversal
    pub fn walk<'a>(&'a self, visit: &mut dyn FnMut(&'a SyntaxNode)) {
        visit(self);
        for child in self.children() {
            child.walk(visit);
        }
    }

    /// True for literal values (no forms, lists or tuples)
    pub fn is_literal(&self) -> bool {
        matches!(
            self,
            SyntaxNode::Atom(_)
                | SyntaxNode::Integer(_)
                | SyntaxNode::Float(_)
                | SyntaxNode::String(_)
                | SyntaxNode::Boolean(_)
                | SyntaxNode::Nil
        )
    }
}

/// A node did not have the shape an extractor expected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeError {
    pub expected: &'static str,
    pub line: Option<u32>,
}

impl ShapeError {
    pub fn new(expected: &'static str, node: &SyntaxNode) -> Self {
        Self {
            expected,
            line: node.line(),
        }
    }
}

impl std::fmt::Display for ShapeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.line {
            Some(line) => write!(f, "expected {} at line {}", self.expected, line),
            None => write!(f, "expected {}", self.expected),
        }
    }
}

impl std::error::Error for ShapeError {}

/// Source location of a node, lines 1-indexed and inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceLocation {
    pub start_line: u32,
    pub end_line: u32,
}

impl SourceLocation {
    pub fn new(start_line: u32, end_line: u32) -> Self {
        Self {
            start_line,
            end_line: end_line.max(start_line),
        }
    }

    /// Location of a form, when it carries a line
    pub fn of(node: &SyntaxNode) -> Option<Self> {
        let meta = node.meta()?;
        let start = meta.line?;
        Some(Self::new(start, meta.end_line.unwrap_or(start)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_lookup() {
        let kw = SyntaxNode::keyword(vec![
            ("as", SyntaxNode::aliases(&["C"])),
            ("warn", SyntaxNode::Boolean(false)),
        ]);
        assert_eq!(kw.keyword_get("warn"), Some(&SyntaxNode::Boolean(false)));
        assert!(kw.keyword_get("only").is_none());
    }

    #[test]
    fn test_alias_segments() {
        let node = SyntaxNode::aliases(&["MyApp", "Repo"]);
        assert_eq!(
            node.alias_segments(),
            Some(vec!["MyApp".to_string(), "Repo".to_string()])
        );
        assert_eq!(SyntaxNode::atom("ets").alias_segments(), None);
    }

    #[test]
    fn test_statements_unwrap_block() {
        let single = SyntaxNode::var("x");
        assert_eq!(single.statements().len(), 1);

        let block = SyntaxNode::block(vec![SyntaxNode::var("x"), SyntaxNode::var("y")]);
        assert_eq!(block.statements().len(), 2);
    }

    #[test]
    fn test_json_roundtrip() {
        let node = SyntaxNode::form(
            "def",
            Meta::spanning(3, 5),
            vec![
                SyntaxNode::call("f", vec![SyntaxNode::var("x")]),
                SyntaxNode::do_keyword(SyntaxNode::var("x")),
            ],
        );
        let json = serde_json::to_string(&node).unwrap();
        let back: SyntaxNode = serde_json::from_str(&json).unwrap();
        assert_eq!(back, node);
    }

    #[test]
    fn test_walk_preorder() {
        let node = SyntaxNode::call("f", vec![SyntaxNode::var("a"), SyntaxNode::var("b")]);
        let mut names = Vec::new();
        node.walk(&mut |n| {
            if let Some(name) = n.form_name() {
                names.push(name.to_string());
            }
        });
        assert_eq!(names, vec!["f", "a", "b"]);
    }

    #[test]
    fn test_source_location_requires_line() {
        assert!(SourceLocation::of(&SyntaxNode::var("x")).is_none());
        let node = SyntaxNode::var("x").at(Meta::at(7));
        assert_eq!(SourceLocation::of(&node), Some(SourceLocation::new(7, 7)));
    }
}
