//! Node shape classification
//!
//! Maps any [`SyntaxNode`] onto a closed set of shapes so that traversals
//! match exhaustively instead of relying on fallthrough. Forms that fit no
//! known shape land in [`Shape::Unrecognized`].

use super::{Form, SyntaxNode};

/// Function definition macro used to define a named function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DefKind {
    Def,
    Defp,
    Defmacro,
    Defmacrop,
    Defguard,
    Defguardp,
    Defdelegate,
}

impl DefKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "def" => Some(DefKind::Def),
            "defp" => Some(DefKind::Defp),
            "defmacro" => Some(DefKind::Defmacro),
            "defmacrop" => Some(DefKind::Defmacrop),
            "defguard" => Some(DefKind::Defguard),
            "defguardp" => Some(DefKind::Defguardp),
            "defdelegate" => Some(DefKind::Defdelegate),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DefKind::Def => "def",
            DefKind::Defp => "defp",
            DefKind::Defmacro => "defmacro",
            DefKind::Defmacrop => "defmacrop",
            DefKind::Defguard => "defguard",
            DefKind::Defguardp => "defguardp",
            DefKind::Defdelegate => "defdelegate",
        }
    }

    pub fn is_private(&self) -> bool {
        matches!(self, DefKind::Defp | DefKind::Defmacrop | DefKind::Defguardp)
    }

    pub fn is_macro(&self) -> bool {
        matches!(self, DefKind::Defmacro | DefKind::Defmacrop)
    }

    pub fn is_guard(&self) -> bool {
        matches!(self, DefKind::Defguard | DefKind::Defguardp)
    }
}

/// The four lexical directives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DirectiveTag {
    Alias,
    Import,
    Require,
    Use,
}

impl DirectiveTag {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "alias" => Some(DirectiveTag::Alias),
            "import" => Some(DirectiveTag::Import),
            "require" => Some(DirectiveTag::Require),
            "use" => Some(DirectiveTag::Use),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DirectiveTag::Alias => "alias",
            DirectiveTag::Import => "import",
            DirectiveTag::Require => "require",
            DirectiveTag::Use => "use",
        }
    }
}

/// Block constructs that open a nested lexical region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    If,
    Unless,
    Case,
    Cond,
    With,
    For,
    Try,
    Receive,
}

impl BlockKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "if" => Some(BlockKind::If),
            "unless" => Some(BlockKind::Unless),
            "case" => Some(BlockKind::Case),
            "cond" => Some(BlockKind::Cond),
            "with" => Some(BlockKind::With),
            "for" => Some(BlockKind::For),
            "try" => Some(BlockKind::Try),
            "receive" => Some(BlockKind::Receive),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BlockKind::If => "if",
            BlockKind::Unless => "unless",
            BlockKind::Case => "case",
            BlockKind::Cond => "cond",
            BlockKind::With => "with",
            BlockKind::For => "for",
            BlockKind::Try => "try",
            BlockKind::Receive => "receive",
        }
    }
}

/// The three call forms
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CallShape<'a> {
    /// `name(args)`
    Local {
        name: &'a str,
        args: &'a [SyntaxNode],
    },
    /// `Module.name(args)` with a statically known module
    Remote {
        module: &'a SyntaxNode,
        name: &'a str,
        args: &'a [SyntaxNode],
    },
    /// `fun.(args)` or `expr.name(args)` where the target is only known at
    /// runtime
    Dynamic {
        target: &'a SyntaxNode,
        name: Option<&'a str>,
        args: &'a [SyntaxNode],
    },
}

impl<'a> CallShape<'a> {
    pub fn args(&self) -> &'a [SyntaxNode] {
        match self {
            CallShape::Local { args, .. }
            | CallShape::Remote { args, .. }
            | CallShape::Dynamic { args, .. } => args,
        }
    }
}

/// Shape of a node as seen by the extractors
#[derive(Debug, Clone, Copy)]
pub enum Shape<'a> {
    ModuleDef(&'a Form),
    FunctionDef(DefKind, &'a Form),
    AnonymousFn(&'a Form),
    Directive(DirectiveTag, &'a Form),
    BlockConstruct(BlockKind, &'a Form),
    Call(CallShape<'a>),
    Literal(&'a SyntaxNode),
    Variable(&'a str),
    Pin(&'a SyntaxNode),
    /// `@name value` (value absent for reads such as `@name`)
    Attribute {
        name: &'a str,
        value: Option<&'a SyntaxNode>,
        form: &'a Form,
    },
    Quote(&'a Form),
    Unquote {
        splicing: bool,
        expr: Option<&'a SyntaxNode>,
    },
    StructDecl(&'a Form),
    ExceptionDecl(&'a Form),
    ProtocolDecl(&'a Form),
    ImplDecl(&'a Form),
    Block(&'a [SyntaxNode]),
    Match {
        pattern: &'a SyntaxNode,
        value: &'a SyntaxNode,
    },
    /// Operators, data constructors and other special forms whose operands
    /// are ordinary subexpressions
    Operator(&'a str, &'a Form),
    /// Lists and tuples
    Collection(&'a [SyntaxNode]),
    Unrecognized(&'a SyntaxNode),
}

/// Special forms and operators that are never treated as function calls
const SPECIAL_FORMS: &[&str] = &[
    "__aliases__", "__block__", "->", "when", "&", "%{}", "%", "{}", "<<>>", "::", "|",
    "\\\\", "<-", ".", "super", "__MODULE__", "__ENV__", "__CALLER__", "__DIR__",
    "__STACKTRACE__", "+", "-", "*", "/", "++", "--", "<>", "==", "!=", "===", "!==", "<",
    ">", "<=", ">=", "&&", "||", "!", "and", "or", "not", "in", "|>", "..", "..//", "=~",
    "**", "<<<", ">>>", "|||", "&&&", "^^^", "~~~", "<~", "~>", "<~>", "@",
];

/// True if `name` is a special form or operator rather than a call
pub fn is_special_form(name: &str) -> bool {
    SPECIAL_FORMS.contains(&name)
        || DefKind::from_name(name).is_some()
        || DirectiveTag::from_name(name).is_some()
        || BlockKind::from_name(name).is_some()
        || matches!(
            name,
            "defmodule"
                | "fn"
                | "quote"
                | "unquote"
                | "unquote_splicing"
                | "defstruct"
                | "defexception"
                | "defprotocol"
                | "defimpl"
                | "="
                | "^"
        )
}

/// Classify a node
pub fn classify(node: &SyntaxNode) -> Shape<'_> {
    let form = match node {
        SyntaxNode::List(items) | SyntaxNode::Tuple(items) => return Shape::Collection(items),
        SyntaxNode::Form(form) => form,
        literal => return Shape::Literal(literal),
    };

    if let Some(head) = form.head_node() {
        return classify_dot_call(node, form, head);
    }

    let name = match form.name() {
        Some(name) => name,
        None => return Shape::Unrecognized(node),
    };

    if form.is_variable() {
        return Shape::Variable(name);
    }

    if let Some(kind) = DefKind::from_name(name) {
        return Shape::FunctionDef(kind, form);
    }
    if let Some(tag) = DirectiveTag::from_name(name) {
        return Shape::Directive(tag, form);
    }
    if let Some(kind) = BlockKind::from_name(name) {
        return Shape::BlockConstruct(kind, form);
    }

    match name {
        "defmodule" => Shape::ModuleDef(form),
        "fn" => Shape::AnonymousFn(form),
        "quote" => Shape::Quote(form),
        "unquote" => Shape::Unquote {
            splicing: false,
            expr: form.arg(0),
        },
        "unquote_splicing" => Shape::Unquote {
            splicing: true,
            expr: form.arg(0),
        },
        "defstruct" => Shape::StructDecl(form),
        "defexception" => Shape::ExceptionDecl(form),
        "defprotocol" => Shape::ProtocolDecl(form),
        "defimpl" => Shape::ImplDecl(form),
        "__block__" => Shape::Block(form.args()),
        "^" => match form.arg(0) {
            Some(inner) => Shape::Pin(inner),
            None => Shape::Unrecognized(node),
        },
        "=" => match form.args() {
            [pattern, value] => Shape::Match { pattern, value },
            _ => Shape::Unrecognized(node),
        },
        "@" => classify_attribute(node, form),
        other if is_special_form(other) => Shape::Operator(other, form),
        other => Shape::Call(CallShape::Local {
            name: other,
            args: form.args(),
        }),
    }
}

fn classify_attribute<'a>(node: &'a SyntaxNode, form: &'a Form) -> Shape<'a> {
    let inner = match form.args() {
        [SyntaxNode::Form(inner)] => inner,
        _ => return Shape::Unrecognized(node),
    };
    match inner.name() {
        Some(name) => Shape::Attribute {
            name,
            value: inner.arg(0),
            form,
        },
        None => Shape::Unrecognized(node),
    }
}

fn classify_dot_call<'a>(node: &'a SyntaxNode, form: &'a Form, head: &'a SyntaxNode) -> Shape<'a> {
    let dot = match head.as_form() {
        Some(dot) if dot.name() == Some(".") => dot,
        _ => return Shape::Unrecognized(node),
    };
    let args = form.args();
    match dot.args() {
        [target] => Shape::Call(CallShape::Dynamic {
            target,
            name: None,
            args,
        }),
        [module, SyntaxNode::Atom(name)] if is_static_module(module) => {
            Shape::Call(CallShape::Remote {
                module,
                name: name.as_str(),
                args,
            })
        }
        [target, SyntaxNode::Atom(name)] => Shape::Call(CallShape::Dynamic {
            target,
            name: Some(name.as_str()),
            args,
        }),
        _ => Shape::Unrecognized(node),
    }
}

/// Alias references, Erlang module atoms and `__MODULE__` name a module
/// statically.
pub fn is_static_module(node: &SyntaxNode) -> bool {
    match node {
        SyntaxNode::Atom(_) => true,
        SyntaxNode::Form(form) => {
            matches!(form.name(), Some("__aliases__") | Some("__MODULE__"))
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::SyntaxNode as N;

    #[test]
    fn test_classify_definitions() {
        let def = N::call("defp", vec![N::call("f", vec![])]);
        assert!(matches!(classify(&def), Shape::FunctionDef(DefKind::Defp, _)));

        let module = N::call("defmodule", vec![N::aliases(&["M"])]);
        assert!(matches!(classify(&module), Shape::ModuleDef(_)));
    }

    #[test]
    fn test_classify_calls() {
        let local = N::call("foo", vec![N::int(1)]);
        assert!(matches!(
            classify(&local),
            Shape::Call(CallShape::Local { name: "foo", .. })
        ));

        let remote = N::remote(N::aliases(&["Enum"]), "map", vec![]);
        assert!(matches!(
            classify(&remote),
            Shape::Call(CallShape::Remote { name: "map", .. })
        ));

        let erlang = N::remote(N::atom("ets"), "new", vec![]);
        assert!(matches!(classify(&erlang), Shape::Call(CallShape::Remote { .. })));

        let dynamic = N::apply_anonymous(N::var("f"), vec![N::int(1)]);
        assert!(matches!(
            classify(&dynamic),
            Shape::Call(CallShape::Dynamic { name: None, .. })
        ));
    }

    #[test]
    fn test_operators_are_not_calls() {
        let plus = N::call("+", vec![N::int(1), N::int(2)]);
        assert!(matches!(classify(&plus), Shape::Operator("+", _)));
    }

    #[test]
    fn test_attribute_shape() {
        let attr = N::call("@", vec![N::call("timeout", vec![N::int(5000)])]);
        match classify(&attr) {
            Shape::Attribute { name, value, .. } => {
                assert_eq!(name, "timeout");
                assert_eq!(value, Some(&N::int(5000)));
            }
            other => panic!("unexpected shape {other:?}"),
        }
    }

    #[test]
    fn test_unrecognized_fallback() {
        let weird = N::Form(Form {
            head: crate::ast::Head::Node(Box::new(N::int(1))),
            meta: Default::default(),
            args: Some(vec![]),
        });
        assert!(matches!(classify(&weird), Shape::Unrecognized(_)));
    }
}
