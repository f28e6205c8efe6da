//! Function head parsing for `def`-family definitions

use super::records::{ClauseRecord, FunctionKey, ParamRecord};
use crate::ast::render::to_source;
use crate::ast::{DefKind, Form, ShapeError, SourceLocation, SyntaxNode};

/// One parsed `def`/`defp`/`defmacro`/`defguard`/`defdelegate` node
#[derive(Debug)]
pub(crate) struct ParsedDef<'a> {
    pub kind: DefKind,
    pub key: FunctionKey,
    pub min_arity: usize,
    pub clause: ClauseRecord,
    /// Keyword list holding `do` (and `rescue`/`catch`/... for implicit try)
    pub body: Option<&'a SyntaxNode>,
    /// `to:` target node and `as:` name of a `defdelegate`
    pub delegate: Option<(&'a SyntaxNode, Option<String>)>,
}

pub(crate) fn parse<'a>(
    kind: DefKind,
    node: &SyntaxNode,
    form: &'a Form,
) -> Result<ParsedDef<'a>, ShapeError> {
    let head = form
        .arg(0)
        .ok_or_else(|| ShapeError::new("function head", node))?;
    let (call, guard) = split_guard(head);
    let call_form = call
        .as_form()
        .ok_or_else(|| ShapeError::new("function head", call))?;
    let name = call_form
        .name()
        .ok_or_else(|| ShapeError::new("function name", call))?;

    let params: Vec<ParamRecord> = call_form.args().iter().map(parse_param).collect();
    let min_arity = params.iter().filter(|p| p.default.is_none()).count();
    let key = FunctionKey::new(name, params.len());

    let options = form.arg(1);
    let (body, delegate) = match kind {
        DefKind::Defdelegate => {
            let target = options
                .and_then(|o| o.keyword_get("to"))
                .ok_or_else(|| ShapeError::new("`to:` option", node))?;
            let alias = options
                .and_then(|o| o.keyword_get("as"))
                .and_then(SyntaxNode::as_atom)
                .map(str::to_string);
            (None, Some((target, alias)))
        }
        _ => (options.filter(|o| o.keyword_get("do").is_some()), None),
    };

    Ok(ParsedDef {
        kind,
        key,
        min_arity,
        clause: ClauseRecord {
            params,
            guard: guard.map(to_source),
            bodyless: body.is_none(),
            location: SourceLocation::of(node),
        },
        body,
        delegate,
    })
}

/// `f(a) when guard` → (`f(a)`, `guard`)
fn split_guard(head: &SyntaxNode) -> (&SyntaxNode, Option<&SyntaxNode>) {
    match head.as_form().map(|f| (f.name(), f.args())) {
        Some((Some("when"), [call, guard])) => (call, Some(guard)),
        _ => (head, None),
    }
}

fn parse_param(node: &SyntaxNode) -> ParamRecord {
    if let Some(form) = node.as_form().filter(|f| f.name() == Some("\\\\")) {
        if let [pattern, default] = form.args() {
            let mut param = parse_param(pattern);
            param.default = Some(to_source(default));
            return param;
        }
    }
    if let Some(name) = node.as_variable() {
        return ParamRecord {
            name: Some(name.to_string()),
            text: name.to_string(),
            default: None,
            is_pattern: false,
        };
    }
    ParamRecord {
        name: bound_name(node),
        text: to_source(node),
        default: None,
        is_pattern: true,
    }
}

/// `%User{} = user` binds `user` as a whole
fn bound_name(node: &SyntaxNode) -> Option<String> {
    let form = node.as_form().filter(|f| f.name() == Some("="))?;
    form.args()
        .iter()
        .rev()
        .find_map(SyntaxNode::as_variable)
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Meta, SyntaxNode as N};

    fn def(kind: &str, head: N, rest: Vec<N>) -> N {
        let mut args = vec![head];
        args.extend(rest);
        N::form(kind, Meta::spanning(3, 6), args)
    }

    fn parse_node(node: &N) -> ParsedDef<'_> {
        let form = node.as_form().unwrap();
        let kind = DefKind::from_name(form.name().unwrap()).unwrap();
        parse(kind, node, form).unwrap()
    }

    #[test]
    fn test_plain_definition() {
        let node = def(
            "def",
            N::call("f", vec![N::var("a"), N::var("b")]),
            vec![N::do_keyword(N::var("a"))],
        );
        let parsed = parse_node(&node);
        assert_eq!(parsed.key, FunctionKey::new("f", 2));
        assert_eq!(parsed.min_arity, 2);
        assert!(!parsed.clause.bodyless);
        assert!(parsed.body.is_some());
        assert_eq!(parsed.clause.location, Some(SourceLocation::new(3, 6)));
    }

    #[test]
    fn test_guard_and_default() {
        let head = N::call(
            "when",
            vec![
                N::call(
                    "f",
                    vec![
                        N::var("x"),
                        N::call("\\\\", vec![N::var("opts"), N::list(vec![])]),
                    ],
                ),
                N::call("is_integer", vec![N::var("x")]),
            ],
        );
        let node = def("def", head, vec![N::do_keyword(N::var("x"))]);
        let parsed = parse_node(&node);
        assert_eq!(parsed.key.arity, 2);
        assert_eq!(parsed.min_arity, 1);
        assert_eq!(parsed.clause.guard.as_deref(), Some("is_integer(x)"));
        assert_eq!(parsed.clause.params[1].default.as_deref(), Some("[]"));
        assert_eq!(parsed.clause.params[1].name.as_deref(), Some("opts"));
    }

    #[test]
    fn test_pattern_params() {
        let node = def(
            "defp",
            N::call(
                "g",
                vec![
                    N::call("=", vec![N::tuple(vec![N::atom("ok"), N::var("v")]), N::var("all")]),
                    N::int(0),
                ],
            ),
            vec![N::do_keyword(N::Nil)],
        );
        let parsed = parse_node(&node);
        assert!(parsed.clause.params.iter().all(|p| p.is_pattern));
        assert_eq!(parsed.clause.params[0].name.as_deref(), Some("all"));
        assert_eq!(parsed.clause.params[1].name, None);
    }

    #[test]
    fn test_bodyless_head_and_zero_arity() {
        let node = def("def", N::var("version"), vec![]);
        let parsed = parse_node(&node);
        assert_eq!(parsed.key, FunctionKey::new("version", 0));
        assert!(parsed.clause.bodyless);
    }

    #[test]
    fn test_delegate_options() {
        let node = def(
            "defdelegate",
            N::call("h", vec![]),
            vec![N::keyword(vec![
                ("to", N::aliases(&["M2"])),
                ("as", N::atom("other")),
            ])],
        );
        let parsed = parse_node(&node);
        let (target, alias) = parsed.delegate.unwrap();
        assert_eq!(target, &N::aliases(&["M2"]));
        assert_eq!(alias.as_deref(), Some("other"));
        assert!(parsed.clause.bodyless);
    }

    #[test]
    fn test_unquoted_name_rejected() {
        let head = N::Form(Form {
            head: crate::ast::Head::Node(Box::new(N::call("unquote", vec![N::var("name")]))),
            meta: Meta::default(),
            args: Some(vec![]),
        });
        let node = def("def", head, vec![N::do_keyword(N::Nil)]);
        let form = node.as_form().unwrap();
        assert!(parse(DefKind::Def, &node, form).is_err());
    }
}
