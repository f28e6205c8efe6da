//! Render syntax nodes back to compact source text
//!
//! Used for literal properties such as guard expressions, default values and
//! type definitions. The output is close to the original source but not a
//! formatter: layout is always single-line.

use super::{Form, SyntaxNode};

const BINARY_OPERATORS: &[&str] = &[
    "+", "-", "*", "/", "++", "--", "<>", "==", "!=", "===", "!==", "<", ">", "<=", ">=",
    "&&", "||", "and", "or", "in", "|>", "..", "=~", "**", "=", "::", "|", "when", "<-",
    "\\\\", "<<<", ">>>", "|||", "&&&", "^^^", "<~", "~>", "<~>",
];

const UNARY_OPERATORS: &[&str] = &["-", "+", "!", "not", "^", "&", "~~~"];

/// Render a node as single-line source text
pub fn to_source(node: &SyntaxNode) -> String {
    let mut out = String::new();
    write_node(&mut out, node);
    out
}

fn write_node(out: &mut String, node: &SyntaxNode) {
    match node {
        SyntaxNode::Atom(a) => write_atom(out, a),
        SyntaxNode::Integer(i) => out.push_str(&i.to_string()),
        SyntaxNode::Float(f) => out.push_str(&format_float(*f)),
        SyntaxNode::String(s) => {
            out.push('"');
            out.push_str(&s.replace('\\', "\\\\").replace('"', "\\\""));
            out.push('"');
        }
        SyntaxNode::Boolean(b) => out.push_str(if *b { "true" } else { "false" }),
        SyntaxNode::Nil => out.push_str("nil"),
        SyntaxNode::List(items) => write_list(out, items),
        SyntaxNode::Tuple(items) => {
            out.push('{');
            write_joined(out, items, ", ");
            out.push('}');
        }
        SyntaxNode::Form(form) => write_form(out, form),
    }
}

fn write_atom(out: &mut String, atom: &str) {
    match atom {
        "true" | "false" | "nil" => out.push_str(atom),
        a if a.chars().next().is_some_and(|c| c.is_ascii_uppercase()) => out.push_str(a),
        a => {
            out.push(':');
            out.push_str(a);
        }
    }
}

fn format_float(f: f64) -> String {
    if f.fract() == 0.0 && f.is_finite() {
        format!("{f:.1}")
    } else {
        f.to_string()
    }
}

fn write_list(out: &mut String, items: &[SyntaxNode]) {
    out.push('[');
    let keyword = SyntaxNode::List(items.to_vec());
    match keyword.as_keyword() {
        Some(pairs) if !pairs.is_empty() => write_keyword_pairs(out, &pairs),
        _ => write_joined(out, items, ", "),
    }
    out.push(']');
}

fn write_keyword_pairs(out: &mut String, pairs: &[(&str, &SyntaxNode)]) {
    for (i, (key, value)) in pairs.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        out.push_str(key);
        out.push_str(": ");
        write_node(out, value);
    }
}

fn write_joined(out: &mut String, items: &[SyntaxNode], sep: &str) {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push_str(sep);
        }
        write_node(out, item);
    }
}

fn write_form(out: &mut String, form: &Form) {
    if let Some(head) = form.head_node() {
        write_dot_call(out, head, form.args());
        return;
    }
    let name = form.name().unwrap_or_default();
    let args = form.args();

    if form.is_variable() {
        out.push_str(name);
        return;
    }

    match (name, args) {
        ("__aliases__", segments) => {
            let parts: Vec<String> = segments.iter().map(to_source).collect();
            out.push_str(&parts.join("."));
        }
        ("__block__", stmts) => write_joined(out, stmts, "; "),
        ("{}", items) => {
            out.push('{');
            write_joined(out, items, ", ");
            out.push('}');
        }
        ("%{}", pairs) => {
            out.push_str("%{");
            write_map_pairs(out, pairs);
            out.push('}');
        }
        ("%", [module, map]) => {
            out.push('%');
            write_node(out, module);
            out.push('{');
            if let Some(map_form) = map.as_form() {
                write_map_pairs(out, map_form.args());
            }
            out.push('}');
        }
        ("<<>>", parts) => {
            out.push_str("<<");
            write_joined(out, parts, ", ");
            out.push_str(">>");
        }
        ("@", [inner]) => {
            out.push('@');
            write_node(out, inner);
        }
        ("->", [params, body]) => {
            match params.as_list() {
                Some(items) => write_joined(out, items, ", "),
                None => write_node(out, params),
            }
            out.push_str(" -> ");
            write_node(out, body);
        }
        ("fn", clauses) => {
            out.push_str("fn ");
            write_joined(out, clauses, "; ");
            out.push_str(" end");
        }
        (op, [left, right]) if BINARY_OPERATORS.contains(&op) => {
            write_node(out, left);
            out.push(' ');
            out.push_str(op);
            out.push(' ');
            write_node(out, right);
        }
        (op, [operand]) if UNARY_OPERATORS.contains(&op) => {
            out.push_str(op);
            if op == "not" {
                out.push(' ');
            }
            write_node(out, operand);
        }
        (name, args) => write_call(out, name, args),
    }
}

fn write_map_pairs(out: &mut String, pairs: &[SyntaxNode]) {
    for (i, pair) in pairs.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        match pair.tuple_items() {
            Some([SyntaxNode::Atom(key), value]) => {
                out.push_str(key);
                out.push_str(": ");
                write_node(out, value);
            }
            Some([key, value]) => {
                write_node(out, key);
                out.push_str(" => ");
                write_node(out, value);
            }
            _ => write_node(out, pair),
        }
    }
}

fn write_call(out: &mut String, name: &str, args: &[SyntaxNode]) {
    out.push_str(name);
    let (positional, blocks) = split_do_blocks(args);
    out.push('(');
    write_joined(out, positional, ", ");
    out.push(')');
    if let Some(blocks) = blocks {
        for (key, body) in blocks {
            out.push(' ');
            out.push_str(key);
            out.push(' ');
            write_node(out, body);
        }
        out.push_str(" end");
    }
}

/// Separate a trailing `[do: ..., else: ...]` keyword from positional args
fn split_do_blocks(args: &[SyntaxNode]) -> (&[SyntaxNode], Option<Vec<(&str, &SyntaxNode)>>) {
    if let Some((last, rest)) = args.split_last() {
        if let Some(pairs) = last.as_keyword() {
            if pairs.first().is_some_and(|(k, _)| *k == "do") {
                return (rest, Some(pairs));
            }
        }
    }
    (args, None)
}

fn write_dot_call(out: &mut String, head: &SyntaxNode, args: &[SyntaxNode]) {
    let dot_args = head.as_form().map(Form::args).unwrap_or_default();
    match dot_args {
        [target] => {
            write_node(out, target);
            out.push_str(".(");
            write_joined(out, args, ", ");
            out.push(')');
        }
        [target, SyntaxNode::Atom(name)] => {
            write_node(out, target);
            out.push('.');
            out.push_str(name);
            out.push('(');
            write_joined(out, args, ", ");
            out.push(')');
        }
        _ => write_node(out, head),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::SyntaxNode as N;

    #[test]
    fn test_render_guard() {
        let guard = N::call(
            "and",
            vec![
                N::call("is_integer", vec![N::var("x")]),
                N::call(">", vec![N::var("x"), N::int(0)]),
            ],
        );
        assert_eq!(to_source(&guard), "is_integer(x) and x > 0");
    }

    #[test]
    fn test_render_remote_and_keyword() {
        let call = N::remote(
            N::aliases(&["Supervisor"]),
            "init",
            vec![
                N::var("children"),
                N::keyword(vec![("strategy", N::atom("one_for_one"))]),
            ],
        );
        assert_eq!(
            to_source(&call),
            "Supervisor.init(children, [strategy: :one_for_one])"
        );
    }

    #[test]
    fn test_render_literals() {
        assert_eq!(to_source(&N::atom("ok")), ":ok");
        assert_eq!(to_source(&N::string("hi")), "\"hi\"");
        assert_eq!(to_source(&N::Float(2.0)), "2.0");
        assert_eq!(to_source(&N::Nil), "nil");
        assert_eq!(
            to_source(&N::tuple(vec![N::atom("ok"), N::var("v")])),
            "{:ok, v}"
        );
    }
}
