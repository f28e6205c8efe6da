//! `@type`, `@spec` and `@callback` attribute values

use super::records::{FunctionKey, TypeRecord, TypeVisibility};
use crate::ast::render::to_source;
use crate::ast::{ShapeError, SourceLocation, SyntaxNode};

/// `name(args) :: rhs` split into its parts, `when` constraints dropped
struct Signature<'a> {
    name: &'a str,
    args: &'a [SyntaxNode],
    rhs: &'a SyntaxNode,
}

fn signature(value: &SyntaxNode) -> Result<Signature<'_>, ShapeError> {
    let typed = match value.as_form().map(|f| (f.name(), f.args())) {
        Some((Some("when"), [typed, _constraints])) => typed,
        _ => value,
    };
    let (lhs, rhs) = match typed.as_form().map(|f| (f.name(), f.args())) {
        Some((Some("::"), [lhs, rhs])) => (lhs, rhs),
        _ => return Err(ShapeError::new("`name(...) :: type`", value)),
    };
    let head = lhs
        .as_form()
        .ok_or_else(|| ShapeError::new("type name", lhs))?;
    let name = head
        .name()
        .ok_or_else(|| ShapeError::new("type name", lhs))?;
    Ok(Signature {
        name,
        args: head.args(),
        rhs,
    })
}

pub(crate) fn parse_type(
    visibility: TypeVisibility,
    value: &SyntaxNode,
    attribute: &SyntaxNode,
) -> Result<TypeRecord, ShapeError> {
    let sig = signature(value)?;
    Ok(TypeRecord {
        name: sig.name.to_string(),
        params: sig.args.iter().map(to_source).collect(),
        visibility,
        definition: to_source(sig.rhs),
        location: SourceLocation::of(attribute),
    })
}

/// Function key, parameter types and return type of a spec
pub(crate) fn parse_spec(
    value: &SyntaxNode,
) -> Result<(FunctionKey, Vec<String>, String), ShapeError> {
    let sig = signature(value)?;
    Ok((
        FunctionKey::new(sig.name, sig.args.len()),
        sig.args.iter().map(to_source).collect(),
        to_source(sig.rhs),
    ))
}

/// `@optional_callbacks [name: arity, ...]`
pub(crate) fn optional_callbacks(value: &SyntaxNode) -> Vec<FunctionKey> {
    value
        .as_keyword()
        .unwrap_or_default()
        .into_iter()
        .filter_map(|(name, arity)| match arity {
            SyntaxNode::Integer(n) if *n >= 0 => Some(FunctionKey::new(name, *n as usize)),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::SyntaxNode as N;

    #[test]
    fn test_type_with_params() {
        let value = N::call(
            "::",
            vec![
                N::call("result", vec![N::var("t")]),
                N::call(
                    "|",
                    vec![
                        N::tuple(vec![N::atom("ok"), N::var("t")]),
                        N::atom("error"),
                    ],
                ),
            ],
        );
        let ty = parse_type(TypeVisibility::Public, &value, &N::Nil).unwrap();
        assert_eq!(ty.name, "result");
        assert_eq!(ty.arity(), 1);
        assert_eq!(ty.definition, "{:ok, t} | :error");
    }

    #[test]
    fn test_zero_arity_type() {
        let value = N::call("::", vec![N::var("t"), N::call("integer", vec![])]);
        let ty = parse_type(TypeVisibility::Opaque, &value, &N::Nil).unwrap();
        assert_eq!((ty.name.as_str(), ty.arity()), ("t", 0));
        assert_eq!(ty.definition, "integer()");
    }

    #[test]
    fn test_spec_with_when() {
        let spec = N::call(
            "when",
            vec![
                N::call(
                    "::",
                    vec![N::call("id", vec![N::var("a")]), N::var("a")],
                ),
                N::keyword(vec![("a", N::call("term", vec![]))]),
            ],
        );
        let (key, params, ret) = parse_spec(&spec).unwrap();
        assert_eq!(key, FunctionKey::new("id", 1));
        assert_eq!(params, vec!["a"]);
        assert_eq!(ret, "a");
    }

    #[test]
    fn test_malformed_spec() {
        assert!(parse_spec(&N::call("id", vec![])).is_err());
    }

    #[test]
    fn test_optional_callbacks() {
        let value = N::keyword(vec![("a", N::int(1)), ("b", N::int(0))]);
        assert_eq!(
            optional_callbacks(&value),
            vec![FunctionKey::new("a", 1), FunctionKey::new("b", 0)]
        );
    }
}
