//! Entity IRIs - Global, stable identity for every code entity
//!
//! Format: `<base><Module>[/<segment>...]`
//!
//! Examples:
//! - `https://example.org/code#MyApp.Users`
//! - `https://example.org/code#MyApp.Users/get_user/1/clause/0/param/0`
//! - `https://example.org/code#MyApp.Users/valid%3F/1`
//!
//! A function IRI always has exactly two segments after the module
//! (`name/arity`); every other child of a module either has more segments or
//! a non-numeric last segment, so the two families never collide.
//!
//! Path segments used as identifiers are 0-indexed. Name segments are
//! percent-encoded outside the unreserved set, which keeps operator names and
//! `?`/`!` suffixes injective.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default namespace for entity IRIs
pub const DEFAULT_BASE: &str = "https://example.org/code#";

/// A globally unique, deterministic identifier for a graph entity.
///
/// This IRI serves as the primary key for:
/// - Entities (subjects)
/// - Relationship targets (objects)
/// - Vocabulary terms (predicates and classes)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Iri(String);

impl Iri {
    /// Wrap an already well-formed IRI string
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Parse and validate an IRI string
    ///
    /// Only the scheme separator and the absence of whitespace are checked;
    /// the core never needs full RFC 3987 validation.
    pub fn parse(value: &str) -> Result<Self> {
        let (scheme, rest) = value
            .split_once(':')
            .ok_or_else(|| Error::InvalidIri(format!("missing scheme: {value}")))?;
        if scheme.is_empty() || rest.is_empty() {
            return Err(Error::InvalidIri(format!("empty scheme or path: {value}")));
        }
        if !scheme
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        {
            return Err(Error::InvalidIri(format!("invalid scheme: {value}")));
        }
        if value.chars().any(char::is_whitespace) {
            return Err(Error::InvalidIri(format!("whitespace in IRI: {value}")));
        }
        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Append one raw path segment (already escaped)
    fn child(&self, segment: &str) -> Self {
        Self(format!("{}/{}", self.0, segment))
    }

    /// Append `/<label>/<index>`
    fn indexed(&self, label: &str, index: usize) -> Self {
        Self(format!("{}/{}/{}", self.0, label, index))
    }

    // ------------------------------------------------------------------
    // Entity constructors
    // ------------------------------------------------------------------

    /// `{base}{Module}`; also the IRI of the module's struct, exception,
    /// protocol or behaviour
    pub fn for_module(base: &Iri, module: &str) -> Self {
        Self(format!("{}{}", base.0, escape_segment(module)))
    }

    /// `{module}/{name}/{arity}`
    pub fn for_function(module: &Iri, name: &str, arity: usize) -> Self {
        Self(format!("{}/{}/{}", module.0, escape_segment(name), arity))
    }

    /// `{function}/clause/{index}`
    pub fn for_clause(function: &Iri, index: usize) -> Self {
        function.indexed("clause", index)
    }

    /// `{clause}/param/{index}`
    pub fn for_parameter(clause: &Iri, index: usize) -> Self {
        clause.indexed("param", index)
    }

    /// `{module}/attribute/{name}/{index}`
    pub fn for_attribute(module: &Iri, name: &str, index: usize) -> Self {
        module
            .child("attribute")
            .child(&escape_segment(name))
            .child(&index.to_string())
    }

    /// `{module}/type/{name}/{arity}`
    pub fn for_type(module: &Iri, name: &str, arity: usize) -> Self {
        Self(format!("{}/type/{}/{}", module.0, escape_segment(name), arity))
    }

    /// `{module}/spec/{name}/{arity}/{index}`
    pub fn for_spec(module: &Iri, name: &str, arity: usize, index: usize) -> Self {
        Self(format!(
            "{}/spec/{}/{}/{}",
            module.0,
            escape_segment(name),
            arity,
            index
        ))
    }

    /// `{module}/callback/{name}/{arity}`
    pub fn for_callback(module: &Iri, name: &str, arity: usize) -> Self {
        Self(format!(
            "{}/callback/{}/{}",
            module.0,
            escape_segment(name),
            arity
        ))
    }

    /// `{module}/field/{name}`
    pub fn for_field(module: &Iri, name: &str) -> Self {
        module.child("field").child(&escape_segment(name))
    }

    /// `{module}/directive/{alias|import|require|use}/{index}`
    pub fn for_directive(module: &Iri, kind: &str, index: usize) -> Self {
        module.child("directive").indexed(kind, index)
    }

    /// `{protocol}/impl/{for_type}`
    pub fn for_implementation(protocol: &Iri, for_type: &str) -> Self {
        protocol.child("impl").child(&escape_segment(for_type))
    }

    /// `{module}/otp/{pattern}`
    pub fn for_otp_pattern(module: &Iri, pattern: &str) -> Self {
        module.child("otp").child(&escape_segment(pattern))
    }

    /// `{parent}/child/{index}` for supervisor child specs
    pub fn for_child_spec(supervisor: &Iri, index: usize) -> Self {
        supervisor.indexed("child", index)
    }

    /// `{module}/otp/ets/{index}`
    pub fn for_ets_table(module: &Iri, index: usize) -> Self {
        module.child("otp").indexed("ets", index)
    }

    /// `{parent}/{segment}/{n}` for entities without a stable name, where `n`
    /// comes from the threaded expression counter.
    pub fn for_anonymous(parent: &Iri, segment: &str, n: u64) -> Self {
        Self(format!("{}/{}/{}", parent.0, segment, n))
    }

    /// `{parent}/{label}/{index}` for nested children of anonymous entities
    pub fn for_nested(parent: &Iri, label: &str, index: usize) -> Self {
        parent.indexed(label, index)
    }

    /// `{base}file/{path}`
    pub fn for_file(base: &Iri, path: &str) -> Self {
        let escaped: Vec<String> = path
            .split('/')
            .filter(|s| !s.is_empty())
            .map(escape_segment)
            .collect();
        Self(format!("{}file/{}", base.0, escaped.join("/")))
    }

    /// `{file}/L{start}-{end}`
    pub fn for_location(file: &Iri, start_line: u32, end_line: u32) -> Self {
        Self(format!("{}/L{}-{}", file.0, start_line, end_line))
    }

    /// `{list_owner}/{label}/{index}` for ordered-list cells
    pub fn for_list_cell(owner: &Iri, label: &str, index: usize) -> Self {
        owner.child(label).indexed("cell", index)
    }
}

impl fmt::Display for Iri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Iri {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl From<&'static str> for Iri {
    fn from(value: &'static str) -> Self {
        Self(value.to_string())
    }
}

impl Serialize for Iri {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Iri {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Iri::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Percent-encode everything outside `A-Z a-z 0-9 - . _ ~`
pub fn escape_segment(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'.' | b'_' | b'~') {
            out.push(byte as char);
        } else {
            out.push_str(&format!("%{byte:02X}"));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn base() -> Iri {
        Iri::new(DEFAULT_BASE)
    }

    #[test]
    fn test_function_iri_layout() {
        let module = Iri::for_module(&base(), "MyApp.Users");
        let function = Iri::for_function(&module, "get_user", 1);
        let clause = Iri::for_clause(&function, 0);
        let param = Iri::for_parameter(&clause, 0);
        assert_eq!(
            param.as_str(),
            "https://example.org/code#MyApp.Users/get_user/1/clause/0/param/0"
        );
    }

    #[test]
    fn test_escaping_keeps_names_distinct() {
        let module = Iri::for_module(&base(), "M");
        let a = Iri::for_function(&module, "valid?", 1);
        let b = Iri::for_function(&module, "valid!", 1);
        let c = Iri::for_function(&module, "valid%3F", 1);
        assert_eq!(a.as_str(), "https://example.org/code#M/valid%3F/1");
        assert_ne!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_distinct_entities_distinct_iris() {
        let module = Iri::for_module(&base(), "M");
        let iris: Vec<Iri> = vec![
            Iri::for_function(&module, "f", 0),
            Iri::for_function(&module, "f", 1),
            Iri::for_type(&module, "f", 0),
            Iri::for_callback(&module, "f", 0),
            Iri::for_spec(&module, "f", 0, 0),
            Iri::for_directive(&module, "alias", 0),
            Iri::for_directive(&module, "import", 0),
            Iri::for_attribute(&module, "f", 0),
            Iri::for_field(&module, "f"),
        ];
        let unique: HashSet<_> = iris.iter().collect();
        assert_eq!(unique.len(), iris.len());
    }

    #[test]
    fn test_deterministic() {
        let a = Iri::for_function(&Iri::for_module(&base(), "M"), "f", 2);
        let b = Iri::for_function(&Iri::for_module(&base(), "M"), "f", 2);
        assert_eq!(a, b);
    }

    #[test]
    fn test_file_and_location() {
        let file = Iri::for_file(&base(), "lib/my app/users.ex");
        assert_eq!(
            file.as_str(),
            "https://example.org/code#file/lib/my%20app/users.ex"
        );
        let loc = Iri::for_location(&file, 10, 20);
        assert!(loc.as_str().ends_with("/L10-20"));
    }

    #[test]
    fn test_parse() {
        assert!(Iri::parse("https://example.org/x").is_ok());
        assert!(Iri::parse("no-scheme").is_err());
        assert!(Iri::parse("http://has space").is_err());
    }
}
