//! Directive extraction
//!
//! Turns a single `alias`/`import`/`require`/`use` node into one or more
//! [`Directive`] records. Grouped targets (`alias A.{B, C}`) are expanded
//! through [`super::multi`].

use super::multi::{self, MultiDirectiveGroup};
use super::{DirectiveError, Scope};
use crate::ast::render::to_source;
use crate::ast::{classify, DirectiveTag, Form, Shape, SourceLocation, SyntaxNode};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A module name as an ordered list of segments.
///
/// Elixir modules display as `A.B.C`; Erlang modules (plain atoms) display
/// with a leading colon (`:ets`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModulePath {
    segments: Vec<String>,
    erlang: bool,
}

impl ModulePath {
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
            erlang: false,
        }
    }

    pub fn erlang(name: impl Into<String>) -> Self {
        Self {
            segments: vec![name.into()],
            erlang: true,
        }
    }

    /// Parse the display form back (`A.B` or `:ets`)
    pub fn parse(text: &str) -> Self {
        match text.strip_prefix(':') {
            Some(name) => Self::erlang(name),
            None => Self::new(text.split('.').filter(|s| !s.is_empty())),
        }
    }

    /// Read a module reference node: `__aliases__`, an atom, or
    /// `__MODULE__`. A leading `__MODULE__` segment is replaced by
    /// `current` when it is known.
    pub fn from_node(node: &SyntaxNode, current: Option<&ModulePath>) -> Option<Self> {
        match node {
            SyntaxNode::Atom(atom) => Some(match atom.strip_prefix("Elixir.") {
                Some(rest) => Self::new(rest.split('.')),
                None => Self::erlang(atom.clone()),
            }),
            SyntaxNode::Form(form) if form.name() == Some("__MODULE__") => {
                Some(current.cloned().unwrap_or_else(|| Self::new(["__MODULE__"])))
            }
            _ => {
                let segments = node.alias_segments()?;
                if segments.is_empty() {
                    return None;
                }
                if let Some(current) = current.filter(|_| segments[0] == "__MODULE__") {
                    let mut expanded = current.clone();
                    expanded.segments.extend(segments.into_iter().skip(1));
                    return Some(expanded);
                }
                Some(Self::new(segments))
            }
        }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Last segment, the default alias name
    pub fn last(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or_default()
    }

    pub fn is_erlang(&self) -> bool {
        self.erlang
    }

    /// `self ++ suffix`
    pub fn join(&self, suffix: &ModulePath) -> Self {
        let mut segments = self.segments.clone();
        segments.extend(suffix.segments.iter().cloned());
        Self {
            segments,
            erlang: self.erlang,
        }
    }

    /// Replace the first segment with `target`: `C.D` with `C => A.B.C`
    /// becomes `A.B.C.D`
    pub fn replace_head(&self, target: &ModulePath) -> Self {
        let mut segments = target.segments.clone();
        segments.extend(self.segments.iter().skip(1).cloned());
        Self {
            segments,
            erlang: target.erlang,
        }
    }

    pub fn first(&self) -> Option<&str> {
        self.segments.first().map(String::as_str)
    }
}

impl fmt::Display for ModulePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.erlang {
            write!(f, ":{}", self.segments.join("."))
        } else {
            f.write_str(&self.segments.join("."))
        }
    }
}

impl Serialize for ModulePath {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ModulePath {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::parse(&s))
    }
}

/// `name/arity` reference used by import selectors
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FunctionRef {
    pub name: String,
    pub arity: usize,
}

impl fmt::Display for FunctionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.arity)
    }
}

/// `only: :functions | :macros | :sigils`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportCategory {
    Functions,
    Macros,
    Sigils,
}

impl ImportCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImportCategory::Functions => "functions",
            ImportCategory::Macros => "macros",
            ImportCategory::Sigils => "sigils",
        }
    }
}

/// What an `import` brings into scope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum ImportSelector {
    All,
    Only(Vec<FunctionRef>),
    Except(Vec<FunctionRef>),
    Category(ImportCategory),
}

impl ImportSelector {
    /// Whether `name/arity` is brought in by this selector, as far as can be
    /// told without knowing the imported module's exports
    pub fn names(&self, name: &str, arity: usize) -> bool {
        match self {
            ImportSelector::Only(refs) => refs.iter().any(|r| r.name == name && r.arity == arity),
            _ => false,
        }
    }
}

/// One `key: value` passed to `use`; a bare argument has no key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UseOption {
    pub key: Option<String>,
    pub value: String,
}

/// Directive-specific payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DirectiveKind {
    Alias { as_name: String, explicit: bool },
    Import { selector: ImportSelector },
    Require { as_name: Option<String> },
    Use { options: Vec<UseOption> },
}

impl DirectiveKind {
    pub fn tag(&self) -> DirectiveTag {
        match self {
            DirectiveKind::Alias { .. } => DirectiveTag::Alias,
            DirectiveKind::Import { .. } => DirectiveTag::Import,
            DirectiveKind::Require { .. } => DirectiveTag::Require,
            DirectiveKind::Use { .. } => DirectiveTag::Use,
        }
    }
}

/// A directive found in a module body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Directive {
    #[serde(flatten)]
    pub kind: DirectiveKind,
    pub source: ModulePath,
    pub location: Option<SourceLocation>,
    pub scope: Scope,
    /// Position within an expanded multi-target group
    pub multi_position: Option<usize>,
}

impl Directive {
    pub fn tag(&self) -> DirectiveTag {
        self.kind.tag()
    }

    /// Short name this directive makes available, if any
    pub fn alias_name(&self) -> Option<&str> {
        match &self.kind {
            DirectiveKind::Alias { as_name, .. } => Some(as_name),
            DirectiveKind::Require { as_name } => as_name.as_deref(),
            _ => None,
        }
    }

    pub fn is_multi(&self) -> bool {
        self.multi_position.is_some()
    }
}

/// Extraction settings
#[derive(Debug, Clone, Copy)]
pub struct DirectiveOptions<'a> {
    /// Module the directive appears in, used to expand `__MODULE__`
    pub current_module: Option<&'a ModulePath>,
    pub max_nesting_depth: usize,
}

impl Default for DirectiveOptions<'_> {
    fn default() -> Self {
        Self {
            current_module: None,
            max_nesting_depth: multi::DEFAULT_MAX_NESTING_DEPTH,
        }
    }
}

/// True if `node` is an `alias`/`import`/`require`/`use` form
pub fn is_directive(node: &SyntaxNode) -> bool {
    matches!(classify(node), Shape::Directive(..))
}

/// Extract the directives declared by `node`.
///
/// A plain directive yields one record; a grouped one yields one record per
/// leaf target, or an error and nothing at all.
pub fn extract(
    node: &SyntaxNode,
    scope: Scope,
    options: &DirectiveOptions<'_>,
) -> Result<Vec<Directive>, DirectiveError> {
    let (tag, form) = match classify(node) {
        Shape::Directive(tag, form) => (tag, form),
        _ => return Err(DirectiveError::NotADirective(to_source(node))),
    };
    let target = form
        .arg(0)
        .ok_or_else(|| DirectiveError::NotADirective(to_source(node)))?;
    let location = SourceLocation::of(node);

    if multi::is_group(target) {
        let group = MultiDirectiveGroup::parse(tag, target, options.current_module)?;
        let sources = group.expand(options.max_nesting_depth)?;
        return Ok(sources
            .into_iter()
            .enumerate()
            .map(|(position, source)| Directive {
                kind: default_kind(tag, &source),
                source,
                location,
                scope,
                multi_position: Some(position),
            })
            .collect());
    }

    let source = ModulePath::from_node(target, options.current_module)
        .ok_or_else(|| DirectiveError::InvalidTarget(to_source(target)))?;
    let kind = match tag {
        DirectiveTag::Alias => alias_kind(form, &source, options)?,
        DirectiveTag::Import => DirectiveKind::Import {
            selector: import_selector(form)?,
        },
        DirectiveTag::Require => DirectiveKind::Require {
            as_name: explicit_as(form, options)?,
        },
        DirectiveTag::Use => DirectiveKind::Use {
            options: use_options(form),
        },
    };

    Ok(vec![Directive {
        kind,
        source,
        location,
        scope,
        multi_position: None,
    }])
}

/// Payload of a multi-target member: no options are allowed there
fn default_kind(tag: DirectiveTag, source: &ModulePath) -> DirectiveKind {
    match tag {
        DirectiveTag::Alias => DirectiveKind::Alias {
            as_name: source.last().to_string(),
            explicit: false,
        },
        DirectiveTag::Import => DirectiveKind::Import {
            selector: ImportSelector::All,
        },
        DirectiveTag::Require => DirectiveKind::Require { as_name: None },
        DirectiveTag::Use => DirectiveKind::Use {
            options: Vec::new(),
        },
    }
}

fn alias_kind(
    form: &Form,
    source: &ModulePath,
    options: &DirectiveOptions<'_>,
) -> Result<DirectiveKind, DirectiveError> {
    Ok(match explicit_as(form, options)? {
        Some(as_name) => DirectiveKind::Alias {
            as_name,
            explicit: true,
        },
        None => DirectiveKind::Alias {
            as_name: source.last().to_string(),
            explicit: false,
        },
    })
}

/// `as: Name` from the option list
fn explicit_as(
    form: &Form,
    options: &DirectiveOptions<'_>,
) -> Result<Option<String>, DirectiveError> {
    let Some(value) = form.arg(1).and_then(|opts| opts.keyword_get("as")) else {
        return Ok(None);
    };
    ModulePath::from_node(value, options.current_module)
        .map(|path| Some(path.to_string()))
        .ok_or_else(|| DirectiveError::InvalidTarget(to_source(value)))
}

fn import_selector(form: &Form) -> Result<ImportSelector, DirectiveError> {
    let Some(opts) = form.arg(1) else {
        return Ok(ImportSelector::All);
    };
    if let Some(only) = opts.keyword_get("only") {
        return match only {
            SyntaxNode::Atom(category) => match category.as_str() {
                "functions" => Ok(ImportSelector::Category(ImportCategory::Functions)),
                "macros" => Ok(ImportSelector::Category(ImportCategory::Macros)),
                "sigils" => Ok(ImportSelector::Category(ImportCategory::Sigils)),
                _ => Err(DirectiveError::InvalidTarget(to_source(only))),
            },
            other => function_refs(other).map(ImportSelector::Only),
        };
    }
    if let Some(except) = opts.keyword_get("except") {
        return function_refs(except).map(ImportSelector::Except);
    }
    Ok(ImportSelector::All)
}

/// `[name: arity, ...]`
fn function_refs(node: &SyntaxNode) -> Result<Vec<FunctionRef>, DirectiveError> {
    let pairs = node
        .as_keyword()
        .ok_or_else(|| DirectiveError::InvalidTarget(to_source(node)))?;
    pairs
        .into_iter()
        .map(|(name, arity)| match arity {
            SyntaxNode::Integer(n) if *n >= 0 => Ok(FunctionRef {
                name: name.to_string(),
                arity: *n as usize,
            }),
            other => Err(DirectiveError::InvalidTarget(to_source(other))),
        })
        .collect()
}

fn use_options(form: &Form) -> Vec<UseOption> {
    let Some(opts) = form.arg(1) else {
        return Vec::new();
    };
    match opts.as_keyword() {
        Some(pairs) => pairs
            .into_iter()
            .map(|(key, value)| UseOption {
                key: Some(key.to_string()),
                value: to_source(value),
            })
            .collect(),
        None => vec![UseOption {
            key: None,
            value: to_source(opts),
        }],
    }
}
