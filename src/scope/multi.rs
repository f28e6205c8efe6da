//! Multi-target directive expansion
//!
//! `alias A.B.{C, D.{E}}` is quoted as a remote call to `{}` on the prefix,
//! with the targets as arguments. Targets may themselves be groups. The
//! nesting is input-controlled, so expansion carries an explicit depth and
//! refuses to go past the configured maximum.

use super::directive::ModulePath;
use super::DirectiveError;
use crate::ast::render::to_source;
use crate::ast::{DirectiveTag, SyntaxNode};

/// Default bound on group nesting
pub const DEFAULT_MAX_NESTING_DEPTH: usize = 10;

/// One entry inside `{...}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MultiTarget {
    Leaf(ModulePath),
    Group {
        prefix: ModulePath,
        targets: Vec<MultiTarget>,
    },
}

/// A parsed grouped directive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiDirectiveGroup {
    pub tag: DirectiveTag,
    pub prefix: ModulePath,
    pub targets: Vec<MultiTarget>,
}

/// Prefix node and target list of a `prefix.{...}` node
fn group_parts(node: &SyntaxNode) -> Option<(&SyntaxNode, &[SyntaxNode])> {
    let form = node.as_form()?;
    let dot = form.head_node()?.as_form()?;
    match (dot.name(), dot.args()) {
        (Some("."), [prefix, SyntaxNode::Atom(brace)]) if brace == "{}" => {
            Some((prefix, form.args()))
        }
        _ => None,
    }
}

/// True for `prefix.{...}` nodes
pub fn is_group(node: &SyntaxNode) -> bool {
    group_parts(node).is_some()
}

impl MultiDirectiveGroup {
    /// Parse a grouped target node
    pub fn parse(
        tag: DirectiveTag,
        node: &SyntaxNode,
        current: Option<&ModulePath>,
    ) -> Result<Self, DirectiveError> {
        let (prefix, targets) = group_parts(node)
            .ok_or_else(|| DirectiveError::NotADirective(to_source(node)))?;
        Ok(Self {
            tag,
            prefix: module_path(prefix, current)?,
            targets: parse_targets(targets)?,
        })
    }

    /// Number of leaf targets, i.e. directives produced by a successful
    /// expansion
    pub fn leaf_count(&self) -> usize {
        fn count(targets: &[MultiTarget]) -> usize {
            targets
                .iter()
                .map(|t| match t {
                    MultiTarget::Leaf(_) => 1,
                    MultiTarget::Group { targets, .. } => count(targets),
                })
                .sum()
        }
        count(&self.targets)
    }

    /// Expand to full source paths, in order.
    ///
    /// The top-level group is depth 1. Any group deeper than `max_depth`
    /// fails the whole expansion.
    pub fn expand(&self, max_depth: usize) -> Result<Vec<ModulePath>, DirectiveError> {
        if max_depth < 1 {
            return Err(DirectiveError::MaxNestingDepthExceeded {
                depth: 1,
                max: max_depth,
            });
        }
        let mut out = Vec::with_capacity(self.targets.len());
        expand_into(&self.prefix, &self.targets, 1, max_depth, &mut out)?;
        Ok(out)
    }
}

fn expand_into(
    prefix: &ModulePath,
    targets: &[MultiTarget],
    depth: usize,
    max_depth: usize,
    out: &mut Vec<ModulePath>,
) -> Result<(), DirectiveError> {
    for target in targets {
        match target {
            MultiTarget::Leaf(suffix) => out.push(prefix.join(suffix)),
            MultiTarget::Group {
                prefix: nested,
                targets,
            } => {
                if depth + 1 > max_depth {
                    return Err(DirectiveError::MaxNestingDepthExceeded {
                        depth: depth + 1,
                        max: max_depth,
                    });
                }
                expand_into(&prefix.join(nested), targets, depth + 1, max_depth, out)?;
            }
        }
    }
    Ok(())
}

fn parse_targets(nodes: &[SyntaxNode]) -> Result<Vec<MultiTarget>, DirectiveError> {
    nodes
        .iter()
        .map(|node| match group_parts(node) {
            Some((prefix, targets)) => Ok(MultiTarget::Group {
                prefix: module_path(prefix, None)?,
                targets: parse_targets(targets)?,
            }),
            None => module_path(node, None).map(MultiTarget::Leaf),
        })
        .collect()
}

fn module_path(
    node: &SyntaxNode,
    current: Option<&ModulePath>,
) -> Result<ModulePath, DirectiveError> {
    ModulePath::from_node(node, current)
        .ok_or_else(|| DirectiveError::InvalidTarget(to_source(node)))
}
