//! Bottom-up aggregation of leaf text into every ancestor.
//!
//! Internal-node text is wholly derived: it is the blank-line-joined
//! concatenation of the non-empty leaf texts beneath the node, in document
//! order. Leaves are never modified.

use rayon::prelude::*;
use serde::Serialize;
use tracing::instrument;

use crate::domain::node::{Node, Order};
use crate::domain::span::SpanValue;

/// Separator placed between the fragments of an internal node's text.
pub const FRAGMENT_SEPARATOR: &str = "\n\n";

fn leaf_has_text(node: &Node) -> bool {
    node.text.as_deref().is_some_and(|t| !t.trim().is_empty())
}

fn combine<'a>(node: &mut Node, fragments: impl Iterator<Item = &'a str>) -> bool {
    let joined = fragments.map(str::trim).collect::<Vec<_>>();
    if joined.is_empty() {
        node.text = None;
        false
    } else {
        node.text = Some(joined.join(FRAGMENT_SEPARATOR));
        true
    }
}

/// Aggregate leaf text into `node` and all its descendants, post-order.
///
/// Returns whether the subtree contributes any text.
pub fn aggregate(node: &mut Node) -> bool {
    if node.is_leaf() {
        return leaf_has_text(node);
    }
    let has_text: Vec<bool> = node.children.iter_mut().map(aggregate).collect();
    fold_children(node, &has_text)
}

/// Same result as [`aggregate`]; sibling subtrees are processed on the rayon pool.
pub fn aggregate_parallel(node: &mut Node) -> bool {
    if node.is_leaf() {
        return leaf_has_text(node);
    }
    let has_text: Vec<bool> = node
        .children
        .par_iter_mut()
        .map(aggregate_parallel)
        .collect();
    fold_children(node, &has_text)
}

fn fold_children(node: &mut Node, has_text: &[bool]) -> bool {
    let texts: Vec<String> = node
        .children
        .iter()
        .zip(has_text)
        .filter(|(_, has)| **has)
        .filter_map(|(child, _)| child.text.clone())
        .collect();
    combine(node, texts.iter().map(String::as_str))
}

/// Aggregate every unit of a corpus.
#[instrument(level = "debug", skip(units), fields(units = units.len()))]
pub fn aggregate_all(units: &mut [Node], parallel: bool) {
    if parallel {
        units.par_iter_mut().for_each(|unit| {
            aggregate_parallel(unit);
        });
    } else {
        for unit in units.iter_mut() {
            aggregate(unit);
        }
    }
}

/// Clear the derived text of every internal node.
pub fn reset_derived(node: &mut Node) {
    if node.is_leaf() {
        return;
    }
    node.text = None;
    for child in node.children.iter_mut() {
        reset_derived(child);
    }
}

/// Non-empty leaf texts under `node`, left to right.
pub fn leaf_texts(node: &Node) -> Vec<&str> {
    let mut out = Vec::new();
    collect_leaf_texts(node, &mut out);
    out
}

fn collect_leaf_texts<'a>(node: &'a Node, out: &mut Vec<&'a str>) {
    if node.is_leaf() {
        if leaf_has_text(node) {
            if let Some(text) = node.text.as_deref() {
                out.push(text.trim());
            }
        }
        return;
    }
    for child in &node.children {
        collect_leaf_texts(child, out);
    }
}

/// Metadata and combined text of an internal node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParentExcerpt {
    pub level: String,
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span: Option<String>,
    pub text: String,
}

/// Every internal node carrying derived text, in pre-order across units.
///
/// Expects the units to have been aggregated.
pub fn parent_excerpts(units: &[Node]) -> Vec<ParentExcerpt> {
    let mut out = Vec::new();
    for unit in units {
        unit.walk(Order::Pre, &mut |node, _| {
            if node.is_leaf() {
                return;
            }
            if let Some(text) = &node.text {
                out.push(ParentExcerpt {
                    level: node.level.to_string(),
                    id: node.id.clone(),
                    title: node.title.clone(),
                    span: node.span.as_ref().map(SpanValue::to_string),
                    text: text.clone(),
                });
            }
        });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(id: &str, text: Option<&str>) -> Node {
        let node = Node::new("verse", id, id);
        match text {
            Some(t) => node.with_text(t),
            None => node,
        }
    }

    #[test]
    fn given_leaf_when_aggregating_then_reports_text_without_mutating() {
        let mut node = leaf("1", Some("  A  "));
        assert!(aggregate(&mut node));
        assert_eq!(node.text.as_deref(), Some("  A  "));

        let mut empty = leaf("2", Some("   "));
        assert!(!aggregate(&mut empty));
        assert_eq!(empty.text.as_deref(), Some("   "));
    }

    #[test]
    fn given_internal_without_leaf_text_when_aggregating_then_leaves_text_unset() {
        let mut node = Node::new("section", "1", "s")
            .with_children(vec![leaf("1.1", None), leaf("1.2", Some(""))]);

        assert!(!aggregate(&mut node));
        assert_eq!(node.text, None);
    }

    #[test]
    fn given_stale_derived_text_when_reset_then_only_internal_nodes_cleared() {
        let mut node = Node::new("section", "1", "s")
            .with_text("stale")
            .with_children(vec![leaf("1.1", Some("A"))]);

        reset_derived(&mut node);

        assert_eq!(node.text, None);
        assert_eq!(node.children[0].text.as_deref(), Some("A"));
    }
}
