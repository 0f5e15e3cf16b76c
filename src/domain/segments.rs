//! Author leaf text from line ranges of a root text.

use serde_json::Value;
use tracing::warn;

use crate::domain::node::Node;
use crate::domain::span::Span;

/// Extra field holding a leaf's 1-based line range into the root text.
pub const SEGMENTS_FIELD: &str = "segments_span";

/// Outcome of [`fill_segments`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SegmentFill {
    pub filled: usize,
    /// Leaves whose range could not be resolved: (path, reason).
    pub skipped: Vec<(String, String)>,
}

/// Lines `span.start()..=span.end()` of `lines`, joined with newlines.
pub fn extract_segment(lines: &[&str], span: Span) -> Option<String> {
    let start = span.start() as usize;
    let end = span.end() as usize;
    if start == 0 || end > lines.len() {
        return None;
    }
    Some(lines[start - 1..end].join("\n"))
}

/// Set the text of every leaf carrying a `segments_span` field.
pub fn fill_segments(units: &mut [Node], root_text: &str) -> SegmentFill {
    let lines: Vec<&str> = root_text.lines().collect();
    let mut fill = SegmentFill::default();
    for (i, unit) in units.iter_mut().enumerate() {
        fill_node(unit, &lines, &format!("root[{i}]"), &mut fill);
    }
    fill
}

fn fill_node(node: &mut Node, lines: &[&str], parent_path: &str, fill: &mut SegmentFill) {
    let path = format!("{parent_path}/{}", node.id);
    if !node.is_leaf() {
        for child in node.children.iter_mut() {
            fill_node(child, lines, &path, fill);
        }
        return;
    }
    let Some(raw) = node.extra.get(SEGMENTS_FIELD) else {
        return;
    };
    let resolved = match raw {
        Value::String(s) => s
            .parse::<Span>()
            .map_err(|e| e.to_string())
            .and_then(|span| {
                extract_segment(lines, span).ok_or_else(|| {
                    format!("span '{s}' is outside a text of {} lines", lines.len())
                })
            }),
        other => Err(format!("'{SEGMENTS_FIELD}' must be a string, found {other}")),
    };
    match resolved {
        Ok(text) => {
            node.text = Some(text);
            fill.filled += 1;
        }
        Err(reason) => {
            warn!("skipping segment at {}: {}", path, reason);
            fill.skipped.push((path, reason));
        }
    }
}
