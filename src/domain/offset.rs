//! Cross-unit verse-span renumbering.
//!
//! Each unit (e.g. a chapter) is numbered locally from 1. Combining units
//! into a corpus shifts every span of unit i by the total length of units
//! 0..i, and stamps the shifted value as the node's global span.

use tracing::{debug, instrument, warn};

use crate::domain::node::Node;
use crate::domain::span::SpanValue;

/// Offset applied to one unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitOffset {
    pub unit_id: String,
    pub offset: u32,
    /// Local upper bound of the unit's top-level span (0 when unparseable).
    pub length: u32,
}

/// A span that could not be rewritten and was left as it was.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpanWarning {
    pub path: String,
    pub raw: String,
}

/// Outcome of [`propagate`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Propagation {
    pub units: Vec<UnitOffset>,
    /// Running offset after the last unit.
    pub total: u32,
    pub warnings: Vec<SpanWarning>,
}

/// Local upper bound `K` of a unit: the end of its top-level span.
///
/// Missing or unparseable spans contribute 0.
pub fn unit_length(unit: &Node) -> u32 {
    match &unit.span {
        Some(SpanValue::Valid(span)) => span.end(),
        Some(SpanValue::Malformed(raw)) => {
            warn!(
                "could not parse top-level span '{}' of unit {}; counting 0 verses",
                raw, unit.id
            );
            0
        }
        None => {
            warn!("unit {} has no top-level span; counting 0 verses", unit.id);
            0
        }
    }
}

/// Shift every span in `node`'s subtree by `offset` and stamp the global span.
fn shift_subtree(node: &mut Node, offset: u32, path: &str, warnings: &mut Vec<SpanWarning>) {
    let path = format!("{path}/{}", node.id);
    match node.span.clone() {
        Some(SpanValue::Valid(span)) => match span.checked_shift(offset) {
            Some(shifted) => {
                let shifted = SpanValue::Valid(shifted);
                node.global_span = Some(shifted.clone());
                node.span = Some(shifted);
            }
            None => {
                warn!("span '{}' at {} overflows at offset {}; skipping update", span, path, offset);
                warnings.push(SpanWarning {
                    path: path.clone(),
                    raw: span.to_string(),
                });
            }
        },
        Some(SpanValue::Malformed(raw)) => {
            warn!("could not parse span '{}' at {}; skipping update", raw, path);
            warnings.push(SpanWarning {
                path: path.clone(),
                raw,
            });
        }
        None => {}
    }
    for child in node.children.iter_mut() {
        shift_subtree(child, offset, &path, warnings);
    }
}

/// Rewrite the spans of an ordered sequence of units with cumulative offsets.
///
/// Never fails: malformed spans, and spans that would overflow `u32`, are
/// preserved and reported in [`Propagation::warnings`]. The running offset
/// saturates at `u32::MAX`.
#[instrument(level = "debug", skip(units), fields(units = units.len()))]
pub fn propagate(units: &mut [Node]) -> Propagation {
    units
        .iter_mut()
        .enumerate()
        .fold(Propagation::default(), |mut acc, (i, unit)| {
            let length = unit_length(unit);
            let offset = acc.total;
            debug!("unit {} ({}): offset {}, length {}", i, unit.id, offset, length);
            shift_subtree(unit, offset, &format!("root[{i}]"), &mut acc.warnings);
            acc.units.push(UnitOffset {
                unit_id: unit.id.clone(),
                offset,
                length,
            });
            acc.total = offset.checked_add(length).unwrap_or_else(|| {
                warn!("running offset overflows after unit {}; saturating", unit.id);
                u32::MAX
            });
            acc
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::span::Span;

    #[test]
    fn given_unit_without_span_when_measuring_then_counts_zero() {
        let unit = Node::new("chapter", "1", "c");
        assert_eq!(unit_length(&unit), 0);
    }

    #[test]
    fn given_single_form_span_when_measuring_then_uses_value() {
        let unit = Node::new("chapter", "1", "c").with_span(Span::Single(7));
        assert_eq!(unit_length(&unit), 7);
    }

    #[test]
    fn given_no_units_when_propagating_then_total_is_zero() {
        let result = propagate(&mut []);
        assert_eq!(result, Propagation::default());
    }
}
