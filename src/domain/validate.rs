//! Structural and numeric checks run before an outline is persisted.
//!
//! Validation stops at the first violation and reports the offending node's
//! path together with the failed check. Nothing is repaired.

use std::collections::HashSet;
use std::fmt;

use serde_json::{Map, Value};
use tracing::{debug, instrument};

use crate::domain::node::{kind, path_segment, Node};
use crate::domain::span::SpanValue;

/// The check a node failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Check {
    NotAnObject { found: &'static str },
    MissingField(&'static str),
    ChildrenNotSequence { found: &'static str },
    DuplicateSiblingId(String),
    InvertedSpan(String),
    MissingGlobalSpan,
    SpanGap { previous_end: u32, start: u32 },
}

impl fmt::Display for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Check::NotAnObject { found } => write!(f, "expected a node object, found {found}"),
            Check::MissingField(field) => write!(f, "missing required field '{field}'"),
            Check::ChildrenNotSequence { found } => {
                write!(f, "'children' must be an ordered sequence, found {found}")
            }
            Check::DuplicateSiblingId(id) => write!(f, "duplicate sibling id '{id}'"),
            Check::InvertedSpan(raw) => write!(f, "span '{raw}' ends before it starts"),
            Check::MissingGlobalSpan => write!(f, "unit has no global span"),
            Check::SpanGap {
                previous_end,
                start,
            } => write!(
                f,
                "global spans not contiguous: previous unit ends at {previous_end}, this unit starts at {start}"
            ),
        }
    }
}

/// First failed check and where it failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub path: String,
    pub check: Check,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.check)
    }
}

impl std::error::Error for Violation {}

/// Validator configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct Validator {
    /// Also require contiguous global spans across top-level units.
    pub contiguity: bool,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contiguity(mut self) -> Self {
        self.contiguity = true;
        self
    }

    /// Structural checks on an unparsed document (a node or a list of nodes).
    #[instrument(level = "debug", skip(self, raw))]
    pub fn check_document(&self, raw: &Value) -> Result<(), Violation> {
        match raw {
            Value::Array(items) => items
                .iter()
                .enumerate()
                .try_for_each(|(i, item)| check_raw_node(item, &format!("root[{i}]"))),
            other => check_raw_node(other, "root[0]"),
        }
    }

    /// Invariant checks on parsed units.
    #[instrument(level = "debug", skip(self, units), fields(units = units.len()))]
    pub fn check(&self, units: &[Node]) -> Result<(), Violation> {
        check_siblings(units, "root")?;
        for (i, unit) in units.iter().enumerate() {
            check_node(unit, &format!("root[{i}]"))?;
        }
        if self.contiguity {
            check_contiguity(units)?;
        }
        debug!("validation passed");
        Ok(())
    }

    pub fn validate(&self, units: &[Node]) -> bool {
        self.check(units).is_ok()
    }
}

fn violation(path: &str, check: Check) -> Violation {
    Violation {
        path: path.to_string(),
        check,
    }
}

fn has_field(obj: &Map<String, Value>, names: &[&str]) -> bool {
    names
        .iter()
        .any(|name| obj.get(*name).is_some_and(|v| !v.is_null()))
}

fn check_raw_node(raw: &Value, parent_path: &str) -> Result<(), Violation> {
    let obj = raw.as_object().ok_or_else(|| {
        violation(
            parent_path,
            Check::NotAnObject { found: kind(raw) },
        )
    })?;
    let path = format!("{parent_path}/{}", path_segment(obj));

    for (field, names) in [
        ("level", &["level"][..]),
        ("id", &["id", "number"][..]),
        ("title", &["title"][..]),
    ] {
        if !has_field(obj, names) {
            return Err(violation(&path, Check::MissingField(field)));
        }
    }

    match obj.get("children") {
        None | Some(Value::Null) => Ok(()),
        Some(Value::Array(children)) => children
            .iter()
            .try_for_each(|child| check_raw_node(child, &path)),
        Some(other) => Err(violation(
            &path,
            Check::ChildrenNotSequence { found: kind(other) },
        )),
    }
}

fn check_siblings(siblings: &[Node], parent_path: &str) -> Result<(), Violation> {
    let mut seen = HashSet::new();
    for node in siblings {
        if !seen.insert(node.id.as_str()) {
            return Err(violation(
                &format!("{parent_path}/{}", node.id),
                Check::DuplicateSiblingId(node.id.clone()),
            ));
        }
    }
    Ok(())
}

fn check_node(node: &Node, parent_path: &str) -> Result<(), Violation> {
    let path = format!("{parent_path}/{}", node.id);
    for span in [&node.span, &node.global_span].into_iter().flatten() {
        if span.is_inverted() {
            return Err(violation(&path, Check::InvertedSpan(span.to_string())));
        }
    }
    check_siblings(&node.children, &path)?;
    node.children
        .iter()
        .try_for_each(|child| check_node(child, &path))
}

/// Discontinuity between two consecutive units (a gap or an overlap).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gap {
    pub unit_id: String,
    pub previous_end: u32,
    pub start: u32,
}

/// Outcome of a global-span continuity scan over top-level units.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Continuity {
    pub gap: Option<Gap>,
    /// Units lacking a parseable global span (skipped by the scan).
    pub unstamped: Vec<String>,
    /// End of the last unit scanned.
    pub last_end: u32,
}

impl Continuity {
    pub fn is_contiguous(&self) -> bool {
        self.gap.is_none()
    }
}

/// Scan top-level units for the first discontinuity in their global spans.
pub fn continuity(units: &[Node]) -> Continuity {
    let mut report = Continuity::default();
    for unit in units {
        let Some(span) = unit.global_span.as_ref().and_then(SpanValue::as_span) else {
            report.unstamped.push(unit.id.clone());
            continue;
        };
        if span.start() != report.last_end + 1 {
            report.gap = Some(Gap {
                unit_id: unit.id.clone(),
                previous_end: report.last_end,
                start: span.start(),
            });
            return report;
        }
        report.last_end = span.end();
    }
    report
}

fn check_contiguity(units: &[Node]) -> Result<(), Violation> {
    let mut last_end = 0;
    for (i, unit) in units.iter().enumerate() {
        let path = format!("root[{i}]/{}", unit.id);
        let Some(span) = unit.global_span.as_ref().and_then(SpanValue::as_span) else {
            return Err(violation(&path, Check::MissingGlobalSpan));
        };
        if span.start() != last_end + 1 {
            return Err(violation(
                &path,
                Check::SpanGap {
                    previous_end: last_end,
                    start: span.start(),
                },
            ));
        }
        last_end = span.end();
    }
    Ok(())
}
