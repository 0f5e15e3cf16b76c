//! Outline nodes: parse, walk, and canonical serialization.

use std::fmt;

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Value};
use tracing::instrument;

use crate::domain::annotation::Annotation;
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::span::{Span, SpanValue};

/// Structural tag of a node (chapter, section, subsection, ...).
///
/// The set is open: whatever the input says is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Level(String);

impl Level {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Level {
    fn from(tag: &str) -> Self {
        Self::new(tag)
    }
}

/// Deterministic per-node key used to name annotation artifacts,
/// e.g. `section-1-1` for a section with id `1.1`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeKey(String);

impl NodeKey {
    pub fn new(level: &Level, id: &str) -> Self {
        Self(format!("{}-{}", level.as_str(), id.replace('.', "-")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeKey {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}

/// Traversal order for [`Node::walk`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Pre,
    Post,
}

/// One node of an outline. A parent exclusively owns its children.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub level: Level,
    pub id: String,
    pub title: String,
    pub span: Option<SpanValue>,
    pub global_span: Option<SpanValue>,
    pub text: Option<String>,
    pub annotation: Option<Annotation>,
    /// Input fields without a dedicated slot, carried through unchanged.
    pub extra: Map<String, Value>,
    pub children: Vec<Node>,
}

const LEVEL: &str = "level";
const ID: [&str; 2] = ["id", "number"];
const TITLE: &str = "title";
const SPAN: [&str; 2] = ["span", "verses_span"];
const GLOBAL_SPAN: [&str; 2] = ["global_span", "global_verses_span"];
const TEXT: [&str; 2] = ["text", "verse_text_excerpt"];
const ANNOTATION: [&str; 2] = ["annotation", "summary"];
const CHILDREN: &str = "children";

impl Node {
    pub fn new(level: impl Into<Level>, id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            level: level.into(),
            id: id.into(),
            title: title.into(),
            span: None,
            global_span: None,
            text: None,
            annotation: None,
            extra: Map::new(),
            children: Vec::new(),
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(SpanValue::Valid(span));
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = children;
        self
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn key(&self) -> NodeKey {
        NodeKey::new(&self.level, &self.id)
    }

    /// Parse a single node object (and its subtree).
    #[instrument(level = "trace", skip(raw))]
    pub fn parse(raw: &Value) -> DomainResult<Node> {
        parse_node(raw, "root")
    }

    /// Visit every node with its depth (root = 0).
    pub fn walk<F>(&self, order: Order, visitor: &mut F)
    where
        F: FnMut(&Node, usize),
    {
        self.walk_at(order, 0, visitor);
    }

    fn walk_at<F>(&self, order: Order, depth: usize, visitor: &mut F)
    where
        F: FnMut(&Node, usize),
    {
        if order == Order::Pre {
            visitor(self, depth);
        }
        for child in &self.children {
            child.walk_at(order, depth + 1, visitor);
        }
        if order == Order::Post {
            visitor(self, depth);
        }
    }

    /// Number of nodes in this subtree, including self.
    pub fn count(&self) -> usize {
        let mut n = 0;
        self.walk(Order::Pre, &mut |_, _| n += 1);
        n
    }
}

/// Parse a unit document: a single node object, or a sequence of node objects.
pub fn parse_document(raw: &Value) -> DomainResult<Vec<Node>> {
    match raw {
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, item)| parse_node(item, &format!("root[{i}]")))
            .collect(),
        Value::Object(_) => Ok(vec![parse_node(raw, "root[0]")?]),
        other => Err(DomainError::format(
            "root",
            format!("expected a node or a list of nodes, found {}", kind(other)),
        )),
    }
}

pub(crate) fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

fn lookup<'a>(obj: &'a Map<String, Value>, names: &[&str]) -> Option<&'a Value> {
    names
        .iter()
        .find_map(|name| obj.get(*name))
        .filter(|v| !v.is_null())
}

fn required_string(obj: &Map<String, Value>, names: &[&str], path: &str) -> DomainResult<String> {
    match lookup(obj, names) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(other) => Err(DomainError::format(
            path,
            format!("field '{}' must be a string, found {}", names[0], kind(other)),
        )),
        None => Err(DomainError::format(
            path,
            format!("missing required field '{}'", names[0]),
        )),
    }
}

fn span_value(value: &Value) -> SpanValue {
    match value {
        Value::String(s) => SpanValue::parse(s),
        Value::Number(n) => SpanValue::parse(&n.to_string()),
        other => SpanValue::Malformed(other.to_string()),
    }
}

/// Path segment naming a node, as used in error reports: its id when it has one.
pub(crate) fn path_segment(obj: &Map<String, Value>) -> String {
    match lookup(obj, &ID) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => "unknown".to_string(),
    }
}

fn parse_node(raw: &Value, parent_path: &str) -> DomainResult<Node> {
    let obj = raw.as_object().ok_or_else(|| {
        DomainError::format(
            parent_path,
            format!("expected a node object, found {}", kind(raw)),
        )
    })?;
    let path = format!("{parent_path}/{}", path_segment(obj));

    let level = Level::new(required_string(obj, &[LEVEL], &path)?);
    let id = required_string(obj, &ID, &path)?;
    let title = required_string(obj, &[TITLE], &path)?;

    let span = lookup(obj, &SPAN).map(span_value);
    let global_span = lookup(obj, &GLOBAL_SPAN).map(span_value);

    let text = match lookup(obj, &TEXT) {
        None => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(other) => {
            return Err(DomainError::format(
                &path,
                format!("field 'text' must be a string, found {}", kind(other)),
            ))
        }
    };

    let annotation = lookup(obj, &ANNOTATION).cloned().map(Annotation::from);

    let children = match obj.get(CHILDREN) {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| parse_node(item, &path))
            .collect::<DomainResult<Vec<_>>>()?,
        Some(other) => {
            return Err(DomainError::format(
                &path,
                format!("'children' must be an ordered sequence, found {}", kind(other)),
            ))
        }
    };

    let known = |key: &str| {
        key == LEVEL
            || key == TITLE
            || key == CHILDREN
            || ID.contains(&key)
            || SPAN.contains(&key)
            || GLOBAL_SPAN.contains(&key)
            || TEXT.contains(&key)
            || ANNOTATION.contains(&key)
    };
    let extra = obj
        .iter()
        .filter(|(k, _)| !known(k))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    Ok(Node {
        level,
        id,
        title,
        span,
        global_span,
        text,
        annotation,
        extra,
        children,
    })
}

/// Fields are emitted in a fixed order: level, id, title, span, global_span,
/// text, extra fields, annotation, children. Absent fields are omitted.
impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry(LEVEL, self.level.as_str())?;
        map.serialize_entry(ID[0], &self.id)?;
        map.serialize_entry(TITLE, &self.title)?;
        if let Some(span) = &self.span {
            map.serialize_entry(SPAN[0], &span.to_string())?;
        }
        if let Some(global) = &self.global_span {
            map.serialize_entry(GLOBAL_SPAN[0], &global.to_string())?;
        }
        if let Some(text) = &self.text {
            map.serialize_entry(TEXT[0], text)?;
        }
        for (k, v) in &self.extra {
            map.serialize_entry(k, v)?;
        }
        if let Some(annotation) = &self.annotation {
            map.serialize_entry(ANNOTATION[0], annotation)?;
        }
        if !self.children.is_empty() {
            map.serialize_entry(CHILDREN, &self.children)?;
        }
        map.end()
    }
}
