//! Attach externally produced annotations to an outline.
//!
//! The merger is stateless: every call performs a fresh lookup of every node
//! key in the store. Missing annotations are not errors; they are reported in
//! [`MergeStats`] so that the external generator can be re-run for exactly
//! those keys.

use std::collections::{BTreeMap, HashMap};

use tracing::{debug, instrument};

use crate::domain::annotation::Annotation;
use crate::domain::node::{Node, NodeKey};

/// Source of annotations, looked up by node key.
pub trait AnnotationStore {
    fn lookup(&self, key: &NodeKey) -> Option<Annotation>;
}

impl AnnotationStore for BTreeMap<NodeKey, Annotation> {
    fn lookup(&self, key: &NodeKey) -> Option<Annotation> {
        self.get(key).cloned()
    }
}

impl AnnotationStore for HashMap<NodeKey, Annotation> {
    fn lookup(&self, key: &NodeKey) -> Option<Annotation> {
        self.get(key).cloned()
    }
}

/// Which scratch fields are dropped from the merged copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScratchPolicy {
    /// Drop the authored text of leaves.
    pub strip_leaf_text: bool,
    /// Extra field names removed from every node.
    pub fields: Vec<String>,
}

impl Default for ScratchPolicy {
    fn default() -> Self {
        Self {
            strip_leaf_text: true,
            fields: Vec::new(),
        }
    }
}

/// Integration statistics of one merge.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergeStats {
    pub total_nodes: usize,
    pub integrated: usize,
    /// Keys without an annotation, in document order.
    pub missing: Vec<NodeKey>,
}

impl MergeStats {
    /// Share of nodes that received an annotation, in percent.
    pub fn integration_rate(&self) -> f64 {
        if self.total_nodes == 0 {
            return 0.0;
        }
        self.integrated as f64 / self.total_nodes as f64 * 100.0
    }

    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Copy of `node` without scratch fields, recursively.
pub fn strip_scratch(node: &Node, policy: &ScratchPolicy) -> Node {
    let mut copy = Node {
        level: node.level.clone(),
        id: node.id.clone(),
        title: node.title.clone(),
        span: node.span.clone(),
        global_span: node.global_span.clone(),
        text: node.text.clone(),
        annotation: node.annotation.clone(),
        extra: node.extra.clone(),
        children: node
            .children
            .iter()
            .map(|child| strip_scratch(child, policy))
            .collect(),
    };
    if copy.is_leaf() && policy.strip_leaf_text {
        copy.text = None;
    }
    copy.extra.retain(|k, _| !policy.fields.contains(k));
    copy
}

fn attach<S>(node: &mut Node, store: &S, stats: &mut MergeStats)
where
    S: AnnotationStore + ?Sized,
{
    let key = node.key();
    stats.total_nodes += 1;
    match store.lookup(&key) {
        Some(annotation) => {
            debug!("integrated annotation for {}", key);
            node.annotation = Some(annotation);
            stats.integrated += 1;
        }
        None => {
            debug!("no annotation for {}", key);
            stats.missing.push(key);
        }
    }
    for child in node.children.iter_mut() {
        attach(child, store, stats);
    }
}

/// Produce an annotated copy of `units`. The input is left untouched.
#[instrument(level = "debug", skip(units, store, policy), fields(units = units.len()))]
pub fn merge<S>(units: &[Node], store: &S, policy: &ScratchPolicy) -> (Vec<Node>, MergeStats)
where
    S: AnnotationStore + ?Sized,
{
    let mut stats = MergeStats::default();
    let merged = units
        .iter()
        .map(|unit| {
            let mut copy = strip_scratch(unit, policy);
            attach(&mut copy, store, &mut stats);
            copy
        })
        .collect();
    (merged, stats)
}

/// Keys of all nodes lacking an annotation in `store`, without building a copy.
pub fn pending_keys<S>(units: &[Node], store: &S) -> Vec<NodeKey>
where
    S: AnnotationStore + ?Sized,
{
    let mut pending = Vec::new();
    for unit in units {
        unit.walk(crate::domain::node::Order::Pre, &mut |node, _| {
            let key = node.key();
            if store.lookup(&key).is_none() {
                pending.push(key);
            }
        });
    }
    pending
}
