//! Outline document service
//!
//! Loads and saves outline documents and runs the single-document operations:
//! aggregation, parent excerpt export, scratch stripping, segment fill and display.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use termtree::Tree;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::segments::{fill_segments, SegmentFill};
use crate::domain::{
    aggregate_all, parent_excerpts, parse_document, strip_scratch, Node, Order, ScratchPolicy,
    Validator,
};
use crate::infrastructure::json;
use crate::infrastructure::traits::FileSystem;

/// A loaded outline document.
#[derive(Debug, Clone, PartialEq)]
pub struct Outline {
    pub units: Vec<Node>,
    /// The document was a list of units rather than a single node object.
    pub is_list: bool,
}

impl Outline {
    pub fn list(units: Vec<Node>) -> Self {
        Self { units, is_list: true }
    }

    /// Total node count across all units.
    pub fn node_count(&self) -> usize {
        self.units.iter().map(Node::count).sum()
    }
}

/// Summary of an aggregation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateReport {
    pub nodes: usize,
    /// Internal nodes that received combined text.
    pub with_text: usize,
}

/// Per-file result of [`OutlineService::count_root_lines`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineCount {
    pub path: PathBuf,
    pub lines: usize,
}

/// Service for outline documents on disk.
#[derive(Clone)]
pub struct OutlineService {
    fs: Arc<dyn FileSystem>,
    indent: usize,
}

impl OutlineService {
    /// Create a new outline service writing JSON with `indent` spaces.
    pub fn new(fs: Arc<dyn FileSystem>, indent: usize) -> Self {
        Self { fs, indent }
    }

    /// Read, structurally check and parse an outline document.
    pub fn load(&self, path: &Path) -> ApplicationResult<Outline> {
        debug!("load: path={}", path.display());
        if !self.fs.exists(path) {
            return Err(ApplicationError::NotFound(path.to_path_buf()));
        }
        let content = self
            .fs
            .read_to_string(path)
            .with_path_context("read outline", path)?;
        let raw = json::from_str(&content).with_path_context("decode outline", path)?;
        Validator::new().check_document(&raw)?;
        let units = parse_document(&raw)?;
        debug!("load: {} units", units.len());
        Ok(Outline {
            units,
            is_list: raw.is_array(),
        })
    }

    /// Write an outline in the shape it was loaded in.
    pub fn save(&self, path: &Path, outline: &Outline) -> ApplicationResult<()> {
        match outline.units.as_slice() {
            [single] if !outline.is_list => self.write_json(path, single),
            units => self.write_json(path, units),
        }
    }

    /// Serialize any value to `path` with the configured indentation.
    pub fn write_json<T: Serialize + ?Sized>(&self, path: &Path, value: &T) -> ApplicationResult<()> {
        debug!("write_json: path={}", path.display());
        let rendered = json::to_pretty_string(value, self.indent)
            .with_path_context("encode output", path)?;
        self.fs
            .ensure_parent(path)
            .with_path_context("create parent directory", path)?;
        self.fs
            .write(path, &rendered)
            .with_path_context("write output", path)
    }

    /// Parse, aggregate, validate and write an outline.
    pub fn aggregate(
        &self,
        input: &Path,
        output: &Path,
        parallel: bool,
    ) -> ApplicationResult<AggregateReport> {
        let mut outline = self.load(input)?;
        aggregate_all(&mut outline.units, parallel);
        Validator::new().check(&outline.units)?;

        let mut with_text = 0;
        for unit in &outline.units {
            unit.walk(Order::Pre, &mut |node, _| {
                if !node.is_leaf() && node.text.is_some() {
                    with_text += 1;
                }
            });
        }
        self.save(output, &outline)?;
        Ok(AggregateReport {
            nodes: outline.node_count(),
            with_text,
        })
    }

    /// Aggregate an outline and write the metadata and text of each internal node.
    pub fn export_parents(&self, input: &Path, output: &Path, parallel: bool) -> ApplicationResult<usize> {
        let mut outline = self.load(input)?;
        aggregate_all(&mut outline.units, parallel);
        let excerpts = parent_excerpts(&outline.units);
        self.write_json(output, &excerpts)?;
        Ok(excerpts.len())
    }

    /// Remove leaf text and scratch fields from every node.
    pub fn strip(&self, input: &Path, output: &Path, policy: &ScratchPolicy) -> ApplicationResult<usize> {
        let outline = self.load(input)?;
        let stripped = Outline {
            units: outline
                .units
                .iter()
                .map(|unit| strip_scratch(unit, policy))
                .collect(),
            is_list: outline.is_list,
        };
        self.save(output, &stripped)?;
        Ok(stripped.node_count())
    }

    /// Fill leaf text from line ranges of a root text file.
    pub fn fill_segments(
        &self,
        input: &Path,
        root_text: &Path,
        output: &Path,
    ) -> ApplicationResult<SegmentFill> {
        let mut outline = self.load(input)?;
        let text = self
            .fs
            .read_to_string(root_text)
            .with_path_context("read root text", root_text)?;
        let fill = fill_segments(&mut outline.units, &text);
        debug!(
            "fill_segments: filled={} skipped={}",
            fill.filled,
            fill.skipped.len()
        );
        self.save(output, &outline)?;
        Ok(fill)
    }

    /// Count non-empty lines of every `*root*bo.txt` file under `dir`.
    pub fn count_root_lines(&self, dir: &Path) -> ApplicationResult<Vec<LineCount>> {
        if !self.fs.is_dir(dir) {
            return Err(ApplicationError::NotFound(dir.to_path_buf()));
        }
        let mut counts = Vec::new();
        for entry in WalkDir::new(dir).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("skipping unreadable entry: {}", e);
                    continue;
                }
            };
            if !entry.file_type().is_file() || !is_root_text(entry.path()) {
                continue;
            }
            let content = self
                .fs
                .read_to_string(entry.path())
                .with_path_context("read root text", entry.path())?;
            counts.push(LineCount {
                path: entry.path().to_path_buf(),
                lines: content.lines().filter(|l| !l.trim().is_empty()).count(),
            });
        }
        Ok(counts)
    }
}

fn is_root_text(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|name| name.contains("root") && name.ends_with("bo.txt"))
}

fn label(node: &Node) -> String {
    let mut label = format!("{} {}", node.level, node.id);
    if !node.title.is_empty() {
        label.push_str(&format!(": {}", node.title));
    }
    if let Some(span) = &node.span {
        label.push_str(&format!(" [{span}]"));
    }
    label
}

/// Content summary of the node's annotation, when it has a readable one.
fn summary(node: &Node) -> Option<String> {
    node.annotation
        .as_ref()
        .and_then(|a| a.view())
        .map(|view| view.content_summary)
        .filter(|s| !s.trim().is_empty())
}

/// Render a unit and its subtree as a tree, optionally with annotation summaries.
pub fn outline_tree(node: &Node, summaries: bool) -> Tree<String> {
    let mut text = label(node);
    if summaries {
        if let Some(summary) = summary(node) {
            text.push_str(&format!(" - {summary}"));
        }
    }
    Tree::new(text).with_leaves(node.children.iter().map(|child| outline_tree(child, summaries)))
}

/// One label per top-level unit.
pub fn top_level(units: &[Node]) -> Vec<String> {
    units.iter().map(label).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Annotation, Span};
    use serde_json::json;

    #[test]
    fn given_nested_node_when_rendering_tree_then_shows_every_label() {
        let node = Node::new("chapter", "1", "Intro")
            .with_span(Span::Single(3))
            .with_children(vec![Node::new("section", "1.1", "")]);

        let rendered = outline_tree(&node, false).to_string();

        assert!(rendered.starts_with("chapter 1: Intro [3]\n"));
        assert!(rendered.contains("section 1.1"));
    }

    #[test]
    fn given_annotated_nodes_when_rendering_with_summaries_then_appends_readable_ones() {
        let mut node = Node::new("chapter", "1", "Intro")
            .with_children(vec![Node::new("section", "1.1", "S")]);
        node.annotation = Some(Annotation::new(json!({"content_summary": "opening"})));
        node.children[0].annotation = Some(Annotation::new(json!({"key_concepts": "a, b"})));

        let rendered = outline_tree(&node, true).to_string();

        assert!(rendered.starts_with("chapter 1: Intro - opening\n"));
        assert!(rendered.contains("section 1.1: S"));
        assert!(!rendered.contains("S - "));
        assert!(!outline_tree(&node, false).to_string().contains("opening"));
    }

    #[test]
    fn given_file_names_when_matching_root_text_then_requires_both_markers() {
        assert!(is_root_text(Path::new("a/chapter_root_bo.txt")));
        assert!(!is_root_text(Path::new("a/chapter_bo.txt")));
        assert!(!is_root_text(Path::new("a/root_en.txt")));
    }
}
