//! Domain layer: the outline tree and its algorithms
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod aggregate;
pub mod annotation;
pub mod error;
pub mod merge;
pub mod node;
pub mod offset;
pub mod segments;
pub mod span;
pub mod validate;

pub use aggregate::{aggregate, aggregate_all, aggregate_parallel, parent_excerpts, reset_derived, ParentExcerpt};
pub use annotation::{Annotation, AnnotationArtifact, AnnotationView, Relationship};
pub use error::{DomainError, DomainResult};
pub use merge::{merge, pending_keys, strip_scratch, AnnotationStore, MergeStats, ScratchPolicy};
pub use node::{parse_document, Level, Node, NodeKey, Order};
pub use offset::{propagate, Propagation, SpanWarning, UnitOffset};
pub use span::{Span, SpanValue};
pub use validate::{continuity, Check, Continuity, Gap, Validator, Violation};
