//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on the FileSystem boundary trait
//! but are themselves concrete structs, not traits.

mod annotation;
mod corpus;
mod outline;

pub use annotation::{AnnotateReport, AnnotationService};
pub use corpus::{CombineReport, CorpusService};
pub use outline::{outline_tree, top_level, AggregateReport, LineCount, Outline, OutlineService};
