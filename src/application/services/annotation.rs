//! Annotation merge service
//!
//! Attaches generator artifacts from a summaries directory to an outline.

use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::application::services::outline::{Outline, OutlineService};
use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{merge, pending_keys, MergeStats, NodeKey, ScratchPolicy, Validator};
use crate::infrastructure::annotation_store::DirectoryAnnotationStore;
use crate::infrastructure::traits::FileSystem;

/// Result of an annotate run.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotateReport {
    pub stats: MergeStats,
    /// Artifact files present in the summaries directory.
    pub artifacts: usize,
}

/// Service merging stored annotations into outlines.
pub struct AnnotationService {
    fs: Arc<dyn FileSystem>,
    outline: OutlineService,
}

impl AnnotationService {
    pub fn new(fs: Arc<dyn FileSystem>, outline: OutlineService) -> Self {
        Self { fs, outline }
    }

    fn store(&self, summaries: &Path) -> ApplicationResult<DirectoryAnnotationStore> {
        if !self.fs.is_dir(summaries) {
            return Err(ApplicationError::NotFound(summaries.to_path_buf()));
        }
        Ok(DirectoryAnnotationStore::new(self.fs.clone(), summaries))
    }

    /// Validate `input`, merge annotations from `summaries` and write the result.
    pub fn annotate(
        &self,
        input: &Path,
        summaries: &Path,
        output: &Path,
        policy: &ScratchPolicy,
    ) -> ApplicationResult<AnnotateReport> {
        debug!(
            "annotate: input={} summaries={}",
            input.display(),
            summaries.display()
        );
        let outline = self.outline.load(input)?;
        Validator::new().check(&outline.units)?;
        let store = self.store(summaries)?;

        let (units, stats) = merge(&outline.units, &store, policy);
        self.outline.save(
            output,
            &Outline {
                units,
                is_list: outline.is_list,
            },
        )?;
        debug!(
            "annotate: integrated {}/{}",
            stats.integrated, stats.total_nodes
        );
        Ok(AnnotateReport {
            stats,
            artifacts: store.count_artifacts(),
        })
    }

    /// Keys of nodes in `input` without an artifact in `summaries`.
    pub fn pending(&self, input: &Path, summaries: &Path) -> ApplicationResult<Vec<NodeKey>> {
        let outline = self.outline.load(input)?;
        let store = self.store(summaries)?;
        Ok(pending_keys(&outline.units, &store))
    }
}
