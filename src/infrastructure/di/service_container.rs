//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::sync::Arc;

use crate::application::services::{AnnotationService, CorpusService, OutlineService};
use crate::config::Settings;
use crate::domain::ScratchPolicy;
use crate::infrastructure::traits::{FileSystem, RealFileSystem};

/// Container holding all application services.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,

    pub outline: OutlineService,
    pub corpus: CorpusService,
    pub annotation: AnnotationService,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> Self {
        Self::with_deps(settings, Arc::new(RealFileSystem))
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(settings: Settings, fs: Arc<dyn FileSystem>) -> Self {
        let settings = Arc::new(settings);
        let outline = OutlineService::new(fs.clone(), settings.output.indent);
        let corpus = CorpusService::new(fs.clone(), outline.clone());
        let annotation = AnnotationService::new(fs.clone(), outline.clone());

        Self {
            settings,
            fs,
            outline,
            corpus,
            annotation,
        }
    }

    /// Scratch policy derived from the `annotate` settings.
    pub fn scratch_policy(&self) -> ScratchPolicy {
        ScratchPolicy {
            strip_leaf_text: self.settings.annotate.strip_leaf_text,
            fields: self.settings.annotate.scratch_fields.clone(),
        }
    }
}
