//! Directory-backed annotation store
//!
//! One `<key>.json` artifact per node, as written by the external generator.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::domain::{Annotation, AnnotationArtifact, AnnotationStore, NodeKey};
use crate::infrastructure::json;
use crate::infrastructure::traits::FileSystem;

/// Annotation artifacts stored as JSON files in a directory.
pub struct DirectoryAnnotationStore {
    fs: Arc<dyn FileSystem>,
    dir: PathBuf,
}

impl DirectoryAnnotationStore {
    pub fn new(fs: Arc<dyn FileSystem>, dir: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            dir: dir.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Location of the artifact for `key`.
    pub fn artifact_path(&self, key: &NodeKey) -> PathBuf {
        self.dir.join(format!("{}.json", key.as_str()))
    }

    /// Number of `.json` files directly inside the store directory.
    pub fn count_artifacts(&self) -> usize {
        WalkDir::new(&self.dir)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_file())
            .filter(|e| e.path().extension().is_some_and(|ext| ext == "json"))
            .count()
    }

    fn read(&self, key: &NodeKey) -> Option<AnnotationArtifact> {
        let path = self.artifact_path(key);
        if !self.fs.is_file(&path) {
            return None;
        }
        let content = match self.fs.read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                warn!("cannot read artifact {}: {}", path.display(), e);
                return None;
            }
        };
        match json::from_str(&content).and_then(serde_json::from_value::<AnnotationArtifact>) {
            Ok(artifact) => Some(artifact),
            Err(e) => {
                warn!("cannot decode artifact {}: {}", path.display(), e);
                None
            }
        }
    }
}

impl AnnotationStore for DirectoryAnnotationStore {
    fn lookup(&self, key: &NodeKey) -> Option<Annotation> {
        let artifact = self.read(key)?;
        if !artifact.key.is_empty() && artifact.key != key.as_str() {
            warn!(
                "artifact for {} names key '{}'; using it anyway",
                key, artifact.key
            );
        }
        match artifact.annotation {
            Some(annotation) => {
                debug!("lookup: found {}", key);
                Some(annotation)
            }
            None => {
                warn!("artifact for {} has no summary payload; treating as missing", key);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::traits::RealFileSystem;
    use tempfile::TempDir;

    #[test]
    fn given_artifact_files_when_looking_up_then_returns_payload_or_none() {
        // Arrange
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("chapter-1.json"),
            r#"{"level": "chapter-1", "summary": {"content_summary": "opening"}}"#,
        )
        .unwrap();
        std::fs::write(
            dir.path().join("chapter-4.json"),
            r#"{"level": "chapter-4", "summary": null}"#,
        )
        .unwrap();
        std::fs::write(dir.path().join("chapter-2.json"), "not json").unwrap();
        let store = DirectoryAnnotationStore::new(Arc::new(RealFileSystem), dir.path());

        // Act / Assert
        let found = store.lookup(&NodeKey::from("chapter-1")).unwrap();
        assert_eq!(found.get("content_summary"), Some(&serde_json::Value::from("opening")));
        assert!(store.lookup(&NodeKey::from("chapter-2")).is_none());
        assert!(store.lookup(&NodeKey::from("chapter-3")).is_none());
        assert!(store.lookup(&NodeKey::from("chapter-4")).is_none());
        assert_eq!(store.count_artifacts(), 3);
    }
}
