//! Corpus assembly service
//!
//! Discovers per-unit outline files under a root directory, aggregates them,
//! renumbers their spans into one global sequence and writes the combined corpus.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use regex::Regex;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::application::services::outline::{Outline, OutlineService};
use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{aggregate_all, continuity, propagate, Continuity, Propagation, Validator};
use crate::infrastructure::traits::FileSystem;

/// Result of combining a corpus.
#[derive(Debug, Clone, PartialEq)]
pub struct CombineReport {
    /// Unit files that were merged, in corpus order.
    pub sources: Vec<PathBuf>,
    pub propagation: Propagation,
    pub continuity: Continuity,
}

/// Service for discovering, combining and verifying corpora.
pub struct CorpusService {
    fs: Arc<dyn FileSystem>,
    outline: OutlineService,
}

impl CorpusService {
    pub fn new(fs: Arc<dyn FileSystem>, outline: OutlineService) -> Self {
        Self { fs, outline }
    }

    /// Unit files `<root>/<subdir>/<unit_file_name>`, ordered by the first
    /// integer in the subdirectory name.
    ///
    /// Subdirectories without a number sort last, by name. Subdirectories
    /// lacking the unit file are skipped with a warning.
    pub fn discover(&self, root: &Path, unit_file_name: &str) -> ApplicationResult<Vec<PathBuf>> {
        debug!("discover: root={} file={}", root.display(), unit_file_name);
        if !self.fs.is_dir(root) {
            return Err(ApplicationError::NotFound(root.to_path_buf()));
        }
        let number = Regex::new(r"\d+").map_err(|e| ApplicationError::OperationFailed {
            context: "compile unit number pattern".to_string(),
            source: Box::new(e),
        })?;

        let mut dirs: Vec<(Option<u64>, String, PathBuf)> = WalkDir::new(root)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!("skipping unreadable entry: {}", e);
                    None
                }
            })
            .filter(|e| e.file_type().is_dir())
            .map(|e| {
                let name = e.file_name().to_string_lossy().into_owned();
                let n = number
                    .find(&name)
                    .and_then(|m| m.as_str().parse::<u64>().ok());
                (n, name, e.into_path())
            })
            .collect();
        dirs.sort_by(|a, b| (a.0.is_none(), a.0, &a.1).cmp(&(b.0.is_none(), b.0, &b.1)));

        let mut units = Vec::new();
        for (_, name, dir) in dirs {
            let file = dir.join(unit_file_name);
            if self.fs.is_file(&file) {
                units.push(file);
            } else {
                warn!("unit {} has no {}; skipping", name, unit_file_name);
            }
        }
        if units.is_empty() {
            return Err(ApplicationError::NoUnits(root.to_path_buf()));
        }
        debug!("discover: {} units", units.len());
        Ok(units)
    }

    /// Aggregate every discovered unit, propagate span offsets and write the corpus.
    pub fn combine(
        &self,
        root: &Path,
        unit_file_name: &str,
        output: &Path,
        parallel: bool,
    ) -> ApplicationResult<CombineReport> {
        let sources = self.discover(root, unit_file_name)?;

        let mut units = Vec::with_capacity(sources.len());
        for source in &sources {
            let loaded = self.outline.load(source)?;
            let count = loaded.units.len();
            match loaded.units.into_iter().next() {
                Some(unit) => {
                    if count > 1 {
                        warn!(
                            "{} holds {} units; using the first",
                            source.display(),
                            count
                        );
                    }
                    units.push(unit);
                }
                None => warn!("{} holds no unit; skipping", source.display()),
            }
        }

        aggregate_all(&mut units, parallel);
        let propagation = propagate(&mut units);
        for w in &propagation.warnings {
            warn!("left span '{}' unchanged at {}", w.raw, w.path);
        }
        Validator::new().check(&units)?;
        let continuity = continuity(&units);

        self.outline.save(output, &Outline::list(units))?;
        info!(
            "combined {} units ({} verses) into {}",
            sources.len(),
            propagation.total,
            output.display()
        );
        Ok(CombineReport {
            sources,
            propagation,
            continuity,
        })
    }

    /// Scan a combined corpus for the first global-span discontinuity.
    pub fn verify(&self, corpus: &Path) -> ApplicationResult<Continuity> {
        let outline = self.outline.load(corpus)?;
        let report = continuity(&outline.units);
        debug!(
            "verify: contiguous={} last_end={}",
            report.is_contiguous(),
            report.last_end
        );
        Ok(report)
    }
}
