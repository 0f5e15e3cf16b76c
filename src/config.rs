//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/versetree/versetree.toml`
//! 3. Local config: `./.versetree.toml`, or the file given with `--config`
//! 4. Environment variables: `VERSETREE_*` prefix (`__` between section and key)

use std::path::{Path, PathBuf};

use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use config::builder::DefaultState;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;

/// Name of the local config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = ".versetree.toml";

/// Unit discovery and corpus output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CorpusConfig {
    /// File name of a unit outline inside each unit subdirectory
    pub unit_file_name: String,
    /// File name of the combined corpus written under the corpus root
    pub combined_file_name: String,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            unit_file_name: "MLS_en.json".into(),
            combined_file_name: "combined_MLS_en.json".into(),
        }
    }
}

/// Annotation merge settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AnnotateConfig {
    /// Directory holding `<key>.json` annotation artifacts
    pub summaries_dir: PathBuf,
    /// Drop leaf text from the annotated copy
    pub strip_leaf_text: bool,
    /// Extra fields removed from every node of the annotated copy
    pub scratch_fields: Vec<String>,
}

impl Default for AnnotateConfig {
    fn default() -> Self {
        Self {
            summaries_dir: PathBuf::from("summaries"),
            strip_leaf_text: true,
            scratch_fields: vec!["segment_text".into()],
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AggregateConfig {
    /// Aggregate sibling subtrees on the rayon pool
    pub parallel: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct OutputConfig {
    /// Spaces per indentation level of written JSON
    pub indent: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { indent: 2 }
    }
}

/// Unified configuration for versetree.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    pub corpus: CorpusConfig,
    pub annotate: AnnotateConfig,
    pub aggregate: AggregateConfig,
    pub output: OutputConfig,
}

/// Get the XDG config directory for versetree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "versetree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("versetree.toml"))
}

/// Get the path to the local config file in the working directory.
pub fn local_config_path() -> PathBuf {
    PathBuf::from(LOCAL_CONFIG_FILE)
}

fn with_defaults(
    mut builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ApplicationError> {
    let defaults = Settings::default();
    builder = builder
        .set_default("corpus.unit_file_name", defaults.corpus.unit_file_name)
        .map_err(config_err)?
        .set_default("corpus.combined_file_name", defaults.corpus.combined_file_name)
        .map_err(config_err)?
        .set_default(
            "annotate.summaries_dir",
            defaults.annotate.summaries_dir.to_string_lossy().to_string(),
        )
        .map_err(config_err)?
        .set_default("annotate.strip_leaf_text", defaults.annotate.strip_leaf_text)
        .map_err(config_err)?
        .set_default("annotate.scratch_fields", defaults.annotate.scratch_fields)
        .map_err(config_err)?
        .set_default("aggregate.parallel", defaults.aggregate.parallel)
        .map_err(config_err)?
        .set_default("output.indent", defaults.output.indent as i64)
        .map_err(config_err)?;
    Ok(builder)
}

impl Settings {
    /// Expand shell variables and tilde in path-like fields.
    ///
    /// Handles `~`, `$VAR`, and `${VAR}` syntax. Unknown variables are left as written.
    fn expand_paths(&mut self) {
        let raw = self.annotate.summaries_dir.to_string_lossy().to_string();
        let expanded = shellexpand::full(&raw)
            .map(|s| s.into_owned())
            .unwrap_or(raw);
        self.annotate.summaries_dir = PathBuf::from(expanded);
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `explicit` - Config file given on the command line; replaces the local
    ///   `.versetree.toml` lookup and must exist
    pub fn load(explicit: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut builder = with_defaults(Config::builder())?;

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                builder = builder.add_source(File::from(global_path).required(false));
            }
        }

        builder = match explicit {
            Some(path) => builder.add_source(File::from(path).required(true)),
            None => builder.add_source(File::from(local_config_path()).required(false)),
        };

        builder = builder.add_source(
            Environment::with_prefix("VERSETREE")
                .prefix_separator("_")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("annotate.scratch_fields")
                .try_parsing(true),
        );

        let config = builder.build().map_err(config_err)?;
        let mut settings: Self = config.try_deserialize().map_err(config_err)?;

        settings.expand_paths();
        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# versetree configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/versetree/versetree.toml
#   Local:  ./.versetree.toml  (or --config <path>)
#   Env:    VERSETREE_<SECTION>__<KEY>, e.g. VERSETREE_OUTPUT__INDENT=4

[corpus]
# Unit outline file inside each unit subdirectory
# unit_file_name = "MLS_en.json"

# Combined corpus file written under the corpus root
# combined_file_name = "combined_MLS_en.json"

[annotate]
# Directory of <key>.json annotation artifacts
# summaries_dir = "summaries"

# Drop leaf text from the annotated outline
# strip_leaf_text = true

# Extra fields removed from every node of the annotated outline
# scratch_fields = ["segment_text"]

[aggregate]
# Aggregate subtrees in parallel
# parallel = false

[output]
# Spaces per indentation level of written JSON
# indent = 2
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_defaults_when_created_then_match_corpus_layout() {
        let settings = Settings::default();
        assert_eq!(settings.corpus.unit_file_name, "MLS_en.json");
        assert_eq!(settings.corpus.combined_file_name, "combined_MLS_en.json");
        assert_eq!(settings.output.indent, 2);
        assert!(settings.annotate.strip_leaf_text);
        assert!(!settings.aggregate.parallel);
    }

    #[test]
    fn given_tilde_in_summaries_dir_when_expand_paths_then_expands_to_home() {
        let mut settings = Settings::default();
        settings.annotate.summaries_dir = PathBuf::from("~/summaries");

        settings.expand_paths();

        let home = std::env::var("HOME").expect("HOME should be set");
        let dir = settings.annotate.summaries_dir.to_string_lossy();
        assert!(dir.starts_with(&home), "should start with home dir: {dir}");
        assert!(!dir.contains('~'));
    }

    #[test]
    fn given_template_when_parsed_then_yields_defaults() {
        let parsed: Settings = toml::from_str(&Settings::template()).expect("parse template");
        assert_eq!(parsed, Settings::default());
    }

    #[test]
    fn given_settings_when_rendered_to_toml_then_roundtrips() {
        let mut settings = Settings::default();
        settings.output.indent = 4;

        let rendered = settings.to_toml().expect("render");
        let parsed: Settings = toml::from_str(&rendered).expect("parse");

        assert_eq!(parsed, settings);
    }
}
