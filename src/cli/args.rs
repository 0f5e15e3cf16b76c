//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueHint};

/// Hierarchical verse outlines: aggregate leaf text, renumber spans across units, merge annotations
#[derive(Parser, Debug)]
#[command(name = "versetree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug level: -d info, -dd debug, -ddd trace
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub debug: u8,

    /// Config file (replaces ./.versetree.toml)
    #[arg(long, global = true, value_hint = ValueHint::FilePath, env = "VERSETREE_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fill internal node text from the leaves beneath them
    Aggregate {
        /// Unit outline file
        #[arg(value_hint = ValueHint::FilePath)]
        input: PathBuf,
        /// Output file (default: overwrite input)
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        output: Option<PathBuf>,
    },

    /// Export metadata and combined text of every internal node
    Parents {
        #[arg(value_hint = ValueHint::FilePath)]
        input: PathBuf,
        /// Output file (default: <input stem>_parents.json)
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        output: Option<PathBuf>,
    },

    /// Combine unit outlines under a root into one globally numbered corpus
    Combine {
        /// Corpus root holding one subdirectory per unit
        #[arg(value_hint = ValueHint::DirPath)]
        root: PathBuf,
        /// Output file (default: <root>/<corpus.combined_file_name>)
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        output: Option<PathBuf>,
    },

    /// Check global-span continuity of a combined corpus
    Verify {
        #[arg(value_hint = ValueHint::FilePath)]
        corpus: PathBuf,
    },

    /// Merge annotation artifacts into an outline
    Annotate {
        #[arg(value_hint = ValueHint::FilePath)]
        input: PathBuf,
        /// Artifact directory (default: annotate.summaries_dir)
        #[arg(short, long, value_hint = ValueHint::DirPath)]
        summaries: Option<PathBuf>,
        /// Output file (default: <input stem>_annotated.json)
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        output: Option<PathBuf>,
    },

    /// List node keys without an annotation artifact
    Pending {
        #[arg(value_hint = ValueHint::FilePath)]
        input: PathBuf,
        /// Artifact directory (default: annotate.summaries_dir)
        #[arg(short, long, value_hint = ValueHint::DirPath)]
        summaries: Option<PathBuf>,
    },

    /// Remove leaf text and scratch fields
    Strip {
        #[arg(value_hint = ValueHint::FilePath)]
        input: PathBuf,
        /// Output file (default: overwrite input)
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        output: Option<PathBuf>,
    },

    /// Fill leaf text from line ranges (segments_span) of a root text
    Segments {
        #[arg(value_hint = ValueHint::FilePath)]
        input: PathBuf,
        /// Root text file
        #[arg(value_hint = ValueHint::FilePath)]
        root_text: PathBuf,
        /// Output file (default: overwrite input)
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        output: Option<PathBuf>,
    },

    /// Print the outline as a tree
    Show {
        #[arg(value_hint = ValueHint::FilePath)]
        input: PathBuf,
        /// Only list top-level entries
        #[arg(long)]
        top: bool,
        /// Append each node's annotation summary
        #[arg(short, long)]
        annotations: bool,
    },

    /// Count non-empty lines of root text files (*root*bo.txt)
    CountLines {
        #[arg(value_hint = ValueHint::DirPath)]
        dir: PathBuf,
    },

    /// Validate an outline
    Validate {
        #[arg(value_hint = ValueHint::FilePath)]
        input: PathBuf,
        /// Also require contiguous global spans across top-level units
        #[arg(long)]
        contiguity: bool,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Create config template
    Init {
        /// Create global config
        #[arg(short, long)]
        global: bool,
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Show config paths
    Path,
}
