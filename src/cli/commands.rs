//! Command dispatch: maps parsed arguments onto application services

use std::io;
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use clap_complete::generate;
use itertools::Itertools;
use tracing::{debug, instrument};

use crate::application::services::{outline_tree, top_level};
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::Validator;
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::InfraError;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let Some(command) = &cli.command else {
        return Err(CliError::Usage(
            "no command given; run with --help for usage".to_string(),
        ));
    };
    if let Commands::Completion { shell } = command {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        generate(*shell, &mut cmd, name, &mut io::stdout());
        return Ok(());
    }

    let settings = Settings::load(cli.config.as_deref())?;
    let container = ServiceContainer::new(settings);

    match command {
        Commands::Aggregate { input, output } => cmd_aggregate(&container, input, output.as_deref()),
        Commands::Parents { input, output } => cmd_parents(&container, input, output.as_deref()),
        Commands::Combine { root, output } => cmd_combine(&container, root, output.as_deref()),
        Commands::Verify { corpus } => cmd_verify(&container, corpus),
        Commands::Annotate {
            input,
            summaries,
            output,
        } => cmd_annotate(&container, input, summaries.as_deref(), output.as_deref()),
        Commands::Pending { input, summaries } => {
            cmd_pending(&container, input, summaries.as_deref())
        }
        Commands::Strip { input, output } => cmd_strip(&container, input, output.as_deref()),
        Commands::Segments {
            input,
            root_text,
            output,
        } => cmd_segments(&container, input, root_text, output.as_deref()),
        Commands::Show {
            input,
            top,
            annotations,
        } => cmd_show(&container, input, *top, *annotations),
        Commands::CountLines { dir } => cmd_count_lines(&container, dir),
        Commands::Validate { input, contiguity } => cmd_validate(&container, input, *contiguity),
        Commands::Config { command } => cmd_config(&container, cli.config.as_deref(), command),
        Commands::Completion { .. } => Ok(()),
    }
}

/// `<dir>/<stem><suffix>.json` next to `input`.
fn sibling(input: &Path, suffix: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "outline".to_string());
    input.with_file_name(format!("{stem}{suffix}.json"))
}

#[instrument(skip(c))]
fn cmd_aggregate(c: &ServiceContainer, input: &Path, output: Option<&Path>) -> CliResult<()> {
    let output = output.unwrap_or(input);
    let report = c
        .outline
        .aggregate(input, output, c.settings.aggregate.parallel)?;
    output::success(&format!(
        "aggregated {} nodes ({} with combined text) into {}",
        report.nodes,
        report.with_text,
        output.display()
    ));
    Ok(())
}

#[instrument(skip(c))]
fn cmd_parents(c: &ServiceContainer, input: &Path, output: Option<&Path>) -> CliResult<()> {
    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| sibling(input, "_parents"));
    let n = c
        .outline
        .export_parents(input, &output, c.settings.aggregate.parallel)?;
    output::success(&format!("exported {} parent excerpts to {}", n, output.display()));
    Ok(())
}

#[instrument(skip(c))]
fn cmd_combine(c: &ServiceContainer, root: &Path, output: Option<&Path>) -> CliResult<()> {
    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| root.join(&c.settings.corpus.combined_file_name));
    let report = c.corpus.combine(
        root,
        &c.settings.corpus.unit_file_name,
        &output,
        c.settings.aggregate.parallel,
    )?;

    output::header("Units");
    for unit in &report.propagation.units {
        output::detail(&format!(
            "{:<8} offset {:>6}  length {:>6}",
            unit.unit_id, unit.offset, unit.length
        ));
    }
    for w in &report.propagation.warnings {
        output::warning(&format!("span '{}' at {} left unchanged", w.raw, w.path));
    }
    if let Some(gap) = &report.continuity.gap {
        output::warning(&format!(
            "global spans jump at unit {}: previous end {}, start {}",
            gap.unit_id, gap.previous_end, gap.start
        ));
    }
    output::success(&format!(
        "combined {} units ({} verses) into {}",
        report.sources.len(),
        report.propagation.total,
        output.display()
    ));
    Ok(())
}

#[instrument(skip(c))]
fn cmd_verify(c: &ServiceContainer, corpus: &Path) -> CliResult<()> {
    let report = c.corpus.verify(corpus)?;
    if !report.unstamped.is_empty() {
        output::warning(&format!(
            "units without global_span: {}",
            report.unstamped.iter().join(", ")
        ));
    }
    match &report.gap {
        Some(gap) => {
            output::failure(&format!(
                "gap at unit {}: previous end {}, start {}",
                gap.unit_id, gap.previous_end, gap.start
            ));
            Err(CliError::Inconsistent(format!(
                "global spans are not contiguous at unit {}",
                gap.unit_id
            )))
        }
        None => {
            output::success(&format!(
                "global spans are contiguous (last verse {})",
                report.last_end
            ));
            Ok(())
        }
    }
}

fn summaries_dir(c: &ServiceContainer, summaries: Option<&Path>) -> PathBuf {
    summaries
        .map(Path::to_path_buf)
        .unwrap_or_else(|| c.settings.annotate.summaries_dir.clone())
}

#[instrument(skip(c))]
fn cmd_annotate(
    c: &ServiceContainer,
    input: &Path,
    summaries: Option<&Path>,
    output: Option<&Path>,
) -> CliResult<()> {
    let summaries = summaries_dir(c, summaries);
    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| sibling(input, "_annotated"));
    let report = c
        .annotation
        .annotate(input, &summaries, &output, &c.scratch_policy())?;
    let stats = &report.stats;

    output::header("Annotation");
    output::detail(&format!("artifacts:  {}", report.artifacts));
    output::detail(&format!("nodes:      {}", stats.total_nodes));
    output::detail(&format!("integrated: {}", stats.integrated));
    output::detail(&format!("missing:    {}", stats.missing.len()));
    output::detail(&format!("rate:       {:.1}%", stats.integration_rate()));
    if stats.is_complete() {
        output::success(&format!("wrote {}", output.display()));
    } else {
        output::warning(&format!(
            "{} nodes lack annotations; list them with `versetree pending`",
            stats.missing.len()
        ));
        output::action("Wrote", &output.display());
    }
    Ok(())
}

#[instrument(skip(c))]
fn cmd_pending(c: &ServiceContainer, input: &Path, summaries: Option<&Path>) -> CliResult<()> {
    let summaries = summaries_dir(c, summaries);
    let keys = c.annotation.pending(input, &summaries)?;
    debug!("pending: {} keys", keys.len());
    for key in &keys {
        output::info(key);
    }
    Ok(())
}

#[instrument(skip(c))]
fn cmd_strip(c: &ServiceContainer, input: &Path, output: Option<&Path>) -> CliResult<()> {
    let output = output.unwrap_or(input);
    let n = c.outline.strip(input, output, &c.scratch_policy())?;
    output::success(&format!("stripped {} nodes into {}", n, output.display()));
    Ok(())
}

#[instrument(skip(c))]
fn cmd_segments(
    c: &ServiceContainer,
    input: &Path,
    root_text: &Path,
    output: Option<&Path>,
) -> CliResult<()> {
    let output = output.unwrap_or(input);
    let fill = c.outline.fill_segments(input, root_text, output)?;
    for (path, reason) in &fill.skipped {
        output::warning(&format!("{path}: {reason}"));
    }
    output::success(&format!(
        "filled {} leaves ({} skipped) into {}",
        fill.filled,
        fill.skipped.len(),
        output.display()
    ));
    Ok(())
}

#[instrument(skip(c))]
fn cmd_show(c: &ServiceContainer, input: &Path, top: bool, annotations: bool) -> CliResult<()> {
    let outline = c.outline.load(input)?;
    if top {
        for label in top_level(&outline.units) {
            output::info(&label);
        }
    } else {
        for unit in &outline.units {
            output::info(&outline_tree(unit, annotations));
        }
    }
    Ok(())
}

#[instrument(skip(c))]
fn cmd_count_lines(c: &ServiceContainer, dir: &Path) -> CliResult<()> {
    let counts = c.outline.count_root_lines(dir)?;
    let total: usize = counts.iter().map(|lc| lc.lines).sum();
    for lc in &counts {
        output::detail(&format!("{:>8}  {}", lc.lines, lc.path.display()));
    }
    output::action("Total", &format!("{} lines in {} files", total, counts.len()));
    Ok(())
}

#[instrument(skip(c))]
fn cmd_validate(c: &ServiceContainer, input: &Path, contiguity: bool) -> CliResult<()> {
    let outline = c.outline.load(input)?;
    let validator = if contiguity {
        Validator::new().with_contiguity()
    } else {
        Validator::new()
    };
    validator
        .check(&outline.units)
        .map_err(crate::application::ApplicationError::from)?;
    output::success(&format!(
        "{} is valid ({} nodes)",
        input.display(),
        outline.node_count()
    ));
    Ok(())
}

fn cmd_config(c: &ServiceContainer, explicit: Option<&Path>, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            output::info(&c.settings.to_toml()?);
            Ok(())
        }
        ConfigCommands::Init { global, force } => {
            let path = if *global {
                global_config_path().ok_or_else(|| {
                    CliError::Usage("cannot determine global config directory".to_string())
                })?
            } else {
                explicit
                    .map(Path::to_path_buf)
                    .unwrap_or_else(local_config_path)
            };
            if c.fs.exists(&path) && !force {
                return Err(CliError::Usage(format!(
                    "{} already exists (use --force to overwrite)",
                    path.display()
                )));
            }
            c.fs
                .ensure_parent(&path)
                .map_err(|e| InfraError::io(format!("create {}", path.display()), e))?;
            c.fs
                .write(&path, &Settings::template())
                .map_err(|e| InfraError::io(format!("write {}", path.display()), e))?;
            output::action("Created", &path.display());
            Ok(())
        }
        ConfigCommands::Path => {
            let mark = |p: &Path| if c.fs.exists(p) { "" } else { " (not found)" };
            match global_config_path() {
                Some(p) => output::info(&format!("global: {}{}", p.display(), mark(p.as_path()))),
                None => output::info("global: <unavailable>"),
            }
            let local = explicit
                .map(Path::to_path_buf)
                .unwrap_or_else(local_config_path);
            output::info(&format!("local:  {}{}", local.display(), mark(local.as_path())));
            Ok(())
        }
    }
}
