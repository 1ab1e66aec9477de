//! Command-line interface module for iconsort.
//!
//! This module handles argument parsing, merging the command line over the
//! configuration file, and reporting a run on the console.

use crate::config::{ConfigResult, IconConfig, Settings};
use crate::organizer::{OrganizeResult, Organizer, RunEvent, RunMode};
use crate::output::OutputFormatter;
use crate::report::RunReport;
use clap::{ArgAction, Parser};
use std::path::{Path, PathBuf};

/// Sort vector icons into `<category>/<color>/` folders by filename.
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "iconsort", version, about)]
pub struct Cli {
    /// Directory to collect icons from [default: output_svgs]
    #[arg(long, env = "ICONSORT_SOURCE", value_name = "DIR")]
    pub source: Option<PathBuf>,

    /// Directory to sort icons into [default: systemui_svgs_ultimate]
    #[arg(long, env = "ICONSORT_DEST", value_name = "DIR")]
    pub dest: Option<PathBuf>,

    /// TOML configuration file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Show where files would go without moving anything
    #[arg(long)]
    pub dry_run: bool,

    /// Write a JSON report of the run to this file
    #[arg(long, value_name = "FILE")]
    pub report: Option<PathBuf>,

    /// Increase diagnostic logging (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    pub fn mode(&self) -> RunMode {
        if self.dry_run {
            RunMode::DryRun
        } else {
            RunMode::Execute
        }
    }
}

/// Loads the configuration and applies command-line overrides.
pub fn load_settings(cli: &Cli) -> ConfigResult<Settings> {
    let mut config = IconConfig::load(cli.config.as_deref())?;
    if let Some(source) = &cli.source {
        config.paths.source = source.clone();
    }
    if let Some(dest) = &cli.dest {
        config.paths.destination = dest.clone();
    }
    config.compile()
}

/// Runs the CLI application with parsed arguments.
///
/// # Examples
///
/// ```no_run
/// use iconsort::cli::{run_cli, Cli};
///
/// let cli = Cli {
///     source: Some("raw_icons".into()),
///     dest: Some("sorted".into()),
///     ..Default::default()
/// };
/// match run_cli(&cli) {
///     Ok(report) => println!("moved {}", report.moved()),
///     Err(e) => eprintln!("Error: {}", e),
/// }
/// ```
pub fn run_cli(cli: &Cli) -> OrganizeResult<RunReport> {
    let settings = load_settings(cli)?;
    organize_with_settings(settings, cli.mode(), cli.report.as_deref())
}

/// Organizes with explicit settings, printing one line per file and a
/// summary at the end.
pub fn organize_with_settings(
    settings: Settings,
    mode: RunMode,
    report_path: Option<&Path>,
) -> OrganizeResult<RunReport> {
    let dry_run = mode == RunMode::DryRun;
    if dry_run {
        OutputFormatter::dry_run_notice(&format!(
            "Analyzing contents of: {}",
            settings.source_root.display()
        ));
    } else {
        OutputFormatter::info(&format!(
            "Organizing contents of: {}",
            settings.source_root.display()
        ));
    }

    let organizer = Organizer::new(settings);
    let spinner = OutputFormatter::create_spinner();
    let result = organizer.run(mode, |event| {
        spinner.suspend(|| print_event(&event, dry_run));
        if counts_as_file(&event) {
            spinner.inc(1);
        }
    });
    spinner.finish_and_clear();
    let report = result?;

    print_summary(&report);

    if let Some(path) = report_path {
        match report.save(path) {
            Ok(()) => OutputFormatter::info(&format!("Report written to {}", path.display())),
            Err(e) => OutputFormatter::warning(&format!(
                "Could not write report {}: {}",
                path.display(),
                e
            )),
        }
    }

    Ok(report)
}

/// Skipped directories are reported but not counted as processed files.
fn counts_as_file(event: &RunEvent<'_>) -> bool {
    !matches!(event, RunEvent::SubtreeSkipped(_))
}

fn print_event(event: &RunEvent<'_>, dry_run: bool) {
    match event {
        RunEvent::Placed(record) => {
            let relative = record.relative_destination.as_deref().unwrap_or(Path::new(""));
            if dry_run {
                OutputFormatter::planned(&record.raw_name, relative);
            } else {
                OutputFormatter::moved(&record.raw_name, relative);
            }
        }
        RunEvent::Failed { record, error } => {
            OutputFormatter::failure(&format!("{}: {}", record.raw_name, error));
        }
        RunEvent::SubtreeSkipped(error) => {
            OutputFormatter::warning(&error.to_string());
        }
    }
}

fn print_summary(report: &RunReport) {
    let tally = &report.tally;
    if tally.moved > 0 {
        OutputFormatter::summary_table(&tally.by_category, tally.moved);
    }

    println!();
    if report.dry_run {
        OutputFormatter::dry_run_notice(&format!(
            "Would organize {} icons into '{}'. No files were modified.",
            tally.moved,
            report.destination_root.display()
        ));
    } else {
        OutputFormatter::success(&format!(
            "Organized {} icons into '{}'.",
            tally.moved,
            report.destination_root.display()
        ));
    }

    if !tally.failures.is_empty() {
        OutputFormatter::warning(&format!(
            "{} {} could not be organized. Please review errors above.",
            tally.failures.len(),
            if tally.failures.len() == 1 { "file" } else { "files" }
        ));
    }
    if !tally.skipped_dirs.is_empty() {
        OutputFormatter::warning(&format!(
            "{} unreadable {} skipped.",
            tally.skipped_dirs.len(),
            if tally.skipped_dirs.len() == 1 {
                "directory was"
            } else {
                "directories were"
            }
        ));
    }
}
