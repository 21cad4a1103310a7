//! Command-line arguments.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

use crate::config::MatchPreset;
use crate::config::schema::MAX_TIME_SCALE;

// ============================================================================
// Root CLI
// ============================================================================

/// Football match clock and tactical decision simulator.
#[derive(Parser, Debug)]
#[command(name = "kickoff", author, version, about)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress logs and match commentary; errors and the summary still print.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output control.
    #[arg(long, default_value = "auto", global = true, env = "KICKOFF_COLOR")]
    pub color: ColorChoice,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Play a match in (scaled) real time.
    Run(RunArgs),

    /// Check match configuration files without playing.
    Validate(ValidateArgs),

    /// Print the event and tactical response tables.
    Catalog(CatalogArgs),

    /// Generate shell completion scripts.
    Completions(CompletionsArgs),

    /// Display version information.
    Version(VersionArgs),
}

// ============================================================================
// Run
// ============================================================================

#[derive(Args, Debug)]
#[command(group = clap::ArgGroup::new("source").multiple(false))]
pub struct RunArgs {
    /// Path to a YAML match configuration.
    #[arg(short, long, group = "source", env = "KICKOFF_CONFIG")]
    pub config: Option<PathBuf>,

    /// Built-in match configuration.
    #[arg(short, long, group = "source")]
    pub preset: Option<MatchPreset>,

    /// RNG seed; overrides the configured one.
    #[arg(long, env = "KICKOFF_SEED")]
    pub seed: Option<u64>,

    /// Simulated seconds per wall-clock second; overrides the configured one.
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_TIME_SCALE)))]
    pub time_scale: Option<u32>,

    /// Who answers decision events.
    #[arg(short, long, default_value = "interactive")]
    pub responder: Responder,

    /// Write the JSONL event log to this file ("-" for stdout).
    #[arg(long, env = "KICKOFF_EVENTS_FILE")]
    pub events_file: Option<PathBuf>,

    /// Serve Prometheus metrics on this port.
    #[arg(long, env = "KICKOFF_METRICS_PORT")]
    pub metrics_port: Option<u16>,

    /// Summary format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

/// Strategy for answering decision events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Responder {
    /// Read response ids from stdin
    #[default]
    Interactive,
    /// Never answer; every decision times out
    None,
    /// Always take the first listed option
    First,
    /// Lowest risk option
    Safest,
    /// Highest risk option
    Boldest,
    /// Any option, uniformly
    Random,
}

// ============================================================================
// Validate / Catalog / Completions / Version
// ============================================================================

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Configuration files to validate.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,

    /// Treat warnings as errors.
    #[arg(long)]
    pub strict: bool,
}

#[derive(Args, Debug)]
pub struct CatalogArgs {
    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Target shell for completion script.
    pub shell: Shell,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

// ============================================================================
// CLI-Local Enums
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ColorChoice {
    /// Auto-detect terminal support.
    #[default]
    Auto,
    /// Always use color.
    Always,
    /// Never use color.
    Never,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output.
    #[default]
    Human,
    /// JSON output.
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    #[value(name = "powershell")]
    PowerShell,
    Elvish,
}
