//! Reelcut CLI: compose source files into a virtual timeline and turn
//! analysis output into a validated edit plan.
//!
//! Usage:
//!   reelcut compose <SOURCES>...                    Print the composite timeline
//!   reelcut plan <SOURCES>... --instructions FILE   Build an edit plan and report
//!   reelcut locate <SOURCES>... --at SECS           Map a timestamp to its source
//!   reelcut locate <SOURCES>... --source N --local SECS
//!                                                   Map a source offset to composite time

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use reelcut_common::config::{AppConfig, EditSettings, FailurePolicy};

mod commands;

#[derive(Parser)]
#[command(
    name = "reelcut",
    about = "Turn timestamped edit instructions into safe source-local clips",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (defaults to $XDG_CONFIG_HOME/reelcut/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Probe sources and print the composite timeline as JSON
    Compose {
        /// Source files, in timeline order
        #[arg(required = true)]
        sources: Vec<PathBuf>,

        /// Filler between sources (seconds)
        #[arg(long)]
        gap: Option<f64>,

        /// Write the mapping here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Translate analysis output into an edit plan
    Plan {
        /// Source files, in timeline order
        #[arg(required = true)]
        sources: Vec<PathBuf>,

        /// JSON file with composite-time instructions
        #[arg(short, long)]
        instructions: PathBuf,

        /// Target plan duration (seconds)
        #[arg(long)]
        target: Option<f64>,

        /// Accepted deviation from the target (seconds)
        #[arg(long)]
        tolerance: Option<f64>,

        /// Filler between sources (seconds)
        #[arg(long)]
        gap: Option<f64>,

        /// Length of a synthesized clip (seconds)
        #[arg(long)]
        min_clip: Option<f64>,

        /// Physically concatenated artifact to record in the report
        #[arg(long)]
        artifact: Option<PathBuf>,

        /// Fail on the first bad instruction instead of skipping it
        #[arg(long)]
        abort_on_error: bool,

        /// Build an even-split plan when no instruction survives
        #[arg(long)]
        fallback: bool,

        /// Write the report here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show which source a composite timestamp falls in, or where a
    /// source offset lands on the composite timeline
    Locate {
        /// Source files, in timeline order
        #[arg(required = true)]
        sources: Vec<PathBuf>,

        /// Composite timestamp (seconds)
        #[arg(long, required_unless_present = "source", conflicts_with = "source")]
        at: Option<f64>,

        /// Source position in timeline order (0-based)
        #[arg(long, requires = "local")]
        source: Option<usize>,

        /// Offset within `--source` (seconds)
        #[arg(long, requires = "source")]
        local: Option<f64>,

        /// Filler between sources (seconds)
        #[arg(long)]
        gap: Option<f64>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from(path)
            .map_err(|e| anyhow::anyhow!("Failed to load config {}: {e}", path.display()))?,
        None => AppConfig::load(),
    };

    // Initialize logging
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    reelcut_common::logging::init_logging(&config.logging);

    let settings = config.edit;
    match cli.command {
        Commands::Compose {
            sources,
            gap,
            output,
        } => {
            let settings = EditSettings {
                gap_duration_secs: gap.unwrap_or(settings.gap_duration_secs),
                ..settings
            };
            commands::compose::run(sources, settings, output).await
        }
        Commands::Plan {
            sources,
            instructions,
            target,
            tolerance,
            gap,
            min_clip,
            artifact,
            abort_on_error,
            fallback,
            output,
        } => {
            let settings = EditSettings {
                target_duration_secs: target.unwrap_or(settings.target_duration_secs),
                duration_tolerance_secs: tolerance.unwrap_or(settings.duration_tolerance_secs),
                gap_duration_secs: gap.unwrap_or(settings.gap_duration_secs),
                min_clip_secs: min_clip.unwrap_or(settings.min_clip_secs),
                failure_policy: if abort_on_error {
                    FailurePolicy::Abort
                } else {
                    settings.failure_policy
                },
                fallback_when_empty: fallback || settings.fallback_when_empty,
                ..settings
            };
            commands::plan::run(sources, instructions, settings, artifact, output).await
        }
        Commands::Locate {
            sources,
            at,
            source,
            local,
            gap,
        } => {
            let settings = EditSettings {
                gap_duration_secs: gap.unwrap_or(settings.gap_duration_secs),
                ..settings
            };
            let query = match (at, source, local) {
                (Some(at), _, _) => commands::locate::Query::At(at),
                (None, Some(source_index), Some(local_secs)) => {
                    commands::locate::Query::SourceOffset {
                        source_index,
                        local_secs,
                    }
                }
                _ => anyhow::bail!("locate needs --at, or --source with --local"),
            };
            commands::locate::run(sources, settings, query).await
        }
    }
}
