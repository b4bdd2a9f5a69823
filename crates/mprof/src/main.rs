//! mprof - pitch-class profiles for folk melody corpora
//!
//! Subcommands:
//! - `mprof analyze <input>` - Per-piece relative frequencies, root at bin 0
//! - `mprof summary <input>` - Mean profile per mode as text bar charts
//! - `mprof pitch <token>...` - Pitch class of spelled pitches
//! - `mprof config` - Show the effective configuration

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use melody_profile::DistributionView;
use profconf::{OutputFormat, ProfileConfig};

mod commands;
mod render;

#[derive(Parser)]
#[command(name = "mprof")]
#[command(about = "Pitch-class profiles for folk melody corpora")]
#[command(version)]
struct Cli {
    /// Config file, used in place of ./melody-profile.toml
    #[arg(long, global = true, env = "MELODY_PROFILE_CONFIG")]
    config: Option<PathBuf>,

    /// Field delimiter: one ASCII character or "tab"
    #[arg(short, long, global = true)]
    delimiter: Option<String>,

    /// Column that names each piece
    #[arg(long, global = true)]
    id_column: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Derive per-piece pitch-class distributions
    Analyze {
        /// Corpus table with key and spelled_pitches columns
        input: PathBuf,

        /// Write here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format (default from config)
        #[arg(short, long, value_enum)]
        format: Option<Format>,

        /// Keep absolute pitch classes instead of rotating to the root
        #[arg(long)]
        absolute: bool,
    },

    /// Average transposed distributions per mode
    Summary {
        /// Corpus table with key and spelled_pitches columns
        input: PathBuf,

        /// Width of the longest bar
        #[arg(short, long, default_value = "40")]
        width: usize,

        /// Emit JSON instead of charts
        #[arg(long)]
        json: bool,
    },

    /// Print the pitch class of each spelled pitch
    Pitch {
        /// Tokens such as C4, F#3, B-5
        #[arg(required = true)]
        tokens: Vec<String>,
    },

    /// Show the effective configuration and where it came from
    Config,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Csv,
    Json,
}

impl From<Format> for OutputFormat {
    fn from(f: Format) -> Self {
        match f {
            Format::Csv => OutputFormat::Csv,
            Format::Json => OutputFormat::Json,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let (mut config, sources) = ProfileConfig::load_with_sources_from(cli.config.as_deref())
        .context("loading configuration")?;
    if let Some(delimiter) = &cli.delimiter {
        config.input.delimiter = profconf::loader::parse_delimiter("--delimiter", delimiter)?;
    }
    if let Some(id_column) = cli.id_column {
        config.input.id_column = Some(id_column);
    }

    init_logging(&config.logging.log_level);

    match cli.command {
        Commands::Analyze {
            input,
            output,
            format,
            absolute,
        } => {
            let format = format.map(OutputFormat::from).unwrap_or(config.output.format);
            let view = if absolute || !config.output.transposed {
                DistributionView::Absolute
            } else {
                DistributionView::Transposed
            };
            commands::analyze(&config, &input, output.as_deref(), format, view)?;
        }
        Commands::Summary { input, width, json } => {
            commands::summary(&config, &input, width, json)?;
        }
        Commands::Pitch { tokens } => {
            commands::pitch(&tokens)?;
        }
        Commands::Config => {
            commands::show_config(&config, &sources);
        }
    }

    Ok(())
}

/// Logs go to stderr so stdout stays clean for data.
fn init_logging(level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_new(level)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
