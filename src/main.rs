// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{anyhow, Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{error, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use cijsubs::app_config::{Config, LogLevel};
use cijsubs::selection;
use cijsubs::Controller;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => LogLevel::Error,
            CliLogLevel::Warn => LogLevel::Warn,
            CliLogLevel::Info => LogLevel::Info,
            CliLogLevel::Debug => LogLevel::Debug,
            CliLogLevel::Trace => LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate shell completions for cijsubs
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// CIJ subs downloader
///
/// Downloads Comprehensible Japanese transcripts as WebVTT subtitles and plain text.
#[derive(Parser, Debug)]
#[command(name = "cijsubs")]
#[command(version)]
#[command(about = "CIJ subs downloader")]
#[command(long_about = "Downloads Comprehensible Japanese transcripts as WebVTT subtitles and plain text.

EXAMPLES:
    cijsubs 1                      # Download video 1
    cijsubs 1,4-6,9-10             # Download videos 1, 4, 5, 6, 9 and 10
    cijsubs all                    # Download everything not yet downloaded
    cijsubs -o subs all            # Write into ./subs instead of ./transcripts
    cijsubs completions bash       # Generate bash completions

IDs already found in the output directory are removed from the selection,
so nothing is downloaded twice.")]
#[command(args_conflicts_with_subcommands = true)]
#[command(subcommand_negates_reqs = true)]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// List of numbers and ranges (e.g. "2,5-7,9-10"), or `all`
    #[arg(value_name = "IDS", required = true)]
    ids: Option<String>,

    /// Directory receiving the transcripts
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Optional JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,

    /// Do not draw a progress bar
    #[arg(long)]
    no_progress: bool,
}

// @struct: Custom logger implementation; filtering follows the global max level
struct CustomLogger;

impl CustomLogger {
    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI colour for log level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S%.3f");
            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} {}\x1B[0m",
                Self::color_for_level(record.level()),
                now,
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(e) = CustomLogger::init(LevelFilter::Info) {
        eprintln!("Failed to initialize logger: {}", e);
        return ExitCode::FAILURE;
    }

    let cli = CommandLineOptions::parse();

    if let Some(Commands::Completions { shell }) = cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(shell, &mut cmd, "cijsubs", &mut std::io::stdout());
        return ExitCode::SUCCESS;
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(options: CommandLineOptions) -> Result<()> {
    let expression = options.ids.as_deref()
        .ok_or_else(|| anyhow!("IDS is required when no subcommand is specified"))?;

    // Parse before any HTTP client exists so a bad expression never touches the network
    let selection = selection::parse(expression)?;

    let mut config = match &options.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => Config::default(),
    };

    if let Some(output_dir) = options.output_dir {
        config.output_dir = output_dir;
    }
    if let Some(log_level) = options.log_level {
        config.log_level = log_level.into();
    }
    if options.no_progress {
        config.show_progress = false;
    }

    config.validate().context("Configuration validation failed")?;
    log::set_max_level(config.log_level.to_level_filter());

    let controller = Controller::with_config(config)?;
    controller.run(&selection).await?;

    Ok(())
}
