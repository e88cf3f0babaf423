// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Result, anyhow, Context};
use log::{info, warn, LevelFilter, Log, Metadata, Record, Level, SetLoggerError};
use std::path::{Path, PathBuf};
use std::io::Write;
use std::fs::File;
use std::io::BufReader;
use clap::{Args, Parser, ValueEnum, CommandFactory, Subcommand};
use clap_complete::{generate, Shell};

use supercut::app_config::{self, Config};
use supercut::app_controller::Controller;
use supercut::corpus::Corpus;
use supercut::keyword_matcher::KeywordSet;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Args, Debug, Clone)]
struct CommonArgs {
    /// Configuration file path
    #[arg(short, long, default_value = "conf.json", global = true)]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum, global = true)]
    log_level: Option<CliLogLevel>,
}

#[derive(Args, Debug)]
struct RunArgs {
    /// URL of a YouTube channel, playlist, single video, etc.
    #[arg(value_name = "URL")]
    url: String,

    /// Keywords to include in the supercut
    #[arg(value_name = "KEYWORDS", required = true, num_args = 1..)]
    keywords: Vec<String>,

    /// Directory to store results in
    #[arg(short, long)]
    output: Option<String>,

    /// Limit the number of videos scraped
    #[arg(short, long)]
    number: Option<usize>,

    /// Ignore any saved snapshot and start from scratch
    #[arg(short, long)]
    force: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Download, scan, fetch videos and write the EDL (default command)
    Run(RunArgs),

    /// Scan a directory of .vtt files and save the result as a snapshot
    Scan {
        /// Directory holding `<id>=<title>.vtt` files
        #[arg(value_name = "SUBTITLE_DIR")]
        subtitle_dir: PathBuf,

        /// Keywords to search for
        #[arg(value_name = "KEYWORDS", required = true, num_args = 1..)]
        keywords: Vec<String>,

        /// Where to write the snapshot
        #[arg(short, long, default_value = "keyword_scan.json")]
        snapshot: PathBuf,
    },

    /// Write an EDL from a snapshot whose frame rates are resolved
    Edl {
        /// Snapshot produced by a previous run
        #[arg(value_name = "SNAPSHOT")]
        snapshot: PathBuf,

        /// Output EDL file
        #[arg(short, long, default_value = "supercut.edl")]
        output: PathBuf,

        /// Title for the EDL header (defaults to the configured title)
        #[arg(short, long)]
        title: Option<String>,
    },

    /// Generate shell completions for supercut
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// supercut - automatic construction of "supercut" videos
///
/// Finds keywords in the captions of a channel or playlist and writes an edit
/// decision list that strings every occurrence together.
#[derive(Parser, Debug)]
#[command(name = "supercut")]
#[command(version)]
#[command(about = "Tool for automatic construction of \"supercut\" videos")]
#[command(args_conflicts_with_subcommands = true)]
#[command(long_about = "supercut downloads captions, finds keywords in them, fetches the matching videos and writes an EDL.

EXAMPLES:
    supercut https://www.youtube.com/c/SomeChannel hello world
    supercut -n 20 -o results https://youtu.be/dQw4w9WgXcQ never
    supercut scan ./subtitles hello --snapshot scan.json
    supercut edl results/c_SomeChannel/keyword_scan.json -o cut.edl
    supercut completions bash > supercut.bash

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    common: CommonArgs,

    /// URL of a YouTube channel, playlist, single video, etc.
    #[arg(value_name = "URL")]
    url: Option<String>,

    /// Keywords to include in the supercut
    #[arg(value_name = "KEYWORDS")]
    keywords: Vec<String>,

    /// Directory to store results in
    #[arg(short, long)]
    output: Option<String>,

    /// Limit the number of videos scraped
    #[arg(short, long)]
    number: Option<usize>,

    /// Ignore any saved snapshot and start from scratch
    #[arg(short, long)]
    force: bool,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Emoji and ANSI color for log level
    fn decoration_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("❌ ", "1;31"),
            Level::Warn => ("🚧 ", "1;33"),
            Level::Info => (" ", "1;32"),
            Level::Debug => ("🔍 ", "1;36"),
            Level::Trace => ("📋 ", "1;35"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (emoji, color) = Self::decoration_for_level(record.level());
            let _ = writeln!(
                std::io::stderr(),
                "\x1B[{}m{} {} {}\x1B[0m",
                color, now, emoji, record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // The logger accepts everything; the effective level is set via max_level
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    // Parse command line arguments using clap
    let cli = CommandLineOptions::parse();

    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "supercut", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Run(args)) => run_pipeline(args, &cli.common).await,
        Some(Commands::Scan { subtitle_dir, keywords, snapshot }) => {
            let config = load_config(&cli.common)?;
            run_scan(config, &subtitle_dir, &keywords, &snapshot)
        }
        Some(Commands::Edl { snapshot, output, title }) => {
            let mut config = load_config(&cli.common)?;
            if let Some(title) = title {
                config.edl_title = title;
            }
            run_edl(config, &snapshot, &output)
        }
        None => {
            // Default behavior - top-level args mean `run`
            let url = cli.url.ok_or_else(|| {
                anyhow!("URL is required when no subcommand is specified")
            })?;
            if cli.keywords.is_empty() {
                return Err(anyhow!("At least one keyword is required"));
            }

            let args = RunArgs {
                url,
                keywords: cli.keywords,
                output: cli.output,
                number: cli.number,
                force: cli.force,
            };
            run_pipeline(args, &cli.common).await
        }
    }
}

/// Load the configuration file, creating a default one when missing, and apply the log level
fn load_config(common: &CommonArgs) -> Result<Config> {
    // If log level is set via command line, apply it immediately
    if let Some(level) = &common.log_level {
        let level: app_config::LogLevel = level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    let config_path = &common.config_path;
    let mut config = if Path::new(config_path).exists() {
        let file = File::open(config_path)
            .context(format!("Failed to open config file: {}", config_path))?;
        let reader = BufReader::new(file);
        serde_json::from_reader::<_, Config>(reader)
            .context(format!("Failed to parse config file: {}", config_path))?
    } else {
        warn!("Config file not found at '{}', creating default config.", config_path);
        let config = Config::default();
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;
        std::fs::write(config_path, config_json)
            .context(format!("Failed to write default config to file: {}", config_path))?;
        config
    };

    match &common.log_level {
        Some(level) => config.log_level = level.clone().into(),
        None => log::set_max_level(config.log_level.to_level_filter()),
    }

    Ok(config)
}

async fn run_pipeline(args: RunArgs, common: &CommonArgs) -> Result<()> {
    let mut config = load_config(common)?;
    if let Some(output) = args.output {
        config.output_dir = output;
    }
    if let Some(number) = args.number {
        config.downloader.max_videos = number;
    }

    let keywords = KeywordSet::new(&args.keywords);
    if keywords.is_empty() {
        return Err(anyhow!("At least one non-empty keyword is required"));
    }

    let controller = Controller::with_config(config)?;
    let edl_path = controller.run(&args.url, &keywords, args.force).await?;
    info!("Success: {}", edl_path.display());
    Ok(())
}

fn run_scan(config: Config, subtitle_dir: &Path, keywords: &[String], snapshot: &Path) -> Result<()> {
    if !subtitle_dir.is_dir() {
        return Err(anyhow!("Subtitle directory does not exist: {:?}", subtitle_dir));
    }

    let keywords = KeywordSet::new(keywords);
    if keywords.is_empty() {
        return Err(anyhow!("At least one non-empty keyword is required"));
    }

    let controller = Controller::with_config(config)?;
    let corpus = controller.scan(subtitle_dir, &keywords)?;
    corpus.save_snapshot(snapshot)?;
    info!("Success: {}", snapshot.display());
    Ok(())
}

fn run_edl(config: Config, snapshot: &Path, output: &Path) -> Result<()> {
    let controller = Controller::with_config(config)?;
    let corpus = Corpus::load_snapshot(snapshot)?;
    let edl = controller.write_edl(&corpus, output)?;
    info!("Success: {} edits in {}", edl.len(), output.display());
    Ok(())
}
