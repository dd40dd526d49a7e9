// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, error};
use std::io::Write;
use std::path::PathBuf;

use latinify::app_config::{Config, LogLevel};
use latinify::app_controller::Controller;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, Copy, ValueEnum)]
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
    /// Translate a page file into Latin
    Translate {
        /// Page file (JSON document tree)
        #[arg(value_name = "PAGE")]
        input_file: PathBuf,

        /// Where to write the translated page (default: <PAGE>.la.json)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show the hourly quota and cooldown state
    Status,

    /// Purge expired cache entries and show the cache size
    Cache,

    /// Generate shell completions for latinify
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Latinify - translate web pages into Latin
#[derive(Parser, Debug)]
#[command(name = "latinify")]
#[command(version)]
#[command(about = "Translate page text into Latin and back")]
#[command(long_about = "Latinify translates the visible text of a page into Latin through the
Google Cloud Translation API, caching translations for a day and limiting
how often pages can be translated.

EXAMPLES:
    latinify translate page.json                # Writes page.la.json
    latinify translate page.json -o out.json    # Explicit output file
    latinify status                             # Show rate-limit state
    latinify cache                              # Purge and inspect the cache
    latinify completions bash > latinify.bash   # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. If the config file doesn't
    exist, a default one will be created automatically. The API key may also be
    given with --api-key or the LATINIFY_API_KEY environment variable.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json", global = true)]
    config_path: PathBuf,

    /// Google Cloud Translation API key
    #[arg(long, env = "LATINIFY_API_KEY", hide_env_values = true, global = true)]
    api_key: Option<String>,

    /// Set logging level
    #[arg(short, long, value_enum, global = true)]
    log_level: Option<CliLogLevel>,
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

    // @returns: ANSI colour for log level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "1;31",
            Level::Warn => "1;33",
            Level::Info => "1;32",
            Level::Debug => "1;36",
            Level::Trace => "1;35",
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
            let _ = writeln!(
                std::io::stderr(),
                "\x1B[{}m{} {:<5} {}\x1B[0m",
                Self::color_for_level(record.level()),
                now,
                record.level(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() {
    // Trace-level logger; the effective level is lowered once the config is known
    if let Err(e) = CustomLogger::init(LevelFilter::Trace) {
        eprintln!("Failed to initialise logging: {}", e);
    }
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();
    if let Err(e) = run(cli).await {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: CommandLineOptions) -> Result<()> {
    if let Commands::Completions { shell } = cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(shell, &mut cmd, "latinify", &mut std::io::stdout());
        return Ok(());
    }

    if let Some(level) = cli.log_level {
        log::set_max_level(LogLevel::from(level).to_level_filter());
    }

    let mut config = Config::load_or_create(&cli.config_path)?;
    if let Some(api_key) = cli.api_key {
        config.provider.api_key = api_key;
    }
    match cli.log_level {
        Some(level) => config.log_level = level.into(),
        None => log::set_max_level(config.log_level.to_level_filter()),
    }

    let controller = Controller::with_config(config.clone())?;

    match cli.command {
        Commands::Translate { input_file, output } => {
            config
                .validate()
                .context("Configuration validation failed")?;
            let result = controller
                .translate_file(&input_file, output.as_deref())
                .await?;
            let outcome = result.outcome;
            println!(
                "Translated {} fragment(s) -> {}",
                outcome.translated,
                result.output_path.display()
            );
            if let Some(message) = outcome.message {
                println!("{}", message);
            }
            if outcome.truncated {
                println!("Character limit reached; the rest of the page was left untranslated");
            }
        }
        Commands::Status => {
            let status = controller.rate_limit_status().await?;
            let state = status.state;
            println!(
                "Translations this window: {}/{} ({} left)",
                state.count,
                status.hourly_limit,
                status.remaining()
            );
            println!("Window resets at: {}", format_millis(state.window_reset_at));
            println!("Last translation: {}", format_millis(state.last_attempt_at));
            if let Some(wait) = status.cooldown_wait_seconds {
                println!("Cooldown: {}s before the next translation", wait);
            }
        }
        Commands::Cache => {
            let report = controller.cache_report().await?;
            println!("Cached translations: {}", report.stats.entries);
            println!("Expired entries purged: {}", report.purged);
        }
        Commands::Completions { .. } => {}
    }

    Ok(())
}

fn format_millis(millis: i64) -> String {
    if millis <= 0 {
        return "never".to_string();
    }
    chrono::DateTime::from_timestamp_millis(millis)
        .map(|t| {
            t.with_timezone(&chrono::Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string()
        })
        .unwrap_or_else(|| millis.to_string())
}
