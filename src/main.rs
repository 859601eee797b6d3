// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{anyhow, Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{error, info, warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::PathBuf;

use pdf_translator::app_config::{self, Config};
use pdf_translator::app_controller::{Controller, RunOptions, RunSummary};
use pdf_translator::language_utils;

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

#[derive(Subcommand, Debug)]
enum Commands {
    /// Translate PDF or text documents (default command)
    Translate(TranslateArgs),

    /// Generate shell completions for pdf-translator
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug, Clone)]
struct TranslateArgs {
    /// Input PDF/text file or directory to process
    #[arg(value_name = "INPUT_PATH")]
    input_path: PathBuf,

    /// Force overwrite of existing output files
    #[arg(short, long)]
    force_overwrite: bool,

    /// Target language code (e.g. 'JA', 'DE', 'EN-US')
    #[arg(short, long)]
    target_language: Option<String>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: PathBuf,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,

    /// Output directory (defaults to the input file's directory)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Start extracting at the first line instead of the start marker
    #[arg(long)]
    ignore_start: bool,

    /// Do not stop extracting at the end marker
    #[arg(long)]
    ignore_end: bool,

    /// Write plain text instead of Markdown
    #[arg(long)]
    plain: bool,

    /// Write the translation only, without the source text
    #[arg(long)]
    no_source: bool,

    /// Write hit files for every rule category
    #[arg(long)]
    hits: bool,

    /// Segment only and write the translation units, without calling the translator
    #[arg(long)]
    dry_run: bool,
}

/// pdf-translator - Translate academic PDFs with DeepL
///
/// Extracts the body text of a paper, rebuilds its paragraphs and headings,
/// and translates it in character-bounded batches.
#[derive(Parser, Debug)]
#[command(name = "pdf-translator")]
#[command(version)]
#[command(about = "Translate academic PDFs with DeepL, rebuilding paragraphs and headings")]
#[command(long_about = "pdf-translator extracts the text of PDF documents, rebuilds paragraphs and headings,
and translates them with DeepL.

EXAMPLES:
    pdf-translator paper.pdf                     # Translate using default config
    pdf-translator -f paper.pdf                  # Force overwrite existing files
    pdf-translator -t DE paper.pdf               # Translate into German
    pdf-translator --plain --no-source paper.pdf # Plain text, translation only
    pdf-translator --dry-run paper.pdf           # Show the units without translating
    pdf-translator --log-level debug papers/     # Process entire directory with debug logging
    pdf-translator completions bash > pdf-translator.bash

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically; settings missing from an existing file are
    filled in and written back.

    The DeepL API key is read from translation.api_key or DEEPL_API_KEY.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Input PDF/text file or directory to process
    #[arg(value_name = "INPUT_PATH")]
    input_path: Option<PathBuf>,

    /// Force overwrite of existing output files
    #[arg(short, long)]
    force_overwrite: bool,

    /// Target language code (e.g. 'JA', 'DE', 'EN-US')
    #[arg(short, long)]
    target_language: Option<String>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: PathBuf,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,

    /// Output directory (defaults to the input file's directory)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Start extracting at the first line instead of the start marker
    #[arg(long)]
    ignore_start: bool,

    /// Do not stop extracting at the end marker
    #[arg(long)]
    ignore_end: bool,

    /// Write plain text instead of Markdown
    #[arg(long)]
    plain: bool,

    /// Write the translation only, without the source text
    #[arg(long)]
    no_source: bool,

    /// Write hit files for every rule category
    #[arg(long)]
    hits: bool,

    /// Segment only and write the translation units, without calling the translator
    #[arg(long)]
    dry_run: bool,
}

// @struct: Custom logger implementation, filtered by log::max_level
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

    // @returns: Tag for log level
    fn tag_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "[ERROR]",
            Level::Warn => "[WARN] ",
            Level::Info => "",
            Level::Debug => "[DEBUG]",
            Level::Trace => "[TRACE]",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let now = chrono::Local::now().format("%H:%M:%S.%3f");
        let _ = writeln!(
            std::io::stderr(),
            "{}{} {} {}\x1B[0m",
            Self::color_for_level(record.level()),
            now,
            Self::tag_for_level(record.level()),
            record.args()
        );
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Info until the configuration says otherwise
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "pdf-translator", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Translate(args)) => run_translate(args).await,
        None => {
            // Top-level args behave like the translate subcommand
            let input_path = cli
                .input_path
                .ok_or_else(|| anyhow!("INPUT_PATH is required when no subcommand is specified"))?;

            let args = TranslateArgs {
                input_path,
                force_overwrite: cli.force_overwrite,
                target_language: cli.target_language,
                config_path: cli.config_path,
                log_level: cli.log_level,
                output_dir: cli.output_dir,
                ignore_start: cli.ignore_start,
                ignore_end: cli.ignore_end,
                plain: cli.plain,
                no_source: cli.no_source,
                hits: cli.hits,
                dry_run: cli.dry_run,
            };
            run_translate(args).await
        }
    }
}

/// Apply command line overrides on top of the loaded configuration
fn apply_overrides(config: &mut Config, options: &TranslateArgs) -> Result<()> {
    if let Some(target_language) = &options.target_language {
        config.target_language = language_utils::validate_target_language(target_language)?;
    }
    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }
    if let Some(output_dir) = &options.output_dir {
        config.output.output_dir = Some(output_dir.clone());
    }
    if options.ignore_start {
        config.extraction.ignore_start_condition = true;
    }
    if options.ignore_end {
        config.extraction.ignore_end_condition = true;
    }
    if options.plain {
        config.output.markdown = false;
    }
    if options.no_source {
        config.output.output_source = false;
    }
    if options.hits {
        config.rules.record_all_hits();
    }
    Ok(())
}

async fn run_translate(options: TranslateArgs) -> Result<()> {
    if let Some(cmd_log_level) = &options.log_level {
        let level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(LevelFilter::from(&level));
    }

    let mut config = Config::load_or_create(&options.config_path)?;
    apply_overrides(&mut config, &options)?;
    config.validate().context("Configuration validation failed")?;
    log::set_max_level(LevelFilter::from(&config.log_level));

    match language_utils::get_language_name(&config.target_language) {
        Ok(name) => info!("Target language: {} ({})", name, config.target_language),
        Err(e) => warn!("{}", e),
    }

    let controller = Controller::with_config(config)?;

    // Ctrl-C stops after the unit in flight; partial output is still written
    let cancel = controller.cancellation();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, finishing the current unit before stopping");
            cancel.cancel();
        }
    });

    let run_options = RunOptions {
        force_overwrite: options.force_overwrite,
        dry_run: options.dry_run,
    };

    let summary = if options.input_path.is_file() {
        controller.run(options.input_path.clone(), run_options).await?
    } else if options.input_path.is_dir() {
        controller.run_folder(options.input_path.clone(), run_options).await?
    } else {
        return Err(anyhow!("Input path does not exist: {:?}", options.input_path));
    };

    report(&summary)
}

fn report(summary: &RunSummary) -> Result<()> {
    if summary.cancelled {
        warn!(
            "Run was cancelled, {} document(s) left unfinished; run again to translate them",
            summary.partial
        );
    }
    if summary.failed > 0 {
        error!("{} document(s) failed", summary.failed);
        return Err(anyhow!("{} document(s) failed", summary.failed));
    }
    Ok(())
}
