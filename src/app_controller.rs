use anyhow::{anyhow, Context, Result};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use log::{debug, error, info, warn};
use std::collections::HashSet;
use std::fmt::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::app_config::Config;
use crate::errors::AppError;
use crate::extractor;
use crate::file_utils::FileManager;
use crate::language_utils::validate_target_language;
use crate::providers::deepl::DeepL;
use crate::providers::{ExclusiveTranslator, Translator};
use crate::reconstruction::{
    CategoryKind, ComposeOptions, Document, ExtractionOptions, ExtractionOutcome, ExtractionWindow, HitLog, Line,
    OutputComposer, RuleSet, Segmenter,
};
use crate::translation::{BatchTranslator, CancellationFlag, DocumentJob, DocumentTranslator};

// @module: Application controller for document translation

/// Per-run switches that are not part of the configuration file
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Overwrite existing outputs
    pub force_overwrite: bool,
    /// Stop after segmentation and write the units instead of translating
    pub dry_run: bool,
}

/// Outcome counts of a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub written: usize,
    pub skipped: usize,
    pub failed: usize,
    /// Cancelled documents whose finished units went to a `.partial` file
    pub partial: usize,
    pub cancelled: bool,
}

/// A document ready for translation
#[derive(Debug, Clone)]
pub struct PreparedDocument {
    // @field: Input file
    pub input: PathBuf,

    // @field: Where the translated document goes
    pub output_path: PathBuf,

    // @field: Units to translate
    pub document: Document,

    // @field: Rule hits from extraction and segmentation
    pub hits: HitLog,
}

/// Main application controller for document translation
pub struct Controller {
    // @field: App configuration
    config: Config,

    // @field: Compiled rules, shared by every document of the run
    rules: RuleSet,

    // @field: Translator override; DeepL from the configuration when unset
    translator: Option<Arc<dyn Translator>>,

    // @field: Set on Ctrl-C, checked between units
    cancel: CancellationFlag,
}

impl Controller {
    /// Create a new controller for test purposes with default configuration
    pub fn new_for_test() -> Result<Self> {
        Self::with_config(Config::default())
    }

    // @method: Create a new controller with the given configuration
    pub fn with_config(mut config: Config) -> Result<Self> {
        config.validate()?;
        config.target_language = validate_target_language(&config.target_language)?;
        let rules = RuleSet::compile(&config.rules).map_err(AppError::from)?;

        Ok(Self {
            config,
            rules,
            translator: None,
            cancel: CancellationFlag::new(),
        })
    }

    /// Use `translator` instead of building one from the configuration
    pub fn with_translator(mut self, translator: Arc<dyn Translator>) -> Self {
        self.translator = Some(translator);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Handle for cancelling the run
    pub fn cancellation(&self) -> CancellationFlag {
        self.cancel.clone()
    }

    /// Run the extraction window, relaxing the start/end conditions when
    /// nothing survives and the configuration allows it
    pub fn extract_with_retry(&self, name: &str, lines: &[Line]) -> Result<(Vec<Line>, HitLog), AppError> {
        let settings = &self.config.extraction;
        let window = ExtractionWindow::new(&self.rules);
        let first = ExtractionOptions::new(settings.ignore_start_condition, settings.ignore_end_condition);

        let mut attempts = vec![first];
        if settings.retry_relaxed {
            if !first.force_ignore_start && self.rules.start.is_active() {
                attempts.push(ExtractionOptions::new(true, first.force_ignore_end));
            }
            if !first.force_ignore_end && self.rules.end.is_active() {
                attempts.push(ExtractionOptions::new(true, true));
            }
        }

        for (attempt, options) in attempts.iter().enumerate() {
            if attempt > 0 {
                warn!(
                    "{}: nothing extracted, retrying with start condition {} and end condition {}",
                    name,
                    if options.force_ignore_start { "ignored" } else { "active" },
                    if options.force_ignore_end { "ignored" } else { "active" }
                );
            }

            let extraction = window.extract(lines, *options);
            if let ExtractionOutcome::Lines(extracted) = extraction.outcome {
                return Ok((extracted, extraction.hits));
            }
        }

        Err(AppError::NoText(name.to_string()))
    }

    /// Extract, clean and segment one input file
    pub fn prepare_document(&self, input: &Path) -> Result<PreparedDocument> {
        let name = display_name(input);
        let raw = extractor::extract_lines(input).map_err(AppError::from)?;
        self.prepare_lines(input, &raw)
            .with_context(|| format!("Failed to prepare {}", name))
    }

    /// Clean and segment lines that were already extracted from `input`
    pub fn prepare_lines(&self, input: &Path, raw: &[Line]) -> Result<PreparedDocument> {
        let name = display_name(input);
        let (lines, mut hits) = self.extract_with_retry(&name, raw)?;

        let segmentation = Segmenter::new(&self.rules, self.config.chars_per_unit).segment(&lines);
        hits.extend(segmentation.hits);

        info!(
            "{}: {} line(s) extracted, {} paragraph(s) in {} unit(s)",
            name,
            lines.len(),
            segmentation.document.paragraphs().count(),
            segmentation.document.units.len()
        );
        if segmentation.document.oversized_count() > 0 {
            warn!(
                "{}: {} paragraph(s) exceed {} characters and need manual translation",
                name,
                segmentation.document.oversized_count(),
                self.config.chars_per_unit
            );
        }

        let output_dir = self.output_dir_for(input);
        let output_path = FileManager::generate_output_path(
            input,
            &output_dir,
            &self.config.target_language,
            self.config.output.extension(),
        );

        Ok(PreparedDocument {
            input: input.to_path_buf(),
            output_path,
            document: segmentation.document,
            hits,
        })
    }

    fn output_dir_for(&self, input: &Path) -> PathBuf {
        FileManager::output_dir_for(input, self.config.output.output_dir.as_deref())
    }

    /// Write one hit file per category that asks for it
    pub fn write_hit_files(&self, prepared: &PreparedDocument) -> Result<Vec<PathBuf>> {
        let output_dir = self.output_dir_for(&prepared.input);
        let mut written = Vec::new();

        for kind in CategoryKind::ALL {
            let category = self.rules.category(kind);
            if !category.enabled_overall || !category.emit_diagnostics {
                continue;
            }

            let path = FileManager::hit_file_path(&prepared.input, &output_dir, kind);
            FileManager::write_atomic(&path, &prepared.hits.render(kind))?;
            debug!("Wrote {} hit(s) to {}", prepared.hits.hits_for(kind).count(), path.display());
            written.push(path);
        }

        Ok(written)
    }

    /// Run the main workflow on a single input file
    pub async fn run(&self, input_file: PathBuf, options: RunOptions) -> Result<RunSummary> {
        if !FileManager::file_exists(&input_file) {
            return Err(anyhow!("Input file does not exist: {:?}", input_file));
        }

        let summary = self.run_files(vec![input_file.clone()], options).await?;
        if summary.failed > 0 {
            return Err(anyhow!("Failed to translate {:?}", input_file));
        }
        Ok(summary)
    }

    /// Run the workflow in folder mode, processing every PDF and text file
    /// found below `input_dir`. Files that already have a translation are
    /// skipped.
    pub async fn run_folder(&self, input_dir: PathBuf, options: RunOptions) -> Result<RunSummary> {
        if !FileManager::dir_exists(&input_dir) {
            return Err(anyhow!("Input directory does not exist: {:?}", input_dir));
        }

        let files = FileManager::find_inputs(&input_dir)?;
        if files.is_empty() {
            warn!("No PDF or text files found in {:?}", input_dir);
            return Ok(RunSummary::default());
        }

        info!("Found {} file(s) in {:?}", files.len(), input_dir);
        self.run_files(files, options).await
    }

    async fn run_files(&self, files: Vec<PathBuf>, options: RunOptions) -> Result<RunSummary> {
        let start_time = Instant::now();
        let mut summary = RunSummary::default();
        let mut prepared = Vec::new();
        let mut claimed = HashSet::new();

        for input in files {
            let output_dir = self.output_dir_for(&input);
            let output_path = FileManager::generate_output_path(
                &input,
                &output_dir,
                &self.config.target_language,
                self.config.output.extension(),
            );
            let units_path = FileManager::units_file_path(&input, &output_dir);
            let target = if options.dry_run { units_path } else { output_path.clone() };
            if !claimed.insert(target.clone()) {
                error!(
                    "{}: {} is already written by another input of this run",
                    display_name(&input),
                    target.display()
                );
                summary.failed += 1;
                continue;
            }

            if !options.dry_run && output_path.exists() && !options.force_overwrite {
                warn!(
                    "Skipping {}, translation already exists (use -f to force overwrite)",
                    display_name(&input)
                );
                summary.skipped += 1;
                continue;
            }

            match self.prepare_document(&input) {
                Ok(document) => {
                    if let Err(e) = self.write_hit_files(&document) {
                        warn!("{}: {:#}", display_name(&input), e);
                    }
                    prepared.push(document);
                }
                Err(e) => {
                    error!("{:#}", e);
                    summary.failed += 1;
                }
            }
        }

        if options.dry_run {
            for document in &prepared {
                let path = FileManager::units_file_path(&document.input, self.output_dir_for(&document.input));
                match FileManager::write_atomic(&path, &render_units(&document.document)) {
                    Ok(()) => {
                        info!("Wrote units of {} to {}", display_name(&document.input), path.display());
                        summary.written += 1;
                    }
                    Err(e) => {
                        error!("{}: {:#}", display_name(&document.input), e);
                        summary.failed += 1;
                    }
                }
            }
            return Ok(summary);
        }

        if !prepared.is_empty() {
            self.translate_prepared(&prepared, &mut summary).await?;
        }

        info!(
            "Done in {}: {} written, {} partial, {} skipped, {} failed",
            Self::format_duration(start_time.elapsed()),
            summary.written,
            summary.partial,
            summary.skipped,
            summary.failed
        );
        Ok(summary)
    }

    fn build_translator(&self) -> Result<Arc<dyn Translator>> {
        if let Some(translator) = &self.translator {
            return Ok(translator.clone());
        }

        self.config.validate_translator()?;
        let deepl = DeepL::from_config(&self.config.translation).map_err(AppError::from)?;
        Ok(Arc::new(deepl))
    }

    async fn translate_prepared(&self, prepared: &[PreparedDocument], summary: &mut RunSummary) -> Result<()> {
        let translator: Arc<dyn Translator> = Arc::new(ExclusiveTranslator::new(self.build_translator()?));
        info!(
            "Translating {} document(s) into {} with {}",
            prepared.len(),
            self.config.target_language,
            translator.name()
        );

        let composer = OutputComposer::new(&self.rules, ComposeOptions::from(&self.config.output));
        let driver = DocumentTranslator::new(
            translator,
            composer,
            self.config.target_language.clone(),
            self.cancel.clone(),
        );
        let batch = BatchTranslator::new(driver, self.config.translation.concurrent_documents);

        let multi_progress = MultiProgress::new();
        let bars: Vec<ProgressBar> = prepared
            .iter()
            .map(|document| {
                let bar = multi_progress.add(ProgressBar::new(document.document.units.len() as u64));
                bar.set_style(progress_style());
                bar.set_message(display_name(&document.input));
                bar
            })
            .collect();

        let jobs: Vec<DocumentJob> = prepared
            .iter()
            .map(|document| DocumentJob::new(display_name(&document.input), document.document.clone()))
            .collect();

        let results = batch
            .translate_documents(&jobs, |job, done, _total| bars[job].set_position(done as u64))
            .await;

        for ((document, result), bar) in prepared.iter().zip(results).zip(&bars) {
            let name = display_name(&document.input);
            match result {
                Ok(translated) if translated.report.cancelled => {
                    bar.abandon_with_message(format!("{} cancelled", name));
                    summary.cancelled = true;
                    summary.partial += 1;
                    if translated.text.is_empty() {
                        warn!("{}: cancelled before any unit was translated", name);
                        continue;
                    }

                    let partial_path = FileManager::partial_output_path(&document.output_path);
                    match FileManager::write_atomic(&partial_path, &translated.text) {
                        Ok(()) => warn!(
                            "{}: cancelled, {} unit(s) written to {}",
                            name,
                            translated.report.units_done(),
                            partial_path.display()
                        ),
                        Err(e) => error!("{}: {:#}", name, e),
                    }
                }
                Ok(translated) => {
                    bar.finish_with_message(format!("{} done", name));
                    if let Err(e) = FileManager::write_atomic(&document.output_path, &translated.text) {
                        error!("{}: {:#}", name, e);
                        summary.failed += 1;
                        continue;
                    }
                    info!("Wrote {}", document.output_path.display());
                    summary.written += 1;

                    let partial_path = FileManager::partial_output_path(&document.output_path);
                    match FileManager::remove_if_exists(&partial_path) {
                        Ok(true) => debug!("Removed stale {}", partial_path.display()),
                        Ok(false) => {}
                        Err(e) => warn!("{}: {:#}", name, e),
                    }
                }
                Err(e) => {
                    bar.abandon_with_message(format!("{} failed", name));
                    error!("{}: {}", name, e);
                    summary.failed += 1;
                }
            }
        }

        Ok(())
    }

    fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

fn progress_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} units ({percent}%) {msg} {eta}")
        .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▓▒░")
}

/// Plain listing of the units of a document, one paragraph per line
pub fn render_units(document: &Document) -> String {
    let mut out = String::new();
    for (index, unit) in document.units.iter().enumerate() {
        let _ = writeln!(
            out,
            "=== Unit {} ({} paragraph(s), {} char(s){}) ===",
            index + 1,
            unit.paragraphs.len(),
            unit.char_len(),
            if unit.is_oversized { ", oversized: manual translation required" } else { "" }
        );
        for paragraph in &unit.paragraphs {
            if paragraph.is_chart_caption {
                out.push_str("[caption] ");
            }
            out.push_str(&paragraph.text);
            out.push('\n');
        }
        out.push('\n');
    }
    out
}
