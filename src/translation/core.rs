/*!
 * Document translation driver.
 *
 * This module contains the DocumentTranslator, which sends the units of one
 * document to a translator strictly in order and composes the answers into
 * the output text.
 */

use log::{debug, info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::errors::TranslationError;
use crate::providers::Translator;
use crate::reconstruction::{Document, OutputComposer};

/// Cooperative cancellation, checked between units
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// What happened to the units of a document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslationReport {
    /// Units in the document
    pub units_total: usize,

    /// Units composed from a translator answer
    pub units_translated: usize,

    /// Oversized units, marked for manual translation
    pub units_oversized: usize,

    /// Oversized units the translator failed on, written untranslated
    pub units_untranslated: usize,

    /// The run stopped before the last unit
    pub cancelled: bool,

    /// Time spent waiting on the translator
    pub translator_time: Duration,
}

impl TranslationReport {
    /// Units processed in any way
    pub fn units_done(&self) -> usize {
        self.units_translated + self.units_untranslated
    }

    /// Generate a one-line summary
    pub fn summary(&self) -> String {
        let mut summary = format!(
            "{}/{} unit(s) translated, {} oversized, {:.1}s waiting on the translator",
            self.units_translated,
            self.units_total,
            self.units_oversized,
            self.translator_time.as_secs_f64()
        );
        if self.units_untranslated > 0 {
            summary.push_str(&format!(", {} left untranslated", self.units_untranslated));
        }
        if self.cancelled {
            summary.push_str(", cancelled");
        }
        summary
    }
}

/// Composed output of one document
#[derive(Debug, Clone)]
pub struct TranslatedDocument {
    pub text: String,
    pub report: TranslationReport,
}

/// Translates the units of one document in order
#[derive(Debug, Clone)]
pub struct DocumentTranslator<'r> {
    // @field: Shared translator; must already serialise concurrent calls
    translator: Arc<dyn Translator>,

    // @field: Composes each unit as soon as its answer arrives
    composer: OutputComposer<'r>,

    // @field: Language code passed to the translator
    target_language: String,

    // @field: Checked before each unit
    cancel: CancellationFlag,
}

impl<'r> DocumentTranslator<'r> {
    pub fn new(
        translator: Arc<dyn Translator>,
        composer: OutputComposer<'r>,
        target_language: impl Into<String>,
        cancel: CancellationFlag,
    ) -> Self {
        Self {
            translator,
            composer,
            target_language: target_language.into(),
            cancel,
        }
    }

    pub fn composer(&self) -> &OutputComposer<'r> {
        &self.composer
    }

    /// Translate and compose `document`.
    ///
    /// A cancelled run returns what was composed so far. A failure on a
    /// regular unit aborts the document; a failure on an oversized unit keeps
    /// the source text with the manual translation notice.
    pub async fn translate_document(
        &self,
        name: &str,
        document: &Document,
        on_unit: &(dyn Fn(usize, usize) + Send + Sync),
    ) -> Result<TranslatedDocument, TranslationError> {
        let mut text = String::new();
        let mut report = TranslationReport {
            units_total: document.units.len(),
            units_oversized: document.oversized_count(),
            ..Default::default()
        };

        for (index, unit) in document.units.iter().enumerate() {
            if self.cancel.is_cancelled() {
                warn!("{}: cancelled after {} of {} unit(s)", name, index, report.units_total);
                report.cancelled = true;
                break;
            }

            debug!(
                "{}: unit {}/{} ({} paragraph(s), {} char(s){})",
                name,
                index + 1,
                report.units_total,
                unit.paragraphs.len(),
                unit.char_len(),
                if unit.is_oversized { ", oversized" } else { "" }
            );

            let started = Instant::now();
            let answer = self
                .translator
                .translate(&unit.joined_text(), &self.target_language)
                .await;
            report.translator_time += started.elapsed();

            match answer {
                Ok(lines) => {
                    self.composer.compose_unit(unit, index, &lines, &mut text)?;
                    report.units_translated += 1;
                }
                Err(e) if unit.is_oversized => {
                    warn!("{}: unit {} left for manual translation: {}", name, index + 1, e);
                    self.composer.compose_untranslated(unit, &mut text)?;
                    report.units_untranslated += 1;
                }
                Err(e) => return Err(e.into()),
            }

            on_unit(index + 1, report.units_total);
        }

        info!("{}: {}", name, report.summary());
        Ok(TranslatedDocument { text, report })
    }
}
