/*!
 * Groups sealed paragraphs into translation units under a character budget.
 *
 * The batcher is driven by segmentation: it sees paragraphs as they are
 * sealed, and segmentation may ask it to flush early when the paragraph still
 * under construction would push the pending total over the budget.
 */

use log::debug;

use super::document::{Paragraph, TranslationUnit};

/// Accumulates paragraphs into units
#[derive(Debug)]
pub struct UnitBatcher {
    // @field: Maximum characters per regular unit
    budget: usize,

    // @field: Sealed paragraphs not yet flushed
    pending: Vec<Paragraph>,

    // @field: Sum of pending paragraph lengths
    pending_len: usize,

    // @field: Finished units, in order
    units: Vec<TranslationUnit>,
}

impl UnitBatcher {
    pub fn new(budget: usize) -> Self {
        Self {
            budget,
            pending: Vec::new(),
            pending_len: 0,
            units: Vec::new(),
        }
    }

    pub fn budget(&self) -> usize {
        self.budget
    }

    /// Characters waiting in the pending unit
    pub fn pending_len(&self) -> usize {
        self.pending_len
    }

    /// Seal the pending paragraphs as one unit. No-op when nothing is pending.
    pub fn flush(&mut self) {
        if self.pending.is_empty() {
            return;
        }

        debug!(
            "Unit {}: {} paragraph(s), {} char(s)",
            self.units.len() + 1,
            self.pending.len(),
            self.pending_len
        );

        let paragraphs = std::mem::take(&mut self.pending);
        self.pending_len = 0;
        self.units.push(TranslationUnit::batched(paragraphs));
    }

    /// Add a sealed paragraph.
    ///
    /// Oversized paragraphs, and any paragraph longer than the budget on its
    /// own, become single-paragraph units after the pending ones.
    pub fn push(&mut self, paragraph: Paragraph) {
        let len = paragraph.char_len();

        if paragraph.is_oversized || len > self.budget {
            self.flush();
            debug!("Unit {}: oversized paragraph of {} char(s)", self.units.len() + 1, len);
            self.units.push(TranslationUnit::oversized(paragraph));
            return;
        }

        if self.pending_len + len > self.budget {
            self.flush();
        }

        self.pending_len += len;
        self.pending.push(paragraph);
    }

    /// Flush what is left and return every unit
    pub fn finish(mut self) -> Vec<TranslationUnit> {
        self.flush();

        debug_assert!(
            self.units
                .iter()
                .all(|u| !u.is_oversized || u.paragraphs.len() == 1),
            "oversized unit holding more than one paragraph"
        );

        self.units
    }
}
