/*!
 * Paragraph segmentation.
 *
 * One forward scan over the cleaned lines. Body text and figure/table
 * captions are buffered separately, because captions usually interrupt the
 * running text in the extracted line order. A paragraph is sealed on a return
 * line (unless a return-ignore rule vetoes it) or at the end of the stream.
 * Sealed paragraphs go straight to the `UnitBatcher`.
 */

use log::debug;

use super::batcher::UnitBatcher;
use super::classifier::HitLog;
use super::document::{char_len, Document, Line, Paragraph};
use super::rules::{RuleCategory, RuleSet};

/// Text of the paragraph under construction
#[derive(Debug, Default)]
struct ParagraphBuffer {
    text: String,
    len: usize,
    oversized: bool,
}

impl ParagraphBuffer {
    /// Append a non-final line. A trailing hyphen joins the next line
    /// directly; any other line is followed by a single space.
    fn append(&mut self, line: &str) {
        match line.strip_suffix('-') {
            Some(stem) => {
                self.text.push_str(stem);
                self.len += char_len(stem);
            }
            None => {
                self.text.push_str(line);
                self.text.push(' ');
                self.len += char_len(line) + 1;
            }
        }
    }

    /// Close the buffer with its final line
    fn seal(&mut self, line: &str, is_chart_caption: bool) -> Paragraph {
        let mut text = std::mem::take(&mut self.text);
        text.push_str(line);

        let paragraph = Paragraph {
            text,
            is_chart_caption,
            is_oversized: self.oversized,
        };

        self.len = 0;
        self.oversized = false;
        paragraph
    }

    fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Units plus the diagnostic hits recorded while segmenting
#[derive(Debug, Clone)]
pub struct Segmentation {
    pub document: Document,
    pub hits: HitLog,
}

/// The segmentation state machine
#[derive(Debug, Clone)]
pub struct Segmenter<'r> {
    chart_start: &'r RuleCategory,
    returns: &'r RuleCategory,
    return_ignore: &'r RuleCategory,
    budget: usize,
}

impl<'r> Segmenter<'r> {
    pub fn new(rules: &'r RuleSet, budget: usize) -> Self {
        Self::from_categories(&rules.chart_start, &rules.returns, &rules.return_ignore, budget)
    }

    pub fn from_categories(
        chart_start: &'r RuleCategory,
        returns: &'r RuleCategory,
        return_ignore: &'r RuleCategory,
        budget: usize,
    ) -> Self {
        Self {
            chart_start,
            returns,
            return_ignore,
            budget,
        }
    }

    /// Segment `lines` into paragraphs and batch them into units
    pub fn segment(&self, lines: &[Line]) -> Segmentation {
        let mut hits = HitLog::new();
        let mut batcher = UnitBatcher::new(self.budget);
        let mut body = ParagraphBuffer::default();
        let mut chart = ParagraphBuffer::default();
        let mut in_chart = false;
        let last = lines.len().saturating_sub(1);

        for (i, line) in lines.iter().enumerate() {
            let text = line.text.as_str();

            if hits.classify(text, self.chart_start).is_some() {
                in_chart = true;
            }

            let active = if in_chart { &mut chart } else { &mut body };
            let line_len = char_len(text);

            if !active.oversized && batcher.pending_len() + active.len + line_len > self.budget {
                batcher.flush();
                if active.len + line_len > self.budget {
                    debug!("Line {}: paragraph exceeds {} char(s)", line.original_index, self.budget);
                    active.oversized = true;
                }
            }

            let end_of_stream = i == last;
            if self.is_boundary(text, &mut hits) || end_of_stream {
                batcher.push(active.seal(text, in_chart));
                in_chart = false;
            } else {
                active.append(text);
            }
        }

        // The stream can end while the other buffer still holds text
        for (buffer, is_chart_caption) in [(&mut body, false), (&mut chart, true)] {
            if !buffer.is_empty() {
                let mut paragraph = buffer.seal("", is_chart_caption);
                paragraph.text.truncate(paragraph.text.trim_end().len());
                batcher.push(paragraph);
            }
        }

        let document = Document::new(batcher.finish());
        debug!(
            "Segmented {} line(s) into {} unit(s), {} oversized",
            lines.len(),
            document.units.len(),
            document.oversized_count()
        );

        Segmentation { document, hits }
    }

    /// A return match that no return-ignore rule vetoes
    fn is_boundary(&self, text: &str, hits: &mut HitLog) -> bool {
        hits.classify(text, self.returns).is_some() && hits.classify(text, self.return_ignore).is_none()
    }
}
