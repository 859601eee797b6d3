/*!
 * Document model types for reconstruction.
 *
 * Lines come from the extractor, paragraphs are sealed by segmentation and
 * grouped into translation units; a document is the ordered list of units
 * for one input file.
 */

use serde::Serialize;

/// Length of a text in Unicode scalar values, the unit of the character budget
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// One extracted line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Line {
    // @field: Line text, without the line break
    pub text: String,

    // @field: Position in the extractor's output
    pub original_index: usize,
}

impl Line {
    pub fn new(text: impl Into<String>, original_index: usize) -> Self {
        Self {
            text: text.into(),
            original_index,
        }
    }

    /// Same position, new text
    pub fn with_text(&self, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            original_index: self.original_index,
        }
    }

    /// Number the given texts in order
    pub fn from_texts<I, S>(texts: I) -> Vec<Line>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        texts
            .into_iter()
            .enumerate()
            .map(|(index, text)| Line::new(text, index))
            .collect()
    }
}

/// A sealed paragraph
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Paragraph {
    pub text: String,
    pub is_chart_caption: bool,
    pub is_oversized: bool,
}

impl Paragraph {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_chart_caption: false,
            is_oversized: false,
        }
    }

    pub fn char_len(&self) -> usize {
        char_len(&self.text)
    }
}

/// Paragraphs sent to the translator in one call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranslationUnit {
    pub paragraphs: Vec<Paragraph>,
    pub is_oversized: bool,
}

impl TranslationUnit {
    /// A unit of regular paragraphs
    pub fn batched(paragraphs: Vec<Paragraph>) -> Self {
        Self {
            paragraphs,
            is_oversized: false,
        }
    }

    /// A unit holding one paragraph that alone exceeds the budget
    pub fn oversized(mut paragraph: Paragraph) -> Self {
        paragraph.is_oversized = true;
        Self {
            paragraphs: vec![paragraph],
            is_oversized: true,
        }
    }

    /// Sum of paragraph lengths
    pub fn char_len(&self) -> usize {
        self.paragraphs.iter().map(Paragraph::char_len).sum()
    }

    /// Text handed to the translator: one paragraph per line
    pub fn joined_text(&self) -> String {
        self.paragraphs
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// All units of one input file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Document {
    pub units: Vec<TranslationUnit>,
}

impl Document {
    pub fn new(units: Vec<TranslationUnit>) -> Self {
        Self { units }
    }

    pub fn paragraphs(&self) -> impl Iterator<Item = &Paragraph> {
        self.units.iter().flat_map(|u| u.paragraphs.iter())
    }

    pub fn oversized_count(&self) -> usize {
        self.units.iter().filter(|u| u.is_oversized).count()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}
