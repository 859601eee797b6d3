/*!
 * Line extractors.
 *
 * An extractor turns an input file into the flat, ordered line list that
 * reconstruction starts from. PDFs go through `pdf-extract`; plain text files
 * are read as-is, which is handy for re-running a document whose text was
 * extracted elsewhere.
 */

use log::debug;
use std::fs;
use std::path::Path;

use crate::errors::ExtractionError;
use crate::reconstruction::Line;

/// Produces the ordered line list of a document
pub trait LineExtractor: Send + Sync {
    /// Extract every non-empty line of the file at `path`
    fn extract_lines(&self, path: &Path) -> Result<Vec<Line>, ExtractionError>;
}

/// Split extracted text into lines, dropping empty ones.
/// `original_index` is the position in the unfiltered text.
pub fn lines_from_text(text: &str) -> Vec<Line> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.is_empty())
        .map(|(index, line)| Line::new(line, index))
        .collect()
}

fn read_bytes(path: &Path) -> Result<Vec<u8>, ExtractionError> {
    fs::read(path).map_err(|source| ExtractionError::Io {
        path: path.display().to_string(),
        source,
    })
}

/// Extracts the text layer of a PDF
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfExtractor;

impl LineExtractor for PdfExtractor {
    fn extract_lines(&self, path: &Path) -> Result<Vec<Line>, ExtractionError> {
        let bytes = read_bytes(path)?;

        let text = pdf_extract::extract_text_from_mem(&bytes).map_err(|e| {
            ExtractionError::UnsupportedFormat {
                path: path.display().to_string(),
                reason: e.to_string(),
            }
        })?;

        let lines = lines_from_text(&text);
        debug!("Extracted {} line(s) from {}", lines.len(), path.display());
        Ok(lines)
    }
}

/// Reads a UTF-8 text file line by line
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainTextExtractor;

impl LineExtractor for PlainTextExtractor {
    fn extract_lines(&self, path: &Path) -> Result<Vec<Line>, ExtractionError> {
        let bytes = read_bytes(path)?;

        let text = String::from_utf8(bytes).map_err(|e| ExtractionError::UnsupportedFormat {
            path: path.display().to_string(),
            reason: format!("not valid UTF-8: {}", e),
        })?;

        Ok(lines_from_text(&text))
    }
}

/// Input kinds the application understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Pdf,
    Text,
}

impl InputKind {
    /// Kind of `path`, by extension
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_string_lossy().to_lowercase();
        match ext.as_str() {
            "pdf" => Some(Self::Pdf),
            "txt" => Some(Self::Text),
            _ => None,
        }
    }

    pub fn extractor(&self) -> &'static dyn LineExtractor {
        match self {
            Self::Pdf => &PdfExtractor,
            Self::Text => &PlainTextExtractor,
        }
    }
}

/// Extract `path` with the extractor matching its extension
pub fn extract_lines(path: &Path) -> Result<Vec<Line>, ExtractionError> {
    let kind = InputKind::from_path(path).ok_or_else(|| ExtractionError::UnsupportedFormat {
        path: path.display().to_string(),
        reason: "expected a .pdf or .txt file".to_string(),
    })?;

    kind.extractor().extract_lines(path)
}
