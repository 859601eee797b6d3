/*!
 * Translation of reconstructed documents.
 *
 * - `core`: the per-document driver, cancellation and reports
 * - `batch`: concurrent translation of several documents
 */

pub use self::batch::{BatchTranslator, DocumentJob};
pub use self::core::{CancellationFlag, DocumentTranslator, TranslatedDocument, TranslationReport};

pub mod batch;
pub mod core;
