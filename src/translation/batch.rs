/*!
 * Multi-document translation.
 *
 * Documents are independent pipelines and may be translated concurrently;
 * units within a document never are. The translator handed to the batch
 * must already serialise its calls (see `ExclusiveTranslator`).
 */

use futures::stream::{self, StreamExt};
use log::error;
use std::time::Instant;

use super::core::{DocumentTranslator, TranslatedDocument};
use crate::errors::TranslationError;
use crate::reconstruction::Document;

/// A document waiting for translation
#[derive(Debug, Clone)]
pub struct DocumentJob {
    /// Name used in logs and progress
    pub name: String,
    pub document: Document,
}

impl DocumentJob {
    pub fn new(name: impl Into<String>, document: Document) -> Self {
        Self {
            name: name.into(),
            document,
        }
    }
}

/// Batch translator for processing several documents
pub struct BatchTranslator<'r> {
    /// The per-document driver
    translator: DocumentTranslator<'r>,

    /// Maximum number of documents in flight
    max_concurrent_documents: usize,
}

impl<'r> BatchTranslator<'r> {
    pub fn new(translator: DocumentTranslator<'r>, max_concurrent_documents: usize) -> Self {
        Self {
            translator,
            max_concurrent_documents: max_concurrent_documents.max(1),
        }
    }

    /// Translate every job. Results come back in job order; a failed document
    /// does not stop the others.
    pub async fn translate_documents(
        &self,
        jobs: &[DocumentJob],
        progress_callback: impl Fn(usize, usize, usize) + Send + Sync,
    ) -> Vec<Result<TranslatedDocument, TranslationError>> {
        let progress_callback = &progress_callback;

        let mut results = stream::iter(jobs.iter().enumerate())
            .map(|(job_index, job)| async move {
                let start_time = Instant::now();
                let on_unit = move |done: usize, total: usize| progress_callback(job_index, done, total);

                let result = self
                    .translator
                    .translate_document(&job.name, &job.document, &on_unit)
                    .await;

                if let Err(e) = &result {
                    error!("{} failed after {:?}: {}", job.name, start_time.elapsed(), e);
                }

                (job_index, result)
            })
            .buffer_unordered(self.max_concurrent_documents)
            .collect::<Vec<_>>()
            .await;

        // Restore job order
        results.sort_by_key(|(index, _)| *index);
        results.into_iter().map(|(_, result)| result).collect()
    }
}
