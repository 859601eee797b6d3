/*!
 * Translator back ends.
 *
 * The reconstruction pipeline only needs one operation from a translator:
 * take the joined text of a unit and return one translated line per
 * paragraph. This module defines that seam and its implementations:
 * - DeepL: the DeepL REST API
 * - Mock: scripted translator for tests and dry runs
 */

use async_trait::async_trait;
use log::debug;
use std::fmt::Debug;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::errors::ProviderError;

/// Common trait for all translator back ends
#[async_trait]
pub trait Translator: Send + Sync + Debug {
    /// Translate `text` (one paragraph per line) into `target_language`.
    ///
    /// # Returns
    /// * `Result<Vec<String>, ProviderError>` - One string per input line, in order
    async fn translate(&self, text: &str, target_language: &str) -> Result<Vec<String>, ProviderError>;

    /// Test the connection to the back end
    async fn test_connection(&self) -> Result<(), ProviderError>;

    /// Human-readable name used in logs
    fn name(&self) -> &str;
}

/// Split a translated answer into lines, the way the answer is aligned with
/// the paragraphs that were sent
pub fn split_translated(text: &str) -> Vec<String> {
    text.lines().map(str::to_string).collect()
}

/// Serialises calls into a shared translator.
///
/// Documents translated concurrently share one back end; this wrapper keeps a
/// single request in flight at a time.
#[derive(Debug, Clone)]
pub struct ExclusiveTranslator {
    inner: Arc<dyn Translator>,
    gate: Arc<Mutex<()>>,
}

impl ExclusiveTranslator {
    pub fn new(inner: Arc<dyn Translator>) -> Self {
        Self {
            inner,
            gate: Arc::new(Mutex::new(())),
        }
    }
}

#[async_trait]
impl Translator for ExclusiveTranslator {
    async fn translate(&self, text: &str, target_language: &str) -> Result<Vec<String>, ProviderError> {
        let _guard = self.gate.lock().await;
        debug!("{}: translating {} byte(s)", self.inner.name(), text.len());
        self.inner.translate(text, target_language).await
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        let _guard = self.gate.lock().await;
        self.inner.test_connection().await
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}

pub mod deepl;
pub mod mock;
