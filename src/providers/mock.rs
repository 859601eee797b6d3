/*!
 * Mock translator for testing.
 *
 * This module provides a scripted translator that simulates different behaviors:
 * - `MockTranslator::working()` - Prefixes every line with the target language
 * - `MockTranslator::short()` - Drops the last line of every answer
 * - `MockTranslator::failing()` - Always fails with an error
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use super::{split_translated, Translator};
use crate::errors::ProviderError;

/// Behavior mode for the mock translator
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds, one line per input line
    Working,
    /// Answers with one line less than it was sent
    ShortAnswer,
    /// Answers with one extra line
    ExtraLine,
    /// Fails intermittently (every Nth request)
    Intermittent { fail_every: usize },
    /// Always fails with an error
    Failing,
    /// Succeeds after a delay
    Slow { delay_ms: u64 },
}

/// Scripted translator
#[derive(Debug)]
pub struct MockTranslator {
    // @field: Behavior mode
    behavior: MockBehavior,

    // @field: Request counter, shared between clones
    request_count: Arc<AtomicUsize>,

    // @field: Requests currently being answered
    in_flight: Arc<AtomicUsize>,

    // @field: Highest value `in_flight` reached
    max_in_flight: Arc<AtomicUsize>,

    // @field: Every text received, in order
    requests: Arc<Mutex<Vec<String>>>,

    // @field: Custom line translator (optional)
    custom_line: Option<fn(&str) -> String>,
}

impl MockTranslator {
    /// Create a new mock translator with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
            in_flight: Arc::new(AtomicUsize::new(0)),
            max_in_flight: Arc::new(AtomicUsize::new(0)),
            requests: Arc::new(Mutex::new(Vec::new())),
            custom_line: None,
        }
    }

    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    pub fn short() -> Self {
        Self::new(MockBehavior::ShortAnswer)
    }

    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    pub fn intermittent(fail_every: usize) -> Self {
        Self::new(MockBehavior::Intermittent { fail_every })
    }

    /// Translate each line with `translate_line` instead of the default prefix
    pub fn with_custom_line(mut self, translate_line: fn(&str) -> String) -> Self {
        self.custom_line = Some(translate_line);
        self
    }

    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Texts received so far
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().clone()
    }

    fn answer(&self, text: &str, target_language: &str) -> Vec<String> {
        split_translated(text)
            .iter()
            .map(|line| match self.custom_line {
                Some(translate_line) => translate_line(line),
                None => format!("[{}] {}", target_language, line),
            })
            .collect()
    }
}

impl Clone for MockTranslator {
    fn clone(&self) -> Self {
        Self {
            behavior: self.behavior,
            request_count: Arc::clone(&self.request_count),
            in_flight: Arc::clone(&self.in_flight),
            max_in_flight: Arc::clone(&self.max_in_flight),
            requests: Arc::clone(&self.requests),
            custom_line: self.custom_line,
        }
    }
}

#[async_trait]
impl Translator for MockTranslator {
    async fn translate(&self, text: &str, target_language: &str) -> Result<Vec<String>, ProviderError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().push(text.to_string());

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        let result = match self.behavior {
            MockBehavior::Working => Ok(self.answer(text, target_language)),

            MockBehavior::ShortAnswer => {
                let mut lines = self.answer(text, target_language);
                lines.pop();
                Ok(lines)
            }

            MockBehavior::ExtraLine => {
                let mut lines = self.answer(text, target_language);
                lines.push("[extra]".to_string());
                Ok(lines)
            }

            MockBehavior::Intermittent { fail_every } => {
                if fail_every > 0 && count % fail_every == fail_every - 1 {
                    Err(ProviderError::ApiError {
                        message: format!("Simulated intermittent failure (request #{})", count + 1),
                        status_code: 503,
                    })
                } else {
                    Ok(self.answer(text, target_language))
                }
            }

            MockBehavior::Failing => Err(ProviderError::ApiError {
                message: "Simulated translator failure".to_string(),
                status_code: 500,
            }),

            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(tokio::time::Duration::from_millis(delay_ms)).await;
                Ok(self.answer(text, target_language))
            }
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        match self.behavior {
            MockBehavior::Failing => Err(ProviderError::ConnectionError("Simulated outage".to_string())),
            _ => Ok(()),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}
