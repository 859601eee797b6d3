/*!
 * DeepL client.
 *
 * Talks to the DeepL REST API (`/v2/translate`). The unit text is sent as a
 * single string, so DeepL keeps the paragraph-per-line layout and the answer
 * splits back into one line per paragraph.
 */

use async_trait::async_trait;
use log::{error, warn};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use super::{split_translated, Translator};
use crate::app_config::TranslationConfig;
use crate::errors::ProviderError;

/// DeepL client
#[derive(Debug)]
pub struct DeepL {
    /// HTTP client for API requests
    client: Client,
    /// API key for authentication
    api_key: String,
    /// Base URL of the API
    endpoint: Url,
    /// Maximum number of retry attempts
    max_retries: u32,
    /// Base backoff time in milliseconds for exponential backoff
    backoff_base_ms: u64,
}

/// Translate request body
#[derive(Debug, Serialize)]
pub struct TranslateRequest<'a> {
    /// Texts to translate
    text: Vec<&'a str>,
    /// Target language code
    target_lang: &'a str,
    /// Keep the line structure of the input
    split_sentences: &'a str,
    /// Keep the formatting of the input
    preserve_formatting: bool,
}

/// Translate response body
#[derive(Debug, Deserialize)]
pub struct TranslateResponse {
    pub translations: Vec<Translation>,
}

/// One translated text
#[derive(Debug, Deserialize)]
pub struct Translation {
    #[serde(default)]
    pub detected_source_language: Option<String>,
    pub text: String,
}

/// Error body returned by the API
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    message: String,
}

impl DeepL {
    /// Create a new DeepL client
    pub fn new(api_key: impl Into<String>, endpoint: &str, timeout: Duration) -> Result<Self, ProviderError> {
        Self::new_with_config(api_key, endpoint, timeout, 3, 1000)
    }

    /// Create a new DeepL client with explicit retry settings
    pub fn new_with_config(
        api_key: impl Into<String>,
        endpoint: &str,
        timeout: Duration,
        max_retries: u32,
        backoff_base_ms: u64,
    ) -> Result<Self, ProviderError> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| ProviderError::ConnectionError(format!("Invalid endpoint '{}': {}", endpoint, e)))?;

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::ConnectionError(e.to_string()))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            endpoint,
            max_retries,
            backoff_base_ms,
        })
    }

    /// Create a client from the translation section of the configuration
    pub fn from_config(config: &TranslationConfig) -> Result<Self, ProviderError> {
        Self::from_config_with_key(config, config.get_api_key())
    }

    /// Create a client from the configuration with an already resolved key
    pub fn from_config_with_key(config: &TranslationConfig, api_key: String) -> Result<Self, ProviderError> {
        if api_key.is_empty() {
            return Err(ProviderError::AuthenticationError(
                "No DeepL API key configured (set translation.api_key or DEEPL_API_KEY)".to_string(),
            ));
        }

        Self::new(api_key, &config.get_endpoint(), Duration::from_secs(config.timeout_secs))
    }

    fn url(&self, path: &str) -> Result<Url, ProviderError> {
        self.endpoint
            .join(path)
            .map_err(|e| ProviderError::ConnectionError(format!("Invalid endpoint path '{}': {}", path, e)))
    }

    fn auth_header(&self) -> String {
        format!("DeepL-Auth-Key {}", self.api_key)
    }

    /// Send one translate request, retrying rate limits, server errors and
    /// network failures with exponential backoff
    pub async fn complete(&self, request: &TranslateRequest<'_>) -> Result<TranslateResponse, ProviderError> {
        let url = self.url("v2/translate")?;
        let mut attempt = 0;

        loop {
            attempt += 1;

            let result = self
                .client
                .post(url.clone())
                .header("Authorization", self.auth_header())
                .json(request)
                .send()
                .await;

            let error = match result {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return response
                            .json::<TranslateResponse>()
                            .await
                            .map_err(|e| ProviderError::ParseError(e.to_string()));
                    }

                    let body = response.text().await.unwrap_or_default();
                    let message = serde_json::from_str::<ErrorResponse>(&body)
                        .map(|e| e.message)
                        .unwrap_or(body);
                    error!("DeepL API error ({}): {} - attempt {}/{}", status, message, attempt, self.max_retries + 1);
                    status_error(status, message)
                }
                Err(e) => {
                    error!("DeepL network error: {} - attempt {}/{}", e, attempt, self.max_retries + 1);
                    if e.is_timeout() || e.is_connect() {
                        ProviderError::ConnectionError(e.to_string())
                    } else {
                        ProviderError::RequestFailed(e.to_string())
                    }
                }
            };

            if attempt > self.max_retries || !is_retryable(&error) {
                return Err(error);
            }

            let backoff_ms = self.backoff_base_ms * (1u64 << (attempt - 1));
            warn!("Retrying DeepL request in {} ms", backoff_ms);
            tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
        }
    }
}

fn status_error(status: StatusCode, message: String) -> ProviderError {
    match status.as_u16() {
        401 | 403 => ProviderError::AuthenticationError(message),
        // 456: character quota exhausted
        429 | 456 => ProviderError::RateLimitExceeded(message),
        code => ProviderError::ApiError {
            status_code: code,
            message,
        },
    }
}

fn is_retryable(error: &ProviderError) -> bool {
    match error {
        ProviderError::ConnectionError(_) => true,
        ProviderError::RateLimitExceeded(message) => !message.to_lowercase().contains("quota"),
        ProviderError::ApiError { status_code, .. } => *status_code >= 500,
        _ => false,
    }
}

#[async_trait]
impl Translator for DeepL {
    async fn translate(&self, text: &str, target_language: &str) -> Result<Vec<String>, ProviderError> {
        let request = TranslateRequest {
            text: vec![text],
            target_lang: target_language,
            split_sentences: "nonewlines",
            preserve_formatting: true,
        };

        let response = self.complete(&request).await?;
        let translation = response
            .translations
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::ParseError("Response holds no translation".to_string()))?;

        Ok(split_translated(&translation.text))
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        let url = self.url("v2/usage")?;
        let response = self
            .client
            .get(url)
            .header("Authorization", self.auth_header())
            .send()
            .await
            .map_err(|e| ProviderError::ConnectionError(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(status_error(status, body))
        }
    }

    fn name(&self) -> &str {
        "DeepL"
    }
}
