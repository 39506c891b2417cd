//! Minimal Google Gemini REST API client
//!
//! Covers the two calls a retrieval pipeline needs: single-text embeddings
//! and prompt-in, text-out generation.
//!
//! # Example
//!
//! ```rust,ignore
//! use gemini_client::{GeminiClient, TaskType};
//!
//! let client = GeminiClient::from_env()?;
//!
//! let vector = client.embed_content("tuition fees", TaskType::RetrievalQuery).await?;
//! let answer = client.generate_content("Say hello").await?;
//! ```

pub mod error;
pub mod types;

pub use error::{GeminiError, Result};
pub use types::*;

use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-004";
pub const DEFAULT_GENERATION_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_FALLBACK_MODEL: &str = "gemini-pro-latest";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Gemini API client.
#[derive(Clone)]
pub struct GeminiClient {
    http_client: Client,
    api_key: String,
    base_url: String,
    embedding_model: String,
    generation_model: String,
    fallback_model: Option<String>,
    timeout: Duration,
}

impl GeminiClient {
    /// Create a new client with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http_client: Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            generation_model: DEFAULT_GENERATION_MODEL.to_string(),
            fallback_model: Some(DEFAULT_FALLBACK_MODEL.to_string()),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Create from environment variable `GEMINI_API_KEY`.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .map_err(|_| GeminiError::Config("GEMINI_API_KEY not set".into()))?;
        if api_key.trim().is_empty() {
            return Err(GeminiError::Config("GEMINI_API_KEY is empty".into()));
        }
        Ok(Self::new(api_key))
    }

    /// Set a custom base URL (for proxies or tests).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_embedding_model(mut self, model: impl Into<String>) -> Self {
        self.embedding_model = model.into();
        self
    }

    pub fn with_generation_model(mut self, model: impl Into<String>) -> Self {
        self.generation_model = model.into();
        self
    }

    /// Model tried when the generation model is not found; `None` disables
    /// the fallback.
    pub fn with_fallback_model(mut self, model: Option<String>) -> Self {
        self.fallback_model = model;
        self
    }

    /// Per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn embedding_model(&self) -> &str {
        &self.embedding_model
    }

    pub fn generation_model(&self) -> &str {
        &self.generation_model
    }

    /// Embed one text for the given task.
    pub async fn embed_content(&self, text: &str, task_type: TaskType) -> Result<Vec<f32>> {
        let request = EmbedContentRequest {
            model: format!("models/{}", self.embedding_model),
            content: Content::text(text),
            task_type,
        };

        let response: EmbedContentResponse = self
            .post(&self.embedding_model, "embedContent", &request)
            .await?;

        if response.embedding.values.is_empty() {
            return Err(GeminiError::Parse("empty embedding returned".into()));
        }
        Ok(response.embedding.values)
    }

    /// Generate text for a prompt.
    ///
    /// If the generation model is not found (404), the fallback model is
    /// tried once.
    pub async fn generate_content(&self, prompt: &str) -> Result<String> {
        match self.generate_with(&self.generation_model, prompt).await {
            Err(e) if e.is_not_found() => match &self.fallback_model {
                Some(fallback) => {
                    warn!(
                        model = %self.generation_model,
                        fallback = %fallback,
                        "Primary model not found; switching to fallback"
                    );
                    self.generate_with(fallback, prompt).await
                }
                None => Err(e),
            },
            other => other,
        }
    }

    async fn generate_with(&self, model: &str, prompt: &str) -> Result<String> {
        let start = std::time::Instant::now();
        let response: GenerateContentResponse = self
            .post(model, "generateContent", &GenerateContentRequest::prompt(prompt))
            .await?;

        debug!(
            model = %model,
            duration_ms = start.elapsed().as_millis(),
            "Gemini generation"
        );

        response.text().ok_or_else(|| GeminiError::Api {
            status: 200,
            message: "No candidates returned".into(),
        })
    }

    async fn post<B, R>(&self, model: &str, method: &str, body: &B) -> Result<R>
    where
        B: serde::Serialize + ?Sized,
        R: serde::de::DeserializeOwned,
    {
        let response = self
            .http_client
            .post(format!("{}/models/{}:{}", self.base_url, model, method))
            .header("x-goog-api-key", &self.api_key)
            .timeout(self.timeout)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, method, "Gemini request failed");
                GeminiError::Network(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorResponse>(&error_text)
                .map(|e| e.error.message)
                .unwrap_or(error_text);
            warn!(status = %status, error = %message, method, "Gemini API error");
            return Err(GeminiError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json()
            .await
            .map_err(|e| GeminiError::Parse(e.to_string()))
    }
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("base_url", &self.base_url)
            .field("embedding_model", &self.embedding_model)
            .field("generation_model", &self.generation_model)
            .field("fallback_model", &self.fallback_model)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_builder() {
        let client = GeminiClient::new("key-test")
            .with_base_url("https://proxy.example.com/v1beta/")
            .with_generation_model("gemini-test");

        assert_eq!(client.api_key, "key-test");
        assert_eq!(client.base_url(), "https://proxy.example.com/v1beta");
        assert_eq!(client.generation_model(), "gemini-test");
        assert_eq!(client.embedding_model(), DEFAULT_EMBEDDING_MODEL);
    }

    #[test]
    fn test_debug_hides_api_key() {
        let client = GeminiClient::new("secret-key");
        assert!(!format!("{:?}", client).contains("secret-key"));
    }

    #[test]
    fn test_not_found_detection() {
        let err = GeminiError::Api {
            status: 404,
            message: "models/x is not found".into(),
        };
        assert!(err.is_not_found());
        assert!(!GeminiError::Network("reset".into()).is_not_found());
    }
}
