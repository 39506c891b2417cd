//! Gemini implementation of the embedding and generation traits.
//!
//! # Example
//!
//! ```rust,ignore
//! use site_rag::gemini::Gemini;
//!
//! let gemini = Gemini::from_env()?;
//! let report = builder.build(&content, &extractor, &gemini).await?;
//! ```

use async_trait::async_trait;
use gemini_client::{GeminiClient, TaskType};

use crate::error::{RagError, Result};
use crate::traits::embedder::Embedder;
use crate::traits::generator::Generator;

/// Embedder and generator backed by the Gemini API.
#[derive(Debug, Clone)]
pub struct Gemini {
    client: GeminiClient,
}

impl Gemini {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: GeminiClient::new(api_key),
        }
    }

    /// Create from environment variable `GEMINI_API_KEY`.
    pub fn from_env() -> Result<Self> {
        let client = GeminiClient::from_env().map_err(|e| RagError::Config(e.to_string()))?;
        Ok(Self { client })
    }

    /// Wrap a preconfigured client.
    pub fn from_client(client: GeminiClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &GeminiClient {
        &self.client
    }
}

#[async_trait]
impl Embedder for Gemini {
    async fn embed_document(&self, text: &str) -> Result<Vec<f32>> {
        self.client
            .embed_content(text, TaskType::RetrievalDocument)
            .await
            .map_err(|e| RagError::Embedding(Box::new(e)))
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        self.client
            .embed_content(text, TaskType::RetrievalQuery)
            .await
            .map_err(|e| RagError::Embedding(Box::new(e)))
    }

    fn name(&self) -> &str {
        self.client.embedding_model()
    }
}

#[async_trait]
impl Generator for Gemini {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.client
            .generate_content(prompt)
            .await
            .map_err(|e| RagError::Generation(Box::new(e)))
    }
}
