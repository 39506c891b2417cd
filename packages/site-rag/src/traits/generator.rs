//! Generator trait for the answer step.

use async_trait::async_trait;

use crate::error::Result;

/// Prompt-in, text-out generative model.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Generate a completion for a fully built prompt.
    async fn generate(&self, prompt: &str) -> Result<String>;
}

#[async_trait]
impl<G: Generator + ?Sized> Generator for std::sync::Arc<G> {
    async fn generate(&self, prompt: &str) -> Result<String> {
        (**self).generate(prompt).await
    }
}
