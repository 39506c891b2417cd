//! Answer step: retrieved context plus question, sent to a generator.

use tracing::{info, warn};

use crate::retriever::Retriever;
use crate::traits::embedder::Embedder;
use crate::traits::generator::Generator;

/// Context used when retrieval finds nothing.
pub const NO_CONTEXT: &str = "No specific document found for this query.";

/// Reply when the generator fails.
pub const GENERATION_FAILED: &str = "I'm having trouble connecting to the AI server right now.";

/// Reply when a live page could not be read.
pub const PAGE_UNREADABLE: &str = "I couldn't read that link. It might be blocked or empty.";

/// Live page text beyond this many characters is not sent to the model.
pub const MAX_PAGE_CHARS: usize = 10_000;

const DEFAULT_PREAMBLE: &str = "Answer the user's question strictly based on the CONTEXT DATA below. \
If the answer is not in the context, say you don't have that information. Do not make up facts.";

/// Answers questions from the knowledge base.
pub struct Assistant<E, G> {
    retriever: Retriever<E>,
    generator: G,
    preamble: String,
}

impl<E: Embedder, G: Generator> Assistant<E, G> {
    pub fn new(retriever: Retriever<E>, generator: G) -> Self {
        Self {
            retriever,
            generator,
            preamble: DEFAULT_PREAMBLE.to_string(),
        }
    }

    /// Replace the instructions placed before the context.
    pub fn with_preamble(mut self, preamble: impl Into<String>) -> Self {
        self.preamble = preamble.into();
        self
    }

    pub fn retriever(&self) -> &Retriever<E> {
        &self.retriever
    }

    /// Answer from retrieved context; never fails.
    ///
    /// An absent or empty knowledge base falls back to [`NO_CONTEXT`].
    pub async fn answer(&self, question: &str) -> String {
        let context = self.retriever.context(question).await;
        let context = if context.is_empty() {
            info!("No context retrieved; answering without documents");
            NO_CONTEXT.to_string()
        } else {
            context
        };

        let prompt = format!(
            "{}\n\nCONTEXT DATA:\n{}\n\nUSER QUESTION:\n{}",
            self.preamble, context, question
        );
        self.generate(&prompt).await
    }

    /// Answer from the text of a live page.
    ///
    /// `None` (the page could not be read) yields [`PAGE_UNREADABLE`].
    pub async fn answer_from_page(&self, page_text: Option<&str>, question: &str) -> String {
        let Some(text) = page_text else {
            return PAGE_UNREADABLE.to_string();
        };

        let truncated: String = text.chars().take(MAX_PAGE_CHARS).collect();
        let prompt = format!(
            "Read this website content and answer the user's question.\n\nWEBSITE CONTENT:\n{}\n\nUSER QUESTION:\n{}",
            truncated, question
        );
        self.generate(&prompt).await
    }

    /// Pass the question to the generator with no retrieval.
    pub async fn answer_general(&self, question: &str) -> String {
        self.generate(question).await
    }

    async fn generate(&self, prompt: &str) -> String {
        match self.generator.generate(prompt).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(error = %e, "Generation failed");
                GENERATION_FAILED.to_string()
            }
        }
    }
}
