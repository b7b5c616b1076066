use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::{GenerationError, Generator, PromptAssembler, RagConfig, RagError, Retriever};

/// Returned when retrieval finds nothing relevant. The generator is not called.
pub const LOW_CONFIDENCE_ANSWER: &str = "I don't have enough information in my medical references \
to answer that confidently. Please rephrase your question or consult a healthcare professional.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    /// Generated from at least one retrieved passage.
    Grounded,
    /// No passage was retrieved; the text is [`LOW_CONFIDENCE_ANSWER`].
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceRef {
    pub source: String,
    pub score: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RagAnswer {
    pub text: String,
    /// Passages the answer was generated from, best first. Empty iff `confidence` is `Low`.
    pub sources: Vec<SourceRef>,
    pub confidence: Confidence,
}

/// Retriever, then prompt assembly, then a single generation call.
///
/// Holds no per-conversation state; concurrent calls share the index and models
/// read-only.
pub struct RagOrchestrator {
    retriever: Retriever,
    assembler: PromptAssembler,
    generator: Arc<dyn Generator>,
    system_prompt: String,
    timeout: Duration,
}

impl RagOrchestrator {
    pub fn new(retriever: Retriever, generator: Arc<dyn Generator>, cfg: &RagConfig) -> Self {
        Self {
            retriever: retriever.with_min_score(cfg.min_score),
            assembler: PromptAssembler::new(cfg.max_prompt_chars),
            generator,
            system_prompt: cfg.system_prompt.clone(),
            timeout: Duration::from_secs(cfg.generation_timeout_secs),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn retriever(&self) -> &Retriever {
        &self.retriever
    }

    pub async fn answer(&self, query: &str) -> Result<RagAnswer, RagError> {
        let start = Instant::now();
        let hits = self.retriever.retrieve(query).await?;
        if hits.is_empty() {
            tracing::info!("no passages retrieved; returning low-confidence answer");
            return Ok(RagAnswer {
                text: LOW_CONFIDENCE_ANSWER.to_string(),
                sources: Vec::new(),
                confidence: Confidence::Low,
            });
        }

        let prompt = self.assembler.assemble(&self.system_prompt, &hits, query);
        if prompt.truncated > 0 {
            tracing::debug!(truncated = prompt.truncated, "prompt context shortened to fit budget");
        }

        let output = tokio::time::timeout(self.timeout, self.generator.generate(&prompt))
            .await
            .map_err(|_| GenerationError::Timeout(self.timeout.as_secs()))??;
        let text = output.trim();
        if text.is_empty() {
            return Err(GenerationError::EmptyOutput.into());
        }

        let sources = hits
            .iter()
            .map(|hit| SourceRef {
                source: hit.document.source.clone(),
                score: hit.score,
            })
            .collect();

        tracing::info!(
            passages = hits.len(),
            generator = self.generator.name(),
            duration_ms = start.elapsed().as_millis() as u64,
            "rag answer generated"
        );

        Ok(RagAnswer {
            text: text.to_string(),
            sources,
            confidence: Confidence::Grounded,
        })
    }
}
