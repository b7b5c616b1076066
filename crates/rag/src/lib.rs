//! Retrieval-augmented answering for medchat.
//!
//! A question flows through three stages, each behind a narrow seam:
//!
//! 1. [`Retriever`] embeds the question and fetches the [`TOP_K`] nearest passages
//!    from a [`index::VectorIndex`].
//! 2. [`PromptAssembler`] renders system instructions, passages and question into one
//!    prompt, shortening the lowest-ranked passages first when over budget.
//! 3. A [`Generator`] turns the prompt into text, either offline
//!    ([`ExtractiveGenerator`]) or through a hosted model ([`ApiGenerator`]).
//!
//! [`RagOrchestrator`] runs the stages in that fixed order. When nothing is
//! retrieved it returns a low-confidence answer without calling the generator;
//! empty generator output and timeouts are errors, never partial answers.

mod api;
mod config;
mod error;
mod generator;
mod orchestrator;
mod prompt;
mod retriever;

pub use api::ApiGenerator;
pub use config::{GeneratorConfig, RagConfig, DEFAULT_SYSTEM_PROMPT};
pub use error::{GenerationError, RagError};
pub use generator::{build_generator, ExtractiveGenerator, Generator};
pub use orchestrator::{Confidence, RagAnswer, RagOrchestrator, SourceRef, LOW_CONFIDENCE_ANSWER};
pub use prompt::{AssembledPrompt, PromptAssembler};
pub use retriever::{RetrievalResult, Retriever, TOP_K};
