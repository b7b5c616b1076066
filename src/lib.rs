//! Workspace umbrella crate for medchat.
//!
//! Incoming messages are classified by [`IntentRouter`]: emergency keywords short-circuit
//! everything, then the static symptom and advice tables are consulted, and
//! only messages that look like medical questions reach the retrieval pipeline
//! ([`rag::RagOrchestrator`]). Everything else gets a greeting.
//!
//! [`Chatbot`] ties the router to the pipeline and always produces exactly one
//! [`ChatReply`]. The HTTP surface lives in the `medchat-server` crate.

pub mod chatbot;
pub mod config;
pub mod knowledge;
pub mod pipeline;
pub mod router;

pub use chatbot::{ChatReply, Chatbot, ResponseType, current_timestamp};
pub use config::{ConfigLoadError, IndexYamlConfig, MedchatConfig};
pub use knowledge::{KnowledgeBase, TopicEntry};
pub use pipeline::{BuildError, build_and_save, build_index, load_orchestrator};
pub use router::{Intent, IntentRouter};

pub use index::{Document, FlatIndex, IndexError, ScoredDocument, VectorIndex};
pub use rag::{
    Confidence, GenerationError, Generator, RagAnswer, RagConfig, RagError, RagOrchestrator,
    Retriever, SourceRef, TOP_K,
};
pub use semantic::{Embedder, EmbeddingError, SemanticConfig};

pub use {index, rag, semantic};
