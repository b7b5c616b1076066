use std::fmt;
use std::sync::Arc;

use rag::{Confidence, RagOrchestrator, SourceRef};
use serde::{Deserialize, Serialize};

use crate::config::MedchatConfig;
use crate::knowledge::KnowledgeBase;
use crate::pipeline::load_orchestrator;
use crate::router::{Intent, IntentRouter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseType {
    Emergency,
    Symptom,
    Advice,
    Rag,
    General,
}

impl ResponseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseType::Emergency => "emergency",
            ResponseType::Symptom => "symptom",
            ResponseType::Advice => "advice",
            ResponseType::Rag => "rag",
            ResponseType::General => "general",
        }
    }
}

impl fmt::Display for ResponseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One bot reply.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatReply {
    pub text: String,
    #[serde(rename = "type")]
    pub kind: ResponseType,
    /// Local wall-clock time, `HH:MM`.
    pub timestamp: String,
    /// Retrieved passages behind a `rag` reply.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<SourceRef>,
}

impl ChatReply {
    pub fn new(text: impl Into<String>, kind: ResponseType) -> Self {
        Self {
            text: text.into(),
            kind,
            timestamp: current_timestamp(),
            sources: Vec::new(),
        }
    }
}

pub fn current_timestamp() -> String {
    chrono::Local::now().format("%H:%M").to_string()
}

/// Routes a message and produces exactly one reply.
///
/// Never fails: retrieval errors and a missing pipeline both become an apology
/// of type `general`.
#[derive(Clone)]
pub struct Chatbot {
    router: IntentRouter,
    rag: Option<Arc<RagOrchestrator>>,
}

impl Chatbot {
    pub fn new(kb: Arc<KnowledgeBase>, rag: Option<Arc<RagOrchestrator>>) -> Self {
        Self {
            router: IntentRouter::new(kb),
            rag,
        }
    }

    /// Builds the bot from config, loading the index artifact. When the index
    /// cannot be loaded the bot still starts, without retrieval.
    pub fn from_config(cfg: &MedchatConfig) -> Self {
        let rag = match load_orchestrator(cfg) {
            Ok(rag) => {
                tracing::info!(
                    documents = rag.retriever().index_len(),
                    path = %cfg.index.path.display(),
                    "retrieval pipeline ready"
                );
                Some(Arc::new(rag))
            }
            Err(err) => {
                tracing::error!(
                    error = %err,
                    path = %cfg.index.path.display(),
                    "retrieval pipeline unavailable; medical questions will get an apology"
                );
                None
            }
        };
        Self::new(Arc::new(cfg.knowledge.clone()), rag)
    }

    pub fn knowledge(&self) -> &KnowledgeBase {
        self.router.knowledge()
    }

    pub fn rag_available(&self) -> bool {
        self.rag.is_some()
    }

    /// Keyword-only emergency check, usable on messages that are otherwise
    /// rejected before [`Chatbot::respond`] runs.
    pub fn is_emergency(&self, message: &str) -> bool {
        self.router.is_emergency(message)
    }

    pub async fn respond(&self, message: &str) -> ChatReply {
        let kb = self.router.knowledge();
        let intent = self.router.classify(message);
        tracing::debug!(intent = intent_label(&intent), "message classified");

        match intent {
            Intent::Emergency => ChatReply::new(kb.emergency_message.clone(), ResponseType::Emergency),
            Intent::Symptom(entry) => ChatReply::new(kb.symptom_reply(&entry), ResponseType::Symptom),
            Intent::Advice(entry) => ChatReply::new(entry.advice, ResponseType::Advice),
            Intent::Medical => self.answer_medical(message).await,
            Intent::General => ChatReply::new(kb.greeting.clone(), ResponseType::General),
        }
    }

    async fn answer_medical(&self, message: &str) -> ChatReply {
        let kb = self.router.knowledge();
        let Some(rag) = self.rag.as_ref() else {
            tracing::warn!("medical question received but retrieval pipeline is not loaded");
            return ChatReply::new(kb.apology.clone(), ResponseType::General);
        };

        match rag.answer(message.trim()).await {
            Ok(answer) if answer.confidence == Confidence::Grounded => ChatReply {
                sources: answer.sources,
                ..ChatReply::new(answer.text, ResponseType::Rag)
            },
            Ok(answer) => ChatReply::new(answer.text, ResponseType::General),
            Err(err) => {
                tracing::warn!(error = %err, "retrieval pipeline failed");
                ChatReply::new(kb.apology.clone(), ResponseType::General)
            }
        }
    }
}

fn intent_label(intent: &Intent) -> &'static str {
    match intent {
        Intent::Emergency => "emergency",
        Intent::Symptom(_) => "symptom",
        Intent::Advice(_) => "advice",
        Intent::Medical => "medical",
        Intent::General => "general",
    }
}
