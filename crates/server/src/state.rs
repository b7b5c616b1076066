use crate::config::ServerConfig;
use crate::conversation::ConversationStore;
use crate::error::ServerResult;
use medchat::{Chatbot, MedchatConfig};
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct ServerState {
    pub config: Arc<ServerConfig>,

    /// Router, knowledge base and (when the index loaded) the retrieval pipeline.
    /// Read-only after start-up.
    pub chatbot: Arc<Chatbot>,

    pub conversations: ConversationStore,
}

impl ServerState {
    /// Loads the pipeline config and builds the chatbot. A missing or broken
    /// index artifact does not fail start-up; see [`Chatbot::from_config`].
    pub fn new(config: ServerConfig) -> ServerResult<Self> {
        let pipeline = MedchatConfig::load_or_default(config.pipeline_config.as_deref())?;
        let chatbot = Chatbot::from_config(&pipeline);
        Ok(Self::with_chatbot(config, chatbot))
    }

    pub fn with_chatbot(config: ServerConfig, chatbot: Chatbot) -> Self {
        let conversations = ConversationStore::new(
            config.max_history_per_conversation,
            config.max_conversations,
        );
        Self {
            config: Arc::new(config),
            chatbot: Arc::new(chatbot),
            conversations,
        }
    }
}
