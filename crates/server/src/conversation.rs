//! In-memory chat history, keyed by conversation id.
//!
//! Lives for the process lifetime only; nothing is persisted.

use dashmap::DashMap;
use medchat::{ChatReply, ResponseType};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

pub const DEFAULT_CONVERSATION_ID: &str = "default";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Bot,
}

/// One side of an exchange.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatTurn {
    pub speaker: Speaker,
    pub text: String,
    /// `None` for user turns.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<ResponseType>,
    pub timestamp: String,
}

impl ChatTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::User,
            text: text.into(),
            kind: None,
            timestamp: medchat::current_timestamp(),
        }
    }

    pub fn bot(reply: &ChatReply) -> Self {
        Self {
            speaker: Speaker::Bot,
            text: reply.text.clone(),
            kind: Some(reply.kind),
            timestamp: reply.timestamp.clone(),
        }
    }
}

#[derive(Debug, Default)]
struct Conversation {
    turns: Vec<ChatTurn>,
    /// Store-wide tick of the last recorded exchange.
    last_active: u64,
}

/// Per-conversation history, capped in whole exchanges. Once more than
/// `max_conversations` ids are live, the least recently active one is evicted.
#[derive(Debug, Clone)]
pub struct ConversationStore {
    conversations: Arc<DashMap<String, Conversation>>,
    clock: Arc<AtomicU64>,
    max_turns: usize,
    max_conversations: usize,
}

impl ConversationStore {
    /// `max_turns` is rounded down to an even number (at least one exchange).
    pub fn new(max_turns: usize, max_conversations: usize) -> Self {
        Self {
            conversations: Arc::new(DashMap::new()),
            clock: Arc::new(AtomicU64::new(0)),
            max_turns: max_turns.max(2) / 2 * 2,
            max_conversations: max_conversations.max(1),
        }
    }

    /// Appends one user message and the bot reply to it, dropping the oldest
    /// exchanges once the cap is exceeded.
    pub fn record_exchange(&self, conversation_id: &str, user: ChatTurn, bot: ChatTurn) {
        let tick = self.clock.fetch_add(1, Ordering::Relaxed);
        let mut created = false;
        {
            let mut conversation = self
                .conversations
                .entry(conversation_id.to_string())
                .or_insert_with(|| {
                    created = true;
                    Conversation::default()
                });
            conversation.last_active = tick;
            conversation.turns.push(user);
            conversation.turns.push(bot);
            let len = conversation.turns.len();
            if len > self.max_turns {
                conversation.turns.drain(..len - self.max_turns);
            }
        }

        if created {
            self.evict_idle(conversation_id);
        }
    }

    fn evict_idle(&self, keep: &str) {
        while self.conversations.len() > self.max_conversations {
            let oldest = self
                .conversations
                .iter()
                .filter(|entry| entry.key() != keep)
                .min_by_key(|entry| entry.value().last_active)
                .map(|entry| entry.key().clone());
            let Some(oldest) = oldest else { break };
            self.conversations.remove(&oldest);
            tracing::debug!(conversation_id = %oldest, "evicted idle conversation");
        }
    }

    pub fn history(&self, conversation_id: &str) -> Vec<ChatTurn> {
        self.conversations
            .get(conversation_id)
            .map(|conversation| conversation.turns.clone())
            .unwrap_or_default()
    }

    /// Removes all turns for `conversation_id`. Clearing an unknown or already
    /// empty conversation is not an error.
    pub fn clear(&self, conversation_id: &str) -> usize {
        self.conversations
            .remove(conversation_id)
            .map(|(_, conversation)| conversation.turns.len())
            .unwrap_or(0)
    }

    pub fn conversation_count(&self) -> usize {
        self.conversations.len()
    }
}
