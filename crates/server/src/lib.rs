//! Medchat Server - HTTP chat API for the medchat bot
//!
//! Wraps [`medchat::Chatbot`] in an Axum service and keeps per-conversation
//! history in memory for the lifetime of the process.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use server::ServerConfig;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::load()?;
//!     server::start_server(config).await?;
//!     Ok(())
//! }
//! ```
//!
//! # API Endpoints
//!
//! - `POST /send_message` - `{message, conversation_id}` → `{success, response: {text, type, timestamp}, conversation_id}`
//! - `POST /clear_chat` - `{conversation_id}` → `{success: true}`; clearing twice is fine
//! - `GET /get_disclaimer` - `{text, type: "disclaimer"}`
//! - `GET /history/{conversation_id}` - recorded turns, oldest first
//! - `GET /health`, `GET /ready` - probes; `/ready` reports whether retrieval is loaded
//!
//! Configuration comes from `server.{toml,yaml}` and `MEDCHAT_SERVER__*`
//! environment variables; see [`ServerConfig`].

pub mod config;
pub mod conversation;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use conversation::{ChatTurn, ConversationStore, Speaker};
pub use error::{ServerError, ServerResult};
pub use server::{build_router, start_server};
pub use state::ServerState;
