//! `medchat` command line: build the index artifact offline, or ask a single question.
//!
//! ```bash
//! medchat build-index --corpus data/corpus --config medchat.yaml
//! medchat ask "what is cholera?" --config medchat.yaml
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use medchat::{Chatbot, MedchatConfig, build_and_save};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "medchat")]
#[command(about = "Medical information chatbot with retrieval-augmented answers")]
struct Cli {
    /// Pipeline YAML config; built-in defaults when omitted
    #[arg(long, global = true, env = "MEDCHAT_CONFIG")]
    config: Option<PathBuf>,

    /// Log as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Chunk and embed a directory of .txt/.md files into an index artifact
    BuildIndex {
        #[arg(long)]
        corpus: PathBuf,
        /// Overrides `index.path` from the config
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Answer one message the way the chat endpoint would
    Ask { message: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    let cfg = MedchatConfig::load_or_default(cli.config.as_deref())
        .context("failed to load medchat config")?;

    match cli.command {
        Command::BuildIndex { corpus, output } => {
            let index = build_and_save(&corpus, output.as_deref(), &cfg)
                .await
                .with_context(|| format!("failed to build index from {}", corpus.display()))?;
            let path = output.unwrap_or_else(|| cfg.index.path.clone());
            println!(
                "Indexed {} chunks (dim {}) into {}",
                medchat::VectorIndex::len(&index),
                medchat::VectorIndex::dimension(&index),
                path.display()
            );
        }
        Command::Ask { message } => {
            let bot = Chatbot::from_config(&cfg);
            let reply = bot.respond(&message).await;
            println!("[{}] ({}) {}", reply.timestamp, reply.kind, reply.text);
            for source in &reply.sources {
                println!("  source: {} (score {:.3})", source.source, source.score);
            }
        }
    }

    Ok(())
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}
