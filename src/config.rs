//! YAML configuration for the medchat pipeline.
//!
//! One file describes the embedder, the index artifact, the retrieval/generation
//! settings and the static knowledge base. Every section is optional and falls
//! back to its defaults.
//!
//! ## Example YAML Configuration
//!
//! ```yaml
//! version: "1.0"
//!
//! semantic:
//!   mode: "fast"
//!   model_name: "sentence-transformers/all-MiniLM-L6-v2"
//!   dimension: 384
//!
//! index:
//!   path: "data/medchat.index"
//!   chunk_size: 1000
//!   chunk_overlap: 100
//!   compression: "zstd"
//!
//! rag:
//!   max_prompt_chars: 2000
//!   generation_timeout_secs: 60
//!   generator:
//!     mode: "api"
//!     api_provider: "hf"
//!     api_url: "https://router.huggingface.co/hf-inference/models/google/flan-t5-base"
//!
//! knowledge:
//!   emergency_keywords: ["emergency", "chest pain", "unconscious"]
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use index::{CompressionCodec, CompressionConfig, TextSplitter};
use rag::RagConfig;
use semantic::SemanticConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::knowledge::KnowledgeBase;

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("unsupported config version: {0}")]
    UnsupportedVersion(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MedchatConfig {
    pub version: String,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub semantic: SemanticConfig,

    #[serde(default)]
    pub index: IndexYamlConfig,

    #[serde(default)]
    pub rag: RagConfig,

    #[serde(default)]
    pub knowledge: KnowledgeBase,
}

impl Default for MedchatConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            name: None,
            semantic: SemanticConfig::default(),
            index: IndexYamlConfig::default(),
            rag: RagConfig::default(),
            knowledge: KnowledgeBase::default(),
        }
    }
}

impl MedchatConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: MedchatConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads `path` when given, otherwise the built-in defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigLoadError> {
        match path {
            Some(p) => Self::from_file(p),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        match self.version.as_str() {
            "1.0" | "1" => Ok(()),
            v => Err(ConfigLoadError::UnsupportedVersion(v.to_string())),
        }?;

        self.semantic.validate().map_err(ConfigLoadError::Validation)?;
        self.index.validate()?;
        self.rag.validate().map_err(ConfigLoadError::Validation)?;
        self.knowledge.validate().map_err(ConfigLoadError::Validation)?;
        Ok(())
    }
}

/// Where the index artifact lives and how corpora are cut before embedding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexYamlConfig {
    #[serde(default = "default_index_path")]
    pub path: PathBuf,

    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,

    /// `"zstd"` or `"none"`.
    #[serde(default = "default_compression")]
    pub compression: String,

    #[serde(default = "default_compression_level")]
    pub compression_level: i32,

    /// Texts embedded per request while building.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

fn default_index_path() -> PathBuf {
    PathBuf::from("data/medchat.index")
}

fn default_chunk_size() -> usize {
    1000
}

fn default_chunk_overlap() -> usize {
    100
}

fn default_compression() -> String {
    "zstd".into()
}

fn default_compression_level() -> i32 {
    3
}

fn default_batch_size() -> usize {
    32
}

impl Default for IndexYamlConfig {
    fn default() -> Self {
        Self {
            path: default_index_path(),
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            compression: default_compression(),
            compression_level: default_compression_level(),
            batch_size: default_batch_size(),
        }
    }
}

impl IndexYamlConfig {
    fn validate(&self) -> Result<(), ConfigLoadError> {
        self.splitter()
            .map_err(|e| ConfigLoadError::Validation(e.to_string()))?;
        self.compression_config()?;
        if self.batch_size == 0 {
            return Err(ConfigLoadError::Validation(
                "index.batch_size must be positive".into(),
            ));
        }
        Ok(())
    }

    pub fn splitter(&self) -> Result<TextSplitter, index::IndexError> {
        TextSplitter::new(self.chunk_size, self.chunk_overlap)
    }

    pub fn compression_config(&self) -> Result<CompressionConfig, ConfigLoadError> {
        let codec = match self.compression.to_ascii_lowercase().as_str() {
            "zstd" => CompressionCodec::Zstd,
            "none" => CompressionCodec::None,
            other => {
                return Err(ConfigLoadError::Validation(format!(
                    "index.compression must be \"zstd\" or \"none\", got \"{other}\""
                )))
            }
        };
        if !(1..=22).contains(&self.compression_level) {
            return Err(ConfigLoadError::Validation(
                "index.compression_level must be in 1..=22".into(),
            ));
        }
        Ok(CompressionConfig::new(codec, self.compression_level))
    }
}
