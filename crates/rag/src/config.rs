use serde::{Deserialize, Serialize};

use semantic::RetryConfig;

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a careful medical information assistant. \
Answer the question using only the context below. If the context does not contain the answer, \
say that you don't know. Keep the answer short and do not give a diagnosis.";

/// Which text-generation backend to build and how to drive it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GeneratorConfig {
    /// `"extractive"` (offline, picks context sentences) or `"api"` (remote model).
    pub mode: String,
    pub model_name: String,
    pub api_url: Option<String>,
    pub api_auth_header: Option<String>,
    /// `"hf"` (text2text-generation), `"openai"` (chat completions) or `"custom"`.
    pub api_provider: Option<String>,
    pub api_timeout_secs: Option<u64>,
    pub max_new_tokens: u32,
    pub temperature: f32,
    /// Sentences the extractive generator may return.
    pub max_sentences: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_config: Option<RetryConfig>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            mode: "extractive".into(),
            model_name: "google/flan-t5-base".into(),
            api_url: None,
            api_auth_header: None,
            api_provider: None,
            api_timeout_secs: Some(60),
            max_new_tokens: 256,
            temperature: 0.1,
            max_sentences: 3,
            retry_config: None,
        }
    }
}

impl GeneratorConfig {
    pub fn validate(&self) -> Result<(), String> {
        match self.mode.as_str() {
            "extractive" if self.max_sentences == 0 => {
                Err("rag.generator.max_sentences must be positive".into())
            }
            "extractive" => Ok(()),
            "api" => match self.api_url.as_deref() {
                Some(url) if !url.trim().is_empty() => Ok(()),
                _ => Err("rag.generator.api_url is required when mode is \"api\"".into()),
            },
            other => Err(format!("unknown rag.generator.mode \"{other}\"")),
        }
    }
}

/// Orchestrator settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RagConfig {
    pub system_prompt: String,
    /// Upper bound on the rendered prompt, in characters.
    pub max_prompt_chars: usize,
    /// Hits scoring at or below this similarity are discarded.
    pub min_score: f32,
    pub generation_timeout_secs: u64,
    pub generator: GeneratorConfig,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.into(),
            max_prompt_chars: 2000,
            min_score: 0.0,
            generation_timeout_secs: 60,
            generator: GeneratorConfig::default(),
        }
    }
}

impl RagConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.system_prompt.trim().is_empty() {
            return Err("rag.system_prompt must not be empty".into());
        }
        if self.max_prompt_chars == 0 {
            return Err("rag.max_prompt_chars must be positive".into());
        }
        if self.generation_timeout_secs == 0 {
            return Err("rag.generation_timeout_secs must be positive".into());
        }
        if !(-1.0..1.0).contains(&self.min_score) {
            return Err("rag.min_score must be in [-1, 1)".into());
        }
        self.generator.validate()
    }
}
