use serde::{Deserialize, Serialize};

use crate::retry::RetryConfig;

/// Runtime configuration describing which embedder to build and how to post-process vectors.
///
/// # Example
/// ```no_run
/// use semantic::{build_embedder, Embedder, SemanticConfig};
///
/// let cfg = SemanticConfig {
///     mode: "api".into(),
///     api_url: Some("https://router.huggingface.co/hf-inference/models/sentence-transformers/all-MiniLM-L6-v2/pipeline/feature-extraction".into()),
///     api_auth_header: Some("Bearer hf_xxx".into()),
///     api_provider: Some("hf".into()),
///     ..Default::default()
/// };
///
/// let embedder = build_embedder(&cfg).unwrap();
/// assert_eq!(embedder.dimension(), 384);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SemanticConfig {
    /// Inference mode selector: `"fast"` (hashed-feature stub) or `"api"` (remote HTTP).
    pub mode: String,
    /// Model label recorded in index artifacts and sent to OpenAI-style providers.
    pub model_name: String,
    /// Expected vector dimension. The stub produces exactly this many components and
    /// API responses are rejected when they disagree.
    pub dimension: usize,
    /// API inference endpoint when [`mode`](Self::mode) is `"api"`.
    pub api_url: Option<String>,
    /// Authorization header (e.g., `"Bearer hf_xxx"`).
    pub api_auth_header: Option<String>,
    /// Remote provider hint: `"hf"`, `"openai"`, or `"custom"` (default).
    pub api_provider: Option<String>,
    /// Overall API timeout in seconds.
    pub api_timeout_secs: Option<u64>,
    /// Normalize the resulting vector to unit length.
    pub normalize: bool,
    /// Retry policy for API calls. Defaults apply when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_config: Option<RetryConfig>,
}

impl Default for SemanticConfig {
    fn default() -> Self {
        Self {
            mode: "fast".into(),
            model_name: "sentence-transformers/all-MiniLM-L6-v2".into(),
            dimension: 384,
            api_url: None,
            api_auth_header: None,
            api_provider: None,
            api_timeout_secs: Some(30),
            normalize: true,
            retry_config: None,
        }
    }
}

impl SemanticConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.dimension == 0 {
            return Err("semantic.dimension must be greater than zero".into());
        }
        match self.mode.as_str() {
            "fast" => Ok(()),
            "api" => match self.api_url.as_deref() {
                Some(url) if !url.trim().is_empty() => Ok(()),
                _ => Err("semantic.api_url is required when mode is \"api\"".into()),
            },
            other => Err(format!("unknown semantic.mode \"{other}\"")),
        }
    }
}
