//! HTTP embedding provider plus the JSON POST helper shared with generation clients.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;

use crate::normalize::{l2_normalize_in_place, prepare_text};
use crate::retry::{execute_with_retry_async, RetryConfig};
use crate::{Embedder, EmbeddingError, SemanticConfig};

/// Wire dialect spoken by a remote model endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiProviderKind {
    HuggingFace,
    OpenAI,
    Custom,
}

impl ApiProviderKind {
    /// Maps a free-form provider hint (`"hf"`, `"openai"`, ...) to a dialect.
    pub fn from_hint(hint: Option<&str>) -> Self {
        match hint.unwrap_or("custom").to_ascii_lowercase().as_str() {
            "hf" | "huggingface" => ApiProviderKind::HuggingFace,
            "openai" | "gpt" => ApiProviderKind::OpenAI,
            _ => ApiProviderKind::Custom,
        }
    }
}

/// Builds a pooled client with the given overall request timeout.
pub fn build_http_client(timeout: Duration) -> Result<reqwest::Client, String> {
    reqwest::Client::builder()
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10))
        .pool_max_idle_per_host(32)
        .build()
        .map_err(|e| format!("failed to build HTTP client: {e}"))
}

/// POSTs `payload` as JSON and returns the decoded JSON body.
///
/// Transient failures are retried per `retry`; the error string carries the
/// HTTP status so callers can surface it.
pub async fn post_json_with_retry(
    client: &reqwest::Client,
    url: &str,
    auth_header: Option<&str>,
    payload: &Value,
    retry: &RetryConfig,
) -> Result<Value, String> {
    execute_with_retry_async(retry, |_| send_api_request(client, url, auth_header, payload))
        .await
        .into_result()
}

async fn send_api_request(
    client: &reqwest::Client,
    url: &str,
    auth_header: Option<&str>,
    payload: &Value,
) -> Result<Value, String> {
    let mut request = client.post(url).header("Content-Type", "application/json");
    if let Some(header) = auth_header {
        request = request.header("Authorization", header);
    }

    let response = request
        .json(payload)
        .send()
        .await
        .map_err(|e| format!("HTTP request failed: {e}"))?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(format!("HTTP error {status}: {body}"));
    }

    response
        .json::<Value>()
        .await
        .map_err(|e| format!("invalid JSON response: {e}"))
}

/// Embedder backed by a remote feature-extraction endpoint.
pub struct ApiEmbedder {
    client: reqwest::Client,
    url: String,
    auth_header: Option<String>,
    provider: ApiProviderKind,
    model_name: String,
    dimension: usize,
    normalize: bool,
    retry: RetryConfig,
}

impl ApiEmbedder {
    pub fn from_config(cfg: &SemanticConfig) -> Result<Self, EmbeddingError> {
        let url = cfg
            .api_url
            .clone()
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| EmbeddingError::InvalidConfig("api_url is required for api mode".into()))?;
        let timeout = Duration::from_secs(cfg.api_timeout_secs.unwrap_or(30));
        let client = build_http_client(timeout).map_err(EmbeddingError::InvalidConfig)?;
        Ok(Self {
            client,
            url,
            auth_header: cfg.api_auth_header.clone(),
            provider: ApiProviderKind::from_hint(cfg.api_provider.as_deref()),
            model_name: cfg.model_name.clone(),
            dimension: cfg.dimension,
            normalize: cfg.normalize,
            retry: cfg.retry_config.unwrap_or_default(),
        })
    }

    async fn request(&self, texts: &[String], batch: bool) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let payload = build_api_payload(self.provider, texts, &self.model_name, batch);
        let response = post_json_with_retry(
            &self.client,
            &self.url,
            self.auth_header.as_deref(),
            &payload,
            &self.retry,
        )
        .await
        .map_err(EmbeddingError::Request)?;

        let mut vectors = parse_embeddings_from_value(response)?;
        for vector in vectors.iter_mut() {
            if vector.len() != self.dimension {
                return Err(EmbeddingError::DimensionMismatch {
                    expected: self.dimension,
                    actual: vector.len(),
                });
            }
            if self.normalize {
                l2_normalize_in_place(vector);
            }
        }
        Ok(vectors)
    }
}

#[async_trait]
impl Embedder for ApiEmbedder {
    fn name(&self) -> &str {
        &self.model_name
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let text = prepare_text(text)?;
        let mut vectors = self.request(&[text], false).await?;
        if vectors.len() != 1 {
            return Err(EmbeddingError::InvalidResponse(format!(
                "expected 1 embedding, got {}",
                vectors.len()
            )));
        }
        Ok(vectors.remove(0))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let prepared = texts
            .iter()
            .map(|t| prepare_text(t))
            .collect::<Result<Vec<_>, _>>()?;
        let vectors = self.request(&prepared, true).await?;
        if vectors.len() != prepared.len() {
            return Err(EmbeddingError::InvalidResponse(format!(
                "API returned {} embeddings for {} inputs",
                vectors.len(),
                prepared.len()
            )));
        }
        Ok(vectors)
    }
}

fn build_api_payload(provider: ApiProviderKind, texts: &[String], model: &str, batch: bool) -> Value {
    let first = texts.first().map(String::as_str).unwrap_or("");
    match (provider, batch) {
        (ApiProviderKind::HuggingFace, true) => json!({ "inputs": texts }),
        (ApiProviderKind::HuggingFace, false) => json!({ "inputs": first }),
        (ApiProviderKind::OpenAI, true) => json!({ "input": texts, "model": model }),
        (ApiProviderKind::OpenAI, false) => json!({ "input": first, "model": model }),
        (ApiProviderKind::Custom, true) => json!({ "texts": texts }),
        (ApiProviderKind::Custom, false) => json!({ "text": first }),
    }
}

fn parse_embeddings_from_value(value: Value) -> Result<Vec<Vec<f32>>, EmbeddingError> {
    match value {
        Value::Object(mut map) => {
            if let Some(embeddings) = map.remove("embeddings") {
                return parse_embedding_collection(embeddings);
            }
            if let Some(embedding) = map.remove("embedding") {
                return parse_embedding_vector(embedding).map(|v| vec![v]);
            }

            if let Some(Value::Array(items)) = map.remove("data") {
                let mut vectors = Vec::with_capacity(items.len());
                for item in items {
                    match item {
                        Value::Object(mut obj) => match obj.remove("embedding") {
                            Some(embedding) => vectors.push(parse_embedding_vector(embedding)?),
                            None => {
                                return Err(EmbeddingError::InvalidResponse(
                                    "missing `embedding` field in data item".into(),
                                ))
                            }
                        },
                        _ => {
                            return Err(EmbeddingError::InvalidResponse(
                                "unexpected entry inside `data` array".into(),
                            ))
                        }
                    }
                }
                return Ok(vectors);
            }

            Err(EmbeddingError::InvalidResponse(
                "unsupported API response shape".into(),
            ))
        }
        other => parse_embedding_collection(other),
    }
}

fn parse_embedding_collection(value: Value) -> Result<Vec<Vec<f32>>, EmbeddingError> {
    match value {
        Value::Array(items) => {
            if items.is_empty() {
                Ok(Vec::new())
            } else if items.iter().all(|item| matches!(item, Value::Array(_))) {
                items.into_iter().map(parse_embedding_vector).collect()
            } else {
                parse_embedding_vector(Value::Array(items)).map(|vec| vec![vec])
            }
        }
        other => parse_embedding_vector(other).map(|vec| vec![vec]),
    }
}

/// Parses one vector. Token-level output (`[[f32; d]; n_tokens]`) is mean-pooled.
fn parse_embedding_vector(value: Value) -> Result<Vec<f32>, EmbeddingError> {
    let Value::Array(items) = value else {
        return Err(EmbeddingError::InvalidResponse(
            "embedding must be a JSON array".into(),
        ));
    };

    if !items.is_empty() && items.iter().all(|item| matches!(item, Value::Array(_))) {
        let rows = items
            .into_iter()
            .map(parse_embedding_vector)
            .collect::<Result<Vec<_>, _>>()?;
        return mean_pool(rows);
    }

    items
        .into_iter()
        .map(|item| {
            item.as_f64().map(|f| f as f32).ok_or_else(|| {
                EmbeddingError::InvalidResponse("embedding contains a non-numeric value".into())
            })
        })
        .collect()
}

fn mean_pool(rows: Vec<Vec<f32>>) -> Result<Vec<f32>, EmbeddingError> {
    let dim = rows.first().map(Vec::len).unwrap_or(0);
    if rows.iter().any(|r| r.len() != dim) {
        return Err(EmbeddingError::InvalidResponse(
            "token embeddings have inconsistent widths".into(),
        ));
    }
    let mut pooled = vec![0f32; dim];
    for row in &rows {
        for (acc, x) in pooled.iter_mut().zip(row) {
            *acc += x;
        }
    }
    let n = rows.len() as f32;
    for x in pooled.iter_mut() {
        *x /= n;
    }
    Ok(pooled)
}
