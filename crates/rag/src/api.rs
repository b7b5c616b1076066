use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use semantic::api::{build_http_client, post_json_with_retry};
use semantic::{ApiProviderKind, RetryConfig};

use crate::{AssembledPrompt, GenerationError, Generator, GeneratorConfig};

/// Generator backed by a hosted model.
///
/// - `hf`: Hugging Face text2text-generation (`[{"generated_text": ...}]`), greedy decoding.
/// - `openai`: OpenAI-compatible chat completions (`choices[0].message.content`).
/// - custom: `{"prompt", "max_new_tokens"}` in, `{"text"}` or `{"generated_text"}` out.
pub struct ApiGenerator {
    client: reqwest::Client,
    url: String,
    auth_header: Option<String>,
    provider: ApiProviderKind,
    model_name: String,
    max_new_tokens: u32,
    temperature: f32,
    retry: RetryConfig,
}

impl ApiGenerator {
    pub fn from_config(cfg: &GeneratorConfig) -> Result<Self, GenerationError> {
        let url = cfg
            .api_url
            .clone()
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| GenerationError::InvalidConfig("api_url is required for api mode".into()))?;
        let timeout = Duration::from_secs(cfg.api_timeout_secs.unwrap_or(60));
        let client = build_http_client(timeout).map_err(GenerationError::InvalidConfig)?;
        Ok(Self {
            client,
            url,
            auth_header: cfg.api_auth_header.clone(),
            provider: ApiProviderKind::from_hint(cfg.api_provider.as_deref()),
            model_name: cfg.model_name.clone(),
            max_new_tokens: cfg.max_new_tokens,
            temperature: cfg.temperature,
            retry: cfg.retry_config.unwrap_or_default(),
        })
    }

    fn payload(&self, prompt: &AssembledPrompt) -> Value {
        match self.provider {
            ApiProviderKind::HuggingFace => json!({
                "inputs": prompt.render(),
                "parameters": {
                    "max_new_tokens": self.max_new_tokens,
                    "temperature": self.temperature,
                    "do_sample": false,
                },
            }),
            ApiProviderKind::OpenAI => json!({
                "model": self.model_name,
                "messages": [
                    { "role": "system", "content": prompt.system },
                    { "role": "user", "content": prompt.user_section() },
                ],
                "max_tokens": self.max_new_tokens,
                "temperature": self.temperature,
            }),
            ApiProviderKind::Custom => json!({
                "prompt": prompt.render(),
                "max_new_tokens": self.max_new_tokens,
            }),
        }
    }
}

#[async_trait]
impl Generator for ApiGenerator {
    fn name(&self) -> &str {
        &self.model_name
    }

    async fn generate(&self, prompt: &AssembledPrompt) -> Result<String, GenerationError> {
        let payload = self.payload(prompt);
        let response = post_json_with_retry(
            &self.client,
            &self.url,
            self.auth_header.as_deref(),
            &payload,
            &self.retry,
        )
        .await
        .map_err(GenerationError::Request)?;
        parse_generated_text(response)
    }
}

fn parse_generated_text(value: Value) -> Result<String, GenerationError> {
    let text = match &value {
        Value::Array(items) => items
            .first()
            .and_then(|first| first.get("generated_text"))
            .and_then(Value::as_str),
        Value::Object(map) => map
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .or_else(|| map.get("generated_text"))
            .or_else(|| map.get("text"))
            .and_then(Value::as_str),
        Value::String(s) => Some(s.as_str()),
        _ => None,
    };
    text.map(str::to_string).ok_or_else(|| {
        GenerationError::InvalidResponse("response does not contain generated text".into())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api_config(provider: &str) -> GeneratorConfig {
        GeneratorConfig {
            mode: "api".into(),
            api_url: Some("http://127.0.0.1:9/generate".into()),
            api_provider: Some(provider.into()),
            api_timeout_secs: Some(2),
            retry_config: Some(RetryConfig::default().with_max_retries(0)),
            ..Default::default()
        }
    }

    fn prompt() -> AssembledPrompt {
        AssembledPrompt {
            system: "Be careful.".into(),
            context: vec!["Cholera is waterborne.".into()],
            question: "what is cholera".into(),
            truncated: 0,
        }
    }

    #[test]
    fn hf_payload_uses_greedy_decoding() {
        let generator = ApiGenerator::from_config(&api_config("hf")).unwrap();
        let payload = generator.payload(&prompt());
        assert_eq!(payload["parameters"]["max_new_tokens"], 256);
        assert_eq!(payload["parameters"]["do_sample"], false);
        let inputs = payload["inputs"].as_str().unwrap();
        assert!(inputs.starts_with("Be careful."));
        assert!(inputs.contains("Cholera is waterborne."));
    }

    #[test]
    fn openai_payload_separates_system_message() {
        let generator = ApiGenerator::from_config(&api_config("openai")).unwrap();
        let payload = generator.payload(&prompt());
        assert_eq!(payload["model"], "google/flan-t5-base");
        assert_eq!(payload["messages"][0]["content"], "Be careful.");
        let user = payload["messages"][1]["content"].as_str().unwrap();
        assert!(!user.contains("Be careful."));
        assert!(user.contains("Question: what is cholera"));
    }

    #[test]
    fn parses_known_response_shapes() {
        assert_eq!(
            parse_generated_text(json!([{ "generated_text": "an infection" }])).unwrap(),
            "an infection"
        );
        assert_eq!(
            parse_generated_text(json!({
                "choices": [{ "message": { "role": "assistant", "content": "an infection" } }]
            }))
            .unwrap(),
            "an infection"
        );
        assert_eq!(parse_generated_text(json!({ "text": "x" })).unwrap(), "x");
        assert!(matches!(
            parse_generated_text(json!({ "foo": 1 })),
            Err(GenerationError::InvalidResponse(_))
        ));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_request_error() {
        let generator = ApiGenerator::from_config(&api_config("hf")).unwrap();
        assert!(matches!(
            generator.generate(&prompt()).await,
            Err(GenerationError::Request(_))
        ));
    }
}
