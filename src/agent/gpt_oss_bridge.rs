// SYNOID Completion Bridge
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// OpenAI-compatible chat-completion client used for highlight selection.

use crate::error::HighlightError;
use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{error, info};

const DEFAULT_API_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-5-mini";
const API_KEY_VARS: [&str; 2] = ["SYNOID_API_KEY", "OPENAI_API_KEY"];

/// One schema-constrained completion call.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system: String,
    pub user: String,
    /// `response_format` payload (JSON schema constraint).
    pub response_format: Value,
    pub max_tokens: u32,
}

#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Returns the assistant message content, JSON or prose around JSON.
    async fn complete(&self, request: &CompletionRequest) -> Result<String, HighlightError>;
}

pub struct OpenAiCompatibleClient {
    client: reqwest::Client,
    api_url: String,
    model: String,
    api_key: String,
}

impl OpenAiCompatibleClient {
    pub fn new(api_url: &str, model: &str, api_key: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: api_url.to_string(),
            model: model.to_string(),
            api_key: api_key.to_string(),
        }
    }

    /// Reads `SYNOID_API_URL`, `SYNOID_MODEL` and `SYNOID_API_KEY`
    /// (or `OPENAI_API_KEY`).
    pub fn from_env() -> Result<Self, HighlightError> {
        let api_key = API_KEY_VARS
            .iter()
            .find_map(|var| std::env::var(var).ok().filter(|v| !v.trim().is_empty()))
            .ok_or(HighlightError::MissingCredential("SYNOID_API_KEY or OPENAI_API_KEY"))?;
        let api_url = std::env::var("SYNOID_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let model = std::env::var("SYNOID_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        Ok(Self::new(&api_url, &model, api_key.trim()))
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn payload(&self, request: &CompletionRequest) -> Value {
        let reasoning_model = is_gpt5_class(&self.model);
        let mut payload = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": request.system },
                { "role": "user", "content": request.user }
            ],
            "temperature": temperature_for(&self.model),
            "response_format": request.response_format,
        });
        // gpt-5 class models reject `max_tokens`.
        let budget_key = if reasoning_model {
            "max_completion_tokens"
        } else {
            "max_tokens"
        };
        payload[budget_key] = json!(request.max_tokens);
        payload
    }
}

#[async_trait]
impl CompletionProvider for OpenAiCompatibleClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, HighlightError> {
        info!("[LLM] Requesting highlights from {}", self.model);

        let endpoint = format!("{}/chat/completions", self.api_url.trim_end_matches('/'));
        let resp = self
            .client
            .post(&endpoint)
            .bearer_auth(&self.api_key)
            .json(&self.payload(request))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            error!("[LLM] Completion failed with {}: {}", status, body);
            return Err(HighlightError::from_status(status.as_u16(), &body));
        }

        let json: Value = resp.json().await?;
        let content = json["choices"][0]["message"]["content"]
            .as_str()
            .unwrap_or_default()
            .to_string();
        Ok(content)
    }
}

pub fn is_gpt5_class(model: &str) -> bool {
    model.trim().to_lowercase().starts_with("gpt-5")
}

pub fn temperature_for(model: &str) -> f64 {
    if is_gpt5_class(model) {
        1.0
    } else {
        0.7
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> CompletionRequest {
        CompletionRequest {
            system: "sys".to_string(),
            user: "usr".to_string(),
            response_format: json!({ "type": "json_object" }),
            max_tokens: 720,
        }
    }

    #[test]
    fn test_temperature_by_model_family() {
        assert_eq!(temperature_for("gpt-5-mini"), 1.0);
        assert_eq!(temperature_for("GPT-5"), 1.0);
        assert_eq!(temperature_for("gpt-4o-mini"), 0.7);
        assert_eq!(temperature_for("llama3:latest"), 0.7);
    }

    #[test]
    fn test_payload_for_gpt5() {
        let client = OpenAiCompatibleClient::new("http://localhost:1234/v1/", "gpt-5-mini", "k");
        let payload = client.payload(&request());
        assert_eq!(payload["model"], "gpt-5-mini");
        assert_eq!(payload["temperature"], 1.0);
        assert_eq!(payload["max_completion_tokens"], 720);
        assert!(payload.get("max_tokens").is_none());
        assert_eq!(payload["messages"][1]["content"], "usr");
        assert_eq!(payload["response_format"]["type"], "json_object");
    }

    #[test]
    fn test_payload_for_other_models() {
        let client = OpenAiCompatibleClient::new("http://localhost:1234/v1", "gpt-4o", "k");
        let payload = client.payload(&request());
        assert_eq!(payload["temperature"], 0.7);
        assert_eq!(payload["max_tokens"], 720);
    }
}
