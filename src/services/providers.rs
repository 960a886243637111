// Model Provider Service
// OpenAI-compatible chat-completions client used by the model-backed
// alignment checker.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::debug;

use crate::services::config_store::ConfigStore;

const OPENAI_DEFAULT_URL: &str = "https://api.openai.com/v1/chat/completions";
const REQUEST_TIMEOUT_SECS: u64 = 80;

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },
    #[error("Missing content in response")]
    MissingContent,
    #[error("JSON parse error: {0}")]
    JsonError(String),
    #[error("API key not configured")]
    MissingApiKey,
}

#[derive(Debug, Clone, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Clone, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: i32,
    temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Clone, Serialize)]
struct ResponseFormat {
    r#type: String,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatResponse {
    choices: Option<Vec<ChatChoice>>,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatChoice {
    message: Option<ChatMessageResponse>,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatMessageResponse {
    content: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResult {
    pub content: String,
    pub latency_ms: i64,
}

/// Resolve the API key for `provider` from the environment first, then the
/// config store. Returns None when neither is configured.
pub fn get_api_key(provider: &str) -> Option<String> {
    let env_name = format!("{}_API_KEY", provider.to_uppercase());
    if let Ok(key) = env::var(&env_name) {
        let key = key.trim().to_string();
        if !key.is_empty() {
            return Some(key);
        }
    }

    ConfigStore::default_config_dir()
        .map(ConfigStore::new)
        .and_then(|store| store.get_api_key(provider).ok().flatten())
}

/// HTTP client handle for the judge endpoint. Construct once and pass it
/// around; it owns the request timeout, the caller owns retries.
pub struct ProviderClient {
    client: Client,
    chat_url: String,
}

impl Default for ProviderClient {
    fn default() -> Self {
        Self::new()
    }
}

impl ProviderClient {
    pub fn new() -> Self {
        let chat_url = env::var("OPENAI_API_URL")
            .ok()
            .filter(|url| !url.trim().is_empty())
            .or_else(|| {
                ConfigStore::default_config_dir()
                    .map(ConfigStore::new)
                    .and_then(|store| store.get_provider_url("openai").ok().flatten())
            })
            .unwrap_or_else(|| OPENAI_DEFAULT_URL.to_string());

        Self::with_base_url(&chat_url)
    }

    /// Point the client at a specific chat-completions endpoint, e.g. a
    /// self-hosted gateway.
    pub fn with_base_url(chat_url: &str) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .unwrap_or_default();

        Self {
            client,
            chat_url: chat_url.to_string(),
        }
    }

    /// One chat-completions call in JSON-object response mode. Low
    /// temperature keeps the judge close to deterministic, though the call is
    /// still inherently nondeterministic.
    pub async fn call_chat_json(
        &self,
        model: &str,
        api_key: &str,
        system_prompt: &str,
        user_prompt: &str,
        max_tokens: i32,
    ) -> Result<ChatResult, ProviderError> {
        let request = ChatRequest {
            model: model.to_string(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system_prompt.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user_prompt.to_string(),
                },
            ],
            max_tokens,
            temperature: 0.2,
            response_format: Some(ResponseFormat {
                r#type: "json_object".to_string(),
            }),
        };

        let started = Instant::now();
        let response = self
            .client
            .post(&self.chat_url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ProviderError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: ChatResponse = response.json().await?;
        let latency_ms = started.elapsed().as_millis() as i64;
        debug!("[provider] chat call model={} latency_ms={}", model, latency_ms);

        let content = parsed
            .choices
            .and_then(|choices| choices.into_iter().next())
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .ok_or(ProviderError::MissingContent)?;

        Ok(ChatResult { content, latency_ms })
    }
}

/// Pull the outermost JSON object out of a model reply that may wrap it in
/// prose or code fences.
pub fn extract_json(content: &str) -> String {
    let trimmed = content.trim();
    if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}')) {
        if start < end {
            return trimmed[start..=end].to_string();
        }
    }
    trimmed.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_base_url() {
        let client = ProviderClient::with_base_url("http://127.0.0.1:8080/v1/chat/completions");
        assert_eq!(client.chat_url, "http://127.0.0.1:8080/v1/chat/completions");
    }

    #[test]
    fn test_extract_json_strips_fences() {
        let content = "```json\n{\"alignment_score\": 0.9}\n```";
        assert_eq!(extract_json(content), "{\"alignment_score\": 0.9}");
    }

    #[test]
    fn test_extract_json_passes_through_plain_object() {
        let content = "{\"confidence\": 0.5}";
        assert_eq!(extract_json(content), content);
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_http_error() {
        let client = ProviderClient::with_base_url("http://127.0.0.1:9/v1/chat/completions");
        let result = client.call_chat_json("gpt-4o", "test-key", "sys", "user", 64).await;
        assert!(matches!(result, Err(ProviderError::HttpError(_))));
    }
}
