// LLM Alignment Checker
// Model-backed implementation of the alignment scoring contract. Same output
// shape as the heuristic scorer, at the cost of network latency,
// nondeterminism, and a per-call failure mode.

use serde::Deserialize;
use tracing::warn;

use crate::models::AlignmentVerdict;
use crate::services::providers::{extract_json, get_api_key, ProviderClient, ProviderError};

use super::ALIGNED_THRESHOLD;

pub const DEFAULT_JUDGE_MODEL: &str = "gpt-4o";
const MAX_RESPONSE_TOKENS: i32 = 512;

const JUDGE_SYSTEM_PROMPT: &str =
    "You are a bilingual translation expert in evaluating text alignment quality.";

#[derive(Debug, Deserialize, Default)]
struct JudgeResponse {
    #[serde(default)]
    alignment_score: f64,
    #[serde(default)]
    confidence: f64,
    #[serde(default)]
    explanation: Option<String>,
}

/// Judge handle: construct once, reuse across the batch, drop when done.
pub struct LlmChecker {
    client: ProviderClient,
    model: String,
    api_key: String,
}

impl LlmChecker {
    pub fn new(client: ProviderClient, model: &str, api_key: &str) -> Self {
        Self {
            client,
            model: model.to_string(),
            api_key: api_key.to_string(),
        }
    }

    /// Build a checker from the environment/config store, or None when no
    /// API key is configured.
    pub fn from_config() -> Option<Self> {
        let api_key = get_api_key("openai")?;
        Some(Self::new(ProviderClient::new(), DEFAULT_JUDGE_MODEL, &api_key))
    }

    /// Score one pair by asking the judge model for a JSON verdict. Values
    /// are clamped into [0, 1]; the aligned flag is derived locally with the
    /// shared threshold rather than trusted from the model.
    pub async fn check(
        &self,
        source_text: &str,
        target_text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<AlignmentVerdict, ProviderError> {
        let user_prompt = format!(
            "Evaluate if these two texts are properly aligned translations:\n\n\
             {}: {}\n{}: {}\n\n\
             Return a JSON object with:\n\
             1. \"alignment_score\" (0.0-1.0) where 1.0 means perfect alignment\n\
             2. \"confidence\" (0.0-1.0) indicating your confidence in this assessment\n\
             3. \"explanation\" - a brief explanation of the score\n\n\
             Only consider translations aligned when they accurately convey the same \
             information. Do not consider stylistic differences as misalignment.",
            language_name(source_lang),
            source_text,
            language_name(target_lang),
            target_text,
        );

        let result = self
            .client
            .call_chat_json(
                &self.model,
                &self.api_key,
                JUDGE_SYSTEM_PROMPT,
                &user_prompt,
                MAX_RESPONSE_TOKENS,
            )
            .await?;

        let json = extract_json(&result.content);
        let parsed: JudgeResponse = serde_json::from_str(&json).map_err(|e| {
            warn!("[llm_checker] unparseable judge reply: {}", e);
            ProviderError::JsonError(format!("judge reply parse failed: {}", e))
        })?;

        let alignment_score = parsed.alignment_score.clamp(0.0, 1.0);
        let confidence = parsed.confidence.clamp(0.0, 1.0);
        let explanation = parsed
            .explanation
            .filter(|text| !text.trim().is_empty())
            .unwrap_or_else(|| "No explanation provided".to_string());

        Ok(AlignmentVerdict {
            alignment_score,
            confidence,
            explanation: vec![explanation],
            is_aligned: alignment_score >= ALIGNED_THRESHOLD,
        })
    }
}

/// The judge prompt reads better with language names than ISO codes.
fn language_name(code: &str) -> &str {
    match code {
        "en" => "English",
        "cs" => "Czech",
        "de" => "German",
        "fr" => "French",
        "es" => "Spanish",
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_name_mapping() {
        assert_eq!(language_name("en"), "English");
        assert_eq!(language_name("cs"), "Czech");
        assert_eq!(language_name("xx"), "xx");
    }

    #[test]
    fn test_judge_response_tolerates_missing_fields() {
        let parsed: JudgeResponse = serde_json::from_str("{\"alignment_score\": 0.8}").unwrap();
        assert!((parsed.alignment_score - 0.8).abs() < f64::EPSILON);
        assert_eq!(parsed.confidence, 0.0);
        assert!(parsed.explanation.is_none());
    }

    #[tokio::test]
    async fn test_unreachable_judge_returns_error() {
        let checker = LlmChecker::new(
            ProviderClient::with_base_url("http://127.0.0.1:9/v1/chat/completions"),
            DEFAULT_JUDGE_MODEL,
            "test-key",
        );
        let result = checker.check("A sentence.", "Věta.", "en", "cs").await;
        assert!(result.is_err());
    }
}
