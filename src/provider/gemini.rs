//! @ai:module:intent Google Gemini generateContent API client
//! @ai:module:layer infrastructure
//! @ai:module:public_api GeminiClient
//! @ai:module:stateless false

use crate::config::ApiConfig;
use crate::provider::{Outcome, ProviderClient, PREFLIGHT_MAX_TOKENS, PREFLIGHT_PROMPT};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Safety categories pinned to BLOCK_NONE so that blocking observed in the
/// results reflects the provider's hard floor, not the default thresholds.
const SAFETY_CATEGORIES: [&str; 4] = [
    "HARM_CATEGORY_HARASSMENT",
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
    "HARM_CATEGORY_DANGEROUS_CONTENT",
];

/// @ai:intent generateContent request body
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiRequest<'a> {
    contents: Vec<Content<'a>>,
    safety_settings: Vec<SafetySetting>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct SafetySetting {
    category: &'static str,
    threshold: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
}

/// @ai:intent generateContent response body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default)]
    finish_reason: Option<String>,
    #[serde(default)]
    safety_ratings: Vec<SafetyRating>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SafetyRating {
    category: String,
    probability: String,
    #[serde(default)]
    blocked: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
}

/// @ai:intent Map a parsed generateContent response to an Outcome.
///            A non-error response with no candidate parts is a safety
///            suppression; the diagnostic folds in the finish reason, the
///            prompt-feedback block reason when present, and every safety
///            rating the provider flagged as blocked.
/// @ai:effects pure
fn outcome_from_response(response: ApiResponse) -> Outcome {
    let (tokens_sent, tokens_received) = response
        .usage_metadata
        .map(|u| (u.prompt_token_count, u.candidates_token_count))
        .unwrap_or((0, 0));

    let block_reason = response
        .prompt_feedback
        .and_then(|f| f.block_reason);

    let Some(candidate) = response.candidates.into_iter().next() else {
        let mut diagnostic = "Reason: NO_CANDIDATES".to_string();
        if let Some(reason) = block_reason {
            diagnostic.push_str(&format!(" | Prompt blocked: {reason}"));
        }
        return Outcome::blocked(diagnostic, tokens_sent, tokens_received);
    };

    let text = candidate
        .content
        .map(|c| {
            c.parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect::<Vec<_>>()
                .join("\n")
        })
        .unwrap_or_default();

    if !text.is_empty() {
        return Outcome::success(text, tokens_sent, tokens_received);
    }

    let finish_reason = candidate.finish_reason.unwrap_or_else(|| "UNKNOWN".to_string());
    let mut diagnostic = format!("Reason: {finish_reason}");

    if let Some(reason) = block_reason {
        diagnostic.push_str(&format!(" | Prompt blocked: {reason}"));
    }

    let blocked_categories: Vec<String> = candidate
        .safety_ratings
        .iter()
        .filter(|r| r.blocked)
        .map(|r| format!("{}: {}", r.category, r.probability))
        .collect();

    if !blocked_categories.is_empty() {
        diagnostic.push_str(&format!(" | Blocked: {}", blocked_categories.join(", ")));
    }

    Outcome::blocked(diagnostic, tokens_sent, tokens_received)
}

/// @ai:intent Provider client for the Gemini generateContent API
pub struct GeminiClient {
    client: reqwest::Client,
    config: ApiConfig,
    api_key: String,
}

impl GeminiClient {
    /// @ai:intent Create a new Gemini client
    /// @ai:pre GOOGLE_API_KEY environment variable is set
    /// @ai:effects env
    pub fn new(config: ApiConfig) -> Result<Self> {
        let api_key =
            std::env::var("GOOGLE_API_KEY").context("GOOGLE_API_KEY not set in environment")?;

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.request_timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            config,
            api_key,
        })
    }

    /// @ai:intent Issue one generateContent call; any failure surfaces as Err
    /// @ai:effects network
    async fn request(&self, prompt: &str, max_tokens: u32) -> Result<ApiResponse> {
        let request = ApiRequest {
            contents: vec![Content {
                parts: vec![RequestPart { text: prompt }],
            }],
            safety_settings: SAFETY_CATEGORIES
                .iter()
                .map(|&category| SafetySetting {
                    category,
                    threshold: "BLOCK_NONE",
                })
                .collect(),
            generation_config: GenerationConfig {
                max_output_tokens: max_tokens,
            },
        };

        let url = format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent",
            self.config.model()
        );

        let response = self
            .client
            .post(&url)
            .query(&[("key", &self.api_key)])
            .json(&request)
            .send()
            .await
            .context("Failed to send request to Gemini API")?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Gemini API error ({}): {}", status, error_text);
        }

        response
            .json()
            .await
            .context("Failed to parse Gemini API response")
    }
}

impl ProviderClient for GeminiClient {
    fn name(&self) -> &'static str {
        "gemini"
    }

    /// @ai:intent Minimal completion request to prove the endpoint is usable
    /// @ai:effects network
    async fn preflight(&self) -> Result<()> {
        self.request(PREFLIGHT_PROMPT, PREFLIGHT_MAX_TOKENS)
            .await
            .context("Gemini pre-flight check failed")?;
        Ok(())
    }

    /// @ai:intent Send one prompt as a fresh conversation
    /// @ai:effects network
    async fn send(&self, prompt: &str) -> Outcome {
        match self.request(prompt, self.config.max_tokens).await {
            Ok(response) => outcome_from_response(response),
            Err(e) => Outcome::error(format!("{e:#}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::OutcomeStatus;

    fn parse(json: &str) -> ApiResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_candidate_with_parts_maps_to_success() {
        let response = parse(
            r#"{
                "candidates": [{
                    "content": {"parts": [{"text": "I don't experience color."}]},
                    "finishReason": "STOP"
                }],
                "usageMetadata": {"promptTokenCount": 7, "candidatesTokenCount": 11}
            }"#,
        );

        let outcome = outcome_from_response(response);
        assert_eq!(outcome.status, OutcomeStatus::Success);
        assert_eq!(outcome.response, "I don't experience color.");
        assert_eq!(outcome.tokens_sent, 7);
        assert_eq!(outcome.tokens_received, 11);
    }

    #[test]
    fn test_safety_suppression_maps_to_blocked_with_categories() {
        let response = parse(
            r#"{
                "candidates": [{
                    "finishReason": "SAFETY",
                    "safetyRatings": [
                        {"category": "HARM_CATEGORY_HARASSMENT", "probability": "HIGH", "blocked": true},
                        {"category": "HARM_CATEGORY_HATE_SPEECH", "probability": "NEGLIGIBLE", "blocked": false}
                    ]
                }]
            }"#,
        );

        let outcome = outcome_from_response(response);
        assert_eq!(outcome.status, OutcomeStatus::Blocked);
        assert!(outcome.response.contains("Reason: SAFETY"));
        assert!(outcome.response.contains("HARM_CATEGORY_HARASSMENT: HIGH"));
        assert!(!outcome.response.contains("HATE_SPEECH"));
        assert_eq!(outcome.tokens_sent, 0);
        assert_eq!(outcome.tokens_received, 0);
    }

    #[test]
    fn test_no_candidates_maps_to_blocked_with_prompt_feedback() {
        let response = parse(
            r#"{
                "candidates": [],
                "promptFeedback": {"blockReason": "SAFETY"}
            }"#,
        );

        let outcome = outcome_from_response(response);
        assert_eq!(outcome.status, OutcomeStatus::Blocked);
        assert!(outcome.response.contains("NO_CANDIDATES"));
        assert!(outcome.response.contains("Prompt blocked: SAFETY"));
    }
}
