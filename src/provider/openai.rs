//! @ai:module:intent OpenAI Chat Completions API client
//! @ai:module:layer infrastructure
//! @ai:module:public_api OpenAiClient
//! @ai:module:stateless false

use crate::config::ApiConfig;
use crate::provider::{Outcome, ProviderClient, PREFLIGHT_MAX_TOKENS, PREFLIGHT_PROMPT};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// @ai:intent Chat Completions request body
#[derive(Debug, Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

/// @ai:intent Chat Completions response body
#[derive(Debug, Deserialize)]
struct ApiResponse {
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

/// @ai:intent Map a parsed Chat Completions response to an Outcome.
///            A content_filter finish reason with no content counts as
///            blocked; a missing choice is a malformed response.
/// @ai:effects pure
fn outcome_from_response(response: ApiResponse) -> Outcome {
    let (tokens_sent, tokens_received) = response
        .usage
        .map(|u| (u.prompt_tokens, u.completion_tokens))
        .unwrap_or((0, 0));

    let Some(choice) = response.choices.into_iter().next() else {
        return Outcome::error("OpenAI response contained no choices".to_string());
    };

    let finish_reason = choice.finish_reason.unwrap_or_default();

    match choice.message.content {
        Some(text) if !text.is_empty() => Outcome::success(text, tokens_sent, tokens_received),
        _ if finish_reason == "content_filter" => Outcome::blocked(
            format!("Reason: {finish_reason}"),
            tokens_sent,
            tokens_received,
        ),
        _ => Outcome::error(format!(
            "OpenAI response had empty content (finish_reason: {finish_reason})"
        )),
    }
}

/// @ai:intent Provider client for the OpenAI Chat Completions API
pub struct OpenAiClient {
    client: reqwest::Client,
    config: ApiConfig,
    api_key: String,
}

impl OpenAiClient {
    /// @ai:intent Create a new OpenAI client
    /// @ai:pre OPENAI_API_KEY environment variable is set
    /// @ai:effects env
    pub fn new(config: ApiConfig) -> Result<Self> {
        let api_key =
            std::env::var("OPENAI_API_KEY").context("OPENAI_API_KEY not set in environment")?;

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

    /// @ai:intent Issue one Chat Completions call; any failure surfaces as Err
    /// @ai:effects network
    async fn request(&self, prompt: &str, max_tokens: u32) -> Result<ApiResponse> {
        let request = ApiRequest {
            model: self.config.model(),
            max_tokens,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post("https://api.openai.com/v1/chat/completions")
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .context("Failed to send request to OpenAI API")?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("OpenAI API error ({}): {}", status, error_text);
        }

        response
            .json()
            .await
            .context("Failed to parse OpenAI API response")
    }
}

impl ProviderClient for OpenAiClient {
    fn name(&self) -> &'static str {
        "openai"
    }

    /// @ai:intent Minimal completion request to prove the endpoint is usable
    /// @ai:effects network
    async fn preflight(&self) -> Result<()> {
        self.request(PREFLIGHT_PROMPT, PREFLIGHT_MAX_TOKENS)
            .await
            .context("OpenAI pre-flight check failed")?;
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
