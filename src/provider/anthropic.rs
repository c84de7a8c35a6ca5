//! @ai:module:intent Anthropic Messages API client
//! @ai:module:layer infrastructure
//! @ai:module:public_api AnthropicClient
//! @ai:module:stateless false

use crate::config::ApiConfig;
use crate::provider::{Outcome, ProviderClient, PREFLIGHT_MAX_TOKENS, PREFLIGHT_PROMPT};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// @ai:intent Anthropic Messages API request body
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

/// @ai:intent Anthropic Messages API response body
#[derive(Debug, Deserialize)]
struct ApiResponse {
    content: Vec<ContentBlock>,
    usage: Usage,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    text: String,
}

#[derive(Debug, Deserialize)]
struct Usage {
    input_tokens: u32,
    output_tokens: u32,
}

/// @ai:intent Provider client for the Anthropic Messages API
pub struct AnthropicClient {
    client: reqwest::Client,
    config: ApiConfig,
    api_key: String,
}

impl AnthropicClient {
    /// @ai:intent Create a new Anthropic client
    /// @ai:pre ANTHROPIC_API_KEY environment variable is set
    /// @ai:effects env
    pub fn new(config: ApiConfig) -> Result<Self> {
        let api_key = std::env::var("ANTHROPIC_API_KEY")
            .context("ANTHROPIC_API_KEY not set in environment")?;

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

    /// @ai:intent Issue one Messages API call; any failure surfaces as Err
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
            .post("https://api.anthropic.com/v1/messages")
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .context("Failed to send request to Anthropic API")?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Anthropic API error ({}): {}", status, error_text);
        }

        response
            .json()
            .await
            .context("Failed to parse Anthropic API response")
    }
}

impl ProviderClient for AnthropicClient {
    fn name(&self) -> &'static str {
        "anthropic"
    }

    /// @ai:intent Minimal completion request to prove the endpoint is usable
    /// @ai:effects network
    async fn preflight(&self) -> Result<()> {
        self.request(PREFLIGHT_PROMPT, PREFLIGHT_MAX_TOKENS)
            .await
            .context("Anthropic pre-flight check failed")?;
        Ok(())
    }

    /// @ai:intent Send one prompt as a fresh conversation
    /// @ai:effects network
    async fn send(&self, prompt: &str) -> Outcome {
        match self.request(prompt, self.config.max_tokens).await {
            Ok(response) => {
                let text = response
                    .content
                    .into_iter()
                    .map(|c| c.text)
                    .collect::<Vec<_>>()
                    .join("\n");

                Outcome::success(
                    text,
                    response.usage.input_tokens,
                    response.usage.output_tokens,
                )
            }
            Err(e) => Outcome::error(format!("{e:#}")),
        }
    }
}
