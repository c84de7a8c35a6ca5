//! @ai:module:intent Provider adapters and the call outcome model
//! @ai:module:layer infrastructure
//! @ai:module:public_api ProviderClient, Outcome, OutcomeStatus
//! @ai:module:stateless false

pub mod anthropic;
pub mod gemini;
pub mod openai;

pub use anthropic::AnthropicClient;
pub use gemini::GeminiClient;
pub use openai::OpenAiClient;

use serde::{Deserialize, Serialize};

/// Prompt used by the pre-flight connectivity probe
pub(crate) const PREFLIGHT_PROMPT: &str =
    "Hello, can you respond with just 'API test successful'?";

/// Token cap for the pre-flight probe; kept small to make it cheap
pub(crate) const PREFLIGHT_MAX_TOKENS: u32 = 50;

/// @ai:intent Three-way classification of a single provider call
/// @ai:effects pure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeStatus {
    Success,
    Error,
    Blocked,
}

impl OutcomeStatus {
    /// @ai:intent Convert status to string representation
    /// @ai:effects pure
    pub fn as_str(&self) -> &'static str {
        match self {
            OutcomeStatus::Success => "success",
            OutcomeStatus::Error => "error",
            OutcomeStatus::Blocked => "blocked",
        }
    }
}

impl std::fmt::Display for OutcomeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// @ai:intent Result of one provider call, resolved to exactly one value
/// @ai:effects pure
#[derive(Debug, Clone)]
pub struct Outcome {
    pub status: OutcomeStatus,
    /// Response text for success, diagnostic text for error/blocked
    pub response: String,
    pub tokens_sent: u32,
    pub tokens_received: u32,
}

impl Outcome {
    /// @ai:intent Build a success outcome with usage counters
    /// @ai:effects pure
    pub fn success(response: String, tokens_sent: u32, tokens_received: u32) -> Self {
        Self {
            status: OutcomeStatus::Success,
            response,
            tokens_sent,
            tokens_received,
        }
    }

    /// @ai:intent Build an error outcome from a human-readable cause
    /// @ai:effects pure
    pub fn error(cause: String) -> Self {
        Self {
            status: OutcomeStatus::Error,
            response: format!("ERROR: {cause}"),
            tokens_sent: 0,
            tokens_received: 0,
        }
    }

    /// @ai:intent Build a blocked outcome carrying the provider's diagnostic
    /// @ai:effects pure
    pub fn blocked(diagnostic: String, tokens_sent: u32, tokens_received: u32) -> Self {
        Self {
            status: OutcomeStatus::Blocked,
            response: format!("BLOCKED: {diagnostic}"),
            tokens_sent,
            tokens_received,
        }
    }
}

/// @ai:intent Uniform capability contract over one provider endpoint
#[allow(async_fn_in_trait)]
pub trait ProviderClient: Send + Sync {
    /// @ai:intent Provider name used for logging
    fn name(&self) -> &'static str;

    /// @ai:intent Minimal connectivity probe; failure is fatal to the run
    async fn preflight(&self) -> anyhow::Result<()>;

    /// @ai:intent Send one prompt and resolve to exactly one Outcome.
    ///            Transport and parse failures fold into an Error outcome;
    ///            this never propagates a raw error to the dispatcher.
    async fn send(&self, prompt: &str) -> Outcome;
}

/// @ai:intent Mock provider for dry runs and testing
pub struct MockProviderClient {
    response: String,
}

impl MockProviderClient {
    /// @ai:intent Create a mock that returns a fixed successful response
    /// @ai:effects pure
    pub fn new(response: String) -> Self {
        Self { response }
    }
}

impl ProviderClient for MockProviderClient {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn preflight(&self) -> anyhow::Result<()> {
        Ok(())
    }

    async fn send(&self, _prompt: &str) -> Outcome {
        Outcome::success(self.response.clone(), 100, 200)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_client_returns_fixed_response() {
        let client = MockProviderClient::new("canned answer".to_string());

        client.preflight().await.unwrap();
        let outcome = client.send("anything").await;

        assert_eq!(outcome.status, OutcomeStatus::Success);
        assert_eq!(outcome.response, "canned answer");
        assert_eq!(outcome.tokens_sent, 100);
        assert_eq!(outcome.tokens_received, 200);
    }

    #[test]
    fn test_error_outcome_carries_cause_and_zero_usage() {
        let outcome = Outcome::error("connection refused".to_string());

        assert_eq!(outcome.status, OutcomeStatus::Error);
        assert_eq!(outcome.response, "ERROR: connection refused");
        assert_eq!(outcome.tokens_sent, 0);
        assert_eq!(outcome.tokens_received, 0);
    }

    #[test]
    fn test_status_as_str() {
        assert_eq!(OutcomeStatus::Success.as_str(), "success");
        assert_eq!(OutcomeStatus::Error.as_str(), "error");
        assert_eq!(OutcomeStatus::Blocked.as_str(), "blocked");
    }
}
