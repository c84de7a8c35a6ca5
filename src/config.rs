//! @ai:module:intent Configuration structs for the conversation runner
//! @ai:module:layer infrastructure
//! @ai:module:public_api ProbeConfig, ApiConfig, RunConfig, Provider
//! @ai:module:stateless true

use serde::{Deserialize, Serialize};

/// @ai:intent Supported provider endpoints
/// @ai:effects pure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Anthropic,
    OpenAi,
    Gemini,
}

impl Provider {
    /// @ai:intent Convert provider to string representation
    /// @ai:effects pure
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Anthropic => "anthropic",
            Provider::OpenAi => "openai",
            Provider::Gemini => "gemini",
        }
    }

    /// @ai:intent Default model identifier for this provider
    /// @ai:effects pure
    pub fn default_model(&self) -> &'static str {
        match self {
            Provider::Anthropic => "claude-sonnet-4-20250514",
            Provider::OpenAi => "gpt-4o",
            Provider::Gemini => "gemini-2.5-flash",
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Provider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "anthropic" => Ok(Provider::Anthropic),
            "openai" => Ok(Provider::OpenAi),
            "gemini" => Ok(Provider::Gemini),
            other => anyhow::bail!(
                "Unknown provider '{}', expected anthropic, openai or gemini",
                other
            ),
        }
    }
}

/// @ai:intent Main configuration for a research run
/// @ai:effects pure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProbeConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub run: RunConfig,
}

/// @ai:intent API configuration for the provider client
/// @ai:effects pure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_provider")]
    pub provider: Provider,
    /// Model identifier; empty string means the provider default
    #[serde(default)]
    pub model: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl ApiConfig {
    /// @ai:intent Resolve the model identifier, falling back to the provider default
    /// @ai:effects pure
    pub fn model(&self) -> &str {
        if self.model.is_empty() {
            self.provider.default_model()
        } else {
            &self.model
        }
    }
}

/// @ai:intent Run configuration for batch dispatch
/// @ai:effects pure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default = "default_repetitions")]
    pub repetitions: u32,
    /// Upper bound on concurrently outstanding provider calls
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Cooperative pause between batches, the only rate-limiting knob
    #[serde(default = "default_batch_delay_ms")]
    pub batch_delay_ms: u64,
    #[serde(default)]
    pub dry_run: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: String::new(),
            max_tokens: default_max_tokens(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            repetitions: default_repetitions(),
            batch_size: default_batch_size(),
            batch_delay_ms: default_batch_delay_ms(),
            dry_run: false,
        }
    }
}

fn default_provider() -> Provider {
    Provider::Anthropic
}

fn default_max_tokens() -> u32 {
    800
}

fn default_request_timeout() -> u64 {
    120
}

fn default_repetitions() -> u32 {
    10
}

fn default_batch_size() -> usize {
    5
}

fn default_batch_delay_ms() -> u64 {
    100
}

impl ProbeConfig {
    /// @ai:intent Load configuration from a TOML file
    /// @ai:pre path exists and is readable
    /// @ai:effects fs:read
    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// @ai:intent Save configuration to a TOML file
    /// @ai:effects fs:write
    pub fn save(&self, path: &std::path::Path) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = ProbeConfig::default();
        assert_eq!(config.api.provider, Provider::Anthropic);
        assert_eq!(config.api.max_tokens, 800);
        assert_eq!(config.run.repetitions, 10);
        assert_eq!(config.run.batch_size, 5);
        assert_eq!(config.run.batch_delay_ms, 100);
        assert!(!config.run.dry_run);
    }

    #[test]
    fn test_model_falls_back_to_provider_default() {
        let mut api = ApiConfig::default();
        assert_eq!(api.model(), "claude-sonnet-4-20250514");

        api.provider = Provider::Gemini;
        assert_eq!(api.model(), "gemini-2.5-flash");

        api.model = "gemini-1.5-flash".to_string();
        assert_eq!(api.model(), "gemini-1.5-flash");
    }

    #[test]
    fn test_partial_toml_uses_field_defaults() {
        let config: ProbeConfig = toml::from_str(
            r#"
[api]
provider = "openai"

[run]
batch_size = 8
"#,
        )
        .unwrap();

        assert_eq!(config.api.provider, Provider::OpenAi);
        assert_eq!(config.api.max_tokens, 800);
        assert_eq!(config.run.batch_size, 8);
        assert_eq!(config.run.repetitions, 10);
    }

    #[test]
    fn test_toml_round_trip() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("probe.toml");

        let mut config = ProbeConfig::default();
        config.api.provider = Provider::Gemini;
        config.run.repetitions = 3;
        config.save(&path).unwrap();

        let loaded = ProbeConfig::load(&path).unwrap();
        assert_eq!(loaded.api.provider, Provider::Gemini);
        assert_eq!(loaded.run.repetitions, 3);
    }

    #[test]
    fn test_provider_from_str() {
        assert_eq!("anthropic".parse::<Provider>().unwrap(), Provider::Anthropic);
        assert_eq!("OpenAI".parse::<Provider>().unwrap(), Provider::OpenAi);
        assert!("mistral".parse::<Provider>().is_err());
    }
}
