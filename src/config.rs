//! Typed configuration for model access and agent personas.
//!
//! Replaces the ad-hoc "config dict" pattern: every field is named and typed,
//! defaults are documented, and validation happens when the value is built,
//! not when it is first used.

use std::time::Duration;

use miette::Diagnostic;
use thiserror::Error;

/// Errors raised while building configuration values.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("model name must not be empty")]
    #[diagnostic(code(ragentic::config::empty_model))]
    EmptyModel,

    #[error("api key must not be empty")]
    #[diagnostic(code(ragentic::config::empty_api_key))]
    EmptyApiKey,

    #[error("timeout must be greater than zero")]
    #[diagnostic(code(ragentic::config::zero_timeout))]
    ZeroTimeout,

    #[error("environment variable {var} is not set")]
    #[diagnostic(
        code(ragentic::config::missing_env),
        help("Export the variable or add it to a .env file in the working directory.")
    )]
    MissingEnv { var: String },

    #[error("agent name must not be empty")]
    #[diagnostic(code(ragentic::config::empty_agent_name))]
    EmptyAgentName,
}

/// Access configuration for a hosted language or embedding model.
///
/// Validated at construction: the model and API key must be non-empty and the
/// timeout positive. Once built, an `LlmConfig` is immutable.
///
/// # Examples
///
/// ```
/// use ragentic::config::LlmConfig;
/// use std::time::Duration;
///
/// let config = LlmConfig::builder()
///     .model("text-embedding-3-small")
///     .api_key("sk-test")
///     .timeout(Duration::from_secs(30))
///     .build()
///     .unwrap();
///
/// assert_eq!(config.model(), "text-embedding-3-small");
/// ```
#[derive(Clone, Debug)]
pub struct LlmConfig {
    model: String,
    api_key: String,
    timeout: Duration,
    cache_seed: Option<u64>,
}

impl LlmConfig {
    /// Default request timeout when none is configured.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(600);

    /// Start building a config.
    pub fn builder() -> LlmConfigBuilder {
        LlmConfigBuilder::default()
    }

    /// Build a config with the API key loaded from the environment.
    ///
    /// Reads `var` from the process environment, loading a `.env` file first
    /// if one is present.
    ///
    /// # Errors
    ///
    /// [`ConfigError::MissingEnv`] when the variable is unset, plus the usual
    /// construction errors for an empty model name.
    pub fn from_env(model: impl Into<String>, var: &str) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let api_key = std::env::var(var).map_err(|_| ConfigError::MissingEnv {
            var: var.to_string(),
        })?;
        Self::builder().model(model).api_key(api_key).build()
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Seed forwarded to providers that support response caching.
    pub fn cache_seed(&self) -> Option<u64> {
        self.cache_seed
    }
}

/// Builder for [`LlmConfig`].
#[derive(Debug)]
pub struct LlmConfigBuilder {
    model: Option<String>,
    api_key: Option<String>,
    timeout: Duration,
    cache_seed: Option<u64>,
}

impl Default for LlmConfigBuilder {
    fn default() -> Self {
        Self {
            model: None,
            api_key: None,
            timeout: LlmConfig::DEFAULT_TIMEOUT,
            cache_seed: None,
        }
    }
}

impl LlmConfigBuilder {
    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    #[must_use]
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Request timeout; defaults to [`LlmConfig::DEFAULT_TIMEOUT`].
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn cache_seed(mut self, seed: u64) -> Self {
        self.cache_seed = Some(seed);
        self
    }

    /// Validate and build the final config.
    pub fn build(self) -> Result<LlmConfig, ConfigError> {
        let model = self.model.unwrap_or_default();
        if model.trim().is_empty() {
            return Err(ConfigError::EmptyModel);
        }
        let api_key = self.api_key.unwrap_or_default();
        if api_key.trim().is_empty() {
            return Err(ConfigError::EmptyApiKey);
        }
        if self.timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(LlmConfig {
            model,
            api_key,
            timeout: self.timeout,
            cache_seed: self.cache_seed,
        })
    }
}

/// Persona definition for a chat agent: a display name plus system prompt.
///
/// The name must be non-empty; the system message may be empty for proxy-style
/// agents that relay input verbatim.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AgentProfile {
    name: String,
    system_message: String,
}

impl AgentProfile {
    /// Build a profile, validating the agent name.
    pub fn new(
        name: impl Into<String>,
        system_message: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ConfigError::EmptyAgentName);
        }
        Ok(Self {
            name,
            system_message: system_message.into(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn system_message(&self) -> &str {
        &self.system_message
    }
}
