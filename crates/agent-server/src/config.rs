//! Server Configuration
//!
//! Read from the process environment after `.env` is loaded.

use agent_runtime::OpenAiConfig;
use local_advisor::{CHAIN_MODEL, ImageAgentConfig, UnsplashConfig};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Listen address
    pub bind_addr: String,

    /// OpenAI-compatible gateway
    pub llm: OpenAiConfig,

    /// Model for the text chains
    pub chain_model: String,

    pub image_agent: ImageAgentConfig,

    pub unsplash: UnsplashConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// `ConfigError::MissingEnvVar` if `OPENROUTER_API_KEY` is not set;
    /// `ConfigError::InvalidValue` for unparsable numbers.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_key = var("OPENROUTER_API_KEY")
            .ok_or_else(|| ConfigError::MissingEnvVar("OPENROUTER_API_KEY".to_string()))?;

        let llm_defaults = OpenAiConfig::default();
        let llm = OpenAiConfig {
            base_url: var("LLM_BASE_URL").unwrap_or(llm_defaults.base_url),
            api_key: Some(api_key),
            timeout_secs: parse_or(var("LLM_TIMEOUT_SECS"), "LLM_TIMEOUT_SECS", llm_defaults.timeout_secs)?,
        };

        let agent_defaults = ImageAgentConfig::default();
        let image_agent = ImageAgentConfig {
            model: var("AGENT_MODEL").unwrap_or(agent_defaults.model),
            max_iterations: parse_or(
                var("AGENT_MAX_ITERATIONS"),
                "AGENT_MAX_ITERATIONS",
                agent_defaults.max_iterations,
            )?,
            ..agent_defaults
        };

        let unsplash_defaults = UnsplashConfig::default();
        let unsplash = UnsplashConfig {
            base_url: var("UNSPLASH_BASE_URL").unwrap_or(unsplash_defaults.base_url),
            access_key: var("UNSPLASH_API_KEY"),
            ..unsplash_defaults
        };

        Ok(Self {
            bind_addr: var("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string()),
            llm,
            chain_model: var("CHAIN_MODEL").unwrap_or_else(|| CHAIN_MODEL.to_string()),
            image_agent,
            unsplash,
        })
    }
}

/// Tracing filter used when `RUST_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

/// `RUST_LOG` through a variable lookup, or the default filter
pub fn log_filter(lookup: impl Fn(&str) -> Option<String>) -> String {
    lookup("RUST_LOG")
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string())
}

fn parse_or<T>(value: Option<String>, key: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.map_or(Ok(default), |v| {
        v.trim()
            .parse()
            .map_err(|e| ConfigError::InvalidValue(key.to_string(), format!("{e}")))
    })
}
