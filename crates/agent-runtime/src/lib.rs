//! # agent-runtime
//!
//! Runtime providers for the local-advisor system.
//!
//! ## Providers
//!
//! - **OpenAI-compatible** (default): OpenRouter or any gateway exposing
//!   `POST /chat/completions`
//! - **Scripted**: replays canned replies, for tests and offline demos
//!
//! ## Usage
//!
//! ```rust,ignore
//! use agent_runtime::{OpenAiConfig, OpenAiProvider};
//!
//! let provider = OpenAiProvider::from_config(OpenAiConfig::default())?;
//! let chain = LlmChain::new("meals", prompt, Arc::new(provider), options);
//! ```

#[cfg(feature = "openai")]
pub mod openai;

#[cfg(feature = "openai")]
pub use openai::{OpenAiConfig, OpenAiProvider};
pub use agent_core::scripted::{RecordedRequest, ScriptedProvider};

// Re-export core types for convenience
pub use agent_core::{
    Agent, AgentError, GenerationOptions, LlmChain, LlmProvider, Message, Result, Role, Tool,
    ToolRegistry,
};
