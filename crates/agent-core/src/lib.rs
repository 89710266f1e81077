//! # agent-core
//!
//! Core agent logic with provider-agnostic LLM abstraction, prompt chains and
//! a ReAct tool loop.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  LlmChain:  Prompt ──format──▶ LlmProvider ──▶ String       │
//! ├─────────────────────────────────────────────────────────────┤
//! │                        Agent                                 │
//! │  ┌─────────────┐  ┌─────────────┐  ┌─────────────────────┐  │
//! │  │  Reasoning  │  │    Tools    │  │   LlmProvider       │  │
//! │  │    Loop     │──│   Registry  │──│   (Strategy)        │  │
//! │  └─────────────┘  └─────────────┘  └─────────────────────┘  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The `LlmProvider` trait enables swapping between OpenRouter, any other
//! OpenAI-compatible gateway, or a scripted provider without changing chain
//! or agent logic.

pub mod chain;
pub mod error;
pub mod message;
pub mod prompt;
pub mod provider;
pub mod reasoning;
pub mod scripted;
pub mod tool;

pub use chain::LlmChain;
pub use error::{AgentError, Result};
pub use message::{Message, Role};
pub use prompt::{FewShotPromptTemplate, Prompt, PromptExample, PromptTemplate};
pub use provider::{GenerationOptions, LlmProvider};
pub use reasoning::{Agent, AgentBuilder, AgentOutput, AgentStep};
pub use scripted::{RecordedRequest, ScriptedProvider};
pub use tool::{Tool, ToolCall, ToolRegistry, ToolResult, ToolSchema};
