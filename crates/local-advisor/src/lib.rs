//! # local-advisor
//!
//! Suggestions for a place: classic dishes, an easy recipe with time and
//! cost, pictures of the dish, and travel routes between two places.
//!
//! ## Pipelines
//!
//! ```text
//! location ─▶ meals ─▶ recipe ─┬─▶ time & cost
//!                              └─▶ dish name ─▶ image agent ─▶ [url, url, url]
//!
//! start + destination ─▶ route ─┬─▶ stops
//!                               └─▶ time & cost
//! ```
//!
//! Each arrow is one `LlmChain` call; the image agent is a ReAct loop with a
//! single `DishImageSearch` tool backed by the Unsplash search API.

pub mod error;
pub mod images;
pub mod photos;
pub mod recipe;
pub mod route;
pub mod svckit;

pub use error::{AdvisorError, Result};
pub use images::{DishImageAgent, ImageAgentConfig, normalize_image_output};
pub use photos::{ImageSearch, MockImageSearch, UnsplashClient, UnsplashConfig};
pub use recipe::{RecipeChains, RecipeSuggestion};
pub use route::{RouteChains, RoutePlan};

/// Default model for the text chains
pub const CHAIN_MODEL: &str = "google/gemma-3-27b-it:free";

/// Default model for the image agent
pub const IMAGE_AGENT_MODEL: &str = "nvidia/nemotron-nano-12b-v2-vl:free";

/// ReAct prompt for the dish image agent
pub const DISH_IMAGE_AGENT_PROMPT: &str = r"
You are an AI agent that can use tools.

You have access to the following tools:
{tools}

Tool names:
{tool_names}

Use the following format:

Thought: you should think about what to do
Action: the tool name
Action Input: the input to the tool
Observation: the result of the tool
... (repeat Thought/Action/Observation as needed)
Final Answer: the final answer

IMPORTANT:
- If a tool is required, DO NOT provide a Final Answer
- When using DishImageSearch, return ONLY the tool output
- A Final Answer with images must be a JSON array of URL strings

Begin!

Question:
{input}

{agent_scratchpad}
";
