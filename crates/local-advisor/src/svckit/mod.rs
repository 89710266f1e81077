//! Service Kit - Agent Tools
//!
//! Domain-specific tools that implement `agent_core::Tool` for the advisor.

mod image_search;

pub use image_search::DishImageSearchTool;
