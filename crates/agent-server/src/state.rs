//! Application State

use std::sync::Arc;

use agent_core::{GenerationOptions, LlmProvider};
use local_advisor::{DishImageAgent, ImageAgentConfig, ImageSearch, RecipeChains, RouteChains};

/// Chain temperature for `/generate`
pub const RECIPE_TEMPERATURE: f32 = 0.5;

/// Chain temperature for `/demo/generate` and `/route/generate`
pub const DEMO_TEMPERATURE: f32 = 0.7;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// LLM provider (OpenRouter, scripted, etc.)
    pub provider: Arc<dyn LlmProvider>,

    /// Recipe chains for the image-enabled page
    pub recipes: Arc<RecipeChains>,

    /// Recipe chains for the demo page
    pub demo: Arc<RecipeChains>,

    pub routes: Arc<RouteChains>,

    pub images: Arc<DishImageAgent>,

    /// Photo search backing the image agent
    pub image_search: Arc<dyn ImageSearch>,
}

impl AppState {
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        image_search: Arc<dyn ImageSearch>,
        chain_model: &str,
        image_agent: &ImageAgentConfig,
    ) -> local_advisor::Result<Self> {
        let recipe_options = GenerationOptions::new(chain_model, RECIPE_TEMPERATURE);
        let demo_options = GenerationOptions::new(chain_model, DEMO_TEMPERATURE);

        Ok(Self {
            recipes: Arc::new(RecipeChains::new(provider.clone(), &recipe_options)),
            demo: Arc::new(RecipeChains::new(provider.clone(), &demo_options)),
            routes: Arc::new(RouteChains::new(provider.clone(), &demo_options)),
            images: Arc::new(DishImageAgent::new(
                provider.clone(),
                image_search.clone(),
                image_agent,
            )?),
            provider,
            image_search,
        })
    }
}
