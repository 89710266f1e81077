//! Recipe pipeline end to end over a scripted model and a static photo source

use std::sync::Arc;

use agent_core::GenerationOptions;
use agent_runtime::ScriptedProvider;
use local_advisor::{
    CHAIN_MODEL, DishImageAgent, ImageAgentConfig, MockImageSearch, RecipeChains,
};

#[tokio::test]
async fn test_location_to_images() {
    let provider = Arc::new(ScriptedProvider::new([
        "Pho, banh mi and bun cha.",
        "The easiest dish is Banh Mi.\n\nIngredients:\n- Baguette\n- Pickled carrots",
        "About 20 minutes and $6.",
        "Banh Mi",
        "Thought: I need pictures.\nAction: DishImageSearch\nAction Input: \"Banh Mi\"",
    ]));
    let search = Arc::new(MockImageSearch::new(["https://img/banh-mi-1", "https://img/banh-mi-2"]));

    let chains = RecipeChains::new(provider.clone(), &GenerationOptions::new(CHAIN_MODEL, 0.5));
    let images = DishImageAgent::new(provider.clone(), search.clone(), &ImageAgentConfig::default()).unwrap();

    let suggestion = chains.suggest("Vietnam").await.unwrap();
    let dish = chains.dish_name(&suggestion.recipe).await.unwrap();
    let urls = images.fetch_dish_images(&dish).await;

    assert_eq!(suggestion.meal, "Pho, banh mi and bun cha.");
    assert_eq!(dish, "Banh Mi");
    assert_eq!(urls, vec!["https://img/banh-mi-1", "https://img/banh-mi-2"]);
    assert_eq!(search.queries(), vec!["Banh Mi"]);

    let requests = provider.requests();
    assert_eq!(requests.len(), 5);
    assert!(requests[..4].iter().all(|r| r.model == CHAIN_MODEL));
    assert!((requests[4].temperature - 0.3).abs() < f32::EPSILON);
    assert_eq!(provider.remaining(), 0);
}
