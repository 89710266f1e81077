//! Recipe Pipeline
//!
//! location → classic meals → easiest recipe → time & cost, plus a
//! dish-name extraction step feeding the image agent.

use std::sync::Arc;

use agent_core::{
    FewShotPromptTemplate, GenerationOptions, LlmChain, LlmProvider, PromptExample,
    PromptTemplate,
};
use serde::{Deserialize, Serialize};

use crate::error::Result;

const CARBONARA: &str = "The easiest dish to cook at home is Pasta Carbonara because it requires minimal ingredients \
and simple techniques.

Ingredients:
- Spaghetti
- Eggs
- Parmesan cheese
- Bacon or pancetta
- Black pepper

Steps:
- Boil the spaghetti until al dente
- Cook the bacon until crisp
- Whisk eggs with cheese
- Combine everything off the heat and season with pepper";

/// location → two or three classic dishes
pub fn location_prompt() -> FewShotPromptTemplate {
    FewShotPromptTemplate::new(
        PromptTemplate::from_template("Location: {input}\nResponse: {output}"),
        "Location: {location}\nResponse:",
    )
    .prefix("Suggest two or three classic dishes from the location.\n\n")
    .example(PromptExample::new(
        "Italy",
        "Some classic dishes from Italy include pizza, pasta carbonara, and risotto.",
    ))
    .example(PromptExample::new(
        "India",
        "Traditional Indian dishes include Chicken Kebab, Masala Dosa and Chole Bhature.",
    ))
}

/// meals → easiest dish with a full recipe
pub fn recipe_prompt() -> FewShotPromptTemplate {
    FewShotPromptTemplate::new(
        PromptTemplate::from_template("Meals: {input}\nResponse: {output}"),
        "Meals: {meal}\nResponse:",
    )
    .prefix(
        "From the given list of meals, identify the easiest dish to cook at home.\n\
         Explain briefly why it is easiest, then provide a detailed recipe.\n\
         Use clear section headings like Ingredients and Steps.\n\
         Use bullet points for ingredients and steps.\n\n",
    )
    .example(PromptExample::new("Pizza, pasta carbonara, risotto", CARBONARA))
}

/// recipe → cooking time and cost
pub fn time_prompt() -> PromptTemplate {
    PromptTemplate::from_template("Estimate cooking time and cost for this recipe:\n{recipe}")
}

/// recipe → bare dish name
pub fn dish_name_prompt() -> PromptTemplate {
    PromptTemplate::from_template(
        "
Extract ONLY the dish name from the recipe below.

Rules:
- Return ONLY the dish name
- No explanations
- No punctuation
- No extra words

Recipe:
{recipe}
",
    )
}

/// First non-blank line of the extraction output, trimmed
pub fn clean_dish_name(raw: &str) -> String {
    raw.trim().lines().next().unwrap_or_default().trim().to_string()
}

/// Text blocks produced for one location
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeSuggestion {
    pub meal: String,
    pub recipe: String,
    pub time: String,
}

/// The recipe chains over one provider
pub struct RecipeChains {
    meals: LlmChain,
    recipe: LlmChain,
    time: LlmChain,
    dish_name: LlmChain,
}

impl RecipeChains {
    pub fn new(provider: Arc<dyn LlmProvider>, options: &GenerationOptions) -> Self {
        Self {
            meals: LlmChain::new("meals", location_prompt(), provider.clone(), options.clone()),
            recipe: LlmChain::new("recipe", recipe_prompt(), provider.clone(), options.clone()),
            time: LlmChain::new("time", time_prompt(), provider.clone(), options.clone()),
            dish_name: LlmChain::new("dish_name", dish_name_prompt(), provider, options.clone()),
        }
    }

    /// Run meals → recipe → time & cost
    pub async fn suggest(&self, location: &str) -> Result<RecipeSuggestion> {
        let meal = self.meals.invoke(&[("location", location)]).await?;
        let recipe = self.recipe.invoke(&[("meal", meal.as_str())]).await?;
        let time = self.time.invoke(&[("recipe", recipe.as_str())]).await?;

        tracing::debug!(location = %location, "Recipe suggestion ready");
        Ok(RecipeSuggestion { meal, recipe, time })
    }

    /// Extract a clean dish name from a recipe
    pub async fn dish_name(&self, recipe: &str) -> Result<String> {
        let raw = self.dish_name.invoke(&[("recipe", recipe)]).await?;
        Ok(clean_dish_name(&raw))
    }
}
