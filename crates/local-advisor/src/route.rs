//! Route Pipeline
//!
//! start + destination → route → stops along the way, time & cost.

use std::sync::Arc;

use agent_core::{
    FewShotPromptTemplate, GenerationOptions, LlmChain, LlmProvider, PromptExample,
    PromptTemplate,
};
use serde::{Deserialize, Serialize};

use crate::error::Result;

const PARIS_LYON: &str = "The fastest way from Paris to Lyon is the TGV high-speed train from \
Gare de Lyon, which takes about two hours. Driving along the A6 motorway takes around four and \
a half hours and lets you stop in Burgundy on the way.";

/// start + destination → recommended way to travel
pub fn route_prompt() -> FewShotPromptTemplate {
    FewShotPromptTemplate::new(
        PromptTemplate::from_template("Trip: {input}\nResponse: {output}"),
        "Trip: {start} to {destination}\nResponse:",
    )
    .prefix(
        "Suggest the best way to travel between the two places.\n\
         Mention the main transport options and roughly how long each takes.\n\n",
    )
    .example(PromptExample::new("Paris to Lyon", PARIS_LYON))
}

/// route → places worth stopping at
pub fn stops_prompt() -> FewShotPromptTemplate {
    FewShotPromptTemplate::new(
        PromptTemplate::from_template("Route: {input}\nResponse: {output}"),
        "Route: {route}\nResponse:",
    )
    .prefix(
        "List two or three places worth stopping at along the route.\n\
         Use bullet points with one short reason for each.\n\n",
    )
    .example(PromptExample::new(
        PARIS_LYON,
        "- Dijon: the old town and its mustard shops\n\
         - Beaune: wine cellars of Burgundy\n\
         - Mâcon: a riverside lunch on the Saône",
    ))
}

/// route → travel time and cost
pub fn time_prompt() -> PromptTemplate {
    PromptTemplate::from_template("Estimate travel time and cost for this route:\n{route}")
}

/// Text blocks produced for one trip
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutePlan {
    pub route: String,
    pub stops: String,
    pub time: String,
}

/// The route chains over one provider
pub struct RouteChains {
    route: LlmChain,
    stops: LlmChain,
    time: LlmChain,
}

impl RouteChains {
    pub fn new(provider: Arc<dyn LlmProvider>, options: &GenerationOptions) -> Self {
        Self {
            route: LlmChain::new("route", route_prompt(), provider.clone(), options.clone()),
            stops: LlmChain::new("stops", stops_prompt(), provider.clone(), options.clone()),
            time: LlmChain::new("route_time", time_prompt(), provider, options.clone()),
        }
    }

    /// Run route → stops → time & cost
    pub async fn plan(&self, start: &str, destination: &str) -> Result<RoutePlan> {
        let route = self
            .route
            .invoke(&[("start", start), ("destination", destination)])
            .await?;
        let stops = self.stops.invoke(&[("route", route.as_str())]).await?;
        let time = self.time.invoke(&[("route", route.as_str())]).await?;

        tracing::debug!(start = %start, destination = %destination, "Route plan ready");
        Ok(RoutePlan { route, stops, time })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agent_core::Prompt;
    use agent_runtime::ScriptedProvider;

    #[test]
    fn test_route_prompt_slots() {
        let prompt = route_prompt();
        assert_eq!(prompt.input_variables(), vec!["start", "destination"]);

        let text = prompt
            .format(&[("start", "Berlin"), ("destination", "Prague")])
            .unwrap();
        assert!(text.contains("Trip: Paris to Lyon\nResponse: The fastest way"));
        assert!(text.ends_with("Trip: Berlin to Prague\nResponse:"));
    }

    #[tokio::test]
    async fn test_plan_runs_three_chains() {
        let provider = Arc::new(ScriptedProvider::new([
            "Take the EC train, about four hours.",
            "- Dresden: baroque old town",
            "Four hours, around 40 EUR.",
        ]));
        let chains = RouteChains::new(provider.clone(), &GenerationOptions::default());

        let plan = chains.plan("Berlin", "Prague").await.unwrap();
        assert_eq!(plan.route, "Take the EC train, about four hours.");
        assert_eq!(plan.stops, "- Dresden: baroque old town");
        assert_eq!(plan.time, "Four hours, around 40 EUR.");

        let requests = provider.requests();
        assert!(requests[1].prompt.ends_with("Route: Take the EC train, about four hours.\nResponse:"));
        assert_eq!(
            requests[2].prompt,
            "Estimate travel time and cost for this route:\nTake the EC train, about four hours."
        );
    }
}
