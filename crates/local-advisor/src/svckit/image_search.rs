//! Dish Image Search Tool
//!
//! Looks up photos of a dish through an image search provider.

use std::sync::Arc;

use async_trait::async_trait;

use agent_core::{
    AgentError, Result as CoreResult, Tool, ToolCall, ToolResult, ToolSchema,
    tool::ParameterSchema,
};

use crate::photos::ImageSearch;

pub const TOOL_NAME: &str = "DishImageSearch";

/// Tool returning image URLs for a dish name
pub struct DishImageSearchTool {
    search: Arc<dyn ImageSearch>,
}

impl DishImageSearchTool {
    pub fn new(search: Arc<dyn ImageSearch>) -> Self {
        Self { search }
    }
}

#[async_trait]
impl Tool for DishImageSearchTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: TOOL_NAME.into(),
            description: "Search images for a dish name and return a list of image URLs".into(),
            parameters: vec![ParameterSchema {
                name: "dish".into(),
                param_type: "string".into(),
                description: "Dish name, e.g. 'Pho Bo'".into(),
                required: true,
            }],
            return_direct: true,
        }
    }

    async fn execute(&self, call: &ToolCall) -> CoreResult<ToolResult> {
        let dish = call.str_arg("dish").map(str::trim).unwrap_or_default();
        if dish.is_empty() {
            return Err(AgentError::ToolValidation("dish name is empty".into()));
        }

        let urls = self
            .search
            .search(dish)
            .await
            .map_err(|e| AgentError::ToolExecution(e.to_string()))?;

        tracing::debug!(dish = %dish, provider = self.search.name(), count = urls.len(), "Dish image search");

        let output = serde_json::to_string(&urls)?;
        Ok(ToolResult::success(TOOL_NAME, output).with_data(serde_json::json!(urls)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::photos::MockImageSearch;
    use std::collections::HashMap;

    fn call(dish: &str) -> ToolCall {
        ToolCall {
            name: TOOL_NAME.into(),
            arguments: HashMap::from([("dish".to_string(), serde_json::json!(dish))]),
            id: None,
        }
    }

    #[tokio::test]
    async fn test_returns_urls_as_text_and_data() {
        let search = Arc::new(MockImageSearch::new(["a.jpg", "b.jpg"]));
        let tool = DishImageSearchTool::new(search.clone());

        let result = tool.execute(&call(" Pad Thai ")).await.unwrap();
        assert!(result.success);
        assert_eq!(result.output, r#"["a.jpg","b.jpg"]"#);
        assert_eq!(result.data, Some(serde_json::json!(["a.jpg", "b.jpg"])));
        assert_eq!(search.queries(), vec!["Pad Thai"]);
    }

    #[tokio::test]
    async fn test_search_error_is_tool_execution() {
        let tool = DishImageSearchTool::new(Arc::new(MockImageSearch::failing(401)));
        let err = tool.execute(&call("Pho")).await.unwrap_err();
        assert!(matches!(err, AgentError::ToolExecution(msg) if msg.contains("401")));
    }

    #[test]
    fn test_schema_is_return_direct() {
        let tool = DishImageSearchTool::new(Arc::new(MockImageSearch::default()));
        let schema = tool.schema();
        assert!(schema.return_direct);
        assert_eq!(schema.parameters.len(), 1);
        assert!(schema.parameters[0].required);
    }
}
