//! Reasoning Loop
//!
//! Implements the ReAct (Reason + Act) pattern. The LLM writes
//! `Thought / Action / Action Input` turns; the loop runs the named tool,
//! appends the observation to the scratchpad and asks again until the LLM
//! writes a `Final Answer` or a `return_direct` tool finishes the run.

use std::fmt::Write as _;
use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde::Serialize;

use crate::error::{AgentError, Result};
use crate::message::Message;
use crate::prompt::{Prompt, PromptTemplate};
use crate::provider::{GenerationOptions, LlmProvider};
use crate::tool::{Tool, ToolCall, ToolRegistry, ToolResult};

const FINAL_ANSWER: &str = "Final Answer:";
const OBSERVATION_STOP: &str = "\nObservation";

const MISSING_ACTION: &str = "Invalid Format: Missing 'Action:' after 'Thought:'";
const MISSING_ACTION_INPUT: &str = "Invalid Format: Missing 'Action Input:' after 'Action:'";
const INVALID_RESPONSE: &str = "Invalid or incomplete response";

/// Generic ReAct prompt; slots: `tools`, `tool_names`, `input`, `agent_scratchpad`
pub const DEFAULT_REACT_PROMPT: &str = "Answer the following questions as best you can. \
You have access to the following tools:

{tools}

Use the following format:

Question: the input question you must answer
Thought: you should always think about what to do
Action: the action to take, should be one of [{tool_names}]
Action Input: the input to the action
Observation: the result of the action
... (this Thought/Action/Action Input/Observation can repeat N times)
Thought: I now know the final answer
Final Answer: the final answer to the original input question

Begin!

Question: {input}
Thought:{agent_scratchpad}";

static ACTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)Action\s*\d*\s*:[\s]*(.*?)[\s]*Action\s*\d*\s*Input\s*\d*\s*:[\s]*(.*)")
        .expect("action pattern is valid")
});
static ACTION_ONLY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Action\s*\d*\s*:").expect("action pattern is valid"));
static ACTION_INPUT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Action\s*\d*\s*Input\s*\d*\s*:").expect("action input pattern is valid")
});

/// Agent configuration
#[derive(Clone, Debug)]
pub struct AgentConfig {
    /// ReAct prompt template
    pub prompt: PromptTemplate,

    /// Maximum reasoning iterations before giving up
    pub max_iterations: usize,

    /// Generation options
    pub generation: GenerationOptions,

    /// Feed malformed LLM turns back as observations instead of failing
    pub handle_parsing_errors: bool,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            prompt: PromptTemplate::from_template(DEFAULT_REACT_PROMPT),
            max_iterations: 15,
            generation: GenerationOptions::default().with_stop(OBSERVATION_STOP),
            handle_parsing_errors: true,
        }
    }
}

/// One parsed LLM turn
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AgentDecision {
    /// Run a tool
    Action { tool: String, input: String },
    /// Stop with this answer
    Finish(String),
}

/// A turn that did not follow the ReAct format
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseFailure {
    /// Text fed back to the LLM
    pub observation: String,
    /// Error detail for logs
    pub reason: String,
}

impl ParseFailure {
    fn new(observation: &str, reason: impl Into<String>) -> Self {
        Self {
            observation: observation.into(),
            reason: reason.into(),
        }
    }
}

/// Parse a single ReAct turn
pub fn parse_react_output(text: &str) -> std::result::Result<AgentDecision, ParseFailure> {
    let includes_answer = text.contains(FINAL_ANSWER);

    if let Some(caps) = ACTION_RE.captures(text) {
        if includes_answer {
            return Err(ParseFailure::new(
                INVALID_RESPONSE,
                format!("Parsing LLM output produced both a final answer and a parse-able action: {text}"),
            ));
        }
        let tool = caps[1].trim().to_string();
        let input = caps[2].trim().trim_matches('"').to_string();
        return Ok(AgentDecision::Action { tool, input });
    }

    if includes_answer {
        let answer = text.rsplit(FINAL_ANSWER).next().unwrap_or_default().trim();
        return Ok(AgentDecision::Finish(answer.to_string()));
    }

    let reason = format!("Could not parse LLM output: `{text}`");
    if !ACTION_ONLY_RE.is_match(text) {
        Err(ParseFailure::new(MISSING_ACTION, reason))
    } else if !ACTION_INPUT_RE.is_match(text) {
        Err(ParseFailure::new(MISSING_ACTION_INPUT, reason))
    } else {
        Err(ParseFailure::new(INVALID_RESPONSE, reason))
    }
}

/// Cut a turn where the model started inventing its own observation
fn truncate_at_observation(text: &str) -> &str {
    text.find(OBSERVATION_STOP).map_or(text, |idx| &text[..idx])
}

/// One completed Thought/Action/Observation cycle
#[derive(Clone, Debug, Serialize)]
pub struct AgentStep {
    /// Tool name, or `_Exception` for a malformed turn
    pub tool: String,
    pub tool_input: String,
    /// Raw LLM text for this turn
    pub log: String,
    pub observation: String,
}

/// Result of an agent run
#[derive(Clone, Debug, Serialize)]
pub struct AgentOutput {
    /// Final answer text, or the structured result of a `return_direct` tool
    pub output: serde_json::Value,
    pub steps: Vec<AgentStep>,
}

fn format_scratchpad(steps: &[AgentStep]) -> String {
    let mut thoughts = String::new();
    for step in steps {
        let _ = write!(thoughts, "{}\nObservation: {}\nThought: ", step.log, step.observation);
    }
    thoughts
}

/// The main Agent struct
pub struct Agent {
    provider: Arc<dyn LlmProvider>,
    tools: Arc<ToolRegistry>,
    config: AgentConfig,
}

impl Agent {
    /// Create a new agent
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        tools: Arc<ToolRegistry>,
        config: AgentConfig,
    ) -> Self {
        Self {
            provider,
            tools,
            config,
        }
    }

    /// Create with default configuration
    pub fn with_defaults(provider: Arc<dyn LlmProvider>, tools: Arc<ToolRegistry>) -> Self {
        Self::new(provider, tools, AgentConfig::default())
    }

    /// Run the loop on one input
    pub async fn invoke(&self, input: &str) -> Result<AgentOutput> {
        let tool_descriptions = self.tools.render_descriptions();
        let tool_names = self.tools.names().join(", ");
        let mut steps: Vec<AgentStep> = Vec::new();

        for iteration in 1..=self.config.max_iterations {
            let scratchpad = format_scratchpad(&steps);
            let prompt = self.config.prompt.format(&[
                ("tools", tool_descriptions.as_str()),
                ("tool_names", tool_names.as_str()),
                ("input", input),
                ("agent_scratchpad", scratchpad.as_str()),
            ])?;

            let completion = self
                .provider
                .complete(&[Message::user(prompt)], &self.config.generation)
                .await?;
            let text = truncate_at_observation(&completion.content);
            tracing::debug!(iteration, "Agent turn:\n{}", text);

            match parse_react_output(text) {
                Ok(AgentDecision::Finish(answer)) => {
                    return Ok(AgentOutput {
                        output: serde_json::Value::String(answer),
                        steps,
                    });
                }
                Ok(AgentDecision::Action { tool, input: tool_input }) => {
                    let (observation, direct) = self.run_tool(&tool, &tool_input).await;
                    steps.push(AgentStep {
                        tool,
                        tool_input,
                        log: text.to_string(),
                        observation,
                    });
                    if let Some(output) = direct {
                        return Ok(AgentOutput { output, steps });
                    }
                }
                Err(failure) => {
                    if !self.config.handle_parsing_errors {
                        return Err(AgentError::Parse(failure.reason));
                    }
                    tracing::warn!(iteration, "Re-prompting after malformed turn: {}", failure.observation);
                    steps.push(AgentStep {
                        tool: "_Exception".into(),
                        tool_input: failure.observation.clone(),
                        log: text.to_string(),
                        observation: failure.observation,
                    });
                }
            }
        }

        Err(AgentError::MaxIterations(self.config.max_iterations))
    }

    /// Resolve and execute a tool; returns the observation and, for a
    /// successful `return_direct` tool, the final output
    async fn run_tool(&self, name: &str, input: &str) -> (String, Option<serde_json::Value>) {
        let Some(tool) = self.tools.get(name) else {
            tracing::debug!(tool = %name, "LLM requested an unknown tool");
            let observation = format!(
                "{name} is not a valid tool, try one of [{}].",
                self.tools.names().join(", ")
            );
            return (observation, None);
        };

        let schema = tool.schema();
        let call = ToolCall::from_action_input(&schema, input);
        tracing::debug!(tool = %call.name, input = %input, "Executing tool");

        let result = self.execute_tool(&call).await;
        let direct = (schema.return_direct && result.success).then(|| {
            result
                .data
                .clone()
                .unwrap_or_else(|| serde_json::Value::String(result.output.clone()))
        });

        (result.output, direct)
    }

    /// Execute a tool call
    async fn execute_tool(&self, call: &ToolCall) -> ToolResult {
        match self.tools.execute(call).await {
            Ok(mut result) => {
                result.id.clone_from(&call.id);
                result
            }
            Err(e) => {
                let result = ToolResult::failure(call.name.clone(), format!("Error: {e}"));
                match &call.id {
                    Some(id) => result.with_id(id.clone()),
                    None => result,
                }
            }
        }
    }

    /// Get the tool registry
    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }
}

/// Builder for Agent configuration
pub struct AgentBuilder {
    provider: Option<Arc<dyn LlmProvider>>,
    tools: ToolRegistry,
    config: AgentConfig,
}

impl Default for AgentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AgentBuilder {
    pub fn new() -> Self {
        Self {
            provider: None,
            tools: ToolRegistry::new(),
            config: AgentConfig::default(),
        }
    }

    #[must_use]
    pub fn provider(mut self, provider: Arc<dyn LlmProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    #[must_use]
    pub fn tool<T: Tool + 'static>(mut self, tool: T) -> Self {
        self.tools.register(tool);
        self
    }

    #[must_use]
    pub fn tools(mut self, tools: ToolRegistry) -> Self {
        self.tools = tools;
        self
    }

    #[must_use]
    pub fn prompt(mut self, template: impl Into<String>) -> Self {
        self.config.prompt = PromptTemplate::from_template(template);
        self
    }

    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.generation.model = model.into();
        self
    }

    #[must_use]
    pub const fn temperature(mut self, temp: f32) -> Self {
        self.config.generation.temperature = temp;
        self
    }

    #[must_use]
    pub const fn max_iterations(mut self, max: usize) -> Self {
        self.config.max_iterations = max;
        self
    }

    #[must_use]
    pub const fn handle_parsing_errors(mut self, enabled: bool) -> Self {
        self.config.handle_parsing_errors = enabled;
        self
    }

    pub fn build(self) -> Result<Agent> {
        let provider = self
            .provider
            .ok_or_else(|| AgentError::Config("Provider is required".into()))?;

        let variables = self.config.prompt.input_variables();
        for slot in ["input", "agent_scratchpad"] {
            if !variables.iter().any(|v| v == slot) {
                return Err(AgentError::Config(format!("Agent prompt is missing {{{slot}}}")));
            }
        }

        Ok(Agent::new(provider, Arc::new(self.tools), self.config))
    }
}
