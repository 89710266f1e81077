//! Prompt Chains
//!
//! A chain is one prompt fill, one provider round trip and plain-text
//! output extraction. Multi-step pipelines are built by feeding one chain's
//! output into the next chain's variables.

use std::sync::Arc;

use crate::error::Result;
use crate::message::Message;
use crate::prompt::Prompt;
use crate::provider::{GenerationOptions, LlmProvider};

/// Prompt → LLM → text
pub struct LlmChain {
    name: String,
    prompt: Box<dyn Prompt>,
    provider: Arc<dyn LlmProvider>,
    options: GenerationOptions,
}

impl LlmChain {
    pub fn new(
        name: impl Into<String>,
        prompt: impl Prompt + 'static,
        provider: Arc<dyn LlmProvider>,
        options: GenerationOptions,
    ) -> Self {
        Self {
            name: name.into(),
            prompt: Box::new(prompt),
            provider,
            options,
        }
    }

    /// Chain name used in logs
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Render the prompt without calling the provider
    pub fn render(&self, vars: &[(&str, &str)]) -> Result<String> {
        self.prompt.format(vars)
    }

    /// Run the chain and return the raw completion text
    pub async fn invoke(&self, vars: &[(&str, &str)]) -> Result<String> {
        let prompt = self.render(vars)?;
        tracing::debug!(
            chain = %self.name,
            model = %self.options.model,
            tokens = self.provider.estimate_tokens(&prompt),
            "Invoking chain"
        );

        let completion = self
            .provider
            .complete(&[Message::user(prompt)], &self.options)
            .await?;

        if completion.truncated() {
            tracing::warn!(chain = %self.name, "Completion hit the token limit");
        }

        Ok(completion.content)
    }
}
