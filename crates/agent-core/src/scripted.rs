//! Scripted Provider
//!
//! Replays canned replies in order. Used by the chain, agent and router tests.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::error::{AgentError, Result};
use crate::message::Message;
use crate::provider::{Completion, FinishReason, GenerationOptions, LlmProvider};

/// A request the provider received
#[derive(Clone, Debug)]
pub struct RecordedRequest {
    /// Content of the last message
    pub prompt: String,
    pub model: String,
    pub temperature: f32,
    pub stop_sequences: Vec<String>,
}

/// Provider returning pre-written replies
#[derive(Default)]
pub struct ScriptedProvider {
    replies: Mutex<VecDeque<String>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl ScriptedProvider {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: Mutex::new(replies.into_iter().map(Into::into).collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue another reply
    pub fn push_reply(&self, reply: impl Into<String>) {
        lock(&self.replies).push_back(reply.into());
    }

    /// Requests received so far, oldest first
    pub fn requests(&self) -> Vec<RecordedRequest> {
        lock(&self.requests).clone()
    }

    /// Replies not yet consumed
    pub fn remaining(&self) -> usize {
        lock(&self.replies).len()
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "Scripted"
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    async fn complete(
        &self,
        messages: &[Message],
        options: &GenerationOptions,
    ) -> Result<Completion> {
        lock(&self.requests).push(RecordedRequest {
            prompt: messages.last().map(|m| m.content.clone()).unwrap_or_default(),
            model: options.model.clone(),
            temperature: options.temperature,
            stop_sequences: options.stop_sequences.clone(),
        });

        let content = lock(&self.replies)
            .pop_front()
            .ok_or_else(|| AgentError::ProviderUnavailable("Scripted replies exhausted".into()))?;

        Ok(Completion {
            content,
            model: options.model.clone(),
            usage: None,
            finish_reason: Some(FinishReason::Stop),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_replays_in_order() {
        let provider = ScriptedProvider::new(["one", "two"]);
        let options = GenerationOptions::new("test-model", 0.2);

        let first = provider.complete(&[Message::user("a")], &options).await.unwrap();
        let second = provider.complete(&[Message::user("b")], &options).await.unwrap();
        assert_eq!(first.content, "one");
        assert_eq!(second.content, "two");
        assert_eq!(provider.remaining(), 0);

        let requests = provider.requests();
        assert_eq!(requests[1].prompt, "b");
        assert_eq!(requests[0].model, "test-model");
    }

    #[tokio::test]
    async fn test_exhausted_script_is_unavailable() {
        let provider = ScriptedProvider::default();
        let err = provider
            .complete(&[Message::user("a")], &GenerationOptions::default())
            .await
            .unwrap_err();
        assert!(err.is_retryable());

        provider.push_reply("late");
        assert_eq!(provider.remaining(), 1);
    }

    #[tokio::test]
    async fn test_records_stop_sequences() {
        let provider = ScriptedProvider::new(["Action: Lookup"]);
        let options = GenerationOptions::new("test-model", 0.3).with_stop("\nObservation");
        provider.complete(&[Message::user("q")], &options).await.unwrap();

        assert_eq!(provider.requests()[0].stop_sequences, vec!["\nObservation".to_string()]);
    }

    #[test]
    fn test_poisoned_lock_is_recovered() {
        let provider = std::sync::Arc::new(ScriptedProvider::new(["one"]));
        let poisoner = provider.clone();
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.replies.lock().unwrap();
            panic!("poison the reply queue");
        })
        .join();

        assert!(provider.replies.is_poisoned());
        assert_eq!(provider.remaining(), 1);
        provider.push_reply("two");
        assert_eq!(provider.remaining(), 2);
    }
}
