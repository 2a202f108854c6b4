use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::models::message::Message;
use crate::models::tool::Tool;
use crate::providers::base::{ModelResponse, Provider, Usage};

/// One scripted step of a `MockProvider`
#[derive(Debug, Clone)]
pub enum MockReply {
    Response(ModelResponse),
    Failure(String),
}

impl From<ModelResponse> for MockReply {
    fn from(response: ModelResponse) -> Self {
        MockReply::Response(response)
    }
}

/// What the provider was shown on one call
#[derive(Debug, Clone)]
pub struct MockCall {
    pub messages: Vec<Message>,
    pub tools: Vec<String>,
}

#[derive(Default)]
struct MockState {
    replies: VecDeque<MockReply>,
    calls: Vec<MockCall>,
}

/// A mock provider that returns pre-configured responses for testing.
///
/// Clones share the same script and call log, so a test can keep one handle
/// while the agent owns another.
#[derive(Clone, Default)]
pub struct MockProvider {
    state: Arc<Mutex<MockState>>,
}

impl MockProvider {
    /// Create a new mock provider with a sequence of responses
    pub fn new<I, R>(replies: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<MockReply>,
    {
        Self {
            state: Arc::new(Mutex::new(MockState {
                replies: replies.into_iter().map(Into::into).collect(),
                calls: Vec::new(),
            })),
        }
    }

    /// Every call made so far, oldest first
    pub fn calls(&self) -> Vec<MockCall> {
        self.state
            .lock()
            .map(|state| state.calls.clone())
            .unwrap_or_default()
    }

    pub fn remaining(&self) -> usize {
        self.state
            .lock()
            .map(|state| state.replies.len())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn complete(
        &self,
        messages: &[Message],
        tools: &[Tool],
    ) -> Result<(ModelResponse, Usage)> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| anyhow!("mock provider state was poisoned"))?;

        state.calls.push(MockCall {
            messages: messages.to_vec(),
            tools: tools.iter().map(|tool| tool.name.clone()).collect(),
        });

        match state.replies.pop_front() {
            Some(MockReply::Response(response)) => Ok((response, Usage::default())),
            Some(MockReply::Failure(reason)) => Err(anyhow!(reason)),
            // Return empty response if no more pre-configured responses
            None => Ok((ModelResponse::default(), Usage::default())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_replays_script_then_goes_quiet() -> Result<()> {
        let provider = MockProvider::new([
            MockReply::Response(ModelResponse::text("first")),
            MockReply::Failure("rate limited".into()),
        ]);

        let (response, _) = provider.complete(&[Message::user("hi")], &[]).await?;
        assert_eq!(response.content, "first");

        let err = provider.complete(&[], &[]).await.unwrap_err();
        assert_eq!(err.to_string(), "rate limited");

        let (response, _) = provider.complete(&[], &[]).await?;
        assert_eq!(response, ModelResponse::default());
        assert_eq!(provider.remaining(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_clones_share_call_log() -> Result<()> {
        let provider = MockProvider::new([ModelResponse::text("ok")]);
        let handle = provider.clone();

        provider
            .complete(&[Message::system("sys"), Message::user("hi")], &[])
            .await?;

        let calls = handle.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].messages.len(), 2);
        Ok(())
    }
}
