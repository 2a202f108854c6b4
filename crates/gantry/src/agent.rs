use std::sync::Arc;

use crate::capability::Capability;
use crate::errors::{AgentError, AgentResult};
use crate::models::history::History;
use crate::models::message::Message;
use crate::models::objectid::create_object_id;
use crate::models::tool::{Tool, ToolCall};
use crate::observer::{AgentObserver, LoggingObserver};
use crate::providers::base::Provider;

/// Agent integrates a foundational LLM with the capabilities it may call.
///
/// One agent is one conversation: it owns its history and only ever appends
/// to it. `converse` runs the loop of asking the model, executing any tool
/// calls it returns in order, and asking again until the model answers
/// without tool calls.
pub struct Agent {
    id: String,
    provider: Box<dyn Provider>,
    capabilities: Vec<Arc<dyn Capability>>,
    history: History,
    observers: Vec<Arc<dyn AgentObserver>>,
    verbose: bool,
    max_rounds: Option<usize>,
    // history length at the end of the last completed exchange
    settled: usize,
}

impl Agent {
    /// Create an agent whose history starts with `system_prompt`
    pub fn new<S: Into<String>>(
        provider: Box<dyn Provider>,
        capabilities: Vec<Arc<dyn Capability>>,
        system_prompt: S,
    ) -> Self {
        let mut history = History::new();
        history.push(Message::system(system_prompt));

        Self {
            id: create_object_id("agent"),
            provider,
            capabilities,
            history,
            observers: Vec::new(),
            verbose: false,
            max_rounds: None,
            settled: 1,
        }
    }

    /// Seed the conversation with earlier messages, appended after the
    /// system prompt
    pub fn with_history<I: IntoIterator<Item = Message>>(mut self, messages: I) -> Self {
        self.history.extend(messages);
        self.settled = self.history.len();
        self
    }

    /// Log every loop checkpoint through `tracing` at info level
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn AgentObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Cap the number of backend calls a single exchange may make.
    /// Unlimited unless set.
    pub fn with_max_rounds(mut self, max_rounds: usize) -> Self {
        self.max_rounds = Some(max_rounds);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Metadata for every capability this agent may call, in order
    pub fn tools(&self) -> Vec<Tool> {
        self.capabilities
            .iter()
            .map(|capability| capability.metadata())
            .collect()
    }

    /// Start a fresh agent from the last exchange that completed.
    ///
    /// A failed exchange can leave tool calls without results at the end of
    /// history, which backends refuse to continue from. The new agent keeps
    /// the same provider, capabilities and settings, and the history as it
    /// stood after the last successful exchange.
    pub fn recover(self) -> Self {
        let history = History::from(self.history.messages()[..self.settled].to_vec());
        tracing::debug!(
            agent = %self.id,
            dropped = self.history.len() - self.settled,
            "recovering from a failed exchange"
        );

        Self {
            id: create_object_id("agent"),
            history,
            provider: self.provider,
            capabilities: self.capabilities,
            observers: self.observers,
            verbose: self.verbose,
            max_rounds: self.max_rounds,
            settled: self.settled,
        }
    }

    fn notify(&self, event: impl Fn(&dyn AgentObserver)) {
        if self.verbose {
            event(&LoggingObserver as &dyn AgentObserver);
        }
        for observer in &self.observers {
            event(observer.as_ref());
        }
    }

    fn find_capability(&self, name: &str) -> Option<Arc<dyn Capability>> {
        self.capabilities
            .iter()
            .find(|capability| capability.name() == name)
            .cloned()
    }

    /// Run one exchange and return the model's final answer.
    ///
    /// Any failure aborts the exchange. Messages appended before the failure
    /// stay in history; nothing is appended on behalf of the failed step.
    pub async fn converse(&mut self, input: &str) -> AgentResult<String> {
        self.history.push(Message::user(input));
        let tools = self.tools();
        let mut round = 0;

        loop {
            if let Some(max) = self.max_rounds {
                if round >= max {
                    tracing::warn!(agent = %self.id, max, "model kept requesting tools");
                    return Err(AgentError::MaxRoundsExceeded(max));
                }
            }
            round += 1;

            self.notify(|o| o.on_model_request(&self.id, round, self.history.len()));
            let (response, usage) = self
                .provider
                .complete(self.history.messages(), &tools)
                .await
                .map_err(|e| {
                    tracing::warn!(agent = %self.id, error = %e, "model backend failed");
                    AgentError::Backend(e)
                })?;
            tracing::debug!(
                agent = %self.id,
                round,
                tool_calls = response.tool_calls.len(),
                input_tokens = ?usage.input_tokens,
                output_tokens = ?usage.output_tokens,
                "model responded"
            );

            let message = Message::assistant(response.content, response.tool_calls);
            self.notify(|o| o.on_model_response(&self.id, &message));
            let tool_calls = message.tool_calls().to_vec();
            self.history.push(message);

            if tool_calls.is_empty() {
                let answer = self
                    .history
                    .last()
                    .and_then(Message::text)
                    .unwrap_or_default()
                    .to_string();
                self.settled = self.history.len();
                return Ok(answer);
            }

            for call in tool_calls {
                self.dispatch_tool_call(call).await?;
            }
        }
    }

    /// Execute one tool call and append its result
    async fn dispatch_tool_call(&mut self, call: ToolCall) -> AgentResult<()> {
        let capability = self.find_capability(&call.name).ok_or_else(|| {
            tracing::warn!(agent = %self.id, tool = %call.name, "model requested an unknown tool");
            AgentError::ToolNotFound(call.name.clone())
        })?;

        self.notify(|o| o.on_tool_start(&self.id, &call));
        match capability.call(call.arguments.clone()).await {
            Ok(result) => {
                self.notify(|o| o.on_tool_success(&self.id, &call, &result));
                self.history.push(Message::result(call.id, result));
                Ok(())
            }
            Err(e) => {
                self.notify(|o| o.on_tool_failure(&self.id, &call, &e));
                Err(e.into())
            }
        }
    }
}
