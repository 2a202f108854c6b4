use serde_json::Value;

use crate::errors::ToolError;
use crate::models::message::Message;
use crate::models::tool::ToolCall;

/// Side channel notified at each checkpoint of the agent loop.
///
/// Every method defaults to a no-op. Observers cannot influence control flow;
/// an agent with no observers behaves exactly like one with many.
pub trait AgentObserver: Send + Sync {
    /// About to ask the backend for the next turn
    fn on_model_request(&self, _agent_id: &str, _round: usize, _history_len: usize) {}

    /// The backend answered; `message` is appended to history right after
    fn on_model_response(&self, _agent_id: &str, _message: &Message) {}

    fn on_tool_start(&self, _agent_id: &str, _call: &ToolCall) {}

    fn on_tool_success(&self, _agent_id: &str, _call: &ToolCall, _result: &Value) {}

    fn on_tool_failure(&self, _agent_id: &str, _call: &ToolCall, _error: &ToolError) {}
}

/// Observer that ignores everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl AgentObserver for NoopObserver {}

/// Writes every checkpoint to `tracing` at info level (warn for failures)
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingObserver;

impl AgentObserver for LoggingObserver {
    fn on_model_request(&self, agent_id: &str, round: usize, history_len: usize) {
        tracing::info!(agent = agent_id, round, history_len, "thinking");
    }

    fn on_model_response(&self, agent_id: &str, message: &Message) {
        let calls: Vec<&str> = message
            .tool_calls()
            .iter()
            .map(|call| call.name.as_str())
            .collect();
        if calls.is_empty() {
            tracing::info!(
                agent = agent_id,
                content = message.text().unwrap_or_default(),
                "answered"
            );
        } else {
            tracing::info!(agent = agent_id, tools = ?calls, "requested tools");
        }
    }

    fn on_tool_start(&self, agent_id: &str, call: &ToolCall) {
        tracing::info!(
            agent = agent_id,
            tool = %call.name,
            call_id = %call.id,
            arguments = %call.arguments,
            "tool started"
        );
    }

    fn on_tool_success(&self, agent_id: &str, call: &ToolCall, result: &Value) {
        tracing::info!(
            agent = agent_id,
            tool = %call.name,
            call_id = %call.id,
            result = %result,
            "tool completed"
        );
    }

    fn on_tool_failure(&self, agent_id: &str, call: &ToolCall, error: &ToolError) {
        tracing::warn!(
            agent = agent_id,
            tool = %call.name,
            call_id = %call.id,
            error = %error,
            "tool failed"
        );
    }
}
