use thiserror::Error;

/// Failures raised by a capability while it runs
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ToolError {
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Tool execution failed: {0}")]
    ExecutionError(String),
}

pub type ToolResult<T> = Result<T, ToolError>;

/// Problems with a tool's declared parameter schema
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    #[error("Schema type must be 'object', found '{0}'")]
    NotAnObject(String),

    #[error("Required property '{0}' is not declared in properties")]
    UnknownRequired(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegistryError {
    #[error("Tool with name '{0}' is already registered")]
    DuplicateName(String),

    #[error("Tool '{name}' cannot be registered: {reason}")]
    InvalidTool { name: String, reason: String },
}

/// Everything that can abort a single `Agent::converse` exchange
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    #[error(transparent)]
    Tool(#[from] ToolError),

    #[error("Model backend failed: {0:#}")]
    Backend(#[source] anyhow::Error),

    #[error("Exceeded the limit of {0} model rounds without a final answer")]
    MaxRoundsExceeded(usize),
}

pub type AgentResult<T> = Result<T, AgentError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_error_passes_through_agent_error() {
        let err: AgentError = ToolError::ExecutionError("boom".into()).into();
        assert!(matches!(
            err,
            AgentError::Tool(ToolError::ExecutionError(ref msg)) if msg == "boom"
        ));
        assert_eq!(err.to_string(), "Tool execution failed: boom");
    }

    #[test]
    fn test_backend_error_keeps_context_chain() {
        let source = anyhow::anyhow!("connection refused").context("posting to /v1/chat/completions");
        let err = AgentError::Backend(source);
        let rendered = err.to_string();
        assert!(rendered.contains("posting to /v1/chat/completions"));
        assert!(rendered.contains("connection refused"));
    }

    #[test]
    fn test_registry_error_names_tool() {
        let err = RegistryError::DuplicateName("get_weather".into());
        assert_eq!(
            err.to_string(),
            "Tool with name 'get_weather' is already registered"
        );
    }
}
