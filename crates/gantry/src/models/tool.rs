use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::schema::ToolSchema;

/// The declarative description of a tool, as handed to a model backend.
///
/// This carries no executable reference; see `capability::Capability` for
/// the part that actually runs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tool {
    /// The name of the tool
    pub name: String,
    /// A description of what the tool does
    pub description: String,
    /// Parameters that the tool accepts
    pub parameters: ToolSchema,
}

impl Tool {
    /// Create a new tool with the given name and description
    pub fn new<N, D>(name: N, description: D, parameters: ToolSchema) -> Self
    where
        N: Into<String>,
        D: Into<String>,
    {
        Tool {
            name: name.into(),
            description: description.into(),
            parameters,
        }
    }
}

/// A model-issued request to run one tool
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolCall {
    /// Correlation id, echoed back on the matching result message
    pub id: String,
    /// The name of the tool to execute
    #[serde(rename = "tool_name")]
    pub name: String,
    /// The arguments for the execution
    pub arguments: Value,
}

impl ToolCall {
    pub fn new<I: Into<String>, S: Into<String>>(id: I, name: S, arguments: Value) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::schema::PropertySchema;
    use serde_json::json;

    #[test]
    fn test_tool_serializes_with_schema() -> anyhow::Result<()> {
        let tool = Tool::new(
            "get_weather",
            "Get the current weather for a location",
            ToolSchema::object()
                .property("location", PropertySchema::string("The city"))
                .required(["location"]),
        );
        let value = serde_json::to_value(&tool)?;
        assert_eq!(value["name"], "get_weather");
        assert_eq!(value["parameters"]["required"], json!(["location"]));
        Ok(())
    }

    #[test]
    fn test_tool_call_uses_tool_name_key() -> anyhow::Result<()> {
        let call = ToolCall::new("call_1", "get_weather", json!({"location": "Paris"}));
        let value = serde_json::to_value(&call)?;
        assert_eq!(
            value,
            json!({
                "id": "call_1",
                "tool_name": "get_weather",
                "arguments": {"location": "Paris"}
            })
        );
        Ok(())
    }
}
