use anyhow::{anyhow, Result};
use regex::Regex;
use serde_json::{json, Value};
use std::sync::OnceLock;

use crate::models::message::{Message, MessageKind};
use crate::models::tool::{Tool, ToolCall};
use crate::providers::base::ModelResponse;

/// Convert the conversation history to OpenAI's chat message specification
pub fn messages_to_openai_spec(messages: &[Message]) -> Vec<Value> {
    messages
        .iter()
        .map(|message| match &message.kind {
            MessageKind::System { content } => json!({"role": "system", "content": content}),
            MessageKind::User { content } => json!({"role": "user", "content": content}),
            MessageKind::Assistant {
                content,
                tool_calls,
            } => {
                let mut converted = json!({"role": "assistant", "content": content});
                if !tool_calls.is_empty() {
                    if content.is_empty() {
                        converted["content"] = Value::Null;
                    }
                    converted["tool_calls"] = tool_calls
                        .iter()
                        .map(|call| {
                            json!({
                                "id": call.id,
                                "type": "function",
                                "function": {
                                    "name": sanitize_function_name(&call.name),
                                    "arguments": call.arguments.to_string(),
                                }
                            })
                        })
                        .collect();
                }
                converted
            }
            MessageKind::Result {
                tool_call_id,
                result,
            } => json!({
                "role": "tool",
                "tool_call_id": tool_call_id,
                "content": result.to_string(),
            }),
        })
        .collect()
}

/// Convert tool metadata to OpenAI's function tool specification
pub fn tools_to_openai_spec(tools: &[Tool]) -> Result<Vec<Value>> {
    let mut tool_names = std::collections::HashSet::new();
    let mut result = Vec::new();

    for tool in tools {
        if !tool_names.insert(&tool.name) {
            return Err(anyhow!("Duplicate tool name: {}", tool.name));
        }

        result.push(json!({
            "type": "function",
            "function": {
                "name": tool.name,
                "description": tool.description,
                "parameters": tool.parameters,
            }
        }));
    }

    Ok(result)
}

/// Convert OpenAI's chat completion response into a model response
pub fn openai_response_to_model_response(response: &Value) -> Result<ModelResponse> {
    let original = response
        .get("choices")
        .and_then(|choices| choices.get(0))
        .and_then(|choice| choice.get("message"))
        .ok_or_else(|| anyhow!("Response contained no choices"))?;

    let content = original
        .get("content")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let mut tool_calls = Vec::new();
    if let Some(calls) = original.get("tool_calls").and_then(Value::as_array) {
        for call in calls {
            let id = call["id"].as_str().unwrap_or_default().to_string();
            let name = call["function"]["name"]
                .as_str()
                .unwrap_or_default()
                .to_string();
            let arguments = call["function"]["arguments"].as_str().unwrap_or("{}");

            if !is_valid_function_name(&name) {
                return Err(anyhow!(
                    "The provided function name '{}' had invalid characters, it must match this regex [a-zA-Z0-9_-]+",
                    name
                ));
            }

            let arguments: Value = serde_json::from_str(arguments).map_err(|e| {
                anyhow!(
                    "Could not interpret tool use parameters for id {}: {}",
                    id,
                    e
                )
            })?;
            tool_calls.push(ToolCall::new(id, name, arguments));
        }
    }

    Ok(ModelResponse {
        content,
        tool_calls,
    })
}

fn function_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[^a-zA-Z0-9_-]").expect("static regex is valid"))
}

fn sanitize_function_name(name: &str) -> String {
    function_name_pattern().replace_all(name, "_").to_string()
}

fn is_valid_function_name(name: &str) -> bool {
    !name.is_empty() && !function_name_pattern().is_match(name)
}

#[derive(Debug, thiserror::Error)]
#[error("Context length exceeded. Message: {0}")]
pub struct ContextLengthExceededError(String);

pub fn check_openai_context_length_error(error: &Value) -> Option<ContextLengthExceededError> {
    let code = error.get("code")?;
    if code == "context_length_exceeded" || code == "string_above_max_length" {
        let message = error
            .get("message")
            .and_then(|m| m.as_str())
            .unwrap_or("Unknown error")
            .to_string();
        Some(ContextLengthExceededError(message))
    } else {
        None
    }
}
