use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::objectid::create_object_id;
use super::tool::ToolCall;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Result,
}

/// The role specific payload of a message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum MessageKind {
    System {
        content: String,
    },
    User {
        content: String,
    },
    Assistant {
        content: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        tool_calls: Vec<ToolCall>,
    },
    Result {
        tool_call_id: String,
        result: Value,
    },
}

/// One turn in a conversation.
///
/// Every constructor assigns a fresh id. Fields are public for reading and
/// pattern matching, but once a message is in a `History` there is no way to
/// get a mutable reference back to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub created: i64,
    #[serde(flatten)]
    pub kind: MessageKind,
}

impl Message {
    fn new(kind: MessageKind) -> Self {
        Message {
            id: create_object_id("msg"),
            created: Utc::now().timestamp(),
            kind,
        }
    }

    pub fn system<S: Into<String>>(content: S) -> Self {
        Self::new(MessageKind::System {
            content: content.into(),
        })
    }

    pub fn user<S: Into<String>>(content: S) -> Self {
        Self::new(MessageKind::User {
            content: content.into(),
        })
    }

    /// An assistant turn, with the tool calls the model asked for (if any)
    pub fn assistant<S: Into<String>>(content: S, tool_calls: Vec<ToolCall>) -> Self {
        Self::new(MessageKind::Assistant {
            content: content.into(),
            tool_calls,
        })
    }

    pub fn result<S: Into<String>>(tool_call_id: S, result: Value) -> Self {
        Self::new(MessageKind::Result {
            tool_call_id: tool_call_id.into(),
            result,
        })
    }

    pub fn role(&self) -> Role {
        match self.kind {
            MessageKind::System { .. } => Role::System,
            MessageKind::User { .. } => Role::User,
            MessageKind::Assistant { .. } => Role::Assistant,
            MessageKind::Result { .. } => Role::Result,
        }
    }

    /// The text of the message, if this role carries any
    pub fn text(&self) -> Option<&str> {
        match &self.kind {
            MessageKind::System { content }
            | MessageKind::User { content }
            | MessageKind::Assistant { content, .. } => Some(content),
            MessageKind::Result { .. } => None,
        }
    }

    /// Tool calls requested by an assistant message; empty for every other role
    pub fn tool_calls(&self) -> &[ToolCall] {
        match &self.kind {
            MessageKind::Assistant { tool_calls, .. } => tool_calls,
            _ => &[],
        }
    }

    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls().is_empty()
    }

    /// The `(tool_call_id, result)` pair if this is a result message
    pub fn as_result(&self) -> Option<(&str, &Value)> {
        match &self.kind {
            MessageKind::Result {
                tool_call_id,
                result,
            } => Some((tool_call_id, result)),
            _ => None,
        }
    }
}
