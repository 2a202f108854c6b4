use serde::Serialize;
use std::collections::VecDeque;
use thiserror::Error;

use super::message::{Message, MessageKind};

/// A break in the assistant/result correlation of a history
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CorrelationError {
    #[error("Result message {message_id} does not follow an assistant message with tool calls")]
    Orphaned { message_id: String },

    #[error("Result message {message_id} answers '{found}' but the next pending tool call is '{expected}'")]
    OutOfOrder {
        message_id: String,
        expected: String,
        found: String,
    },
}

/// The ordered, append-only record of a conversation.
///
/// Only appends are exposed. Nothing can be removed, reordered or edited in
/// place; corrections are made by appending new messages.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct History {
    messages: Vec<Message>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn extend<I: IntoIterator<Item = Message>>(&mut self, messages: I) {
        self.messages.extend(messages);
    }

    /// The full ordered sequence, as handed to a model backend
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Message> {
        self.messages.iter()
    }

    /// Verify every result message answers, in order, a tool call issued by
    /// the closest preceding assistant message.
    ///
    /// A batch may be left partially answered: that is what history looks like
    /// after an exchange aborted half way through its tool calls.
    pub fn check_tool_correlation(&self) -> Result<(), CorrelationError> {
        let mut pending: Option<VecDeque<&str>> = None;

        for message in &self.messages {
            match &message.kind {
                MessageKind::Assistant { tool_calls, .. } => {
                    pending = Some(tool_calls.iter().map(|call| call.id.as_str()).collect());
                }
                MessageKind::Result { tool_call_id, .. } => {
                    let queue = pending.as_mut().ok_or_else(|| CorrelationError::Orphaned {
                        message_id: message.id.clone(),
                    })?;
                    match queue.pop_front() {
                        Some(expected) if expected == tool_call_id => {}
                        Some(expected) => {
                            return Err(CorrelationError::OutOfOrder {
                                message_id: message.id.clone(),
                                expected: expected.to_string(),
                                found: tool_call_id.clone(),
                            })
                        }
                        None => {
                            return Err(CorrelationError::Orphaned {
                                message_id: message.id.clone(),
                            })
                        }
                    }
                }
                MessageKind::System { .. } | MessageKind::User { .. } => pending = None,
            }
        }

        Ok(())
    }
}

impl<'a> IntoIterator for &'a History {
    type Item = &'a Message;
    type IntoIter = std::slice::Iter<'a, Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.iter()
    }
}

impl From<Vec<Message>> for History {
    fn from(messages: Vec<Message>) -> Self {
        Self { messages }
    }
}
