//! Pair-safe chat history truncation for LLM agents.
//!
//! `chat-trim` keeps a growing conversation within a bounded message count
//! so the next model call fits its context window. The core abstraction is
//! the [`TruncationReducer`](reducer::TruncationReducer): it holds a
//! [`ReducerConfig`](reducer::ReducerConfig) and a history, and on each
//! [`reduce()`](reducer::TruncationReducer::reduce) drops the oldest messages
//! down to the configured tail, never separating an assistant tool call from
//! the tool message that answers it.
//!
//! # Getting started
//!
//! ```
//! use chat_trim::prelude::*;
//!
//! let config = ReducerConfig::new(5, 2).unwrap();
//! let mut reducer = TruncationReducer::new(config);
//! for i in 0..12 {
//!     reducer.push_message(Message::user(format!("turn {i}")));
//! }
//!
//! // 12 > 5 + 2, so the history is cut back to the last 5 messages.
//! assert_eq!(
//!     reducer.reduce(),
//!     ReduceOutcome::Reduced { removed: 7, retained: 5 }
//! );
//! assert_eq!(reducer.messages()[0].content.as_deref(), Some("turn 7"));
//!
//! // Nothing new since the last cut.
//! assert_eq!(reducer.reduce(), ReduceOutcome::Unchanged);
//! ```
//!
//! # Where to find things
//!
//! - **Decide where to cut:** [`reducer::evaluate`] returns the cut index (or
//!   `None`) for a message slice and a config. [`reducer::extract_range`]
//!   slices the retained tail.
//! - **Understand pairing:** [`reducer::pairing`] maps every tool call to its
//!   result and answers "is this index a safe cut?".
//! - **Hold a history:** implement [`HistoryContainer`](history::HistoryContainer),
//!   or use [`ChatHistory`](history::ChatHistory) / `Vec<Message>`. For
//!   histories read from other threads or tasks, use
//!   [`SharedHistory`](history::SharedHistory), which swaps the message list
//!   under a single lock.
//! - **Tune the policy:** [`ReducerConfig`](reducer::ReducerConfig) builder
//!   methods set the slack threshold, search direction, user-turn alignment,
//!   system-prompt pinning, and auto-reduce on push.

pub mod history;
pub mod prelude;
pub mod reducer;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

// ── Schema generation ──────────────────────────────────────────────

/// Generate a JSON Schema `serde_json::Value` from a type that implements
/// `schemars::JsonSchema`. Used to publish the reducer config file format.
///
/// # Example
///
/// ```
/// use chat_trim::json_schema_for;
/// use chat_trim::reducer::ReducerConfig;
///
/// let schema = json_schema_for::<ReducerConfig>();
/// assert_eq!(schema["type"], "object");
/// assert!(schema["required"].as_array().unwrap().contains(&"target_count".into()));
/// ```
pub fn json_schema_for<T: JsonSchema>() -> serde_json::Value {
    let schema = schemars::schema_for!(T);
    serde_json::to_value(schema)
        .unwrap_or_else(|_| serde_json::json!({"type": "object", "properties": {}}))
}

// ── Message types ──────────────────────────────────────────────────

/// Role of a message in the conversation.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
    Tool,
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MessageRole::System => write!(f, "system"),
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "assistant"),
            MessageRole::Tool => write!(f, "tool"),
        }
    }
}

/// A message in the conversation.
///
/// Pairing lives in two fields: an assistant message lists the calls it
/// makes in `tool_calls`, and each tool message names the call it answers
/// in `tool_call_id`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Message {
    pub role: MessageRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: Some(content.into()),
            tool_calls: None,
            tool_call_id: None,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: Some(content.into()),
            tool_calls: None,
            tool_call_id: None,
        }
    }

    pub fn assistant_text(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: Some(content.into()),
            tool_calls: None,
            tool_call_id: None,
        }
    }

    pub fn assistant_tool_calls(calls: Vec<ToolCall>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: None,
            tool_calls: Some(calls),
            tool_call_id: None,
        }
    }

    pub fn tool_result(call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Tool,
            content: Some(content.into()),
            tool_calls: None,
            tool_call_id: Some(call_id.into()),
        }
    }

    pub fn is_system(&self) -> bool {
        self.role == MessageRole::System
    }

    pub fn is_user(&self) -> bool {
        self.role == MessageRole::User
    }

    /// Ids of the tool calls this message opens. Empty for anything but an
    /// assistant message with `tool_calls`.
    pub fn tool_call_ids(&self) -> impl Iterator<Item = &str> {
        self.tool_calls
            .iter()
            .flatten()
            .map(|call| call.id.as_str())
    }

    /// Whether this message takes part in any call/result pairing.
    pub fn has_pairing(&self) -> bool {
        self.tool_call_id.is_some() || self.tool_calls.as_ref().is_some_and(|c| !c.is_empty())
    }
}

// ── Tool call types ────────────────────────────────────────────────

/// The type of a tool call. Currently always `Function`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub enum CallType {
    #[serde(rename = "function")]
    Function,
}

/// A tool call requested by the model.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ToolCall {
    pub id: String,
    #[serde(rename = "type")]
    pub call_type: CallType,
    pub function: FunctionCallData,
}

impl ToolCall {
    /// Create a function call with the given id, name and raw JSON arguments.
    pub fn function(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            call_type: CallType::Function,
            function: FunctionCallData {
                name: name.into(),
                arguments: arguments.into(),
            },
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct FunctionCallData {
    pub name: String,
    pub arguments: String,
}
