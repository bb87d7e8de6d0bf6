use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::message::Message;
use super::tool::ToolCall;

/// Token counts reported by the vendor; missing fields count as zero
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
}

/// Why the model stopped generating
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FinishReason {
    Stop,
    Length,
    ToolCalls,
    ContentFilter,
    Other(String),
}

impl FinishReason {
    /// Map a chat `finish_reason` or a responses status/incomplete reason
    pub fn from_wire(value: &str) -> Self {
        match value {
            "stop" | "completed" => Self::Stop,
            "length" | "max_output_tokens" | "max_tokens" => Self::Length,
            "tool_calls" | "function_call" => Self::ToolCalls,
            "content_filter" => Self::ContentFilter,
            other => Self::Other(other.to_owned()),
        }
    }
}

/// One candidate answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub index: usize,
    pub message: Message,
    pub finish_reason: Option<FinishReason>,
}

/// Normalized vendor response
#[derive(Debug, Clone)]
pub struct Response {
    /// Wire JSON the response was assembled from
    pub raw: Value,
    pub choices: Vec<Choice>,
    pub usage: Usage,
}

impl Response {
    pub fn messages(&self) -> impl Iterator<Item = &Message> {
        self.choices.iter().map(|choice| &choice.message)
    }

    /// Text of every message that has any, joined by newlines
    pub fn text(&self) -> String {
        self.messages()
            .map(Message::text)
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Reasoning summaries across all messages
    pub fn thinking(&self) -> Option<String> {
        let summaries: Vec<String> = self.messages().filter_map(Message::thinking).collect();
        (!summaries.is_empty()).then(|| summaries.join("\n"))
    }

    pub fn tool_calls(&self) -> Vec<&ToolCall> {
        self.messages().flat_map(Message::tool_call_list).collect()
    }

    pub fn has_tool_calls(&self) -> bool {
        self.messages().any(|message| message.tool_call_list().next().is_some())
    }

    /// Finish reason of the last choice that reports one
    pub fn finish_reason(&self) -> Option<&FinishReason> {
        self.choices.iter().rev().find_map(|choice| choice.finish_reason.as_ref())
    }
}
