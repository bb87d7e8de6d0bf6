use serde::{Deserialize, Serialize};

use super::content::{ContentPart, Direction};
use super::tool::ToolCall;
use crate::error::{LlmError, Result};

/// Role of a message author
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

impl Role {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::Tool => "tool",
        }
    }

    /// Assistant content is output, everything else is input
    pub const fn direction(self) -> Direction {
        match self {
            Self::Assistant => Direction::Output,
            Self::System | Self::User | Self::Tool => Direction::Input,
        }
    }

    pub(crate) fn parse(value: &str) -> Result<Self> {
        match value {
            "system" | "developer" => Ok(Self::System),
            "user" => Ok(Self::User),
            "assistant" => Ok(Self::Assistant),
            "tool" => Ok(Self::Tool),
            other => Err(LlmError::Decode(format!("unknown role '{other}'"))),
        }
    }
}

/// One conversation turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: Vec<ContentPart>,
}

impl Message {
    pub const fn new(role: Role, content: Vec<ContentPart>) -> Self {
        Self { role, content }
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self::new(Role::System, vec![ContentPart::text(text)])
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, vec![ContentPart::text(text)])
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Role::Assistant, vec![ContentPart::text(text)])
    }

    /// Tool-role message answering one tool call
    pub fn tool_result(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(Role::Tool, vec![ContentPart::tool_call_result(tool_call_id, content)])
    }

    /// Tool-role message carrying calls requested by the model
    pub fn tool_calls(calls: impl IntoIterator<Item = ToolCall>) -> Self {
        Self::new(Role::Tool, calls.into_iter().map(ContentPart::ToolCall).collect())
    }

    pub const fn is_system(&self) -> bool {
        matches!(self.role, Role::System)
    }

    /// Whether the content is made of tool call results only
    pub fn is_tool(&self) -> bool {
        !self.content.is_empty()
            && self
                .content
                .iter()
                .all(|part| matches!(part, ContentPart::ToolCallResult { .. }))
    }

    pub const fn direction(&self) -> Direction {
        self.role.direction()
    }

    /// Concatenated text parts
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|part| match part {
                ContentPart::Text { value } => Some(value.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Reasoning summaries joined by newlines, if any
    pub fn thinking(&self) -> Option<String> {
        let summaries: Vec<&str> = self
            .content
            .iter()
            .filter_map(|part| match part {
                ContentPart::Thinking { value } => Some(value.as_str()),
                _ => None,
            })
            .collect();

        (!summaries.is_empty()).then(|| summaries.join("\n"))
    }

    pub fn tool_call_list(&self) -> impl Iterator<Item = &ToolCall> {
        self.content.iter().filter_map(|part| match part {
            ContentPart::ToolCall(call) => Some(call),
            _ => None,
        })
    }

    /// Check the role/content rules for a message about to be sent
    ///
    /// A tool-role message carries exactly one tool call result or only
    /// tool calls. Tool call results never appear under another role and
    /// system messages are text only.
    pub fn validate_outbound(&self) -> Result<()> {
        let results = self
            .content
            .iter()
            .filter(|part| matches!(part, ContentPart::ToolCallResult { .. }))
            .count();

        match self.role {
            Role::Tool => {
                let only_calls = !self.content.is_empty()
                    && self.content.iter().all(|part| matches!(part, ContentPart::ToolCall(_)));
                if (results == 1 && self.content.len() == 1) || only_calls {
                    Ok(())
                } else {
                    Err(LlmError::InvalidMessage(format!(
                        "tool message must carry exactly one tool call result or only tool calls, got {} parts",
                        self.content.len()
                    )))
                }
            }
            Role::System if self.content.iter().any(|part| !matches!(part, ContentPart::Text { .. })) => Err(
                LlmError::InvalidMessage("system messages may only contain text".to_owned()),
            ),
            role if results > 0 => Err(LlmError::InvalidMessage(format!(
                "{} message cannot carry tool call results",
                role.as_str()
            ))),
            _ => Ok(()),
        }
    }
}
