//! Wire-format registry
//!
//! A [`Context`] maps each [`ContentKind`] to a serialize/deserialize pair
//! and carries the structural codecs (messages, choices, usage, tools) for
//! one wire format. Swapping the context is the only difference between the
//! responses and chat-completions code paths.

mod chat_completions;
mod responses;

use std::collections::HashMap;
use std::sync::OnceLock;

use parley_config::WireFormat;
use serde_json::Value;

use crate::error::{LlmError, Result};
use crate::types::{Choice, ContentKind, ContentPart, Direction, Message, ToolSpec, Usage};

/// Encode one part for the given direction
pub type SerializePart = fn(&ContentPart, Direction) -> Result<Value>;

/// Decode one wire fragment already classified as this codec's kind
pub type DeserializePart = fn(&Value) -> Result<ContentPart>;

/// Serialize/deserialize pair registered for a content kind
#[derive(Debug, Clone, Copy)]
pub struct PartCodec {
    pub serialize: SerializePart,
    pub deserialize: DeserializePart,
}

/// Whether thinking parts are sent back to the vendor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThinkingPolicy {
    Include,
    Exclude,
}

#[derive(Debug, Clone, Copy)]
struct Structure {
    classify: fn(&Value) -> Option<ContentKind>,
    message: fn(&Message, &Context) -> Result<Vec<Value>>,
    choices: fn(&Value, &Context) -> Result<Vec<Choice>>,
    usage: fn(&Value) -> Usage,
    tool: fn(&ToolSpec) -> Value,
}

/// Codec registry for one wire format
#[derive(Debug, Clone)]
pub struct Context {
    format: WireFormat,
    thinking: ThinkingPolicy,
    parts: HashMap<ContentKind, PartCodec>,
    structure: Structure,
}

impl Context {
    /// Context for the `/v1/responses` endpoint
    pub fn responses() -> Self {
        let mut context = Self::empty(WireFormat::Responses, ThinkingPolicy::Include, responses::STRUCTURE);
        for (kind, codec) in responses::PARTS {
            context.register(*kind, *codec);
        }
        context
    }

    /// Context for the `/v1/chat/completions` endpoint
    pub fn chat_completions() -> Self {
        let mut context = Self::empty(
            WireFormat::ChatCompletions,
            ThinkingPolicy::Exclude,
            chat_completions::STRUCTURE,
        );
        for (kind, codec) in chat_completions::PARTS {
            context.register(*kind, *codec);
        }
        context
    }

    /// Context for a format with no part codecs registered
    pub fn bare(format: WireFormat) -> Self {
        match format {
            WireFormat::Responses => Self::empty(format, ThinkingPolicy::Include, responses::STRUCTURE),
            WireFormat::ChatCompletions => {
                Self::empty(format, ThinkingPolicy::Exclude, chat_completions::STRUCTURE)
            }
        }
    }

    /// Process-wide default context for a format, built on first use
    pub fn shared(format: WireFormat) -> &'static Self {
        static RESPONSES: OnceLock<Context> = OnceLock::new();
        static CHAT_COMPLETIONS: OnceLock<Context> = OnceLock::new();

        match format {
            WireFormat::Responses => RESPONSES.get_or_init(Self::responses),
            WireFormat::ChatCompletions => CHAT_COMPLETIONS.get_or_init(Self::chat_completions),
        }
    }

    fn empty(format: WireFormat, thinking: ThinkingPolicy, structure: Structure) -> Self {
        Self {
            format,
            thinking,
            parts: HashMap::new(),
            structure,
        }
    }

    /// Insert or replace the codec for a kind, returning the previous one
    pub fn register(&mut self, kind: ContentKind, codec: PartCodec) -> Option<PartCodec> {
        self.parts.insert(kind, codec)
    }

    #[must_use]
    pub fn with_thinking(mut self, policy: ThinkingPolicy) -> Self {
        self.thinking = policy;
        self
    }

    pub const fn format(&self) -> WireFormat {
        self.format
    }

    pub const fn thinking(&self) -> ThinkingPolicy {
        self.thinking
    }

    pub(crate) fn includes_thinking(&self) -> bool {
        self.thinking == ThinkingPolicy::Include
    }

    fn codec(&self, kind: ContentKind) -> Result<&PartCodec> {
        self.parts.get(&kind).ok_or_else(|| LlmError::UnknownKind {
            kind: kind.to_string(),
        })
    }

    /// Encode a part through the codec registered for its kind
    pub fn serialize_part(&self, part: &ContentPart, direction: Direction) -> Result<Value> {
        (self.codec(part.kind())?.serialize)(part, direction)
    }

    /// Decode a fragment as a specific kind
    pub fn deserialize_kind(&self, kind: ContentKind, data: &Value) -> Result<ContentPart> {
        (self.codec(kind)?.deserialize)(data)
    }

    /// Decode a fragment by its wire tag; unrecognized tags yield `None`
    pub fn deserialize_part(&self, data: &Value) -> Result<Option<ContentPart>> {
        match (self.structure.classify)(data) {
            Some(kind) => self.deserialize_kind(kind, data).map(Some),
            None => Ok(None),
        }
    }

    /// Encode a message into one or more wire items
    pub fn serialize_message(&self, message: &Message) -> Result<Vec<Value>> {
        message.validate_outbound()?;
        (self.structure.message)(message, self)
    }

    /// Decode the choice list of a final response body
    pub fn deserialize_choices(&self, body: &Value) -> Result<Vec<Choice>> {
        (self.structure.choices)(body, self)
    }

    pub fn deserialize_usage(&self, usage: &Value) -> Usage {
        (self.structure.usage)(usage)
    }

    pub fn serialize_tool(&self, tool: &ToolSpec) -> Value {
        (self.structure.tool)(tool)
    }
}

/// Required string field of a wire fragment
pub(crate) fn str_field<'a>(data: &'a Value, key: &str) -> Result<&'a str> {
    data.get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| LlmError::Decode(format!("missing string field '{key}' in {data}")))
}

/// Field that is either a string or arbitrary JSON to be re-encoded
pub(crate) fn text_field(data: &Value, key: &str) -> String {
    match data.get(key) {
        Some(Value::String(value)) => value.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

pub(crate) fn usage_count(usage: &Value, key: &str) -> u64 {
    usage.get(key).and_then(Value::as_u64).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::types::ToolCall;

    fn sample_parts() -> Vec<ContentPart> {
        vec![
            ContentPart::text("Hello"),
            ContentPart::thinking("Considering the question"),
            ContentPart::ToolCall(ToolCall::new("call_1", "weather", r#"{"city":"Ottawa"}"#)),
            ContentPart::tool_call_result("call_1", r#"{"temp":21}"#),
            ContentPart::file("report.pdf", b"%PDF-1.7"),
            ContentPart::file("cat.png", b"\x89PNG"),
            ContentPart::url("https://localhost/cat.jpg"),
            ContentPart::url("https://localhost/report.pdf"),
        ]
    }

    #[test]
    fn responses_parts_round_trip_in_both_directions() {
        let context = Context::responses();
        for direction in [Direction::Input, Direction::Output] {
            for part in sample_parts() {
                let wire = context.serialize_part(&part, direction).unwrap();
                assert_eq!(context.deserialize_part(&wire).unwrap(), Some(part), "{wire}");
            }
        }
    }

    #[test]
    fn chat_parts_round_trip_except_thinking() {
        let context = Context::chat_completions();
        for direction in [Direction::Input, Direction::Output] {
            for part in sample_parts() {
                let supported = !matches!(part, ContentPart::Thinking { .. })
                    && !(matches!(part, ContentPart::Url { .. }) && !part.is_image());
                if !supported {
                    continue;
                }
                let wire = context.serialize_part(&part, direction).unwrap();
                assert_eq!(context.deserialize_part(&wire).unwrap(), Some(part), "{wire}");
            }
        }
    }

    #[test]
    fn chat_has_no_thinking_codec() {
        let err = Context::chat_completions()
            .serialize_part(&ContentPart::thinking("x"), Direction::Output)
            .unwrap_err();
        assert!(matches!(err, LlmError::UnknownKind { kind } if kind == "thinking"));
    }

    #[test]
    fn bare_context_reports_unknown_kind() {
        let context = Context::bare(WireFormat::Responses);
        let err = context.serialize_part(&ContentPart::text("x"), Direction::Input).unwrap_err();
        assert!(matches!(err, LlmError::UnknownKind { kind } if kind == "text"));

        let err = context
            .deserialize_kind(ContentKind::ToolCall, &json!({"type": "function_call"}))
            .unwrap_err();
        assert!(matches!(err, LlmError::UnknownKind { kind } if kind == "tool_call"));
    }

    #[test]
    fn register_overwrites_existing_codec() {
        fn shout(part: &ContentPart, _: Direction) -> Result<Value> {
            match part {
                ContentPart::Text { value } => Ok(json!({"type": "input_text", "text": value.to_uppercase()})),
                _ => Err(LlmError::UnsupportedContent("text only".to_owned())),
            }
        }

        let mut context = Context::responses();
        let previous = context.register(
            ContentKind::Text,
            PartCodec {
                serialize: shout,
                deserialize: |data| Ok(ContentPart::text(str_field(data, "text")?)),
            },
        );
        assert!(previous.is_some());

        let wire = context.serialize_part(&ContentPart::text("hi"), Direction::Input).unwrap();
        assert_eq!(wire, json!({"type": "input_text", "text": "HI"}));
    }

    #[test]
    fn unknown_part_tags_are_dropped() {
        let context = Context::responses();
        assert_eq!(context.deserialize_part(&json!({"type": "refusal", "refusal": "no"})).unwrap(), None);
        assert_eq!(Context::chat_completions().deserialize_part(&json!({"type": "input_audio"})).unwrap(), None);
    }

    #[test]
    fn shared_contexts_match_format() {
        assert_eq!(Context::shared(WireFormat::Responses).format(), WireFormat::Responses);
        assert_eq!(
            Context::shared(WireFormat::ChatCompletions).thinking(),
            ThinkingPolicy::Exclude
        );
    }
}
