//! Request payload construction
//!
//! Pure: the same prompt, model and options always produce the same body.

mod capabilities;
mod options;

pub use capabilities::{Capabilities, CapabilityTable, models};
pub use options::{ChatOptions, Format, ReasoningEffort, Schema, Thinking, Verbosity};

use parley_config::WireFormat;
use serde_json::{Map, Value, json};

use crate::error::{LlmError, Result};
use crate::serialize::Context;
use crate::types::Prompt;

/// Builds wire request bodies for one serialization context
#[derive(Debug, Clone, Copy)]
pub struct PayloadBuilder<'a> {
    context: &'a Context,
    capabilities: &'a CapabilityTable,
    defaults: &'a Map<String, Value>,
}

impl<'a> PayloadBuilder<'a> {
    pub const fn new(context: &'a Context, capabilities: &'a CapabilityTable, defaults: &'a Map<String, Value>) -> Self {
        Self {
            context,
            capabilities,
            defaults,
        }
    }

    /// Build the request body
    ///
    /// Configured defaults are overridden by computed fields, which are
    /// overridden by `options.extra`. Null values are removed last, at the
    /// top level and inside nested objects.
    ///
    /// # Errors
    ///
    /// `InvalidOption` for out-of-set effort or verbosity values,
    /// `InvalidFormat` for a schema that does not serialize to an object,
    /// `InvalidMessage`/`UnsupportedContent`/`UnknownKind` from message
    /// serialization
    pub fn build(&self, prompt: &Prompt, model: &str, options: &ChatOptions) -> Result<Value> {
        let capabilities = self.capabilities.lookup(model);
        let mut computed = Map::new();
        computed.insert("model".to_owned(), json!(model));

        match self.context.format() {
            WireFormat::Responses => self.responses_fields(prompt, options, capabilities, &mut computed)?,
            WireFormat::ChatCompletions => self.chat_fields(prompt, options, capabilities, &mut computed)?,
        }

        if let Some(temperature) = options.temperature
            && capabilities.temperature
        {
            computed.insert("temperature".to_owned(), json!(temperature));
        }
        if !options.tools.is_empty() {
            let tools = options.tools.iter().map(|tool| self.context.serialize_tool(tool)).collect();
            computed.insert("tools".to_owned(), Value::Array(tools));
        }
        if options.stream {
            computed.insert("stream".to_owned(), Value::Bool(true));
        }

        let mut payload = self.defaults.clone();
        payload.extend(computed);
        payload.extend(options.extra.clone());
        strip_nulls(&mut payload);

        Ok(Value::Object(payload))
    }

    fn responses_fields(
        &self,
        prompt: &Prompt,
        options: &ChatOptions,
        capabilities: Capabilities,
        out: &mut Map<String, Value>,
    ) -> Result<()> {
        for message in prompt.messages().iter().filter(|message| message.is_system()) {
            message.validate_outbound()?;
        }
        if let Some(instructions) = prompt.instructions() {
            out.insert("instructions".to_owned(), Value::String(instructions));
        }

        let mut input = Vec::with_capacity(prompt.len());
        for message in prompt.conversation() {
            input.extend(self.context.serialize_message(message)?);
        }
        out.insert("input".to_owned(), Value::Array(input));

        if capabilities.reasoning
            && let Some(reasoning) = reasoning_object(options)?
        {
            out.insert("reasoning".to_owned(), Value::Object(reasoning));
        }

        let mut text = match &options.text {
            Some(text) => {
                validate_effort_like(text, "verbosity", "text.verbosity", Verbosity::parse_field)?;
                text.clone()
            }
            None => Map::new(),
        };
        if let Some(verbosity) = options.verbosity {
            text.entry("verbosity").or_insert_with(|| json!(verbosity.as_str()));
        }
        if let Some(format) = options.format.as_ref()
            && let Some(format) = responses_format(format)?
        {
            text.insert("format".to_owned(), format);
        }
        if !text.is_empty() {
            out.insert("text".to_owned(), Value::Object(text));
        }

        Ok(())
    }

    fn chat_fields(
        &self,
        prompt: &Prompt,
        options: &ChatOptions,
        capabilities: Capabilities,
        out: &mut Map<String, Value>,
    ) -> Result<()> {
        let mut messages = Vec::with_capacity(prompt.len());
        for message in prompt.messages() {
            messages.extend(self.context.serialize_message(message)?);
        }
        out.insert("messages".to_owned(), Value::Array(messages));

        if capabilities.reasoning
            && let Some(effort) = reasoning_object(options)?.and_then(|mut reasoning| reasoning.remove("effort"))
        {
            out.insert("reasoning_effort".to_owned(), effort);
        }

        let verbosity = match &options.text {
            Some(text) => {
                validate_effort_like(text, "verbosity", "text.verbosity", Verbosity::parse_field)?;
                text.get("verbosity").cloned()
            }
            None => None,
        };
        if let Some(verbosity) = verbosity.or_else(|| options.verbosity.map(|v| json!(v.as_str()))) {
            out.insert("verbosity".to_owned(), verbosity);
        }

        if let Some(format) = options.format.as_ref()
            && let Some(format) = chat_format(format)?
        {
            out.insert("response_format".to_owned(), format);
        }

        // Chunk streams only carry usage when asked for it
        if options.stream {
            out.insert("stream_options".to_owned(), json!({ "include_usage": true }));
        }

        Ok(())
    }
}

/// Remove null members from `map` and from every object nested in it
///
/// Arrays are not descended into, so message content and tool schemas
/// reach the wire exactly as serialized.
fn strip_nulls(map: &mut Map<String, Value>) {
    map.retain(|_, value| !value.is_null());
    for value in map.values_mut() {
        if let Value::Object(nested) = value {
            strip_nulls(nested);
        }
    }
}

/// Native `reasoning` wins over `thinking`; the typed effort fills a missing `effort`
fn reasoning_object(options: &ChatOptions) -> Result<Option<Map<String, Value>>> {
    let mut reasoning = if let Some(native) = &options.reasoning {
        validate_effort_like(native, "effort", "reasoning.effort", ReasoningEffort::parse_field)?;
        Some(native.clone())
    } else {
        match &options.thinking {
            Some(Thinking::Enabled) => Some(Map::from_iter([
                ("effort".to_owned(), json!(ReasoningEffort::High.as_str())),
                ("summary".to_owned(), json!("auto")),
            ])),
            Some(Thinking::Config(config)) => {
                validate_effort_like(config, "effort", "thinking.effort", ReasoningEffort::parse_field)?;
                let mut merged = Map::from_iter([("summary".to_owned(), json!("auto"))]);
                merged.extend(config.clone());
                Some(merged)
            }
            None => None,
        }
    };

    if let Some(effort) = options.reasoning_effort {
        reasoning
            .get_or_insert_with(Map::new)
            .entry("effort")
            .or_insert_with(|| json!(effort.as_str()));
    }

    Ok(reasoning)
}

fn validate_effort_like<T>(
    map: &Map<String, Value>,
    key: &str,
    field: &'static str,
    parse: fn(&str, &'static str) -> Result<T>,
) -> Result<()> {
    match map.get(key) {
        Some(Value::String(value)) => parse(value, field).map(|_| ()),
        Some(Value::Null) | None => Ok(()),
        Some(other) => parse(&other.to_string(), field).map(|_| ()),
    }
}

fn responses_format(format: &Format) -> Result<Option<Value>> {
    Ok(match format {
        Format::None => None,
        Format::Text => Some(json!({ "type": "text" })),
        Format::Json => Some(json!({ "type": "json_object" })),
        Format::Schema(schema) => {
            let mut wire = schema_object(schema)?;
            wire.insert("type".to_owned(), json!("json_schema"));
            wire.insert("strict".to_owned(), Value::Bool(true));
            Some(Value::Object(wire))
        }
    })
}

fn chat_format(format: &Format) -> Result<Option<Value>> {
    Ok(match format {
        Format::None => None,
        Format::Text => Some(json!({ "type": "text" })),
        Format::Json => Some(json!({ "type": "json_object" })),
        Format::Schema(schema) => {
            let mut json_schema = schema_object(schema)?;
            json_schema.insert("strict".to_owned(), Value::Bool(true));
            Some(json!({ "type": "json_schema", "json_schema": json_schema }))
        }
    })
}

/// Serialized schema; both the fragment and its `schema` member must be objects
fn schema_object(schema: &Schema) -> Result<Map<String, Value>> {
    match schema.serialize() {
        Value::Object(wire) if wire.get("schema").is_some_and(Value::is_object) => Ok(wire),
        other => Err(LlmError::InvalidFormat {
            value: format!("schema '{}' is not a JSON object: {other}", schema.name),
        }),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::types::{ContentPart, Message, Role, ToolCall, ToolSpec};

    fn build(format: WireFormat, prompt: &Prompt, model: &str, options: &ChatOptions) -> Result<Value> {
        build_with_defaults(format, prompt, model, options, &Map::new())
    }

    fn build_with_defaults(
        format: WireFormat,
        prompt: &Prompt,
        model: &str,
        options: &ChatOptions,
        defaults: &Map<String, Value>,
    ) -> Result<Value> {
        PayloadBuilder::new(Context::shared(format), CapabilityTable::builtin(), defaults).build(prompt, model, options)
    }

    fn responses(prompt: &Prompt, model: &str, options: &ChatOptions) -> Value {
        build(WireFormat::Responses, prompt, model, options).unwrap()
    }

    #[test]
    fn basic_prompt_has_only_input_and_model() {
        let payload = responses(&Prompt::from("Tell me a joke!"), models::GPT_4O, &ChatOptions::default());
        assert_eq!(
            payload,
            json!({
                "input": [{"role": "user", "content": [{"type": "input_text", "text": "Tell me a joke!"}]}],
                "model": "gpt-4o",
            })
        );
    }

    #[test]
    fn empty_prompt_builds_empty_input() {
        let payload = responses(&Prompt::new(), models::GPT_4O, &ChatOptions::default());
        assert_eq!(payload, json!({"input": [], "model": "gpt-4o"}));
    }

    #[test]
    fn system_messages_become_instructions_in_order() {
        let prompt = Prompt::new()
            .system("You are a helpful assistant.")
            .user("What is the capital of Canada?")
            .assistant("Ottawa.")
            .system("Answer briefly.")
            .user("And of France?");

        let payload = responses(&prompt, models::GPT_4O, &ChatOptions::default());
        assert_eq!(payload["instructions"], "You are a helpful assistant.\n\nAnswer briefly.");
        assert_eq!(
            payload["input"],
            json!([
                {"role": "user", "content": [{"type": "input_text", "text": "What is the capital of Canada?"}]},
                {"role": "assistant", "content": [{"type": "output_text", "text": "Ottawa."}]},
                {"role": "user", "content": [{"type": "input_text", "text": "And of France?"}]},
            ])
        );
    }

    #[test]
    fn temperature_dropped_for_every_reasoning_model() {
        let options = ChatOptions::default().temperature(2.0);
        for model in models::REASONING_ONLY {
            let payload = responses(&Prompt::from("Pick a number"), model, &options);
            assert!(payload.get("temperature").is_none(), "{model}");

            let payload = build(WireFormat::ChatCompletions, &Prompt::from("Pick a number"), model, &options).unwrap();
            assert!(payload.get("temperature").is_none(), "{model}");
        }
    }

    #[test]
    fn temperature_kept_for_standard_and_unknown_models() {
        let options = ChatOptions::default().temperature(2.0);
        assert_eq!(responses(&Prompt::from("x"), models::GPT_4O_MINI, &options)["temperature"], 2.0);
        assert_eq!(responses(&Prompt::from("x"), "my-local-model", &options)["temperature"], 2.0);
    }

    #[test]
    fn thinking_enabled_maps_to_high_effort() {
        let options = ChatOptions::default().thinking(Thinking::Enabled);
        let payload = responses(&Prompt::from("Tell me a joke!"), models::GPT_5_1, &options);
        assert_eq!(payload["reasoning"], json!({"effort": "high", "summary": "auto"}));
    }

    #[test]
    fn thinking_config_merges_over_summary() {
        let config = Map::from_iter([("effort".to_owned(), json!("low"))]);
        let options = ChatOptions::default().thinking(Thinking::Config(config));
        let payload = responses(&Prompt::from("x"), models::GPT_5_1, &options);
        assert_eq!(payload["reasoning"], json!({"effort": "low", "summary": "auto"}));

        let config = Map::from_iter([("summary".to_owned(), json!("detailed"))]);
        let options = ChatOptions::default().thinking(Thinking::Config(config));
        let payload = responses(&Prompt::from("x"), models::GPT_5_1, &options);
        assert_eq!(payload["reasoning"], json!({"summary": "detailed"}));
    }

    #[test]
    fn native_reasoning_wins_over_thinking() {
        let options = ChatOptions::default()
            .reasoning(Map::from_iter([("effort".to_owned(), json!("medium"))]))
            .thinking(Thinking::Enabled);
        let payload = responses(&Prompt::from("x"), models::GPT_5_1, &options);
        assert_eq!(payload["reasoning"], json!({"effort": "medium"}));
    }

    #[test]
    fn reasoning_dropped_for_models_without_it() {
        let options = ChatOptions::default().thinking(Thinking::Enabled);
        let payload = responses(&Prompt::from("x"), models::GPT_4O, &options);
        assert!(payload.get("reasoning").is_none());
    }

    #[test]
    fn invalid_nested_effort_is_rejected() {
        let options = ChatOptions::default().thinking(Thinking::Config(Map::from_iter([(
            "effort".to_owned(),
            json!("maximum"),
        )])));
        let err = build(WireFormat::Responses, &Prompt::from("x"), models::GPT_5_1, &options).unwrap_err();
        assert!(matches!(err, LlmError::InvalidOption { field: "thinking.effort", .. }));

        let options = ChatOptions::default().text(Map::from_iter([("verbosity".to_owned(), json!("loud"))]));
        let err = build(WireFormat::Responses, &Prompt::from("x"), models::GPT_5_1, &options).unwrap_err();
        assert!(matches!(err, LlmError::InvalidOption { field: "text.verbosity", .. }));
    }

    #[test]
    fn text_option_and_format_share_text_object() {
        let options = ChatOptions::default()
            .text(Map::from_iter([("verbosity".to_owned(), json!("medium"))]))
            .format(Format::Json);
        let payload = responses(&Prompt::from("x"), models::GPT_5_1, &options);
        assert_eq!(payload["text"], json!({"verbosity": "medium", "format": {"type": "json_object"}}));
    }

    #[test]
    fn schema_format_is_strict_json_schema() {
        let schema = Schema::new("person", json!({"type": "object"}));
        let options = ChatOptions::default().format(Format::Schema(schema));

        let payload = responses(&Prompt::from("x"), models::GPT_4O, &options);
        assert_eq!(
            payload["text"]["format"],
            json!({"type": "json_schema", "strict": true, "name": "person", "schema": {"type": "object"}})
        );

        let payload = build(WireFormat::ChatCompletions, &Prompt::from("x"), models::GPT_4O, &options).unwrap();
        assert_eq!(
            payload["response_format"],
            json!({"type": "json_schema", "json_schema": {"name": "person", "schema": {"type": "object"}, "strict": true}})
        );
    }

    #[test]
    fn non_object_schema_is_an_invalid_format() {
        let schema = Schema::new("person", json!("name: string"));
        let options = ChatOptions::default().format(Format::Schema(schema));

        for format in [WireFormat::Responses, WireFormat::ChatCompletions] {
            let err = build(format, &Prompt::from("x"), models::GPT_4O, &options).unwrap_err();
            assert!(matches!(&err, LlmError::InvalidFormat { value } if value.contains("person")), "{err}");
        }
    }

    #[test]
    fn format_none_and_text() {
        let payload = responses(&Prompt::from("x"), models::GPT_4O, &ChatOptions::default().format(Format::None));
        assert!(payload.get("text").is_none());
        let payload = responses(&Prompt::from("x"), models::GPT_4O, &ChatOptions::default().format(Format::Text));
        assert_eq!(payload["text"], json!({"format": {"type": "text"}}));
    }

    #[test]
    fn chat_payload_uses_top_level_controls() {
        let prompt = Prompt::new().system("Be brief.").user("Hi");
        let options = ChatOptions::default()
            .reasoning_effort(ReasoningEffort::Low)
            .verbosity(Verbosity::High)
            .format(Format::Json)
            .stream(true);

        let payload = build(WireFormat::ChatCompletions, &prompt, models::GPT_5, &options).unwrap();
        assert_eq!(
            payload,
            json!({
                "model": "gpt-5",
                "messages": [
                    {"role": "system", "content": [{"type": "text", "text": "Be brief."}]},
                    {"role": "user", "content": [{"type": "text", "text": "Hi"}]},
                ],
                "reasoning_effort": "low",
                "verbosity": "high",
                "response_format": {"type": "json_object"},
                "stream": true,
                "stream_options": {"include_usage": true},
            })
        );
    }

    #[test]
    fn typed_effort_and_verbosity_on_responses() {
        let options = ChatOptions::default()
            .reasoning_effort(ReasoningEffort::None)
            .verbosity(Verbosity::Low);
        let payload = responses(&Prompt::from("x"), models::GPT_5_1, &options);
        assert_eq!(payload["reasoning"], json!({"effort": "none"}));
        assert_eq!(payload["text"], json!({"verbosity": "low"}));
    }

    #[test]
    fn precedence_defaults_computed_extra_and_null_removal() {
        let defaults = Map::from_iter([
            ("store".to_owned(), json!(false)),
            ("model".to_owned(), json!("ignored")),
            ("user".to_owned(), json!("default-user")),
        ]);
        let options = ChatOptions::default()
            .extra("max_output_tokens", json!(64))
            .extra("user", Value::Null)
            .extra("metadata", json!({"trace": "abc"}));

        let payload =
            build_with_defaults(WireFormat::Responses, &Prompt::from("x"), models::GPT_4O, &options, &defaults)
                .unwrap();
        assert_eq!(payload["store"], false);
        assert_eq!(payload["model"], "gpt-4o");
        assert_eq!(payload["max_output_tokens"], 64);
        assert_eq!(payload["metadata"], json!({"trace": "abc"}));
        assert!(payload.get("user").is_none());
    }

    #[test]
    fn nulls_inside_nested_objects_are_removed() {
        let options = ChatOptions::default()
            .thinking(Thinking::Config(Map::from_iter([("effort".to_owned(), Value::Null)])))
            .text(Map::from_iter([("verbosity".to_owned(), Value::Null)]))
            .format(Format::Json)
            .extra("metadata", json!({"trace": "abc", "run": null, "tags": {"team": null}}));

        let payload = responses(&Prompt::from("x"), models::GPT_5_1, &options);
        assert_eq!(payload["reasoning"], json!({"summary": "auto"}));
        assert_eq!(payload["text"], json!({"format": {"type": "json_object"}}));
        assert_eq!(payload["metadata"], json!({"trace": "abc", "tags": {}}));

        let options = ChatOptions::default().reasoning(Map::from_iter([("effort".to_owned(), Value::Null)]));
        let payload = build(WireFormat::ChatCompletions, &Prompt::from("x"), models::GPT_5_1, &options).unwrap();
        assert!(payload.get("reasoning_effort").is_none());
    }

    #[test]
    fn arrays_keep_their_null_entries() {
        let options = ChatOptions::default().extra("stop", json!(["\n", null]));
        let payload = responses(&Prompt::from("x"), models::GPT_4O, &options);
        assert_eq!(payload["stop"], json!(["\n", null]));
    }

    #[test]
    fn stream_options_only_on_streaming_chat_completions() {
        let options = ChatOptions::default().stream(true);
        let payload = responses(&Prompt::from("x"), models::GPT_4O, &options);
        assert_eq!(payload["stream"], true);
        assert!(payload.get("stream_options").is_none());

        let payload = build(WireFormat::ChatCompletions, &Prompt::from("x"), models::GPT_4O, &ChatOptions::default())
            .unwrap();
        assert!(payload.get("stream_options").is_none());
    }

    #[test]
    fn tools_serialize_through_context() {
        let options = ChatOptions::default().tool(ToolSpec::new("weather", json!({"type": "object"})));
        let payload = responses(&Prompt::from("x"), models::GPT_4O, &options);
        assert_eq!(payload["tools"][0]["name"], "weather");
        assert_eq!(payload["tools"][0]["strict"], true);
    }

    #[test]
    fn responses_includes_thinking_and_tool_round_in_order() {
        let prompt = Prompt::new()
            .user("Weather?")
            .message(Message::new(Role::Assistant, vec![ContentPart::thinking("need tool")]))
            .message(Message::tool_calls([ToolCall::new("call_1", "weather", "{}")]))
            .message(Message::tool_result("call_1", "\"sunny\""));

        let payload = responses(&prompt, models::GPT_5, &ChatOptions::default());
        let kinds: Vec<_> = payload["input"]
            .as_array()
            .unwrap()
            .iter()
            .map(|item| item.get("type").or_else(|| item.get("role")).unwrap().clone())
            .collect();
        assert_eq!(kinds, [json!("user"), json!("reasoning"), json!("function_call"), json!("function_call_output")]);

        let chat = build(WireFormat::ChatCompletions, &prompt, models::GPT_5, &ChatOptions::default()).unwrap();
        assert_eq!(chat["messages"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn invalid_message_fails_build() {
        let prompt = Prompt::from(vec![Message::new(Role::User, vec![ContentPart::tool_call_result("a", "1")])]);
        let err = build(WireFormat::Responses, &prompt, models::GPT_4O, &ChatOptions::default()).unwrap_err();
        assert!(matches!(err, LlmError::InvalidMessage(_)));
    }
}
