use serde_json::{Map, Value, json};

use super::{Context, PartCodec, Structure, str_field, text_field, usage_count};
use crate::error::{LlmError, Result};
use crate::types::{
    Choice, ContentKind, ContentPart, Direction, FinishReason, Message, Role, ToolCall, ToolSpec, Usage,
};
use crate::types::content::{guess_mime, parse_data_uri};

pub(super) const PARTS: &[(ContentKind, PartCodec)] = &[
    (
        ContentKind::Text,
        PartCodec {
            serialize: serialize_text,
            deserialize: deserialize_text,
        },
    ),
    (
        ContentKind::Thinking,
        PartCodec {
            serialize: serialize_thinking,
            deserialize: deserialize_thinking,
        },
    ),
    (
        ContentKind::ToolCall,
        PartCodec {
            serialize: serialize_tool_call,
            deserialize: deserialize_tool_call,
        },
    ),
    (
        ContentKind::ToolCallResult,
        PartCodec {
            serialize: serialize_tool_call_result,
            deserialize: deserialize_tool_call_result,
        },
    ),
    (
        ContentKind::File,
        PartCodec {
            serialize: serialize_file,
            deserialize: deserialize_file,
        },
    ),
    (
        ContentKind::Url,
        PartCodec {
            serialize: serialize_url,
            deserialize: deserialize_url,
        },
    ),
];

pub(super) const STRUCTURE: Structure = Structure {
    classify,
    message: serialize_message,
    choices: deserialize_choices,
    usage: deserialize_usage,
    tool: serialize_tool,
};

fn classify(data: &Value) -> Option<ContentKind> {
    let tag = data.get("type")?.as_str()?;
    match tag {
        "input_text" | "output_text" => Some(ContentKind::Text),
        "reasoning" => Some(ContentKind::Thinking),
        "function_call" => Some(ContentKind::ToolCall),
        "function_call_output" => Some(ContentKind::ToolCallResult),
        "input_image" | "output_image" | "input_file" | "output_file" => {
            if data.get("image_url").is_some() || data.get("file_url").is_some() {
                Some(ContentKind::Url)
            } else if data.get("image_data").is_some() || data.get("file_data").is_some() {
                Some(ContentKind::File)
            } else {
                None
            }
        }
        _ => None,
    }
}

fn mismatch(expected: ContentKind, part: &ContentPart) -> LlmError {
    LlmError::UnsupportedContent(format!("{expected} codec cannot encode a {} part", part.kind()))
}

fn media_type(part: &ContentPart) -> &'static str {
    if part.is_image() { "image" } else { "file" }
}

fn serialize_text(part: &ContentPart, direction: Direction) -> Result<Value> {
    let ContentPart::Text { value } = part else {
        return Err(mismatch(ContentKind::Text, part));
    };
    Ok(json!({ "type": format!("{}_text", direction.as_str()), "text": value }))
}

fn deserialize_text(data: &Value) -> Result<ContentPart> {
    Ok(ContentPart::text(str_field(data, "text")?))
}

fn serialize_thinking(part: &ContentPart, _: Direction) -> Result<Value> {
    let ContentPart::Thinking { value } = part else {
        return Err(mismatch(ContentKind::Thinking, part));
    };
    Ok(json!({
        "type": "reasoning",
        "summary": [{ "type": "summary_text", "text": value }],
    }))
}

/// Summary may be a string, a list of `summary_text` items, or absent in
/// favour of a `thinking` field
fn deserialize_thinking(data: &Value) -> Result<ContentPart> {
    let value = match data.get("summary") {
        Some(Value::String(summary)) => summary.clone(),
        Some(Value::Array(items)) => items
            .iter()
            .filter(|item| item.get("type").and_then(Value::as_str) == Some("summary_text"))
            .filter_map(|item| item.get("text").and_then(Value::as_str))
            .collect::<Vec<_>>()
            .join("\n"),
        _ => text_field(data, "thinking"),
    };
    Ok(ContentPart::Thinking { value })
}

fn serialize_tool_call(part: &ContentPart, _: Direction) -> Result<Value> {
    let ContentPart::ToolCall(call) = part else {
        return Err(mismatch(ContentKind::ToolCall, part));
    };
    Ok(json!({
        "type": "function_call",
        "call_id": call.id,
        "name": call.name,
        "arguments": call.arguments,
    }))
}

fn deserialize_tool_call(data: &Value) -> Result<ContentPart> {
    let id = data
        .get("call_id")
        .or_else(|| data.get("id"))
        .and_then(Value::as_str)
        .ok_or_else(|| LlmError::Decode(format!("function_call without call_id: {data}")))?;
    Ok(ContentPart::ToolCall(ToolCall::new(
        id,
        str_field(data, "name")?,
        text_field(data, "arguments"),
    )))
}

fn serialize_tool_call_result(part: &ContentPart, _: Direction) -> Result<Value> {
    let ContentPart::ToolCallResult { tool_call_id, content } = part else {
        return Err(mismatch(ContentKind::ToolCallResult, part));
    };
    Ok(json!({ "type": "function_call_output", "call_id": tool_call_id, "output": content }))
}

fn deserialize_tool_call_result(data: &Value) -> Result<ContentPart> {
    Ok(ContentPart::tool_call_result(str_field(data, "call_id")?, text_field(data, "output")))
}

fn serialize_file(part: &ContentPart, direction: Direction) -> Result<Value> {
    let (ContentPart::File { filename, .. }, Some(data_uri)) = (part, part.data_uri()) else {
        return Err(mismatch(ContentKind::File, part));
    };
    let media = media_type(part);
    Ok(json!({
        "type": format!("{}_{media}", direction.as_str()),
        format!("{media}_data"): data_uri,
        "filename": filename,
    }))
}

fn deserialize_file(data: &Value) -> Result<ContentPart> {
    let (payload, fallback) = match data.get("image_data") {
        Some(payload) => (payload, "image/*"),
        None => (data.get("file_data").unwrap_or(&Value::Null), "application/octet-stream"),
    };
    let payload = payload
        .as_str()
        .ok_or_else(|| LlmError::Decode(format!("file part without data: {data}")))?;
    let filename = data.get("filename").and_then(Value::as_str).unwrap_or("file").to_owned();

    let (mime_type, encoded) = match parse_data_uri(payload) {
        Some((mime_type, encoded)) => (mime_type.to_owned(), encoded),
        None => (guess_mime(&filename, fallback), payload),
    };

    Ok(ContentPart::File {
        filename,
        mime_type,
        data: encoded.to_owned(),
    })
}

fn serialize_url(part: &ContentPart, direction: Direction) -> Result<Value> {
    let ContentPart::Url { uri, .. } = part else {
        return Err(mismatch(ContentKind::Url, part));
    };
    let media = media_type(part);
    Ok(json!({
        "type": format!("{}_{media}", direction.as_str()),
        format!("{media}_url"): uri,
    }))
}

fn deserialize_url(data: &Value) -> Result<ContentPart> {
    let (uri, fallback) = match data.get("image_url").and_then(Value::as_str) {
        Some(uri) => (uri, "image/*"),
        None => (str_field(data, "file_url")?, "application/octet-stream"),
    };
    Ok(ContentPart::Url {
        uri: uri.to_owned(),
        mime_type: guess_mime(uri, fallback),
    })
}

/// Consecutive text and media parts share one `{role, content}` item; tool
/// calls, tool results and reasoning become top-level items in place
fn serialize_message(message: &Message, context: &Context) -> Result<Vec<Value>> {
    let direction = message.direction();
    let mut items = Vec::new();
    let mut content = Vec::new();

    for part in &message.content {
        match part {
            ContentPart::Text { .. } | ContentPart::File { .. } | ContentPart::Url { .. } => {
                content.push(context.serialize_part(part, direction)?);
            }
            ContentPart::Thinking { .. } if !context.includes_thinking() => {}
            ContentPart::Thinking { .. } | ContentPart::ToolCall(_) | ContentPart::ToolCallResult { .. } => {
                flush(&mut items, &mut content, message.role);
                items.push(context.serialize_part(part, direction)?);
            }
        }
    }
    flush(&mut items, &mut content, message.role);

    Ok(items)
}

fn flush(items: &mut Vec<Value>, content: &mut Vec<Value>, role: Role) {
    if !content.is_empty() {
        items.push(json!({ "role": role.as_str(), "content": std::mem::take(content) }));
    }
}

fn deserialize_item(item: &Value, context: &Context) -> Result<Option<Message>> {
    match item.get("type").and_then(Value::as_str) {
        Some("message") => {
            let role = item.get("role").and_then(Value::as_str).map_or(Ok(Role::Assistant), Role::parse)?;
            let mut content = Vec::new();
            for part in item.get("content").and_then(Value::as_array).into_iter().flatten() {
                if let Some(part) = context.deserialize_part(part)? {
                    content.push(part);
                }
            }
            Ok(Some(Message::new(role, content)))
        }
        Some("function_call") => Ok(Some(Message::new(
            Role::Tool,
            vec![context.deserialize_kind(ContentKind::ToolCall, item)?],
        ))),
        Some("reasoning") => Ok(Some(Message::new(
            Role::Assistant,
            vec![context.deserialize_kind(ContentKind::Thinking, item)?],
        ))),
        _ => Ok(None),
    }
}

fn status_reason(body: &Value) -> Option<FinishReason> {
    match body.get("status").and_then(Value::as_str)? {
        "incomplete" => Some(
            body.pointer("/incomplete_details/reason")
                .and_then(Value::as_str)
                .map_or(FinishReason::Length, FinishReason::from_wire),
        ),
        "in_progress" | "queued" => None,
        status => Some(FinishReason::from_wire(status)),
    }
}

fn deserialize_choices(body: &Value, context: &Context) -> Result<Vec<Choice>> {
    let output = body
        .get("output")
        .and_then(Value::as_array)
        .ok_or_else(|| LlmError::Decode("response body has no output list".to_owned()))?;
    let reason = status_reason(body);

    let mut choices = Vec::with_capacity(output.len());
    for item in output {
        let Some(message) = deserialize_item(item, context)? else {
            continue;
        };
        let finish_reason = if message.tool_call_list().next().is_some() {
            Some(FinishReason::ToolCalls)
        } else {
            reason.clone()
        };
        choices.push(Choice {
            index: choices.len(),
            message,
            finish_reason,
        });
    }

    Ok(choices)
}

fn deserialize_usage(usage: &Value) -> Usage {
    Usage {
        prompt_tokens: usage_count(usage, "input_tokens"),
        completion_tokens: usage_count(usage, "output_tokens"),
        total_tokens: usage_count(usage, "total_tokens"),
    }
}

fn serialize_tool(tool: &ToolSpec) -> Value {
    let mut wire = Map::new();
    wire.insert("type".to_owned(), json!("function"));
    wire.insert("name".to_owned(), json!(tool.name));
    if let Some(description) = &tool.description {
        wire.insert("description".to_owned(), json!(description));
    }
    wire.insert("parameters".to_owned(), tool.parameters.clone());
    wire.insert("strict".to_owned(), Value::Bool(true));
    Value::Object(wire)
}
