use serde_json::{Map, Value, json};

use super::{Context, PartCodec, Structure, str_field, text_field, usage_count};
use crate::error::{LlmError, Result};
use crate::types::content::{guess_mime, parse_data_uri};
use crate::types::{Choice, ContentKind, ContentPart, Direction, FinishReason, Message, Role, ToolCall, ToolSpec, Usage};

// No thinking codec: this wire has no reasoning input shape.
pub(super) const PARTS: &[(ContentKind, PartCodec)] = &[
    (
        ContentKind::Text,
        PartCodec {
            serialize: serialize_text,
            deserialize: deserialize_text,
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
    if data.get("role").and_then(Value::as_str) == Some("tool") {
        return Some(ContentKind::ToolCallResult);
    }
    match data.get("type")?.as_str()? {
        "text" => Some(ContentKind::Text),
        "file" => Some(ContentKind::File),
        "image_url" => Some(ContentKind::Url),
        "function" => Some(ContentKind::ToolCall),
        _ => None,
    }
}

fn mismatch(expected: ContentKind, part: &ContentPart) -> LlmError {
    LlmError::UnsupportedContent(format!("{expected} codec cannot encode a {} part", part.kind()))
}

fn serialize_text(part: &ContentPart, _: Direction) -> Result<Value> {
    let ContentPart::Text { value } = part else {
        return Err(mismatch(ContentKind::Text, part));
    };
    Ok(json!({ "type": "text", "text": value }))
}

fn deserialize_text(data: &Value) -> Result<ContentPart> {
    Ok(ContentPart::text(str_field(data, "text")?))
}

fn serialize_tool_call(part: &ContentPart, _: Direction) -> Result<Value> {
    let ContentPart::ToolCall(call) = part else {
        return Err(mismatch(ContentKind::ToolCall, part));
    };
    Ok(json!({
        "id": call.id,
        "type": "function",
        "function": { "name": call.name, "arguments": call.arguments },
    }))
}

fn deserialize_tool_call(data: &Value) -> Result<ContentPart> {
    let function = data
        .get("function")
        .ok_or_else(|| LlmError::Decode(format!("tool call without function: {data}")))?;
    Ok(ContentPart::ToolCall(ToolCall::new(
        str_field(data, "id")?,
        str_field(function, "name")?,
        text_field(function, "arguments"),
    )))
}

fn serialize_tool_call_result(part: &ContentPart, _: Direction) -> Result<Value> {
    let ContentPart::ToolCallResult { tool_call_id, content } = part else {
        return Err(mismatch(ContentKind::ToolCallResult, part));
    };
    Ok(json!({ "role": "tool", "tool_call_id": tool_call_id, "content": content }))
}

fn deserialize_tool_call_result(data: &Value) -> Result<ContentPart> {
    Ok(ContentPart::tool_call_result(
        str_field(data, "tool_call_id")?,
        text_field(data, "content"),
    ))
}

fn serialize_file(part: &ContentPart, _: Direction) -> Result<Value> {
    let (ContentPart::File { filename, .. }, Some(data_uri)) = (part, part.data_uri()) else {
        return Err(mismatch(ContentKind::File, part));
    };
    Ok(json!({
        "type": "file",
        "file": { "filename": filename, "file_data": data_uri },
    }))
}

fn deserialize_file(data: &Value) -> Result<ContentPart> {
    let file = data
        .get("file")
        .ok_or_else(|| LlmError::Decode(format!("file part without file object: {data}")))?;
    let filename = file.get("filename").and_then(Value::as_str).unwrap_or("file").to_owned();
    let payload = str_field(file, "file_data")?;

    let (mime_type, encoded) = match parse_data_uri(payload) {
        Some((mime_type, encoded)) => (mime_type.to_owned(), encoded),
        None => (guess_mime(&filename, "application/octet-stream"), payload),
    };

    Ok(ContentPart::File {
        filename,
        mime_type,
        data: encoded.to_owned(),
    })
}

fn serialize_url(part: &ContentPart, _: Direction) -> Result<Value> {
    let ContentPart::Url { uri, mime_type } = part else {
        return Err(mismatch(ContentKind::Url, part));
    };
    if !part.is_image() {
        return Err(LlmError::UnsupportedContent(format!(
            "chat completions only accept image URLs, got {mime_type} at {uri}"
        )));
    }
    Ok(json!({ "type": "image_url", "image_url": { "url": uri } }))
}

fn deserialize_url(data: &Value) -> Result<ContentPart> {
    let uri = data
        .pointer("/image_url/url")
        .and_then(Value::as_str)
        .ok_or_else(|| LlmError::Decode(format!("image_url part without url: {data}")))?;
    Ok(ContentPart::Url {
        uri: uri.to_owned(),
        mime_type: guess_mime(uri, "image/*"),
    })
}

/// Text and media go in `content`, tool calls in `tool_calls` of an
/// assistant message, and each tool result becomes its own tool message
fn serialize_message(message: &Message, context: &Context) -> Result<Vec<Value>> {
    let direction = message.direction();
    let mut content = Vec::new();
    let mut tool_calls = Vec::new();
    let mut results = Vec::new();

    for part in &message.content {
        match part {
            ContentPart::ToolCall(_) => tool_calls.push(context.serialize_part(part, direction)?),
            ContentPart::ToolCallResult { .. } => results.push(context.serialize_part(part, direction)?),
            ContentPart::Thinking { .. } if !context.includes_thinking() => {}
            _ => content.push(context.serialize_part(part, direction)?),
        }
    }

    let mut items = Vec::with_capacity(1 + results.len());
    if !content.is_empty() || !tool_calls.is_empty() {
        // Calls requested by the model are replayed as an assistant turn
        let role = if tool_calls.is_empty() { message.role } else { Role::Assistant };
        let mut item = Map::new();
        item.insert("role".to_owned(), json!(role.as_str()));
        if !content.is_empty() {
            item.insert("content".to_owned(), Value::Array(content));
        }
        if !tool_calls.is_empty() {
            item.insert("tool_calls".to_owned(), Value::Array(tool_calls));
        }
        items.push(Value::Object(item));
    }
    items.extend(results);

    Ok(items)
}

fn deserialize_message(data: &Value, context: &Context) -> Result<Message> {
    let role = data.get("role").and_then(Value::as_str).map_or(Ok(Role::Assistant), Role::parse)?;

    if role == Role::Tool {
        return Ok(Message::new(
            role,
            vec![context.deserialize_kind(ContentKind::ToolCallResult, data)?],
        ));
    }

    let mut content = Vec::new();
    if let Some(reasoning) = data.get("reasoning_content").and_then(Value::as_str)
        && !reasoning.is_empty()
    {
        content.push(ContentPart::thinking(reasoning));
    }
    match data.get("content") {
        Some(Value::String(text)) if !text.is_empty() => content.push(ContentPart::text(text.as_str())),
        Some(Value::Array(parts)) => {
            for part in parts {
                if let Some(part) = context.deserialize_part(part)? {
                    content.push(part);
                }
            }
        }
        _ => {}
    }
    for call in data.get("tool_calls").and_then(Value::as_array).into_iter().flatten() {
        content.push(context.deserialize_kind(ContentKind::ToolCall, call)?);
    }

    Ok(Message::new(role, content))
}

fn deserialize_choices(body: &Value, context: &Context) -> Result<Vec<Choice>> {
    let list = body
        .get("choices")
        .and_then(Value::as_array)
        .ok_or_else(|| LlmError::Decode("response body has no choices list".to_owned()))?;

    list.iter()
        .enumerate()
        .map(|(position, choice)| {
            let message = choice
                .get("message")
                .ok_or_else(|| LlmError::Decode(format!("choice without message: {choice}")))?;
            let index = choice
                .get("index")
                .and_then(Value::as_u64)
                .and_then(|index| usize::try_from(index).ok())
                .unwrap_or(position);
            Ok(Choice {
                index,
                message: deserialize_message(message, context)?,
                finish_reason: choice
                    .get("finish_reason")
                    .and_then(Value::as_str)
                    .map(FinishReason::from_wire),
            })
        })
        .collect()
}

fn deserialize_usage(usage: &Value) -> Usage {
    Usage {
        prompt_tokens: usage_count(usage, "prompt_tokens"),
        completion_tokens: usage_count(usage, "completion_tokens"),
        total_tokens: usage_count(usage, "total_tokens"),
    }
}

fn serialize_tool(tool: &ToolSpec) -> Value {
    let mut function = Map::new();
    function.insert("name".to_owned(), json!(tool.name));
    if let Some(description) = &tool.description {
        function.insert("description".to_owned(), json!(description));
    }
    function.insert("parameters".to_owned(), tool.parameters.clone());
    function.insert("strict".to_owned(), Value::Bool(true));
    json!({ "type": "function", "function": function })
}
