use serde_json::Value;

use crate::error::Result;
use crate::serialize::Context;
use crate::types::{Response, Usage};

/// Turn a final vendor body into a [`Response`]
///
/// The body is kept as `raw`. A missing `usage` block counts as zero.
///
/// # Errors
///
/// `Decode` when the body has no output/choices list or an item is missing
/// required fields
pub fn from_wire(body: Value, context: &Context) -> Result<Response> {
    let usage = body
        .get("usage")
        .filter(|usage| usage.is_object())
        .map_or_else(Usage::default, |usage| context.deserialize_usage(usage));
    let choices = context.deserialize_choices(&body)?;

    Ok(Response {
        raw: body,
        choices,
        usage,
    })
}

#[cfg(test)]
mod tests {
    use parley_config::WireFormat;
    use serde_json::json;

    use super::*;
    use crate::types::{Message, Role};

    #[test]
    fn assembles_responses_body() {
        let body = json!({
            "status": "completed",
            "output": [{"type": "message", "role": "assistant", "content": [
                {"type": "output_text", "text": "Two elephants fall off a cliff. Boom! Boom!"},
            ]}],
            "usage": {"input_tokens": 10, "output_tokens": 12, "total_tokens": 22},
        });

        let response = from_wire(body.clone(), Context::shared(WireFormat::Responses)).unwrap();
        assert_eq!(response.text(), "Two elephants fall off a cliff. Boom! Boom!");
        assert_eq!(response.usage.total_tokens, 22);
        assert_eq!(response.raw, body);
    }

    #[test]
    fn missing_usage_is_zero() {
        let body = json!({"output": [{"type": "message", "role": "assistant", "content": []}]});
        let response = from_wire(body, Context::shared(WireFormat::Responses)).unwrap();
        assert_eq!(response.usage, Usage::default());
        assert_eq!(response.choices[0].message, Message::new(Role::Assistant, vec![]));
    }

    #[test]
    fn assembles_chat_body() {
        let body = json!({
            "object": "chat.completion",
            "choices": [{"index": 0, "finish_reason": "stop", "message": {"role": "assistant", "content": "Ottawa."}}],
            "usage": {"prompt_tokens": 3, "completion_tokens": 2, "total_tokens": 5},
        });
        let response = from_wire(body, Context::shared(WireFormat::ChatCompletions)).unwrap();
        assert_eq!(response.text(), "Ottawa.");
        assert_eq!(response.usage.prompt_tokens, 3);
    }

    #[test]
    fn empty_object_is_a_decode_error() {
        assert!(from_wire(json!({}), Context::shared(WireFormat::Responses)).is_err());
    }
}
