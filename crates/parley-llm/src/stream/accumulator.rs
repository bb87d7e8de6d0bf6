use std::collections::BTreeMap;

use serde_json::{Map, Value, json};

use crate::types::Delta;

/// Folds `chat.completion.chunk` objects into one `chat.completion`
#[derive(Debug, Default)]
pub(super) struct ChunkAccumulator {
    header: Map<String, Value>,
    choices: BTreeMap<u64, ChoiceState>,
    usage: Option<Value>,
}

#[derive(Debug, Default)]
struct ChoiceState {
    role: Option<String>,
    content: String,
    reasoning: String,
    tool_calls: BTreeMap<u64, ToolCallState>,
    finish_reason: Option<Value>,
}

#[derive(Debug, Default)]
struct ToolCallState {
    id: String,
    name: String,
    arguments: String,
}

impl ChunkAccumulator {
    /// Merge one chunk, returning the text and reasoning fragments it carried
    pub(super) fn push(&mut self, chunk: &Value) -> Vec<Delta> {
        for key in ["id", "created", "model", "system_fingerprint", "service_tier"] {
            if let Some(value) = chunk.get(key).filter(|value| !value.is_null()) {
                self.header.entry(key).or_insert_with(|| value.clone());
            }
        }
        if let Some(usage) = chunk.get("usage").filter(|usage| !usage.is_null()) {
            self.usage = Some(usage.clone());
        }

        let mut deltas = Vec::new();
        for (position, choice) in chunk
            .get("choices")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .enumerate()
        {
            let index = choice.get("index").and_then(Value::as_u64).unwrap_or(position as u64);
            let state = self.choices.entry(index).or_default();

            if let Some(reason) = choice.get("finish_reason").filter(|reason| !reason.is_null()) {
                state.finish_reason = Some(reason.clone());
            }
            let Some(delta) = choice.get("delta") else {
                continue;
            };

            if let Some(role) = delta.get("role").and_then(Value::as_str) {
                state.role = Some(role.to_owned());
            }
            if let Some(reasoning) = delta.get("reasoning_content").and_then(Value::as_str)
                && !reasoning.is_empty()
            {
                state.reasoning.push_str(reasoning);
                deltas.push(Delta::Thinking(reasoning.to_owned()));
            }
            if let Some(content) = delta.get("content").and_then(Value::as_str)
                && !content.is_empty()
            {
                state.content.push_str(content);
                deltas.push(Delta::Text(content.to_owned()));
            }
            for (call_position, call) in delta
                .get("tool_calls")
                .and_then(Value::as_array)
                .into_iter()
                .flatten()
                .enumerate()
            {
                let call_index = call.get("index").and_then(Value::as_u64).unwrap_or(call_position as u64);
                let entry = state.tool_calls.entry(call_index).or_default();
                if let Some(id) = call.get("id").and_then(Value::as_str) {
                    entry.id = id.to_owned();
                }
                if let Some(name) = call.pointer("/function/name").and_then(Value::as_str) {
                    entry.name.push_str(name);
                }
                if let Some(arguments) = call.pointer("/function/arguments").and_then(Value::as_str) {
                    entry.arguments.push_str(arguments);
                }
            }
        }

        deltas
    }

    pub(super) fn into_completion(self) -> Value {
        let mut completion = self.header;
        completion.insert("object".to_owned(), json!("chat.completion"));

        let choices = self
            .choices
            .into_iter()
            .map(|(index, state)| {
                let mut message = Map::new();
                message.insert(
                    "role".to_owned(),
                    json!(state.role.as_deref().unwrap_or("assistant")),
                );
                message.insert(
                    "content".to_owned(),
                    if state.content.is_empty() {
                        Value::Null
                    } else {
                        Value::String(state.content)
                    },
                );
                if !state.reasoning.is_empty() {
                    message.insert("reasoning_content".to_owned(), Value::String(state.reasoning));
                }
                if !state.tool_calls.is_empty() {
                    let calls = state
                        .tool_calls
                        .into_values()
                        .map(|call| {
                            json!({
                                "id": call.id,
                                "type": "function",
                                "function": { "name": call.name, "arguments": call.arguments },
                            })
                        })
                        .collect();
                    message.insert("tool_calls".to_owned(), Value::Array(calls));
                }

                json!({
                    "index": index,
                    "message": message,
                    "finish_reason": state.finish_reason.unwrap_or(Value::Null),
                })
            })
            .collect();
        completion.insert("choices".to_owned(), Value::Array(choices));

        if let Some(usage) = self.usage {
            completion.insert("usage".to_owned(), usage);
        }

        Value::Object(completion)
    }
}
