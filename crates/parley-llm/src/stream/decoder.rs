use parley_config::WireFormat;
use serde_json::{Map, Value};

use super::accumulator::ChunkAccumulator;
use crate::error::{LlmError, Result};
use crate::types::Delta;

const TEXT_DELTA: &str = "response.output_text.delta";
const REASONING_DELTAS: &[&str] = &[
    "response.reasoning_summary_text.delta",
    "response.reasoning_text.delta",
];
const TERMINAL: &[&str] = &["response.completed", "response.incomplete", "response.failed"];
const DONE: &str = "[DONE]";

/// Per-request stream state
///
/// Bytes are buffered until a full line is available, so a multi-byte
/// character split across chunks is only decoded once all of its bytes
/// have arrived. A newline byte never occurs inside a UTF-8 sequence.
#[derive(Debug)]
pub struct StreamDecoder {
    format: WireFormat,
    buffer: Vec<u8>,
    /// Prefix of `buffer` already searched for a newline
    scanned: usize,
    event: Option<String>,
    data: Vec<String>,
    terminal: Option<Value>,
    chunks: ChunkAccumulator,
}

impl StreamDecoder {
    pub fn new(format: WireFormat) -> Self {
        Self {
            format,
            buffer: Vec::new(),
            scanned: 0,
            event: None,
            data: Vec::new(),
            terminal: None,
            chunks: ChunkAccumulator::default(),
        }
    }

    /// Consume one chunk and return the deltas completed by it, in order
    ///
    /// # Errors
    ///
    /// `MalformedStreamFrame` when a complete line is not UTF-8 or a known
    /// event carries JSON that does not parse
    pub fn feed(&mut self, chunk: &[u8]) -> Result<Vec<Delta>> {
        self.buffer.extend_from_slice(chunk);

        let mut deltas = Vec::new();
        let mut start = 0;
        let mut from = self.scanned;
        while let Some(offset) = self.buffer[from..].iter().position(|&byte| byte == b'\n') {
            let end = from + offset;
            let line = decode_line(&self.buffer[start..end], self.event.as_deref())?;
            self.line(&line, &mut deltas)?;
            start = end + 1;
            from = start;
        }
        self.buffer.drain(..start);
        self.scanned = self.buffer.len();

        Ok(deltas)
    }

    /// Treat end of input as a line and record terminator
    ///
    /// # Errors
    ///
    /// Same as [`feed`](Self::feed) for the pending bytes
    pub fn flush(&mut self) -> Result<Vec<Delta>> {
        let mut deltas = Vec::new();
        if !self.buffer.is_empty() {
            let pending = std::mem::take(&mut self.buffer);
            self.scanned = 0;
            let line = decode_line(&pending, self.event.as_deref())?;
            self.line(&line, &mut deltas)?;
        }
        self.dispatch(&mut deltas)?;
        Ok(deltas)
    }

    /// Whether a terminal event has been seen
    pub const fn is_complete(&self) -> bool {
        self.terminal.is_some()
    }

    /// Final response object, or an empty object when no terminal event arrived
    pub fn finish(self) -> Value {
        self.terminal.unwrap_or_else(|| Value::Object(Map::new()))
    }

    fn line(&mut self, line: &str, deltas: &mut Vec<Delta>) -> Result<()> {
        if line.is_empty() {
            return self.dispatch(deltas);
        }
        if line.starts_with(':') {
            return Ok(());
        }

        let (field, value) = line.split_once(':').unwrap_or((line, ""));
        let value = value.strip_prefix(' ').unwrap_or(value);
        match field {
            "event" => self.event = Some(value.to_owned()),
            "data" => self.data.push(value.to_owned()),
            _ => {}
        }
        Ok(())
    }

    fn dispatch(&mut self, deltas: &mut Vec<Delta>) -> Result<()> {
        let event = self.event.take();
        if self.data.is_empty() {
            return Ok(());
        }
        let data = std::mem::take(&mut self.data).join("\n");

        match self.format {
            WireFormat::Responses => self.dispatch_responses(event, &data, deltas),
            WireFormat::ChatCompletions => self.dispatch_chat(event, &data, deltas),
        }
    }

    fn dispatch_responses(&mut self, event: Option<String>, data: &str, deltas: &mut Vec<Delta>) -> Result<()> {
        if data == DONE {
            return Ok(());
        }

        // Without an `event:` line the payload's own `type` names the event
        let (tag, payload) = match event {
            Some(tag) => {
                if !is_known_tag(&tag) {
                    return Ok(());
                }
                let payload = parse(&tag, data)?;
                (tag, payload)
            }
            None => {
                let payload = parse("message", data)?;
                let Some(tag) = payload.get("type").and_then(Value::as_str) else {
                    return Ok(());
                };
                (tag.to_owned(), payload)
            }
        };

        if tag == TEXT_DELTA {
            deltas.push(Delta::Text(delta_text(&tag, &payload)?));
        } else if REASONING_DELTAS.contains(&tag.as_str()) {
            deltas.push(Delta::Thinking(delta_text(&tag, &payload)?));
        } else if TERMINAL.contains(&tag.as_str()) {
            let response = match payload {
                Value::Object(mut object) => object.remove("response").unwrap_or(Value::Object(object)),
                other => other,
            };
            self.terminal = Some(response);
        }

        Ok(())
    }

    fn dispatch_chat(&mut self, event: Option<String>, data: &str, deltas: &mut Vec<Delta>) -> Result<()> {
        let tag = event.unwrap_or_else(|| "message".to_owned());
        if tag != "message" {
            return Ok(());
        }
        if data == DONE {
            self.terminal = Some(std::mem::take(&mut self.chunks).into_completion());
            return Ok(());
        }

        let chunk = parse(&tag, data)?;
        deltas.extend(self.chunks.push(&chunk));
        Ok(())
    }
}

fn is_known_tag(tag: &str) -> bool {
    tag == TEXT_DELTA || REASONING_DELTAS.contains(&tag) || TERMINAL.contains(&tag)
}

fn decode_line(bytes: &[u8], event: Option<&str>) -> Result<String> {
    let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
    std::str::from_utf8(bytes)
        .map(str::to_owned)
        .map_err(|e| LlmError::MalformedStreamFrame {
            event: event.unwrap_or("message").to_owned(),
            reason: format!("invalid UTF-8: {e}"),
        })
}

fn parse(event: &str, data: &str) -> Result<Value> {
    serde_json::from_str(data).map_err(|e| LlmError::MalformedStreamFrame {
        event: event.to_owned(),
        reason: e.to_string(),
    })
}

fn delta_text(event: &str, payload: &Value) -> Result<String> {
    payload
        .get("delta")
        .and_then(Value::as_str)
        .map(str::to_owned)
        .ok_or_else(|| LlmError::MalformedStreamFrame {
            event: event.to_owned(),
            reason: "missing string field 'delta'".to_owned(),
        })
}
