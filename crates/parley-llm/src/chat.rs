use std::sync::Arc;

use async_stream::try_stream;
use futures_util::{Stream, StreamExt};
use parley_config::{OpenAiConfig, WireFormat};
use parley_core::VendorClient;
use serde_json::{Map, Value};

use crate::assemble;
use crate::error::{LlmError, Result};
use crate::request::{CapabilityTable, ChatOptions, PayloadBuilder, models};
use crate::serialize::Context;
use crate::stream::StreamDecoder;
use crate::transport::{HttpTransport, Transport};
use crate::types::{Delta, Message, Prompt, Response, StreamEvent, ToolCall, ToolExecutor};

/// Tool rounds attempted before the last response is returned as is
pub const DEFAULT_MAX_TOOL_ROUNDS: usize = 8;

/// Chat client for one wire format
#[derive(Clone)]
pub struct Chat {
    transport: Arc<dyn Transport>,
    context: Context,
    capabilities: CapabilityTable,
    defaults: Map<String, Value>,
    default_model: String,
    max_tool_rounds: usize,
}

impl std::fmt::Debug for Chat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Chat")
            .field("format", &self.context.format())
            .field("default_model", &self.default_model)
            .field("max_tool_rounds", &self.max_tool_rounds)
            .finish_non_exhaustive()
    }
}

impl Chat {
    /// Client over any transport using the built-in context for `format`
    pub fn new(transport: impl Transport + 'static, format: WireFormat) -> Self {
        Self {
            transport: Arc::new(transport),
            context: Context::shared(format).clone(),
            capabilities: CapabilityTable::default(),
            defaults: Map::new(),
            default_model: models::DEFAULT.to_owned(),
            max_tool_rounds: DEFAULT_MAX_TOOL_ROUNDS,
        }
    }

    /// HTTP client configured from connection settings
    ///
    /// # Errors
    ///
    /// Returns `Settings` if the HTTP client cannot be built
    pub fn from_config(config: &OpenAiConfig) -> Result<Self> {
        let transport = HttpTransport::new(VendorClient::new(config)?);

        let mut chat = Self::new(transport, config.wire_format)
            .with_capabilities(CapabilityTable::with_overrides(&config.models))
            .with_defaults(config.chat_defaults.clone());
        if let Some(model) = &config.default_model {
            chat = chat.with_default_model(model.clone());
        }

        Ok(chat)
    }

    /// Replace the serialization context
    #[must_use]
    pub fn with_context(mut self, context: Context) -> Self {
        self.context = context;
        self
    }

    #[must_use]
    pub fn with_capabilities(mut self, capabilities: CapabilityTable) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Keys merged under every payload
    #[must_use]
    pub fn with_defaults(mut self, defaults: Map<String, Value>) -> Self {
        self.defaults = defaults;
        self
    }

    #[must_use]
    pub fn with_default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    #[must_use]
    pub const fn with_max_tool_rounds(mut self, rounds: usize) -> Self {
        self.max_tool_rounds = rounds;
        self
    }

    pub const fn context(&self) -> &Context {
        &self.context
    }

    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    /// Request body that would be sent for these inputs
    pub fn payload(&self, prompt: &Prompt, model: &str, options: &ChatOptions) -> Result<Value> {
        PayloadBuilder::new(&self.context, &self.capabilities, &self.defaults).build(prompt, model, options)
    }

    /// Send one non-streaming request
    pub async fn complete(&self, prompt: &Prompt, model: &str, options: &ChatOptions) -> Result<Response> {
        let mut options = options.clone();
        options.stream = false;
        let payload = self.payload(prompt, model, &options)?;

        tracing::debug!(model, path = self.context.format().path(), messages = prompt.len(), "sending chat request");
        let body = self.transport.send(self.context.format().path(), &payload).await?;

        assemble::from_wire(body, &self.context)
    }

    /// Send a streaming request
    ///
    /// Yields every delta as it is decoded, then exactly one
    /// [`StreamEvent::Completed`]. A stream that ends without a terminal
    /// event yields [`LlmError::IncompleteStream`] instead. Dropping the
    /// stream closes the connection.
    pub fn stream<'a>(
        &'a self,
        prompt: &'a Prompt,
        model: &'a str,
        options: &'a ChatOptions,
    ) -> impl Stream<Item = Result<StreamEvent>> + Send + 'a {
        try_stream! {
            let mut options = options.clone();
            options.stream = true;
            let payload = self.payload(prompt, model, &options)?;
            let format = self.context.format();

            tracing::debug!(model, path = format.path(), messages = prompt.len(), "sending streaming chat request");
            let mut chunks = self.transport.send_streaming(format.path(), &payload).await?;
            let mut decoder = StreamDecoder::new(format);

            while let Some(chunk) = chunks.next().await {
                for delta in decoder.feed(&chunk?)? {
                    yield StreamEvent::Delta(delta);
                }
            }
            for delta in decoder.flush()? {
                yield StreamEvent::Delta(delta);
            }

            if !decoder.is_complete() {
                tracing::warn!(model, "stream ended without a completion event");
                Err::<(), _>(LlmError::IncompleteStream)?;
            }

            let response = assemble::from_wire(decoder.finish(), &self.context)?;
            tracing::debug!(model, total_tokens = response.usage.total_tokens, "stream completed");
            yield StreamEvent::Completed(response);
        }
    }

    /// Streaming request driven by a per-delta callback
    pub async fn complete_streaming<F>(
        &self,
        prompt: &Prompt,
        model: &str,
        options: &ChatOptions,
        mut on_delta: F,
    ) -> Result<Response>
    where
        F: FnMut(&Delta) + Send,
    {
        let mut stream = std::pin::pin!(self.stream(prompt, model, options));
        while let Some(event) = stream.next().await {
            match event? {
                StreamEvent::Delta(delta) => on_delta(&delta),
                StreamEvent::Completed(response) => return Ok(response),
            }
        }
        Err(LlmError::IncompleteStream)
    }

    /// Complete, running requested tools and resending until the model stops
    /// calling them or the round limit is reached
    ///
    /// Each call's result is the JSON encoding of the executor's value, sent
    /// back as a tool-role message after the model's own messages.
    pub async fn complete_with_tools(
        &self,
        prompt: &Prompt,
        model: &str,
        options: &ChatOptions,
        executor: &dyn ToolExecutor,
    ) -> Result<Response> {
        let mut conversation = prompt.clone();
        let mut response = self.complete(&conversation, model, options).await?;

        for round in 1..=self.max_tool_rounds {
            if !response.has_tool_calls() {
                return Ok(response);
            }

            let calls: Vec<ToolCall> = response.tool_calls().into_iter().cloned().collect();
            tracing::debug!(model, round, calls = calls.len(), "executing tool calls");

            conversation.extend(response.messages().cloned());
            for call in &calls {
                conversation.push(run_tool(executor, call).await?);
            }

            response = self.complete(&conversation, model, options).await?;
        }

        if response.has_tool_calls() {
            tracing::warn!(model, rounds = self.max_tool_rounds, "tool round limit reached");
        }
        Ok(response)
    }
}

async fn run_tool(executor: &dyn ToolExecutor, call: &ToolCall) -> Result<Message> {
    let output = executor.execute(call).await.map_err(|e| LlmError::ToolExecution {
        name: call.name.clone(),
        reason: e.to_string(),
    })?;
    let content = serde_json::to_string(&output).map_err(|e| LlmError::ToolExecution {
        name: call.name.clone(),
        reason: e.to_string(),
    })?;
    Ok(Message::tool_result(call.id.clone(), content))
}
