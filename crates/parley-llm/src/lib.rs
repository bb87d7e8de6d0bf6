//! Chat adapter for the vendor's Responses and Chat Completions APIs
//!
//! A [`Chat`] turns a [`Prompt`] and [`ChatOptions`] into a wire payload
//! through a serialization [`Context`], sends it, and assembles the reply
//! into a [`Response`]. Streaming replies are decoded incrementally by
//! [`StreamDecoder`].

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod assemble;
mod chat;
mod error;
pub mod request;
pub mod serialize;
mod stream;
mod transport;
pub mod types;

pub use assemble::from_wire;
pub use chat::{Chat, DEFAULT_MAX_TOOL_ROUNDS};
pub use error::{ErrorCategory, LlmError, Result};
pub use parley_config::WireFormat;
pub use request::{
    Capabilities, CapabilityTable, ChatOptions, Format, PayloadBuilder, ReasoningEffort, Schema, Thinking, Verbosity,
    models,
};
pub use serialize::{Context, PartCodec, ThinkingPolicy};
pub use stream::StreamDecoder;
pub use transport::{ByteStream, HttpTransport, Transport};
pub use types::*;
