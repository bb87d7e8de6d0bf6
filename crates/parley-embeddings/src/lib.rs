//! Embedding endpoint adapter

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod client;
mod error;
mod types;

pub use client::{DEFAULT_MODEL, Embeddings};
pub use error::{EmbeddingsError, Result};
pub use types::{EmbedInput, EmbeddingRequest, EmbeddingResponse, EmbeddingUsage};
