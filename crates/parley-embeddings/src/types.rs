use serde::{Deserialize, Serialize};

/// One string or many; a single string is sent as a one-element list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmbedInput {
    Single(String),
    Multiple(Vec<String>),
}

impl EmbedInput {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            Self::Single(text) => vec![text],
            Self::Multiple(texts) => texts,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Single(_) => false,
            Self::Multiple(texts) => texts.is_empty(),
        }
    }
}

impl From<&str> for EmbedInput {
    fn from(text: &str) -> Self {
        Self::Single(text.to_owned())
    }
}

impl From<String> for EmbedInput {
    fn from(text: String) -> Self {
        Self::Single(text)
    }
}

impl From<Vec<String>> for EmbedInput {
    fn from(texts: Vec<String>) -> Self {
        Self::Multiple(texts)
    }
}

impl From<&[&str]> for EmbedInput {
    fn from(texts: &[&str]) -> Self {
        Self::Multiple(texts.iter().map(|text| (*text).to_owned()).collect())
    }
}

/// Embedding request
#[derive(Debug, Clone)]
pub struct EmbeddingRequest {
    pub input: EmbedInput,
    /// Falls back to the client's default model
    pub model: Option<String>,
    /// Output dimensions, for models that support shortening
    pub dimensions: Option<u32>,
}

impl EmbeddingRequest {
    pub fn new(input: impl Into<EmbedInput>) -> Self {
        Self {
            input: input.into(),
            model: None,
            dimensions: None,
        }
    }

    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    #[must_use]
    pub const fn with_dimensions(mut self, dimensions: u32) -> Self {
        self.dimensions = Some(dimensions);
        self
    }
}

/// Token usage for an embedding request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddingUsage {
    #[serde(default)]
    pub prompt_tokens: u64,
    #[serde(default)]
    pub total_tokens: u64,
}

/// Vectors in input order
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingResponse {
    pub embeddings: Vec<Vec<f32>>,
    pub model: String,
    pub usage: EmbeddingUsage,
}

/// Request body of `POST /v1/embeddings`
#[derive(Debug, Serialize)]
pub(crate) struct WireRequest<'a> {
    pub model: &'a str,
    pub input: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireResponse {
    pub data: Vec<WireEmbedding>,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub usage: EmbeddingUsage,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireEmbedding {
    pub embedding: Vec<f32>,
    #[serde(default)]
    pub index: usize,
}

impl From<WireResponse> for EmbeddingResponse {
    fn from(mut wire: WireResponse) -> Self {
        wire.data.sort_by_key(|entry| entry.index);
        Self {
            embeddings: wire.data.into_iter().map(|entry| entry.embedding).collect(),
            model: wire.model,
            usage: wire.usage,
        }
    }
}
