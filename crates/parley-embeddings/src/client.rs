use parley_config::OpenAiConfig;
use parley_core::VendorClient;

use crate::error::{EmbeddingsError, Result};
use crate::types::{EmbeddingRequest, EmbeddingResponse, WireRequest, WireResponse};

/// Model used when a request does not name one
pub const DEFAULT_MODEL: &str = "text-embedding-3-large";

const EMBEDDINGS_PATH: &str = "/embeddings";

/// Embedding endpoint client
#[derive(Debug, Clone)]
pub struct Embeddings {
    client: VendorClient,
    default_model: String,
}

impl Embeddings {
    pub fn new(client: VendorClient) -> Self {
        Self {
            client,
            default_model: DEFAULT_MODEL.to_owned(),
        }
    }

    pub fn from_config(config: &OpenAiConfig) -> Result<Self> {
        Ok(Self::new(VendorClient::new(config)?))
    }

    #[must_use]
    pub fn with_default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    /// Embed every input string
    ///
    /// # Errors
    ///
    /// Returns `EmptyInput` for an empty list, transport errors verbatim, and
    /// `Decode` when the body has no `data` list
    pub async fn embed(&self, request: EmbeddingRequest) -> Result<EmbeddingResponse> {
        if request.input.is_empty() {
            return Err(EmbeddingsError::EmptyInput);
        }

        let EmbeddingRequest { input, model, dimensions } = request;
        let model = model.as_deref().unwrap_or(&self.default_model);
        let body = wire_request(model, input.into_vec(), dimensions);

        tracing::debug!(model = %model, inputs = body.input.len(), "sending embeddings request");

        let response = self.client.send(self.client.post(EMBEDDINGS_PATH).json(&body)).await?;
        let wire: WireResponse = response.json().await.map_err(|e| {
            tracing::error!(error = %e, "failed to parse embeddings response");
            EmbeddingsError::Decode(e.to_string())
        })?;

        let response = EmbeddingResponse::from(wire);
        tracing::debug!(model = %model, vectors = response.embeddings.len(), "embeddings request complete");

        Ok(response)
    }
}

const fn wire_request(model: &str, input: Vec<String>, dimensions: Option<u32>) -> WireRequest<'_> {
    WireRequest { model, input, dimensions }
}
