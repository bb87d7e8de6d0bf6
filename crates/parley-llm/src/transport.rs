use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use parley_core::VendorClient;
use reqwest::header::ACCEPT;
use serde_json::Value;

use crate::error::{LlmError, Result};

/// Raw body chunks of a streaming response
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes>> + Send>>;

/// HTTP collaborator used by [`Chat`](crate::Chat)
///
/// Owns auth, timeouts and retries. Non-2xx responses surface as
/// [`LlmError::Http`] with the status and body verbatim.
#[async_trait]
pub trait Transport: Send + Sync {
    /// POST a JSON body to a versioned path and return the JSON response
    async fn send(&self, path: &str, body: &Value) -> Result<Value>;

    /// POST a JSON body and return the response body as byte chunks
    async fn send_streaming(&self, path: &str, body: &Value) -> Result<ByteStream>;
}

/// Transport backed by [`VendorClient`]
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: VendorClient,
}

impl HttpTransport {
    pub const fn new(client: VendorClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, path: &str, body: &Value) -> Result<Value> {
        let response = self.client.send(self.client.post(path).json(body)).await?;

        response.json().await.map_err(|e| {
            tracing::error!(path, error = %e, "failed to read vendor response");
            LlmError::Decode(e.to_string())
        })
    }

    async fn send_streaming(&self, path: &str, body: &Value) -> Result<ByteStream> {
        let request = self.client.post(path).header(ACCEPT, "text/event-stream").json(body);
        let response = self.client.send(request).await?;

        let stream = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(|e| LlmError::Connection(e.to_string())));
        Ok(Box::pin(stream))
    }
}
