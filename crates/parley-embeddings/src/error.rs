use parley_core::TransportError;
use thiserror::Error;

/// Embedding request failures
#[derive(Debug, Error)]
pub enum EmbeddingsError {
    /// Nothing to embed
    #[error("embedding input must contain at least one string")]
    EmptyInput,

    /// Vendor answered with a non-2xx status
    #[error("vendor returned {status}: {body}")]
    Http { status: u16, body: String },

    #[error("connection failed: {0}")]
    Connection(String),

    #[error("invalid client settings: {0}")]
    Settings(String),

    /// Response body did not have the expected shape
    #[error("failed to decode embeddings response: {0}")]
    Decode(String),
}

impl From<TransportError> for EmbeddingsError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Http { status, body } => Self::Http { status, body },
            TransportError::Connection(reason) => Self::Connection(reason),
            TransportError::Settings(reason) => Self::Settings(reason),
        }
    }
}

pub type Result<T> = std::result::Result<T, EmbeddingsError>;
