use parley_core::TransportError;
use thiserror::Error;

/// Cost query failures
#[derive(Debug, Error)]
pub enum UsageError {
    /// Query parameters that the vendor would reject
    #[error("invalid cost query: {0}")]
    InvalidQuery(String),

    /// Vendor answered with a non-2xx status
    #[error("vendor returned {status}: {body}")]
    Http { status: u16, body: String },

    #[error("connection failed: {0}")]
    Connection(String),

    /// Missing admin key or unusable client settings
    #[error("invalid client settings: {0}")]
    Settings(String),

    #[error("failed to decode cost response: {0}")]
    Decode(String),
}

impl From<TransportError> for UsageError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Http { status, body } => Self::Http { status, body },
            TransportError::Connection(reason) => Self::Connection(reason),
            TransportError::Settings(reason) => Self::Settings(reason),
        }
    }
}

pub type Result<T> = std::result::Result<T, UsageError>;
