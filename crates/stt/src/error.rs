use parley_core::TransportError;
use thiserror::Error;

/// Transcription failures
#[derive(Debug, Error)]
pub enum SttError {
    #[error("invalid response_format '{value}', expected one of: {}", .valid.join(", "))]
    InvalidFormat {
        value: String,
        valid: &'static [&'static str],
    },

    /// A configured default cannot be sent as a form field
    #[error("transcribe default '{0}' must be a string, number or boolean")]
    InvalidDefault(String),

    #[error("invalid audio content type: {0}")]
    InvalidContentType(String),

    #[error("vendor returned {status}: {body}")]
    Http { status: u16, body: String },

    #[error("connection failed: {0}")]
    Connection(String),

    #[error("invalid client settings: {0}")]
    Settings(String),

    #[error("failed to decode transcription response: {0}")]
    Decode(String),
}

impl From<TransportError> for SttError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Http { status, body } => Self::Http { status, body },
            TransportError::Connection(reason) => Self::Connection(reason),
            TransportError::Settings(reason) => Self::Settings(reason),
        }
    }
}

pub type Result<T> = std::result::Result<T, SttError>;
