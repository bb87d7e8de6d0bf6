use parley_core::TransportError;
use thiserror::Error;

/// Speech synthesis failures
#[derive(Debug, Error)]
pub enum TtsError {
    #[error("invalid {field} '{value}', expected one of: {}", .valid.join(", "))]
    InvalidOption {
        field: &'static str,
        value: String,
        valid: &'static [&'static str],
    },

    /// Speed outside the accepted range
    #[error("invalid speed {0}, expected a value between 0.25 and 4.0")]
    InvalidSpeed(f64),

    #[error("speech input must not be empty")]
    EmptyInput,

    #[error("vendor returned {status}: {body}")]
    Http { status: u16, body: String },

    #[error("connection failed: {0}")]
    Connection(String),

    #[error("invalid client settings: {0}")]
    Settings(String),
}

impl From<TransportError> for TtsError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Http { status, body } => Self::Http { status, body },
            TransportError::Connection(reason) => Self::Connection(reason),
            TransportError::Settings(reason) => Self::Settings(reason),
        }
    }
}

pub type Result<T> = std::result::Result<T, TtsError>;
