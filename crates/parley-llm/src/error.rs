use parley_core::TransportError;
use thiserror::Error;

/// Errors that can occur while building, sending or decoding a chat request
#[derive(Debug, Error)]
pub enum LlmError {
    /// Response format is not one of the supported values
    #[error("invalid format '{value}', expected one of: none, text, json, schema")]
    InvalidFormat { value: String },

    /// Option value is outside its enumerated set
    #[error("invalid {field} '{value}', expected one of: {}", .valid.join(", "))]
    InvalidOption {
        /// Name of the offending option
        field: &'static str,
        /// Value supplied by the caller
        value: String,
        /// Accepted values
        valid: &'static [&'static str],
    },

    /// No codec is registered for a content kind
    #[error("no serializer registered for content kind '{kind}'")]
    UnknownKind { kind: String },

    /// Message violates the role/content rules for outbound requests
    #[error("invalid message: {0}")]
    InvalidMessage(String),

    /// Content part cannot be expressed in the active wire format
    #[error("unsupported content: {0}")]
    UnsupportedContent(String),

    /// Stream frame could not be decoded
    #[error("malformed stream frame for event '{event}': {reason}")]
    MalformedStreamFrame { event: String, reason: String },

    /// Stream ended without a terminal event
    #[error("stream ended without a completion event")]
    IncompleteStream,

    /// Vendor returned a non-2xx status
    #[error("vendor returned {status}: {body}")]
    Http { status: u16, body: String },

    /// Request never reached the vendor or the body could not be read
    #[error("connection error: {0}")]
    Connection(String),

    /// Client could not be built from configuration
    #[error("invalid client settings: {0}")]
    Settings(String),

    /// Caller-supplied tool executor failed
    #[error("tool '{name}' failed: {reason}")]
    ToolExecution { name: String, reason: String },

    /// Vendor response body did not have the expected shape
    #[error("failed to decode vendor response: {0}")]
    Decode(String),
}

/// Coarse error taxonomy used by callers to decide how to react
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Bad options, messages or codec registrations; fix the input
    CallerInput,
    /// Vendor sent something this adapter cannot parse
    Protocol,
    /// HTTP or connection failure
    Transport,
}

impl LlmError {
    /// Category of this error
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidFormat { .. }
            | Self::InvalidOption { .. }
            | Self::UnknownKind { .. }
            | Self::InvalidMessage(_)
            | Self::UnsupportedContent(_)
            | Self::Settings(_)
            | Self::ToolExecution { .. } => ErrorCategory::CallerInput,
            Self::MalformedStreamFrame { .. } | Self::IncompleteStream | Self::Decode(_) => ErrorCategory::Protocol,
            Self::Http { .. } | Self::Connection(_) => ErrorCategory::Transport,
        }
    }

    /// Whether a caller-side retry could succeed
    ///
    /// Nothing in this crate retries; this only classifies transport
    /// failures that are usually transient.
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Connection(_) => true,
            Self::Http { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

impl From<TransportError> for LlmError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Http { status, body } => Self::Http { status, body },
            TransportError::Connection(reason) => Self::Connection(reason),
            TransportError::Settings(reason) => Self::Settings(reason),
        }
    }
}

pub type Result<T> = std::result::Result<T, LlmError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_option_names_field_and_valid_set() {
        let err = LlmError::InvalidOption {
            field: "verbosity",
            value: "loud".to_owned(),
            valid: &["low", "medium", "high"],
        };
        assert_eq!(err.to_string(), "invalid verbosity 'loud', expected one of: low, medium, high");
        assert_eq!(err.category(), ErrorCategory::CallerInput);
        assert!(!err.is_retryable());
    }

    #[test]
    fn transport_errors_keep_status_and_body() {
        let err = LlmError::from(TransportError::Http {
            status: 503,
            body: "overloaded".to_owned(),
        });
        assert!(matches!(&err, LlmError::Http { status: 503, body } if body == "overloaded"));
        assert_eq!(err.category(), ErrorCategory::Transport);
        assert!(err.is_retryable());
    }

    #[test]
    fn protocol_errors_are_not_retryable() {
        let err = LlmError::MalformedStreamFrame {
            event: "response.completed".to_owned(),
            reason: "EOF".to_owned(),
        };
        assert_eq!(err.category(), ErrorCategory::Protocol);
        assert!(!err.is_retryable());
        assert!(!LlmError::Http { status: 400, body: String::new() }.is_retryable());
    }
}
