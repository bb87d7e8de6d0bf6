use serde::Deserialize;
use thiserror::Error;

/// Failures owned by the HTTP collaborator
///
/// Surfaced verbatim by every endpoint crate; nothing here is retried.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Vendor answered with a non-2xx status
    #[error("vendor returned {status}: {body}")]
    Http {
        /// HTTP status code
        status: u16,
        /// Raw response body
        body: String,
    },

    /// Request never produced a response (DNS, TLS, timeout, reset)
    #[error("connection failed: {0}")]
    Connection(String),

    /// Client could not be built from the configuration
    #[error("invalid client settings: {0}")]
    Settings(String),
}

impl TransportError {
    /// HTTP status for `Http` errors
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            Self::Connection(_) | Self::Settings(_) => None,
        }
    }

    /// Vendor error message extracted from an `Http` body, if it has one
    pub fn vendor_message(&self) -> Option<String> {
        let Self::Http { body, .. } = self else {
            return None;
        };

        serde_json::from_str::<VendorErrorBody>(body)
            .ok()
            .map(|parsed| parsed.error.message)
    }
}

/// Vendor error envelope: `{"error": {"message": ..., "type": ...}}`
#[derive(Debug, Deserialize)]
struct VendorErrorBody {
    error: VendorErrorDetail,
}

#[derive(Debug, Deserialize)]
struct VendorErrorDetail {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_vendor_message() {
        let err = TransportError::Http {
            status: 400,
            body: r#"{"error":{"message":"Unsupported parameter: 'temperature'","type":"invalid_request_error"}}"#
                .to_owned(),
        };
        assert_eq!(err.status(), Some(400));
        assert_eq!(err.vendor_message().as_deref(), Some("Unsupported parameter: 'temperature'"));
    }

    #[test]
    fn plain_body_has_no_vendor_message() {
        let err = TransportError::Http {
            status: 502,
            body: "Bad Gateway".to_owned(),
        };
        assert!(err.vendor_message().is_none());
        assert_eq!(err.to_string(), "vendor returned 502: Bad Gateway");
    }
}
