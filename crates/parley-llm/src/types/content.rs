use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use super::tool::ToolCall;

const OCTET_STREAM: &str = "application/octet-stream";

/// One semantic unit of a message payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    /// Plain text
    Text { value: String },
    /// Model reasoning summary
    Thinking { value: String },
    /// Function invocation requested by the model
    ToolCall(ToolCall),
    /// Output of a tool invocation sent back to the model
    ToolCallResult { tool_call_id: String, content: String },
    /// Inline file with base64 encoded data
    File {
        filename: String,
        mime_type: String,
        data: String,
    },
    /// Remote file or image reference
    Url { uri: String, mime_type: String },
}

impl ContentPart {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text { value: value.into() }
    }

    pub fn thinking(value: impl Into<String>) -> Self {
        Self::Thinking { value: value.into() }
    }

    pub fn tool_call_result(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self::ToolCallResult {
            tool_call_id: tool_call_id.into(),
            content: content.into(),
        }
    }

    /// Inline file from raw bytes, mime type guessed from the filename
    pub fn file(filename: impl Into<String>, bytes: &[u8]) -> Self {
        let filename = filename.into();
        let mime_type = guess_mime(&filename, OCTET_STREAM);
        Self::File {
            filename,
            mime_type,
            data: STANDARD.encode(bytes),
        }
    }

    /// Remote reference, mime type guessed from the URI path
    pub fn url(uri: impl Into<String>) -> Self {
        let uri = uri.into();
        let mime_type = guess_mime(&uri, OCTET_STREAM);
        Self::Url { uri, mime_type }
    }

    /// Tag used for codec dispatch
    pub const fn kind(&self) -> ContentKind {
        match self {
            Self::Text { .. } => ContentKind::Text,
            Self::Thinking { .. } => ContentKind::Thinking,
            Self::ToolCall(_) => ContentKind::ToolCall,
            Self::ToolCallResult { .. } => ContentKind::ToolCallResult,
            Self::File { .. } => ContentKind::File,
            Self::Url { .. } => ContentKind::Url,
        }
    }

    /// Whether a file or URL part refers to an image
    pub fn is_image(&self) -> bool {
        match self {
            Self::File { mime_type, .. } | Self::Url { mime_type, .. } => mime_type.starts_with("image/"),
            _ => false,
        }
    }

    /// `data:` URI for inline files
    pub fn data_uri(&self) -> Option<String> {
        match self {
            Self::File { mime_type, data, .. } => Some(format!("data:{mime_type};base64,{data}")),
            _ => None,
        }
    }
}

/// Guess a mime type from a file name or URI, ignoring any query string
pub(crate) fn guess_mime(path: &str, fallback: &str) -> String {
    let path = path.split(['?', '#']).next().unwrap_or(path);
    mime_guess::from_path(path)
        .first()
        .map_or_else(|| fallback.to_owned(), |mime| mime.essence_str().to_owned())
}

/// Split a `data:<mime>;base64,<data>` URI into mime type and payload
pub(crate) fn parse_data_uri(uri: &str) -> Option<(&str, &str)> {
    let rest = uri.strip_prefix("data:")?;
    let (mime_type, data) = rest.split_once(";base64,")?;
    Some((mime_type, data))
}

/// Content kind tag keying the serialization registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentKind {
    Text,
    Thinking,
    ToolCall,
    ToolCallResult,
    File,
    Url,
}

impl ContentKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Thinking => "thinking",
            Self::ToolCall => "tool_call",
            Self::ToolCallResult => "tool_call_result",
            Self::File => "file",
            Self::Url => "url",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a part travels to the vendor or comes back from it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Input,
    Output,
}

impl Direction {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::Output => "output",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_encodes_bytes_and_guesses_mime() {
        let part = ContentPart::file("cat.png", b"\x89PNG");
        assert_eq!(part.kind(), ContentKind::File);
        assert!(part.is_image());
        assert_eq!(part.data_uri().as_deref(), Some("data:image/png;base64,iVBORw=="));
    }

    #[test]
    fn url_mime_ignores_query_string() {
        let part = ContentPart::url("https://localhost/report.pdf?sig=abc");
        assert_eq!(
            part,
            ContentPart::Url {
                uri: "https://localhost/report.pdf?sig=abc".to_owned(),
                mime_type: "application/pdf".to_owned(),
            }
        );
        assert!(!part.is_image());
    }

    #[test]
    fn unknown_extension_falls_back() {
        assert_eq!(guess_mime("https://localhost/blob", OCTET_STREAM), OCTET_STREAM);
    }

    #[test]
    fn parses_data_uri() {
        assert_eq!(parse_data_uri("data:image/png;base64,AAAA"), Some(("image/png", "AAAA")));
        assert_eq!(parse_data_uri("https://localhost/a.png"), None);
    }
}
