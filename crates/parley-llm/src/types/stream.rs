use super::response::Response;

/// Incremental fragment decoded from a stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delta {
    Text(String),
    Thinking(String),
}

impl Delta {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Text(value) | Self::Thinking(value) => value,
        }
    }
}

/// Item yielded by a chat stream
#[derive(Debug, Clone)]
pub enum StreamEvent {
    /// Text or reasoning fragment
    Delta(Delta),
    /// Final response assembled from the terminal event; always last
    Completed(Response),
}
