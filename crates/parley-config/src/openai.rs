use indexmap::IndexMap;
use secrecy::SecretString;
use serde::Deserialize;
use serde_json::{Map, Value};

/// Vendor host used when none is configured
pub const DEFAULT_HOST: &str = "https://api.openai.com";

/// Default request timeout in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Connection settings and per-endpoint defaults for the vendor API
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OpenAiConfig {
    /// API key sent as a bearer token
    #[serde(default)]
    pub api_key: Option<SecretString>,
    /// Organization admin key, used only by the cost endpoint
    #[serde(default)]
    pub admin_api_key: Option<SecretString>,
    /// Host override (e.g. a local compatible server)
    #[serde(default)]
    pub host: Option<String>,
    /// Sent as `OpenAI-Organization` when present
    #[serde(default)]
    pub organization: Option<String>,
    /// Sent as `OpenAI-Project` when present
    #[serde(default)]
    pub project: Option<String>,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    /// Which chat wire format to speak
    #[serde(default)]
    pub wire_format: WireFormat,
    /// Chat model used when the caller does not name one
    #[serde(default)]
    pub default_model: Option<String>,
    /// Keys merged into every chat payload before computed fields
    #[serde(default)]
    pub chat_defaults: Map<String, Value>,
    /// Keys merged into every speech payload
    #[serde(default)]
    pub speak_defaults: Map<String, Value>,
    /// Keys merged into every transcription form
    #[serde(default)]
    pub transcribe_defaults: Map<String, Value>,
    /// Capability overrides keyed by model identifier
    #[serde(default)]
    pub models: IndexMap<String, CapabilityOverride>,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            admin_api_key: None,
            host: None,
            organization: None,
            project: None,
            timeout: DEFAULT_TIMEOUT_SECS,
            wire_format: WireFormat::default(),
            default_model: None,
            chat_defaults: Map::new(),
            speak_defaults: Map::new(),
            transcribe_defaults: Map::new(),
            models: IndexMap::new(),
        }
    }
}

impl OpenAiConfig {
    /// Effective host, falling back to the vendor default
    pub fn host(&self) -> &str {
        self.host.as_deref().unwrap_or(DEFAULT_HOST)
    }

    /// Whether requests go to the vendor's own host
    pub fn uses_default_host(&self) -> bool {
        self.host().trim_end_matches('/') == DEFAULT_HOST
    }
}

const fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

/// Chat wire format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WireFormat {
    /// `POST /v1/responses`
    #[default]
    Responses,
    /// `POST /v1/chat/completions`
    ChatCompletions,
}

impl WireFormat {
    /// Path of the chat endpoint below the API version prefix
    pub const fn path(self) -> &'static str {
        match self {
            Self::Responses => "/responses",
            Self::ChatCompletions => "/chat/completions",
        }
    }
}

/// Features a model accepts, overriding the built-in table
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CapabilityOverride {
    /// Whether `temperature` is accepted
    #[serde(default)]
    pub temperature: Option<bool>,
    /// Whether reasoning controls are accepted
    #[serde(default)]
    pub reasoning: Option<bool>,
}
