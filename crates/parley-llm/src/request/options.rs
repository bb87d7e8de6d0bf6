use std::str::FromStr;

use serde_json::{Map, Value, json};

use crate::error::LlmError;
use crate::types::ToolSpec;

/// Structured output descriptor
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    pub name: String,
    pub schema: Value,
    pub description: Option<String>,
}

impl Schema {
    pub fn new(name: impl Into<String>, schema: Value) -> Self {
        Self {
            name: name.into(),
            schema,
            description: None,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Wire fragment used verbatim inside the format field
    pub fn serialize(&self) -> Value {
        let mut wire = Map::new();
        wire.insert("name".to_owned(), json!(self.name));
        if let Some(description) = &self.description {
            wire.insert("description".to_owned(), json!(description));
        }
        wire.insert("schema".to_owned(), self.schema.clone());
        Value::Object(wire)
    }
}

/// Response format requested from the model
#[derive(Debug, Clone, PartialEq)]
pub enum Format {
    None,
    Text,
    Json,
    Schema(Schema),
}

impl FromStr for Format {
    type Err = LlmError;

    /// Parse a named format; `schema` needs a descriptor and is not accepted here
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "none" => Ok(Self::None),
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(LlmError::InvalidFormat { value: other.to_owned() }),
        }
    }
}

macro_rules! option_enum {
    ($(#[$meta:meta])* $name:ident, $field:literal, { $($variant:ident => $wire:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const VALID: &'static [&'static str] = &[$($wire),+];

            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $wire),+
                }
            }

            /// Parse a value read from a mapping option, naming `field` on failure
            pub(crate) fn parse_field(value: &str, field: &'static str) -> Result<Self, LlmError> {
                match value {
                    $($wire => Ok(Self::$variant),)+
                    other => Err(LlmError::InvalidOption {
                        field,
                        value: other.to_owned(),
                        valid: Self::VALID,
                    }),
                }
            }
        }

        impl FromStr for $name {
            type Err = LlmError;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                Self::parse_field(value, $field)
            }
        }
    };
}

option_enum!(
    /// How much effort reasoning models spend before answering
    ReasoningEffort, "reasoning_effort", {
        None => "none",
        Low => "low",
        Medium => "medium",
        High => "high",
    }
);

option_enum!(
    /// Answer length hint
    Verbosity, "verbosity", {
        Low => "low",
        Medium => "medium",
        High => "high",
    }
);

/// Provider-neutral reasoning switch
#[derive(Debug, Clone, PartialEq)]
pub enum Thinking {
    /// High effort with automatic summaries
    Enabled,
    /// `{summary: "auto"}` merged with these keys, caller keys winning
    Config(Map<String, Value>),
}

/// Per-request options
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatOptions {
    pub temperature: Option<f64>,
    pub format: Option<Format>,
    pub tools: Vec<ToolSpec>,
    pub reasoning_effort: Option<ReasoningEffort>,
    pub verbosity: Option<Verbosity>,
    pub thinking: Option<Thinking>,
    /// Vendor-native `reasoning` object; takes precedence over `thinking`
    pub reasoning: Option<Map<String, Value>>,
    /// Vendor-native `text` object, e.g. `{verbosity: "medium"}`
    pub text: Option<Map<String, Value>>,
    /// Raw top-level overrides applied last
    pub extra: Map<String, Value>,
    pub stream: bool,
}

impl ChatOptions {
    #[must_use]
    pub const fn temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    #[must_use]
    pub fn format(mut self, format: Format) -> Self {
        self.format = Some(format);
        self
    }

    #[must_use]
    pub fn tool(mut self, tool: ToolSpec) -> Self {
        self.tools.push(tool);
        self
    }

    #[must_use]
    pub const fn reasoning_effort(mut self, effort: ReasoningEffort) -> Self {
        self.reasoning_effort = Some(effort);
        self
    }

    #[must_use]
    pub const fn verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = Some(verbosity);
        self
    }

    #[must_use]
    pub fn thinking(mut self, thinking: Thinking) -> Self {
        self.thinking = Some(thinking);
        self
    }

    #[must_use]
    pub fn reasoning(mut self, reasoning: Map<String, Value>) -> Self {
        self.reasoning = Some(reasoning);
        self
    }

    #[must_use]
    pub fn text(mut self, text: Map<String, Value>) -> Self {
        self.text = Some(text);
        self
    }

    #[must_use]
    pub fn extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    #[must_use]
    pub const fn stream(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_named_formats() {
        assert_eq!("json".parse::<Format>().unwrap(), Format::Json);
        assert_eq!("text".parse::<Format>().unwrap(), Format::Text);
        let err = "yaml".parse::<Format>().unwrap_err();
        assert!(matches!(err, LlmError::InvalidFormat { value } if value == "yaml"));
    }

    #[test]
    fn invalid_effort_names_field_and_set() {
        let err = "extreme".parse::<ReasoningEffort>().unwrap_err();
        let LlmError::InvalidOption { field, value, valid } = err else {
            panic!("expected InvalidOption");
        };
        assert_eq!(field, "reasoning_effort");
        assert_eq!(value, "extreme");
        assert_eq!(valid, ["none", "low", "medium", "high"]);
    }

    #[test]
    fn verbosity_round_trips_names() {
        for name in Verbosity::VALID {
            assert_eq!(name.parse::<Verbosity>().unwrap().as_str(), *name);
        }
        assert!("none".parse::<Verbosity>().is_err());
    }

    #[test]
    fn schema_serializes_name_and_schema() {
        let schema = Schema::new("person", json!({"type": "object"})).with_description("A person");
        assert_eq!(
            schema.serialize(),
            json!({"name": "person", "description": "A person", "schema": {"type": "object"}})
        );
    }
}
