use std::str::FromStr;

use serde_json::Value;

use crate::error::SttError;

/// Transcription model
pub const DEFAULT_MODEL: &str = "whisper-1";

/// Shape of the transcription response body
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TranscriptionFormat {
    #[default]
    Json,
    Text,
    Srt,
    Vtt,
    VerboseJson,
}

impl TranscriptionFormat {
    pub const VALID: &'static [&'static str] = &["json", "text", "srt", "vtt", "verbose_json"];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Text => "text",
            Self::Srt => "srt",
            Self::Vtt => "vtt",
            Self::VerboseJson => "verbose_json",
        }
    }

    /// Whether the vendor answers with a JSON object
    pub const fn is_json(self) -> bool {
        matches!(self, Self::Json | Self::VerboseJson)
    }
}

impl FromStr for TranscriptionFormat {
    type Err = SttError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "json" => Ok(Self::Json),
            "text" => Ok(Self::Text),
            "srt" => Ok(Self::Srt),
            "vtt" => Ok(Self::Vtt),
            "verbose_json" => Ok(Self::VerboseJson),
            _ => Err(SttError::InvalidFormat {
                value: value.to_owned(),
                valid: Self::VALID,
            }),
        }
    }
}

/// Audio to transcribe plus optional hints
#[derive(Debug, Clone)]
pub struct TranscriptionRequest {
    pub audio: Vec<u8>,
    /// Sent as the part filename; also used to guess the media type
    pub filename: String,
    pub model: Option<String>,
    /// ISO 639-1 language hint
    pub language: Option<String>,
    pub prompt: Option<String>,
    pub temperature: Option<f32>,
    pub format: Option<TranscriptionFormat>,
}

impl TranscriptionRequest {
    pub fn new(filename: impl Into<String>, audio: Vec<u8>) -> Self {
        Self {
            audio,
            filename: filename.into(),
            model: None,
            language: None,
            prompt: None,
            temperature: None,
            format: None,
        }
    }

    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    #[must_use]
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    #[must_use]
    pub const fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    #[must_use]
    pub const fn with_format(mut self, format: TranscriptionFormat) -> Self {
        self.format = Some(format);
        self
    }

    pub(crate) fn content_type(&self) -> String {
        mime_guess::from_path(&self.filename)
            .first_or_octet_stream()
            .essence_str()
            .to_owned()
    }
}

/// Transcribed text
///
/// `raw` holds the full JSON body for JSON formats (segments and words for
/// `verbose_json`).
#[derive(Debug, Clone, PartialEq)]
pub struct Transcription {
    pub text: String,
    pub raw: Option<Value>,
}
