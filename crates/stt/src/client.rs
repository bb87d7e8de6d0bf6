use parley_config::OpenAiConfig;
use parley_core::VendorClient;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{Result, SttError};
use crate::types::{DEFAULT_MODEL, Transcription, TranscriptionFormat, TranscriptionRequest};

const TRANSCRIPTIONS_PATH: &str = "/audio/transcriptions";

#[derive(Deserialize)]
struct TranscriptionBody {
    text: String,
}

/// Transcription endpoint client
#[derive(Debug, Clone)]
pub struct Transcriber {
    client: VendorClient,
    defaults: Map<String, Value>,
}

impl Transcriber {
    pub fn new(client: VendorClient) -> Self {
        Self {
            client,
            defaults: Map::new(),
        }
    }

    pub fn from_config(config: &OpenAiConfig) -> Result<Self> {
        Ok(Self::new(VendorClient::new(config)?).with_defaults(config.transcribe_defaults.clone()))
    }

    /// Fields merged under every form
    #[must_use]
    pub fn with_defaults(mut self, defaults: Map<String, Value>) -> Self {
        self.defaults = defaults;
        self
    }

    /// Text form fields for `request` and the response format they select
    ///
    /// Request fields win over configured defaults. `response_format` falls
    /// back to `json` when neither sets it.
    pub fn fields(&self, request: &TranscriptionRequest) -> Result<(Vec<(String, String)>, TranscriptionFormat)> {
        let mut fields: Map<String, Value> = Map::new();
        fields.insert("model".to_owned(), Value::from(DEFAULT_MODEL));
        fields.extend(self.defaults.clone());

        if let Some(model) = &request.model {
            fields.insert("model".to_owned(), Value::from(model.as_str()));
        }
        if let Some(language) = &request.language {
            fields.insert("language".to_owned(), Value::from(language.as_str()));
        }
        if let Some(prompt) = &request.prompt {
            fields.insert("prompt".to_owned(), Value::from(prompt.as_str()));
        }
        if let Some(temperature) = request.temperature {
            fields.insert("temperature".to_owned(), Value::from(f64::from(temperature)));
        }

        let format = match (request.format, fields.get("response_format").and_then(Value::as_str)) {
            (Some(format), _) => format,
            (None, Some(configured)) => configured.parse()?,
            (None, None) => TranscriptionFormat::default(),
        };
        fields.insert("response_format".to_owned(), Value::from(format.as_str()));

        let fields = fields
            .into_iter()
            .filter(|(_, value)| !value.is_null())
            .map(|(name, value)| form_value(&name, value).map(|value| (name, value)))
            .collect::<Result<Vec<_>>>()?;

        Ok((fields, format))
    }

    /// Upload audio and return its transcription
    pub async fn transcribe(&self, request: TranscriptionRequest) -> Result<Transcription> {
        let (fields, format) = self.fields(&request)?;
        let content_type = request.content_type();

        tracing::debug!(
            bytes = request.audio.len(),
            filename = %request.filename,
            format = format.as_str(),
            "sending transcription request"
        );

        let file = Part::bytes(request.audio)
            .file_name(request.filename)
            .mime_str(&content_type)
            .map_err(|e| SttError::InvalidContentType(e.to_string()))?;
        let form = fields
            .into_iter()
            .fold(Form::new().part("file", file), |form, (name, value)| form.text(name, value));

        let response = self.client.send(self.client.post(TRANSCRIPTIONS_PATH).multipart(form)).await?;

        let transcription = if format.is_json() {
            let raw: Value = response.json().await.map_err(|e| {
                tracing::error!(error = %e, "failed to parse transcription response");
                SttError::Decode(e.to_string())
            })?;
            let body = TranscriptionBody::deserialize(&raw).map_err(|e| SttError::Decode(e.to_string()))?;
            Transcription {
                text: body.text,
                raw: Some(raw),
            }
        } else {
            let text = response.text().await.map_err(|e| SttError::Decode(e.to_string()))?;
            Transcription { text, raw: None }
        };

        tracing::debug!(chars = transcription.text.len(), "transcription complete");

        Ok(transcription)
    }
}

fn form_value(name: &str, value: Value) -> Result<String> {
    match value {
        Value::String(text) => Ok(text),
        Value::Number(number) => Ok(number.to_string()),
        Value::Bool(flag) => Ok(flag.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => Err(SttError::InvalidDefault(name.to_owned())),
    }
}
