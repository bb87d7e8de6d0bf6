use parley_config::OpenAiConfig;
use parley_core::VendorClient;
use serde_json::{Map, Value, json};

use crate::error::{Result, TtsError};
use crate::types::{AudioFormat, SpeechModel, SpeechRequest, SpeechResponse, Voice};

const SPEECH_PATH: &str = "/audio/speech";

/// Speech synthesis endpoint client
#[derive(Debug, Clone)]
pub struct Speech {
    client: VendorClient,
    defaults: Map<String, Value>,
}

impl Speech {
    pub fn new(client: VendorClient) -> Self {
        Self {
            client,
            defaults: Map::new(),
        }
    }

    pub fn from_config(config: &OpenAiConfig) -> Result<Self> {
        Ok(Self::new(VendorClient::new(config)?).with_defaults(config.speak_defaults.clone()))
    }

    /// Keys merged under every payload
    #[must_use]
    pub fn with_defaults(mut self, defaults: Map<String, Value>) -> Self {
        self.defaults = defaults;
        self
    }

    /// Request body for `request`
    ///
    /// Explicit request fields win over configured defaults, which win over
    /// the built-in model, voice and format.
    pub fn payload(&self, request: &SpeechRequest) -> Result<Value> {
        if request.input.is_empty() {
            return Err(TtsError::EmptyInput);
        }
        if let Some(speed) = request.speed
            && !(0.25..=4.0).contains(&speed)
        {
            return Err(TtsError::InvalidSpeed(speed));
        }

        let mut body = Map::new();
        body.insert("model".to_owned(), json!(SpeechModel::DEFAULT.as_str()));
        body.insert("voice".to_owned(), json!(Voice::DEFAULT.as_str()));
        body.insert("response_format".to_owned(), json!(AudioFormat::DEFAULT.as_str()));
        body.extend(self.defaults.clone());

        body.insert("input".to_owned(), json!(request.input));
        if let Some(model) = request.model {
            body.insert("model".to_owned(), json!(model.as_str()));
        }
        if let Some(voice) = request.voice {
            body.insert("voice".to_owned(), json!(voice.as_str()));
        }
        if let Some(format) = request.format {
            body.insert("response_format".to_owned(), json!(format.as_str()));
        }
        if let Some(speed) = request.speed {
            body.insert("speed".to_owned(), json!(speed));
        }

        body.retain(|_, value| !value.is_null());
        Ok(Value::Object(body))
    }

    /// Synthesize speech and return the raw audio
    pub async fn synthesize(&self, request: &SpeechRequest) -> Result<SpeechResponse> {
        let body = self.payload(request)?;
        let format = body["response_format"]
            .as_str()
            .and_then(|format| format.parse::<AudioFormat>().ok())
            .unwrap_or_default();

        tracing::debug!(model = %body["model"], voice = %body["voice"], input_len = request.input.len(), "sending speech request");

        let response = self.client.send(self.client.post(SPEECH_PATH).json(&body)).await?;

        let content_type = response
            .headers()
            .get(http::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map_or_else(|| format.content_type(), str::to_owned);

        let audio = response.bytes().await.map_err(|e| {
            tracing::error!(error = %e, "failed to read speech response body");
            TtsError::Connection(e.to_string())
        })?;

        tracing::debug!(bytes = audio.len(), "speech synthesis complete");

        Ok(SpeechResponse { audio, content_type })
    }
}
