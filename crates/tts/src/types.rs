use std::str::FromStr;

use bytes::Bytes;

use crate::error::TtsError;

macro_rules! wire_enum {
    ($(#[$meta:meta])* $name:ident, $field:literal, default = $default:ident, { $($variant:ident => $wire:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum $name {
            $(
                #[doc = $wire]
                $variant,
            )+
        }

        impl $name {
            pub const DEFAULT: Self = Self::$default;
            pub const VALID: &'static [&'static str] = &[$($wire),+];

            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $wire,)+
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::DEFAULT
            }
        }

        impl FromStr for $name {
            type Err = TtsError;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                match value {
                    $($wire => Ok(Self::$variant),)+
                    _ => Err(TtsError::InvalidOption {
                        field: $field,
                        value: value.to_owned(),
                        valid: Self::VALID,
                    }),
                }
            }
        }
    };
}

wire_enum!(
    /// Speech model
    SpeechModel, "model", default = Tts1Hd, {
        Tts1 => "tts-1",
        Tts1Hd => "tts-1-hd",
    }
);

wire_enum!(
    /// Built-in voice
    Voice, "voice", default = Alloy, {
        Alloy => "alloy",
        Echo => "echo",
        Fable => "fable",
        Nova => "nova",
        Onyx => "onyx",
        Shimmer => "shimmer",
    }
);

wire_enum!(
    /// Encoding of the returned audio
    AudioFormat, "response_format", default = Aac, {
        Aac => "aac",
        Mp3 => "mp3",
        Flac => "flac",
        Opus => "opus",
        Pcm => "pcm",
        Wav => "wav",
    }
);

impl AudioFormat {
    /// Media type for audio in this format
    pub fn content_type(self) -> String {
        mime_guess::from_ext(self.as_str())
            .first_or_octet_stream()
            .essence_str()
            .to_owned()
    }
}

/// Speech synthesis request
///
/// Unset fields come from `speak_defaults`, then from the built-in defaults
/// (`tts-1-hd`, `alloy`, `aac`).
#[derive(Debug, Clone, PartialEq)]
pub struct SpeechRequest {
    pub input: String,
    pub model: Option<SpeechModel>,
    pub voice: Option<Voice>,
    pub format: Option<AudioFormat>,
    /// Playback speed between 0.25 and 4.0
    pub speed: Option<f64>,
}

impl SpeechRequest {
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            model: None,
            voice: None,
            format: None,
            speed: None,
        }
    }

    #[must_use]
    pub const fn with_model(mut self, model: SpeechModel) -> Self {
        self.model = Some(model);
        self
    }

    #[must_use]
    pub const fn with_voice(mut self, voice: Voice) -> Self {
        self.voice = Some(voice);
        self
    }

    #[must_use]
    pub const fn with_format(mut self, format: AudioFormat) -> Self {
        self.format = Some(format);
        self
    }

    #[must_use]
    pub const fn with_speed(mut self, speed: f64) -> Self {
        self.speed = Some(speed);
        self
    }
}

/// Synthesized audio
#[derive(Debug, Clone)]
pub struct SpeechResponse {
    pub audio: Bytes,
    pub content_type: String,
}
