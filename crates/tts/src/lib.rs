//! Speech synthesis endpoint adapter

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod client;
mod error;
mod types;

pub use client::Speech;
pub use error::{Result, TtsError};
pub use types::{AudioFormat, SpeechModel, SpeechRequest, SpeechResponse, Voice};
