//! Transcription endpoint adapter

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod client;
mod error;
mod types;

pub use client::Transcriber;
pub use error::{Result, SttError};
pub use types::{DEFAULT_MODEL, Transcription, TranscriptionFormat, TranscriptionRequest};
