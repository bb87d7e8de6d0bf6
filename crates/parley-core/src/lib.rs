//! Vendor HTTP plumbing shared by the chat, embeddings, speech and
//! transcription crates

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod client;
mod error;

pub use client::{API_VERSION, VendorClient};
pub use error::TransportError;
