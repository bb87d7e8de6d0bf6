//! Configuration for parley
//!
//! The configuration is an explicit value: it is loaded once (from TOML or
//! the environment) and handed to client constructors by reference.

#![allow(clippy::must_use_candidate)]

mod env;
mod loader;
pub mod openai;
pub mod telemetry;

use serde::Deserialize;

pub use openai::{CapabilityOverride, DEFAULT_HOST, OpenAiConfig, WireFormat};
pub use telemetry::TelemetryConfig;

/// Top-level parley configuration
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Vendor connection and request defaults
    #[serde(default)]
    pub openai: OpenAiConfig,
    /// Logging configuration
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}
