//! Connection settings pointed at a mock vendor

use parley_config::{OpenAiConfig, WireFormat};
use secrecy::SecretString;

pub const API_KEY: &str = "sk-test";
pub const ADMIN_API_KEY: &str = "sk-admin-test";
pub const ORGANIZATION: &str = "org-test";

/// Settings for a mock vendor at `host` speaking `format`
pub fn openai(host: &str, format: WireFormat) -> OpenAiConfig {
    OpenAiConfig {
        api_key: Some(SecretString::from(API_KEY)),
        admin_api_key: Some(SecretString::from(ADMIN_API_KEY)),
        host: Some(host.to_owned()),
        organization: Some(ORGANIZATION.to_owned()),
        timeout: 5,
        wire_format: format,
        ..OpenAiConfig::default()
    }
}
