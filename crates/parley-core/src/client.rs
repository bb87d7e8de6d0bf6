use std::time::Duration;

use http::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};
use parley_config::OpenAiConfig;
use reqwest::{Client, RequestBuilder, Response};
use secrecy::{ExposeSecret, SecretString};
use url::Url;

use crate::error::TransportError;

/// API version prefix for every endpoint path
pub const API_VERSION: &str = "v1";

// Header names must be lowercase for `HeaderName::from_static`
const ORGANIZATION_HEADER: &str = "openai-organization";
const PROJECT_HEADER: &str = "openai-project";

/// Vendor HTTP client with auth headers and timeout applied
///
/// Cheap to clone; clones share one connection pool.
#[derive(Debug, Clone)]
pub struct VendorClient {
    http: Client,
    base_url: Url,
}

impl VendorClient {
    /// Build a client from connection settings
    ///
    /// # Errors
    ///
    /// Returns `TransportError::Settings` if the host is not a URL or a
    /// header value contains invalid characters
    pub fn new(config: &OpenAiConfig) -> Result<Self, TransportError> {
        Self::with_key(config, config.api_key.as_ref())
    }

    /// Build a client authenticated with the organization admin key
    ///
    /// # Errors
    ///
    /// Returns `TransportError::Settings` if no admin key is configured, or
    /// for the same reasons as [`new`](Self::new)
    pub fn admin(config: &OpenAiConfig) -> Result<Self, TransportError> {
        let key = config
            .admin_api_key
            .as_ref()
            .filter(|key| !key.expose_secret().is_empty())
            .ok_or_else(|| TransportError::Settings("openai.admin_api_key is not set".to_owned()))?;
        Self::with_key(config, Some(key))
    }

    fn with_key(config: &OpenAiConfig, key: Option<&SecretString>) -> Result<Self, TransportError> {
        let base_url = Url::parse(config.host())
            .map_err(|e| TransportError::Settings(format!("invalid host '{}': {e}", config.host())))?;

        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .pool_idle_timeout(Some(Duration::from_secs(30)))
            .tcp_nodelay(true)
            .default_headers(default_headers(config, key)?)
            .build()
            .map_err(|e| TransportError::Settings(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, base_url })
    }

    /// Full URL of a versioned endpoint, e.g. `/responses`
    pub fn endpoint(&self, path: &str) -> String {
        let host = self.base_url.as_str().trim_end_matches('/');
        format!("{host}/{API_VERSION}{path}")
    }

    /// Start a POST request to a versioned endpoint
    pub fn post(&self, path: &str) -> RequestBuilder {
        self.http.post(self.endpoint(path))
    }

    /// Start a GET request to a versioned endpoint
    pub fn get(&self, path: &str) -> RequestBuilder {
        self.http.get(self.endpoint(path))
    }

    /// Send a request and reject non-2xx responses
    ///
    /// # Errors
    ///
    /// Returns `TransportError::Connection` when no response arrives and
    /// `TransportError::Http` with the body when the status is not 2xx
    pub async fn send(&self, request: RequestBuilder) -> Result<Response, TransportError> {
        let response = request.send().await.map_err(|e| {
            tracing::error!(error = %e, "vendor request failed");
            TransportError::Connection(e.to_string())
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        tracing::warn!(status = %status, "vendor returned error");

        Err(TransportError::Http {
            status: status.as_u16(),
            body,
        })
    }
}

fn default_headers(config: &OpenAiConfig, key: Option<&SecretString>) -> Result<HeaderMap, TransportError> {
    let mut headers = HeaderMap::new();

    if let Some(key) = key {
        let mut value = header_value(&format!("Bearer {}", key.expose_secret()))?;
        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);
    }
    if let Some(organization) = &config.organization {
        headers.insert(HeaderName::from_static(ORGANIZATION_HEADER), header_value(organization)?);
    }
    if let Some(project) = &config.project {
        headers.insert(HeaderName::from_static(PROJECT_HEADER), header_value(project)?);
    }

    Ok(headers)
}

fn header_value(value: &str) -> Result<HeaderValue, TransportError> {
    HeaderValue::try_from(value).map_err(|e| TransportError::Settings(format!("invalid header value: {e}")))
}
