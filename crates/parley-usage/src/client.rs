use parley_config::OpenAiConfig;
use parley_core::VendorClient;
use reqwest::header::ACCEPT;
use serde_json::Value;

use crate::error::{Result, UsageError};
use crate::types::{CostPage, CostQuery};

const COSTS_PATH: &str = "/organization/costs";

/// Organization cost client, authenticated with the admin key
#[derive(Debug, Clone)]
pub struct Costs {
    client: VendorClient,
}

impl Costs {
    pub const fn new(client: VendorClient) -> Self {
        Self { client }
    }

    /// Build a client using `openai.admin_api_key`
    ///
    /// # Errors
    ///
    /// `Settings` when no admin key is configured
    pub fn from_config(config: &OpenAiConfig) -> Result<Self> {
        Ok(Self::new(VendorClient::admin(config)?))
    }

    /// Fetch one page of costs
    ///
    /// # Errors
    ///
    /// `InvalidQuery` before any request is sent, transport errors verbatim,
    /// and `Decode` when the body is not a cost page
    pub async fn get(&self, query: &CostQuery) -> Result<CostPage> {
        query.validate()?;

        tracing::debug!(start_time = query.start_time, end_time = ?query.end_time, "fetching organization costs");

        let request = self.client.get(COSTS_PATH).header(ACCEPT, "application/json").query(query);
        let response = self.client.send(request).await?;
        let body: Value = response.json().await.map_err(|e| {
            tracing::error!(error = %e, "failed to parse cost response");
            UsageError::Decode(e.to_string())
        })?;

        CostPage::from_wire(body)
    }
}

#[cfg(test)]
mod tests {
    use secrecy::SecretString;

    use super::*;

    fn client() -> reqwest::Client {
        reqwest::Client::new()
    }

    fn encoded(query: &CostQuery) -> String {
        let request = client().get("http://localhost/v1/organization/costs").query(query).build().unwrap();
        request.url().query().unwrap_or_default().to_owned()
    }

    #[test]
    fn query_joins_lists_and_skips_unset_fields() {
        let query = CostQuery::new(1_739_112_382)
            .with_end_time(1_741_704_400)
            .with_project_ids(["proj_1234", "proj_5678"])
            .with_group_by(["project_id"])
            .with_limit(100);

        assert_eq!(
            encoded(&query),
            "start_time=1739112382&end_time=1741704400&project_ids=proj_1234%2Cproj_5678&group_by=project_id&limit=100"
        );
    }

    #[test]
    fn minimal_query_has_only_start_time() {
        assert_eq!(encoded(&CostQuery::new(42)), "start_time=42");
        assert_eq!(
            encoded(&CostQuery::new(42).with_bucket_width("1d").with_page("page_abc")),
            "start_time=42&bucket_width=1d&page=page_abc"
        );
    }

    #[test]
    fn from_config_needs_admin_key() {
        let mut config = OpenAiConfig {
            api_key: Some(SecretString::from("sk-test")),
            ..OpenAiConfig::default()
        };
        assert!(matches!(Costs::from_config(&config), Err(UsageError::Settings(_))));

        config.admin_api_key = Some(SecretString::from("sk-admin"));
        Costs::from_config(&config).unwrap();
    }
}
