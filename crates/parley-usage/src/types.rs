use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::error::{Result, UsageError};

/// Query for `GET /v1/organization/costs`
///
/// Times are Unix seconds. List parameters go on the wire joined by commas.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CostQuery {
    pub start_time: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<u64>,
    /// Bucket size, e.g. `1d`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bucket_width: Option<String>,
    #[serde(serialize_with = "comma_joined", skip_serializing_if = "Vec::is_empty")]
    pub project_ids: Vec<String>,
    #[serde(serialize_with = "comma_joined", skip_serializing_if = "Vec::is_empty")]
    pub group_by: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    /// Cursor from a previous page's `next_page`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<String>,
}

impl CostQuery {
    pub fn new(start_time: u64) -> Self {
        Self {
            start_time,
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn with_end_time(mut self, end_time: u64) -> Self {
        self.end_time = Some(end_time);
        self
    }

    #[must_use]
    pub fn with_bucket_width(mut self, width: impl Into<String>) -> Self {
        self.bucket_width = Some(width.into());
        self
    }

    #[must_use]
    pub fn with_project_ids<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.project_ids = ids.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_group_by<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.group_by = fields.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub const fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub fn with_page(mut self, cursor: impl Into<String>) -> Self {
        self.page = Some(cursor.into());
        self
    }

    /// Reject queries whose parameters cannot be encoded faithfully
    ///
    /// # Errors
    ///
    /// `InvalidQuery` when the range is empty, the limit is zero, or a list
    /// entry is blank or contains the comma separator
    pub fn validate(&self) -> Result<()> {
        if let Some(end_time) = self.end_time
            && end_time <= self.start_time
        {
            return Err(UsageError::InvalidQuery(format!(
                "end_time {end_time} must be after start_time {}",
                self.start_time
            )));
        }
        if self.limit == Some(0) {
            return Err(UsageError::InvalidQuery("limit must be greater than 0".to_owned()));
        }
        validate_list("project_ids", &self.project_ids)?;
        validate_list("group_by", &self.group_by)
    }
}

fn validate_list(name: &str, entries: &[String]) -> Result<()> {
    match entries.iter().find(|entry| entry.trim().is_empty() || entry.contains(',')) {
        Some(entry) => Err(UsageError::InvalidQuery(format!(
            "{name} entries must be non-empty and free of commas, got '{entry}'"
        ))),
        None => Ok(()),
    }
}

fn comma_joined<S: Serializer>(entries: &[String], serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&entries.join(","))
}

/// One page of cost buckets
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CostPage {
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub next_page: Option<String>,
    #[serde(default)]
    pub data: Vec<CostBucket>,
    /// Response body as received
    #[serde(skip)]
    pub raw: Value,
}

impl CostPage {
    /// Decode a response body, keeping it as `raw`
    ///
    /// # Errors
    ///
    /// `Decode` when the body is not a cost page
    pub fn from_wire(raw: Value) -> Result<Self> {
        let mut page: Self = serde_json::from_value(raw.clone()).map_err(|e| UsageError::Decode(e.to_string()))?;
        page.raw = raw;
        Ok(page)
    }

    /// Every result across all buckets, in bucket order
    pub fn results(&self) -> impl Iterator<Item = &CostResult> {
        self.data.iter().flat_map(|bucket| bucket.results.iter())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CostBucket {
    pub start_time: u64,
    pub end_time: u64,
    #[serde(default)]
    pub results: Vec<CostResult>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CostResult {
    #[serde(default)]
    pub amount: Option<CostAmount>,
    /// Set when grouped by `line_item`
    #[serde(default)]
    pub line_item: Option<String>,
    /// Set when grouped by `project_id`
    #[serde(default)]
    pub project_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CostAmount {
    pub value: f64,
    pub currency: String,
}
