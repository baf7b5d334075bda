//! Shelterluv animal listing client.
//!
//! # Responsibility
//! - Define the paged `AnimalSource` seam the ingestion job consumes.
//! - Implement it over the Shelterluv v1 REST API.
//!
//! # Invariants
//! - The API key is sent only as the `X-API-Key` header and never logged.
//! - Non-2xx responses and undecodable bodies are errors, never empty pages.
//! - The listing is requested unfiltered so adopted animals come back with
//!   their new status.

use super::IngestError;
use log::{debug, warn};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

/// Default Shelterluv host.
pub const DEFAULT_API_BASE_URL: &str = "https://www.shelterluv.com";
/// Largest page the listing endpoint serves.
pub const MAX_PAGE_SIZE: u32 = 100;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// One animal as returned by the remote listing. Field names follow the API.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RemoteAnimal {
    #[serde(rename = "Internal-ID", default)]
    pub internal_id: Option<Value>,
    #[serde(rename = "Name", default)]
    pub name: Option<String>,
    #[serde(rename = "Type", default)]
    pub species: Option<String>,
    #[serde(rename = "Sex", default)]
    pub sex: Option<String>,
    #[serde(rename = "Color", default)]
    pub color: Option<String>,
    #[serde(rename = "Pattern", default)]
    pub pattern: Option<String>,
    #[serde(rename = "CoverPhoto", default)]
    pub cover_photo: Option<String>,
    #[serde(rename = "LastIntakeUnixTime", default)]
    pub last_intake_unix_time: Option<Value>,
    #[serde(rename = "Status", default)]
    pub status: Option<String>,
    #[serde(rename = "InFoster", default)]
    pub in_foster: Option<bool>,
}

/// One page of the remote listing.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AnimalPage {
    #[serde(default)]
    pub animals: Vec<RemoteAnimal>,
    pub has_more: bool,
    #[serde(default)]
    pub total_count: Option<u64>,
}

impl AnimalPage {
    /// Decodes a listing response body.
    pub fn from_json(body: &str) -> Result<Self, IngestError> {
        serde_json::from_str(body).map_err(|err| {
            IngestError::Malformed(format!("unexpected animal listing response: {err}"))
        })
    }
}

/// Paged source of remote animal records.
pub trait AnimalSource {
    /// Fetches up to `limit` animals starting at `offset`.
    fn fetch_page(&self, offset: u32, limit: u32) -> Result<AnimalPage, IngestError>;
    /// Source name for log events.
    fn name(&self) -> &'static str;
}

/// Blocking HTTP client for the Shelterluv animal listing.
pub struct ShelterluvClient {
    api_base_url: String,
    api_key: String,
    http_client: reqwest::blocking::Client,
}

impl ShelterluvClient {
    /// Builds a client against `api_base_url`.
    ///
    /// # Errors
    /// Returns `IngestError::Http` when the key or URL is blank or the HTTP
    /// client cannot be initialized.
    pub fn new(
        api_base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Result<Self, IngestError> {
        let api_base_url = api_base_url.into().trim().trim_end_matches('/').to_string();
        let api_key = api_key.into();
        if api_base_url.is_empty() {
            return Err(IngestError::Http {
                status: None,
                message: "api base url must not be empty".to_string(),
            });
        }
        if api_key.trim().is_empty() {
            return Err(IngestError::Http {
                status: None,
                message: "api key must not be empty".to_string(),
            });
        }

        let http_client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|err| IngestError::Http {
                status: None,
                message: err.to_string(),
            })?;

        Ok(Self {
            api_base_url,
            api_key,
            http_client,
        })
    }

    /// Listing endpoint URL.
    pub fn animals_url(&self) -> String {
        format!("{}/api/v1/animals", self.api_base_url)
    }
}

impl AnimalSource for ShelterluvClient {
    fn fetch_page(&self, offset: u32, limit: u32) -> Result<AnimalPage, IngestError> {
        let limit = limit.clamp(1, MAX_PAGE_SIZE);
        debug!("event=animals_fetch module=ingest status=start offset={offset} limit={limit}");

        let response = self
            .http_client
            .get(self.animals_url())
            .header("X-API-Key", self.api_key.as_str())
            .header("Accept", "application/json")
            .query(&page_query(offset, limit))
            .send()
            .map_err(|err| IngestError::Http {
                status: err.status().map(|status| status.as_u16()),
                message: err.to_string(),
            })?;

        let status = response.status();
        let body = response.text().map_err(|err| IngestError::Http {
            status: Some(status.as_u16()),
            message: err.to_string(),
        })?;
        if !status.is_success() {
            warn!(
                "event=animals_fetch module=ingest status=error http_status={} offset={offset}",
                status.as_u16()
            );
            return Err(IngestError::Http {
                status: Some(status.as_u16()),
                message: truncate(&body, 200),
            });
        }

        AnimalPage::from_json(&body)
    }

    fn name(&self) -> &'static str {
        "shelterluv"
    }
}

/// Query pairs for one listing page. No status filter is applied.
fn page_query(offset: u32, limit: u32) -> [(&'static str, String); 2] {
    [("offset", offset.to_string()), ("limit", limit.to_string())]
}

fn truncate(value: &str, max_chars: usize) -> String {
    let mut truncated = value.chars().take(max_chars).collect::<String>();
    if value.chars().count() > max_chars {
        truncated.push_str("...");
    }
    truncated
}
