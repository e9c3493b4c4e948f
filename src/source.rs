//! Record sources.
//!
//! A [RecordSource] executes a [SoqlQuery] and returns the matching records. The
//! [SocrataClient] implementation talks to a Socrata open data endpoint over HTTP.

use crate::error::DashboardError;
use crate::metrics::{UPSTREAM_RECORDS, UPSTREAM_REQUESTS};
use crate::models::{FilterMap, Record};
use crate::query::SoqlQuery;

use async_trait::async_trait;
use url::Url;

/// Header used by Socrata to identify an application and raise its rate limits.
static HEADER_APP_TOKEN: &str = "X-App-Token";

/// Record source trait.
///
/// Defines the interface between the views and the remote API.
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Ceiling applied to the number of records of every query.
    fn record_limit(&self) -> usize;

    /// Execute a query.
    ///
    /// Returns the records matching the query.
    ///
    /// # Arguments
    ///
    /// * `query`: The query to execute
    async fn fetch(&self, query: &SoqlQuery) -> Result<Vec<Record>, DashboardError>;

    /// Fetch records matching user filters.
    ///
    /// # Arguments
    ///
    /// * `filters`: Filters selected by the user
    async fn fetch_filtered(&self, filters: &FilterMap) -> Result<Vec<Record>, DashboardError> {
        let query = SoqlQuery::from_filters(filters, self.record_limit());
        self.fetch(&query).await
    }
}

/// Socrata HTTP client.
///
/// Implements [RecordSource] for a Socrata resource endpoint.
#[derive(Debug)]
pub struct SocrataClient {
    reqwest_client: reqwest::Client,
    /// Resource endpoint, e.g. `https://www.datos.gov.co/resource/qijw-htwa.json`
    base_url: Url,
    /// Optional application token
    app_token: Option<String>,
    record_limit: usize,
}

impl SocrataClient {
    /// Create a new Socrata client.
    ///
    /// # Arguments
    ///
    /// * `base_url`: Resource endpoint URL
    /// * `app_token`: Optional application token sent with every request
    /// * `record_limit`: Ceiling applied to the number of records of every query
    pub fn new(base_url: Url, app_token: Option<String>, record_limit: usize) -> Self {
        Self {
            reqwest_client: reqwest::Client::new(),
            base_url,
            app_token,
            record_limit,
        }
    }

    /// Returns the resource endpoint URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    async fn send(&self, url: &Url) -> Result<Vec<Record>, DashboardError> {
        let request = self.reqwest_client.get(url.as_str());
        let request = if let Some(token) = &self.app_token {
            request.header(HEADER_APP_TOKEN, token)
        } else {
            request
        };
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await?;
            return Err(DashboardError::UpstreamStatus {
                status: status.as_u16(),
                body,
            });
        }
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait]
impl RecordSource for SocrataClient {
    fn record_limit(&self) -> usize {
        self.record_limit
    }

    #[tracing::instrument(level = "DEBUG", skip(self, query))]
    async fn fetch(&self, query: &SoqlQuery) -> Result<Vec<Record>, DashboardError> {
        let url = query.to_url(&self.base_url);
        tracing::debug!("Fetching {}", url);
        let result = self.send(&url).await;
        let outcome = match &result {
            Ok(records) => {
                tracing::debug!("Received {} records", records.len());
                UPSTREAM_RECORDS.inc_by(records.len() as u64);
                "ok"
            }
            Err(DashboardError::UpstreamStatus { .. }) => "http_error",
            Err(DashboardError::UpstreamDecode(_)) => "decode_error",
            Err(_) => "transport_error",
        };
        UPSTREAM_REQUESTS.with_label_values(&[outcome]).inc();
        result
    }
}
