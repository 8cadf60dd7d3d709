//! Socrata SODA CSV page source.
//!
//! Issues one `GET` per [`SoqlQuery`] against a dataset's `.csv` resource
//! endpoint using the `$select`, `$where`, `$order`, `$limit`, and `$offset`
//! query parameters, and decodes the CSV body into an [`IncidentTable`].

use std::time::Duration;

use async_trait::async_trait;
use crime_dash_incident_models::IncidentTable;
use crime_dash_source_models::SoqlQuery;

use crate::parsing::decode_csv;
use crate::retry::{self, RetryPolicy};
use crate::{PageSource, SourceError};

/// Per-request timeout. Pages of 50,000 rows can take a while to stream.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// A [`PageSource`] backed by a Socrata CSV resource endpoint.
#[derive(Debug, Clone)]
pub struct SocrataCsvSource {
    client: reqwest::Client,
    /// Resource URL (e.g. `"https://data.cityofchicago.org/resource/ijzp-q8t2.csv"`).
    api_url: String,
    retry: RetryPolicy,
}

impl SocrataCsvSource {
    /// Creates a source for the given resource URL with the default retry
    /// policy.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Unavailable`] if the HTTP client cannot be
    /// constructed.
    pub fn new(api_url: &str) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            api_url: api_url.to_string(),
            retry: RetryPolicy::default(),
        })
    }

    /// Replaces the retry policy.
    #[must_use]
    pub const fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// The resource URL requests are sent to.
    #[must_use]
    pub fn api_url(&self) -> &str {
        &self.api_url
    }
}

#[async_trait]
impl PageSource for SocrataCsvSource {
    async fn fetch_page(&self, query: &SoqlQuery) -> Result<IncidentTable, SourceError> {
        if query.select.is_empty() {
            return Err(SourceError::InvalidQuery {
                message: "column selection must not be empty".to_string(),
            });
        }

        let params = query.to_params();
        log::debug!("GET {} {params:?}", self.api_url);

        let body = retry::send_text(
            || self.client.get(&self.api_url).query(&params),
            &self.retry,
        )
        .await?;

        if body.trim().is_empty() {
            return Err(SourceError::Unavailable {
                message: format!("empty response body from {}", self.api_url),
            });
        }

        decode_csv(body.as_bytes(), &query.select, &self.api_url).map_err(|e| match e {
            SourceError::Csv(e) => SourceError::Unavailable {
                message: format!("malformed CSV from {}: {e}", self.api_url),
            },
            other => other,
        })
    }
}
