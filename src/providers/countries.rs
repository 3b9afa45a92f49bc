use super::util::fetch_body;
use crate::core::country::{CountryEntry, CountrySource};
use crate::core::source::{SourceError, SourceKind};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info, instrument};

const ORIGIN: SourceKind = SourceKind::Countries;

/// Client for a REST Countries v2 style `all` endpoint.
pub struct RestCountriesClient {
    url: String,
    timeout: Duration,
    retries: usize,
}

impl RestCountriesClient {
    pub fn new(url: &str, timeout: Duration) -> Self {
        RestCountriesClient {
            url: url.to_string(),
            timeout,
            retries: 0,
        }
    }

    pub fn with_retries(mut self, retries: usize) -> Self {
        self.retries = retries;
        self
    }
}

#[async_trait]
impl CountrySource for RestCountriesClient {
    #[instrument(name = "CountriesFetch", skip(self), fields(url = %self.url))]
    async fn fetch_all(&self) -> Result<Vec<CountryEntry>, SourceError> {
        let body = fetch_body(ORIGIN, &self.url, self.timeout, self.retries).await?;

        // Entries are decoded one at a time during the merge
        let countries: Vec<CountryEntry> = match serde_json::from_str(&body) {
            Ok(data) => data,
            Err(e) => {
                debug!(error = ?e, "Failed to parse countries response");
                return Err(SourceError::Format {
                    origin: ORIGIN,
                    detail: format!("failed to parse JSON response: {e}"),
                });
            }
        };

        info!("Successfully fetched {} countries", countries.len());
        Ok(countries)
    }
}
