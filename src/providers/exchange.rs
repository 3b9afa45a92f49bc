use super::util::fetch_body;
use crate::core::rates::{RateSnapshot, RateSource};
use crate::core::source::{SourceError, SourceKind};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info, instrument};

const ORIGIN: SourceKind = SourceKind::Exchange;

/// Client for an open.er-api.com style `latest` endpoint.
pub struct ExchangeRateClient {
    url: String,
    timeout: Duration,
    retries: usize,
}

impl ExchangeRateClient {
    pub fn new(url: &str, timeout: Duration) -> Self {
        ExchangeRateClient {
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

#[derive(Debug, Deserialize)]
struct ExchangeResponse {
    #[serde(alias = "base")]
    base_code: Option<String>,
    rates: Option<HashMap<String, Value>>,
}

#[async_trait]
impl RateSource for ExchangeRateClient {
    #[instrument(name = "ExchangeRatesFetch", skip(self), fields(url = %self.url))]
    async fn fetch(&self) -> Result<RateSnapshot, SourceError> {
        let body = fetch_body(ORIGIN, &self.url, self.timeout, self.retries).await?;

        let data: ExchangeResponse =
            serde_json::from_str(&body).map_err(|e| SourceError::Format {
                origin: ORIGIN,
                detail: format!("failed to parse JSON response: {e}"),
            })?;

        let rates = data.rates.ok_or_else(|| SourceError::Format {
            origin: ORIGIN,
            detail: "response has no rates".to_string(),
        })?;

        let rates: HashMap<String, f64> = rates
            .into_iter()
            .filter_map(|(code, value)| match value.as_f64() {
                Some(rate) if rate.is_finite() && rate > 0.0 => Some((code, rate)),
                _ => {
                    debug!("Dropping unusable rate {} for {}", value, code);
                    None
                }
            })
            .collect();

        info!("Successfully fetched {} exchange rates", rates.len());
        Ok(RateSnapshot::new(
            data.base_code.unwrap_or_else(|| "USD".to_string()),
            rates,
        ))
    }
}
