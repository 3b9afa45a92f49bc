//! Exchange rate abstractions

use super::source::SourceError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// How long a fetched snapshot may be served before it must be refetched.
pub const DEFAULT_RATE_TTL: Duration = Duration::from_secs(60 * 60);

/// Rates of every known currency against a single base currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateSnapshot {
    pub base: String,
    pub rates: HashMap<String, f64>,
    pub fetched_at: DateTime<Utc>,
}

impl RateSnapshot {
    pub fn new(base: impl Into<String>, rates: HashMap<String, f64>) -> Self {
        Self {
            base: base.into(),
            rates,
            fetched_at: Utc::now(),
        }
    }

    pub fn rate_for(&self, code: &str) -> Option<f64> {
        self.rates.get(code).copied()
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

/// A source that always goes to the network.
#[async_trait]
pub trait RateSource: Send + Sync {
    async fn fetch(&self) -> Result<RateSnapshot, SourceError>;
}

/// Hands out a snapshot that is still inside its validity window.
#[async_trait]
pub trait RateProvider: Send + Sync {
    async fn valid_rates(&self) -> Result<Arc<RateSnapshot>, SourceError>;
}
