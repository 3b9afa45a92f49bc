//! Refresh pipeline: fetch both sources, merge every country, persist each record.
//!
//! Source failures abort the run before anything is written. Merge and persist
//! failures are isolated per country and reported in [`RefreshSummary::errors`].

use super::country::{CountryEntry, CountrySource};
use super::merge::{self, CountryRecord};
use super::rates::{RateProvider, RateSnapshot};
use super::source::{SourceError, SourceKind};
use crate::store::CountryStore;
use chrono::{DateTime, Utc};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{error, info, instrument, warn};

#[derive(Debug, Error)]
pub enum RefreshError {
    #[error("External data source unavailable: could not fetch data from {origin} API")]
    SourceUnavailable {
        origin: SourceKind,
        #[source]
        cause: SourceError,
    },
}

/// A country that was left out of the run.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum RecordError {
    #[error("failed to process {name}: {detail}")]
    Processing { name: String, detail: String },

    #[error("failed to save {name}: database error: {detail}")]
    Persistence { name: String, detail: String },
}

impl RecordError {
    pub fn name(&self) -> &str {
        match self {
            RecordError::Processing { name, .. } | RecordError::Persistence { name, .. } => name,
        }
    }

    pub fn detail(&self) -> &str {
        match self {
            RecordError::Processing { detail, .. } | RecordError::Persistence { detail, .. } => {
                detail
            }
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RefreshSummary {
    pub total_processed: usize,
    pub saved: usize,
    pub updated: usize,
    pub errors: Vec<RecordError>,
    pub completed_at: DateTime<Utc>,
}

impl RefreshSummary {
    /// Some countries were skipped. The rest were still written.
    pub fn is_partial(&self) -> bool {
        !self.errors.is_empty()
    }
}

pub struct Refresher {
    rates: Arc<dyn RateProvider>,
    countries: Arc<dyn CountrySource>,
    store: Arc<dyn CountryStore>,
    rng: Mutex<StdRng>,
}

impl Refresher {
    pub fn new(
        rates: Arc<dyn RateProvider>,
        countries: Arc<dyn CountrySource>,
        store: Arc<dyn CountryStore>,
    ) -> Self {
        Self {
            rates,
            countries,
            store,
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Replaces the entropy seeded generator used for GDP multipliers.
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = Mutex::new(rng);
        self
    }

    #[instrument(name = "RefreshAll", skip(self))]
    pub async fn refresh_all(&self) -> Result<RefreshSummary, RefreshError> {
        info!("Starting countries refresh");

        let rates = self.rates.valid_rates().await.map_err(|cause| {
            error!(error = %cause, "Failed to fetch exchange rates");
            RefreshError::SourceUnavailable {
                origin: SourceKind::Exchange,
                cause,
            }
        })?;
        info!("Using {} exchange rates", rates.len());

        let raw_countries = self.countries.fetch_all().await.map_err(|cause| {
            error!(error = %cause, "Failed to fetch countries");
            RefreshError::SourceUnavailable {
                origin: SourceKind::Countries,
                cause,
            }
        })?;
        info!("Fetched {} countries", raw_countries.len());

        let mut errors = Vec::new();
        let merged = self.merge_all(&raw_countries, &rates, &mut errors).await;

        let mut saved = 0;
        let mut updated = 0;
        for record in &merged {
            match self.store.upsert(record).await {
                Ok(outcome) if outcome.created => saved += 1,
                Ok(_) => updated += 1,
                Err(e) => {
                    warn!(country = %record.name, error = %e, "Failed to save country");
                    errors.push(RecordError::Persistence {
                        name: record.name.clone(),
                        detail: e.to_string(),
                    });
                }
            }
        }

        info!("Database update: {} new, {} updated", saved, updated);
        if !errors.is_empty() {
            warn!("{} errors occurred during refresh", errors.len());
        }

        Ok(RefreshSummary {
            total_processed: merged.len(),
            saved,
            updated,
            errors,
            completed_at: Utc::now(),
        })
    }

    async fn merge_all(
        &self,
        raw_countries: &[CountryEntry],
        rates: &RateSnapshot,
        errors: &mut Vec<RecordError>,
    ) -> Vec<CountryRecord> {
        let now = Utc::now();
        let mut rng = self.rng.lock().await;

        let mut merged = Vec::with_capacity(raw_countries.len());
        for entry in raw_countries {
            match merge_one(entry, rates, &mut *rng, now) {
                Ok(record) => merged.push(record),
                Err(e) => {
                    warn!(country = %e.name(), error = %e, "Failed to process country");
                    errors.push(e);
                }
            }
        }
        merged
    }
}

const UNNAMED: &str = "<unnamed>";

fn merge_one(
    entry: &CountryEntry,
    rates: &RateSnapshot,
    rng: &mut StdRng,
    now: DateTime<Utc>,
) -> Result<CountryRecord, RecordError> {
    let raw = entry.parse().map_err(|e| RecordError::Processing {
        name: entry.name().unwrap_or(UNNAMED).to_string(),
        detail: format!("malformed country entry: {e}"),
    })?;
    if raw.name.trim().is_empty() {
        return Err(RecordError::Processing {
            name: raw.name.clone(),
            detail: "country name is empty".to_string(),
        });
    }
    Ok(merge::merge(&raw, rates, rng, now))
}
