pub mod disk;
pub mod memory;

pub use disk::DiskStore;
pub use memory::MemoryStore;

use crate::core::merge::CountryRecord;
use crate::core::query::{CountryQuery, SortOrder};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const MAX_NAME_LEN: usize = 255;
const MAX_CAPITAL_LEN: usize = 255;
const MAX_REGION_LEN: usize = 255;
const MAX_CURRENCY_CODE_LEN: usize = 10;
const MAX_FLAG_URL_LEN: usize = 500;
// DECIMAL(15, 6) and DECIMAL(20, 2)
const MAX_EXCHANGE_RATE: f64 = 1e9;
const MAX_ESTIMATED_GDP: f64 = 1e18;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("name must not be empty")]
    EmptyName,

    #[error("{field} is {actual} characters long, limit is {limit}")]
    FieldTooLong {
        field: &'static str,
        limit: usize,
        actual: usize,
    },

    #[error("{field} value {value} is out of range")]
    OutOfRange { field: &'static str, value: f64 },

    #[error("storage backend error: {0}")]
    Backend(#[from] fjall::Error),

    #[error("failed to encode row: {0}")]
    Codec(#[from] serde_json::Error),

    #[error("failed to prepare storage directory: {0}")]
    Io(#[from] std::io::Error),
}

/// A persisted country with its audit timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryRow {
    #[serde(flatten)]
    pub record: CountryRecord,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CountryRow {
    pub(crate) fn created(record: CountryRecord, now: DateTime<Utc>) -> Self {
        Self {
            record,
            created_at: now,
            updated_at: now,
        }
    }

    pub(crate) fn updated(self, record: CountryRecord, now: DateTime<Utc>) -> Self {
        Self {
            record,
            created_at: self.created_at,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpsertOutcome {
    pub created: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreStatus {
    pub total_countries: usize,
    pub last_refreshed_at: Option<DateTime<Utc>>,
}

#[async_trait]
pub trait CountryStore: Send + Sync {
    /// Inserts the record, or replaces the row with the same name.
    async fn upsert(&self, record: &CountryRecord) -> Result<UpsertOutcome, StoreError>;

    async fn get(&self, name: &str) -> Result<Option<CountryRow>, StoreError>;

    async fn list(&self, query: &CountryQuery) -> Result<Vec<CountryRow>, StoreError>;

    /// Returns whether a row existed.
    async fn delete(&self, name: &str) -> Result<bool, StoreError>;

    async fn status(&self) -> Result<StoreStatus, StoreError>;

    async fn top_by_gdp(&self, limit: usize) -> Result<Vec<CountryRow>, StoreError> {
        let query = CountryQuery {
            sort: SortOrder::GdpDesc,
            ..CountryQuery::default()
        };
        let mut rows = self.list(&query).await?;
        rows.truncate(limit);
        Ok(rows)
    }
}

fn check_len(field: &'static str, value: Option<&str>, limit: usize) -> Result<(), StoreError> {
    match value.map(|v| v.chars().count()) {
        Some(actual) if actual > limit => Err(StoreError::FieldTooLong {
            field,
            limit,
            actual,
        }),
        _ => Ok(()),
    }
}

fn check_range(field: &'static str, value: f64, max: f64) -> Result<(), StoreError> {
    if value.is_finite() && (0.0..max).contains(&value) {
        Ok(())
    } else {
        Err(StoreError::OutOfRange { field, value })
    }
}

/// Column constraints every backend enforces before writing.
pub fn validate_record(record: &CountryRecord) -> Result<(), StoreError> {
    if record.name.trim().is_empty() {
        return Err(StoreError::EmptyName);
    }
    check_len("name", Some(&record.name), MAX_NAME_LEN)?;
    check_len("capital", record.capital.as_deref(), MAX_CAPITAL_LEN)?;
    check_len("region", record.region.as_deref(), MAX_REGION_LEN)?;
    check_len(
        "currency_code",
        record.currency_code.as_deref(),
        MAX_CURRENCY_CODE_LEN,
    )?;
    check_len("flag_url", record.flag_url.as_deref(), MAX_FLAG_URL_LEN)?;
    if let Some(rate) = record.exchange_rate {
        check_range("exchange_rate", rate, MAX_EXCHANGE_RATE)?;
    }
    check_range("estimated_gdp", record.estimated_gdp, MAX_ESTIMATED_GDP)
}

pub(crate) fn select(rows: impl IntoIterator<Item = CountryRow>, query: &CountryQuery) -> Vec<CountryRow> {
    let mut rows: Vec<CountryRow> = rows
        .into_iter()
        .filter(|row| query.matches(&row.record))
        .collect();
    rows.sort_by(|a, b| query.sort.compare(&a.record, &b.record));
    rows
}

pub(crate) fn summarize<'a>(rows: impl IntoIterator<Item = &'a CountryRow>) -> StoreStatus {
    rows.into_iter().fold(
        StoreStatus {
            total_countries: 0,
            last_refreshed_at: None,
        },
        |status, row| StoreStatus {
            total_countries: status.total_countries + 1,
            last_refreshed_at: status.last_refreshed_at.max(Some(row.record.last_refreshed_at)),
        },
    )
}


#[cfg(test)]
mod tests {
    use super::testutils::record;
    use super::*;

    #[test]
    fn test_validate_accepts_regular_record() {
        assert!(validate_record(&record("France")).is_ok());
    }

    #[test]
    fn test_validate_rejects_oversized_fields() {
        let long_name = record(&"x".repeat(256));
        assert!(matches!(
            validate_record(&long_name),
            Err(StoreError::FieldTooLong {
                field: "name",
                limit: 255,
                actual: 256
            })
        ));

        let mut long_code = record("France");
        long_code.currency_code = Some("EUROPEANEUR".to_string());
        assert!(matches!(
            validate_record(&long_code),
            Err(StoreError::FieldTooLong {
                field: "currency_code",
                ..
            })
        ));

        let mut blank = record("France");
        blank.name = "  ".to_string();
        assert!(matches!(validate_record(&blank), Err(StoreError::EmptyName)));
    }

    #[test]
    fn test_validate_rejects_out_of_range_numbers() {
        let mut huge_rate = record("France");
        huge_rate.exchange_rate = Some(2e9);
        assert!(matches!(
            validate_record(&huge_rate),
            Err(StoreError::OutOfRange {
                field: "exchange_rate",
                ..
            })
        ));

        let mut negative_gdp = record("France");
        negative_gdp.estimated_gdp = -1.0;
        assert!(validate_record(&negative_gdp).is_err());
    }

    #[test]
    fn test_summarize() {
        let older = CountryRow::created(record("A"), Utc::now());
        let mut newer_record = record("B");
        newer_record.last_refreshed_at = older.record.last_refreshed_at + chrono::Duration::hours(1);
        let newer = CountryRow::created(newer_record, Utc::now());

        let status = summarize([&older, &newer]);
        assert_eq!(status.total_countries, 2);
        assert_eq!(status.last_refreshed_at, Some(newer.record.last_refreshed_at));

        assert_eq!(summarize(Vec::<&CountryRow>::new()).total_countries, 0);
    }
}
