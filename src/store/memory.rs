use super::{
    CountryRow, CountryStore, StoreError, StoreStatus, UpsertOutcome, select, summarize,
    validate_record,
};
use crate::core::merge::CountryRecord;
use crate::core::query::CountryQuery;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::debug;

/// In-memory store keyed by country name
#[derive(Default)]
pub struct MemoryStore {
    rows: Mutex<HashMap<String, CountryRow>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CountryStore for MemoryStore {
    async fn upsert(&self, record: &CountryRecord) -> Result<UpsertOutcome, StoreError> {
        validate_record(record)?;
        let now = Utc::now();

        let mut rows = self.rows.lock().await;
        let (row, created) = match rows.remove(&record.name) {
            Some(existing) => (existing.updated(record.clone(), now), false),
            None => (CountryRow::created(record.clone(), now), true),
        };
        debug!(name = %record.name, created, "Store UPSERT");
        rows.insert(record.name.clone(), row);
        Ok(UpsertOutcome { created })
    }

    async fn get(&self, name: &str) -> Result<Option<CountryRow>, StoreError> {
        Ok(self.rows.lock().await.get(name).cloned())
    }

    async fn list(&self, query: &CountryQuery) -> Result<Vec<CountryRow>, StoreError> {
        let rows = self.rows.lock().await;
        Ok(select(rows.values().cloned(), query))
    }

    async fn delete(&self, name: &str) -> Result<bool, StoreError> {
        let removed = self.rows.lock().await.remove(name).is_some();
        debug!(name, removed, "Store DELETE");
        Ok(removed)
    }

    async fn status(&self) -> Result<StoreStatus, StoreError> {
        Ok(summarize(self.rows.lock().await.values()))
    }
}
