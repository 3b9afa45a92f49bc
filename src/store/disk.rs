use super::{
    CountryRow, CountryStore, StoreError, StoreStatus, UpsertOutcome, select, summarize,
    validate_record,
};
use crate::core::merge::CountryRecord;
use crate::core::query::CountryQuery;
use async_trait::async_trait;
use chrono::Utc;
use fjall::{Keyspace, PartitionCreateOptions, PartitionHandle, PersistMode};
use std::path::Path;
use tracing::debug;

const COUNTRIES_PARTITION: &str = "countries";

/// Country table on a fjall keyspace. Rows are JSON encoded and keyed by name.
pub struct DiskStore {
    keyspace: Keyspace,
    countries: PartitionHandle,
}

impl DiskStore {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        std::fs::create_dir_all(path)?;

        let keyspace = fjall::Config::new(path).open()?;
        let countries =
            keyspace.open_partition(COUNTRIES_PARTITION, PartitionCreateOptions::default())?;
        debug!("Opened country store at {}", path.display());
        Ok(Self {
            keyspace,
            countries,
        })
    }

    fn read(&self, name: &str) -> Result<Option<CountryRow>, StoreError> {
        match self.countries.get(name)? {
            Some(value) => Ok(Some(serde_json::from_slice(&value)?)),
            None => Ok(None),
        }
    }

    fn rows(&self) -> Result<Vec<CountryRow>, StoreError> {
        self.countries
            .iter()
            .map(|item| {
                let (_, value) = item?;
                Ok(serde_json::from_slice(&value)?)
            })
            .collect()
    }
}

#[async_trait]
impl CountryStore for DiskStore {
    async fn upsert(&self, record: &CountryRecord) -> Result<UpsertOutcome, StoreError> {
        validate_record(record)?;
        let now = Utc::now();

        let (row, created) = match self.read(&record.name)? {
            Some(existing) => (existing.updated(record.clone(), now), false),
            None => (CountryRow::created(record.clone(), now), true),
        };
        self.countries
            .insert(record.name.as_str(), serde_json::to_vec(&row)?)?;
        self.keyspace.persist(PersistMode::Buffer)?;
        debug!(name = %record.name, created, "Store UPSERT");
        Ok(UpsertOutcome { created })
    }

    async fn get(&self, name: &str) -> Result<Option<CountryRow>, StoreError> {
        self.read(name)
    }

    async fn list(&self, query: &CountryQuery) -> Result<Vec<CountryRow>, StoreError> {
        Ok(select(self.rows()?, query))
    }

    async fn delete(&self, name: &str) -> Result<bool, StoreError> {
        if !self.countries.contains_key(name)? {
            return Ok(false);
        }
        self.countries.remove(name)?;
        self.keyspace.persist(PersistMode::Buffer)?;
        debug!(name, "Store DELETE");
        Ok(true)
    }

    async fn status(&self) -> Result<StoreStatus, StoreError> {
        Ok(summarize(&self.rows()?))
    }
}
