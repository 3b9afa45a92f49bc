//! Country reference data as delivered by the countries source

use super::source::SourceError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Currency {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub symbol: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RawCountry {
    pub name: String,
    #[serde(default)]
    pub capital: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    pub population: u64,
    #[serde(default)]
    pub currencies: Option<Vec<Currency>>,
    #[serde(default)]
    pub flag: Option<String>,
}

impl RawCountry {
    pub fn primary_currency_code(&self) -> Option<&str> {
        primary_currency_code(self.currencies.as_deref().unwrap_or_default())
    }
}

/// Code of the first listed currency. Later currencies are never consulted.
pub fn primary_currency_code(currencies: &[Currency]) -> Option<&str> {
    currencies
        .first()
        .and_then(|c| c.code.as_deref())
        .filter(|code| !code.is_empty())
}

/// One element of the countries payload, kept undecoded until it is merged
/// so a malformed entry only fails on its own.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct CountryEntry(Value);

impl CountryEntry {
    /// The `name` field, if the entry has a string one.
    pub fn name(&self) -> Option<&str> {
        self.0.get("name").and_then(Value::as_str)
    }

    pub fn parse(&self) -> Result<RawCountry, serde_json::Error> {
        RawCountry::deserialize(&self.0)
    }
}

impl From<Value> for CountryEntry {
    fn from(value: Value) -> Self {
        CountryEntry(value)
    }
}

#[async_trait]
pub trait CountrySource: Send + Sync {
    async fn fetch_all(&self) -> Result<Vec<CountryEntry>, SourceError>;
}
