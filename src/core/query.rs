//! Filtering and ordering of stored countries

use super::merge::CountryRecord;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt::Display;
use std::str::FromStr;
use thiserror::Error;

const MAX_REGION_LEN: usize = 255;
const MAX_CURRENCY_LEN: usize = 10;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error(
        "invalid sort '{0}', expected one of: gdp_desc, gdp_asc, population_desc, population_asc, name_asc, name_desc"
    )]
    InvalidSort(String),

    #[error("{field} filter must be at most {limit} characters")]
    TooLong { field: &'static str, limit: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    GdpDesc,
    GdpAsc,
    PopulationDesc,
    PopulationAsc,
    #[default]
    NameAsc,
    NameDesc,
}

impl Display for SortOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                SortOrder::GdpDesc => "gdp_desc",
                SortOrder::GdpAsc => "gdp_asc",
                SortOrder::PopulationDesc => "population_desc",
                SortOrder::PopulationAsc => "population_asc",
                SortOrder::NameAsc => "name_asc",
                SortOrder::NameDesc => "name_desc",
            }
        )
    }
}

impl FromStr for SortOrder {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gdp_desc" => Ok(SortOrder::GdpDesc),
            "gdp_asc" => Ok(SortOrder::GdpAsc),
            "population_desc" => Ok(SortOrder::PopulationDesc),
            "population_asc" => Ok(SortOrder::PopulationAsc),
            "name_asc" => Ok(SortOrder::NameAsc),
            "name_desc" => Ok(SortOrder::NameDesc),
            _ => Err(QueryError::InvalidSort(s.to_string())),
        }
    }
}

impl SortOrder {
    /// Ties on GDP or population fall back to the name.
    pub fn compare(&self, a: &CountryRecord, b: &CountryRecord) -> Ordering {
        let by_name = a.name.cmp(&b.name);
        match self {
            SortOrder::GdpDesc => b.estimated_gdp.total_cmp(&a.estimated_gdp).then(by_name),
            SortOrder::GdpAsc => a.estimated_gdp.total_cmp(&b.estimated_gdp).then(by_name),
            SortOrder::PopulationDesc => b.population.cmp(&a.population).then(by_name),
            SortOrder::PopulationAsc => a.population.cmp(&b.population).then(by_name),
            SortOrder::NameAsc => by_name,
            SortOrder::NameDesc => by_name.reverse(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CountryQuery {
    pub region: Option<String>,
    pub currency: Option<String>,
    pub sort: SortOrder,
}

fn filter_value(
    value: Option<&str>,
    field: &'static str,
    limit: usize,
) -> Result<Option<String>, QueryError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(v) if v.chars().count() > limit => Err(QueryError::TooLong { field, limit }),
        Some(v) => Ok(Some(v.to_string())),
        None => Ok(None),
    }
}

impl CountryQuery {
    pub fn new(
        region: Option<&str>,
        currency: Option<&str>,
        sort: Option<&str>,
    ) -> Result<Self, QueryError> {
        Ok(Self {
            region: filter_value(region, "region", MAX_REGION_LEN)?,
            currency: filter_value(currency, "currency", MAX_CURRENCY_LEN)?,
            sort: sort.map(SortOrder::from_str).transpose()?.unwrap_or_default(),
        })
    }

    pub fn matches(&self, record: &CountryRecord) -> bool {
        fn eq(filter: &Option<String>, value: &Option<String>) -> bool {
            match filter {
                Some(f) => value.as_deref().is_some_and(|v| v.eq_ignore_ascii_case(f)),
                None => true,
            }
        }
        eq(&self.region, &record.region) && eq(&self.currency, &record.currency_code)
    }
}
