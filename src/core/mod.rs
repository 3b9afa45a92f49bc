//! Core business logic abstractions

pub mod config;
pub mod country;
pub mod log;
pub mod merge;
pub mod query;
pub mod rates;
pub mod refresh;
pub mod source;

// Re-export main types for cleaner imports
pub use country::{CountryEntry, CountrySource, Currency, RawCountry};
pub use merge::CountryRecord;
pub use query::{CountryQuery, SortOrder};
pub use rates::{RateProvider, RateSnapshot, RateSource};
pub use refresh::{RecordError, RefreshError, RefreshSummary, Refresher};
pub use source::{SourceError, SourceKind};
