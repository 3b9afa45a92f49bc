pub mod caching;
pub mod countries;
pub mod exchange;
pub mod util;

pub use caching::{CachingRateSource, RateCache};
pub use countries::RestCountriesClient;
pub use exchange::ExchangeRateClient;
