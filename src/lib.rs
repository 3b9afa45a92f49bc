pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

use crate::core::config::AppConfig;
use crate::core::query::CountryQuery;
use crate::core::refresh::Refresher;
use crate::providers::{CachingRateSource, ExchangeRateClient, RestCountriesClient};
use crate::store::DiskStore;
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{debug, info};

pub enum AppCommand {
    Refresh {
        json: bool,
    },
    List {
        region: Option<String>,
        currency: Option<String>,
        sort: Option<String>,
        json: bool,
    },
    Show {
        name: String,
    },
    Delete {
        name: String,
    },
    Status,
    Summary,
}

/// Wires the configured sources and on-disk store into a [`Refresher`].
pub fn build_refresher(config: &AppConfig, store: Arc<DiskStore>) -> Refresher {
    let sources = &config.sources;
    let exchange = ExchangeRateClient::new(&sources.exchange.url, sources.exchange_timeout())
        .with_retries(sources.retries);
    let countries = RestCountriesClient::new(&sources.countries.url, sources.countries_timeout())
        .with_retries(sources.retries);

    Refresher::new(
        Arc::new(CachingRateSource::new(exchange, sources.rate_cache_ttl())),
        Arc::new(countries),
        store,
    )
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("countryfx starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    }
    .with_env_overrides();
    debug!("Loaded config: {config:#?}");

    let store_path = config.default_data_path()?.join("store");
    let store = Arc::new(
        DiskStore::open(&store_path)
            .with_context(|| format!("Failed to open country store at {}", store_path.display()))?,
    );

    match command {
        AppCommand::Refresh { json } => {
            let refresher = build_refresher(&config, Arc::clone(&store));
            cli::refresh::run(&refresher, json).await
        }
        AppCommand::List {
            region,
            currency,
            sort,
            json,
        } => {
            let query = CountryQuery::new(region.as_deref(), currency.as_deref(), sort.as_deref())?;
            cli::countries::list(store.as_ref(), &query, json).await
        }
        AppCommand::Show { name } => cli::countries::show(store.as_ref(), &name).await,
        AppCommand::Delete { name } => cli::countries::delete(store.as_ref(), &name).await,
        AppCommand::Status => cli::countries::status(store.as_ref()).await,
        AppCommand::Summary => cli::countries::summary(store.as_ref()).await,
    }
}
