use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use std::{fs, path::PathBuf};
use tracing::debug;

const COUNTRIES_URL_ENV: &str = "COUNTRIES_API_URL";
const EXCHANGE_URL_ENV: &str = "EXCHANGE_API_URL";

fn default_countries_url() -> String {
    "https://restcountries.com/v2/all?fields=name,capital,region,population,flag,currencies"
        .to_string()
}

fn default_countries_timeout() -> u64 {
    15
}

fn default_exchange_url() -> String {
    "https://open.er-api.com/v6/latest/USD".to_string()
}

fn default_exchange_timeout() -> u64 {
    10
}

fn default_cache_ttl() -> u64 {
    60 * 60
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CountriesSourceConfig {
    #[serde(default = "default_countries_url")]
    pub url: String,
    #[serde(default = "default_countries_timeout")]
    pub timeout_secs: u64,
}

impl Default for CountriesSourceConfig {
    fn default() -> Self {
        CountriesSourceConfig {
            url: default_countries_url(),
            timeout_secs: default_countries_timeout(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ExchangeSourceConfig {
    #[serde(default = "default_exchange_url")]
    pub url: String,
    #[serde(default = "default_exchange_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_secs: u64,
}

impl Default for ExchangeSourceConfig {
    fn default() -> Self {
        ExchangeSourceConfig {
            url: default_exchange_url(),
            timeout_secs: default_exchange_timeout(),
            cache_ttl_secs: default_cache_ttl(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct SourcesConfig {
    #[serde(default)]
    pub countries: CountriesSourceConfig,
    #[serde(default)]
    pub exchange: ExchangeSourceConfig,
    #[serde(default)]
    pub retries: usize,
}

impl SourcesConfig {
    pub fn countries_timeout(&self) -> Duration {
        Duration::from_secs(self.countries.timeout_secs)
    }

    pub fn exchange_timeout(&self) -> Duration {
        Duration::from_secs(self.exchange.timeout_secs)
    }

    pub fn rate_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.exchange.cache_ttl_secs)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub sources: SourcesConfig,
    pub data_path: Option<String>,
}

impl AppConfig {
    /// Loads the default config file, or built-in defaults if there is none.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!(
                "No config at {}, using built-in defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("io", "countryfx", "countryfx")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn default_data_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        let proj_dirs = ProjectDirs::from("io", "countryfx", "countryfx")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    /// Source URLs given through `COUNTRIES_API_URL` and `EXCHANGE_API_URL`
    /// take precedence over the file.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup(COUNTRIES_URL_ENV).filter(|u| !u.is_empty()) {
            debug!("Countries URL overridden by {}", COUNTRIES_URL_ENV);
            self.sources.countries.url = url;
        }
        if let Some(url) = lookup(EXCHANGE_URL_ENV).filter(|u| !u.is_empty()) {
            debug!("Exchange URL overridden by {}", EXCHANGE_URL_ENV);
            self.sources.exchange.url = url;
        }
        self
    }

    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }
}
