use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use std::{fs, path::PathBuf};
use tracing::{debug, warn};

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct LlmConfig {
    pub base_url: String,
    pub model: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        LlmConfig {
            base_url: "http://localhost:11434".to_string(),
            model: "llama2".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct MarketDataConfig {
    pub base_url: String,
    pub api_key: Option<String>,
}

impl Default for MarketDataConfig {
    fn default() -> Self {
        MarketDataConfig {
            base_url: "https://www.alphavantage.co".to_string(),
            api_key: None,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct PricingConfig {
    pub cache_expiry_secs: u64,
    pub min_call_interval_secs: u64,
    pub default_price: f64,
    pub reporting_currency: String,
    pub forex_prefix: char,
    pub manufacturers: usize,
}

impl Default for PricingConfig {
    fn default() -> Self {
        PricingConfig {
            cache_expiry_secs: 3600,
            min_call_interval_secs: 12,
            default_price: 100.0,
            reporting_currency: "USD".to_string(),
            forex_prefix: 'X',
            manufacturers: 1,
        }
    }
}

impl PricingConfig {
    pub fn cache_expiry(&self) -> Duration {
        Duration::from_secs(self.cache_expiry_secs)
    }

    pub fn min_call_interval(&self) -> Duration {
        Duration::from_secs(self.min_call_interval_secs)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub market_data: MarketDataConfig,
    #[serde(default)]
    pub pricing: PricingConfig,
    /// Pipe-delimited exchange listing files used as the manufacturer directory.
    #[serde(default)]
    pub listings: Vec<PathBuf>,
}

impl AppConfig {
    /// Loads `path` when given; otherwise the default location if it exists,
    /// falling back to built-in defaults. Environment overrides apply last.
    pub fn resolve(path: Option<&str>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::load_from_path(path)?,
            None => match Self::default_config_path() {
                Ok(default_path) if default_path.exists() => Self::load_from_path(&default_path)?,
                _ => {
                    debug!("No config file found, using defaults");
                    Self::default()
                }
            },
        };
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("dev", "procplan", "procplan")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("ALPHA_VANTAGE_API_KEY").filter(|v| !v.is_empty()) {
            self.market_data.api_key = Some(key);
        }
        if let Some(url) = lookup("OLLAMA_BASE_URL").filter(|v| !v.is_empty()) {
            self.llm.base_url = url;
        }
        if let Some(model) = lookup("OLLAMA_MODEL").filter(|v| !v.is_empty()) {
            self.llm.model = model;
        }
    }

    pub fn api_key(&self) -> String {
        match &self.market_data.api_key {
            Some(key) => key.clone(),
            None => {
                warn!("No market data API key configured, using the demo key");
                "demo".to_string()
            }
        }
    }
}
