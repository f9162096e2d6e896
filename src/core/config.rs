use crate::core::currency::{Currency, DEFAULT_MAX_LOOKBACK};
use crate::core::symbols::SymbolMap;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

fn default_rate_currencies() -> Vec<Currency> {
    vec![Currency::Eur, Currency::Usd]
}

fn default_max_lookback() -> u32 {
    DEFAULT_MAX_LOOKBACK
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RatesConfig {
    pub path: PathBuf,
    #[serde(default = "default_rate_currencies")]
    pub currencies: Vec<Currency>,
    #[serde(default = "default_max_lookback")]
    pub max_lookback_days: u32,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StatementsConfig {
    pub path: PathBuf,
    #[serde(default)]
    pub log_ignored_rows: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    pub rates: RatesConfig,
    pub statements: StatementsConfig,
    #[serde(default)]
    pub symbols: SymbolMap,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("io", "fxledger", "fxledger")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!(
            symbols = config.symbols.len(),
            "Successfully loaded config"
        );
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
rates:
  path: "data/nbp"
  currencies: [USD, EUR, GBP]
  max_lookback_days: 7
statements:
  path: "data/investing/degiro"
  log_ignored_rows: true
symbols:
  - product: "TESLA"
    symbol: "TSLA"
  - product: "APPLE INC"
    symbol: "AAPL"
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(config.rates.path, PathBuf::from("data/nbp"));
        assert_eq!(
            config.rates.currencies,
            vec![Currency::Usd, Currency::Eur, Currency::Gbp]
        );
        assert_eq!(config.rates.max_lookback_days, 7);
        assert_eq!(
            config.statements.path,
            PathBuf::from("data/investing/degiro")
        );
        assert!(config.statements.log_ignored_rows);
        assert_eq!(config.symbols.len(), 2);
        assert_eq!(config.symbols.resolve("APPLE INC").unwrap(), "AAPL");
    }

    #[test]
    fn test_config_defaults() {
        let yaml_str = r#"
rates:
  path: "rates"
statements:
  path: "statements"
"#;
        let config: AppConfig = serde_yaml::from_str(yaml_str).unwrap();
        assert_eq!(config.rates.currencies, vec![Currency::Eur, Currency::Usd]);
        assert_eq!(config.rates.max_lookback_days, 5);
        assert!(!config.statements.log_ignored_rows);
        assert!(config.symbols.is_empty());
    }

    #[test]
    fn test_config_rejects_unknown_currency() {
        let yaml_str = r#"
rates:
  path: "rates"
  currencies: [XYZ]
statements:
  path: "statements"
"#;
        assert!(serde_yaml::from_str::<AppConfig>(yaml_str).is_err());
    }

    #[test]
    fn test_load_from_path_reports_missing_file() {
        let err = AppConfig::load_from_path("/nonexistent/fxledger/config.yaml").unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
