use super::ui;
use crate::core::config::AppConfig;
use crate::core::{Currency, ExchangeRateProvider};
use crate::providers::NbpRates;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use tracing::debug;

/// Prints how many units of the home currency one unit of `currency` was
/// worth for a trade on `date`.
pub fn run(
    config: &AppConfig,
    date: NaiveDate,
    currency: Currency,
    lookback: Option<u32>,
) -> Result<()> {
    let max_lookback = lookback.unwrap_or(config.rates.max_lookback_days);
    let rates = NbpRates::from_dir(&config.rates.path, &config.rates.currencies)
        .with_context(|| format!("Failed to load rates from {}", config.rates.path.display()))?;
    debug!(days = rates.table().len(), "Rate tables ready");

    let ratio = rates.ratio(
        date.and_time(chrono::NaiveTime::MIN),
        currency,
        Currency::HOME,
        max_lookback,
    )?;

    println!(
        "{} {}/{} = {}",
        ui::style_text(&date.to_string(), ui::StyleType::Subtle),
        currency,
        Currency::HOME,
        ui::style_text(&ratio.normalize().to_string(), ui::StyleType::TotalValue)
    );
    Ok(())
}
