//! fxledger: normalizes broker statements and historical central-bank
//! exchange rates into currency-resolved trade transactions.

pub mod cli;
pub mod core;
pub mod providers;

use crate::core::Currency;
use crate::core::config::AppConfig;
use anyhow::Result;
use chrono::NaiveDate;
use tracing::{debug, info};

pub enum AppCommand {
    Rate {
        date: NaiveDate,
        currency: Currency,
        lookback: Option<u32>,
    },
    Transactions {
        convert: bool,
    },
}

pub fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("fxledger starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    match command {
        AppCommand::Rate {
            date,
            currency,
            lookback,
        } => cli::rates::run(&config, date, currency, lookback),
        AppCommand::Transactions { convert } => cli::transactions::run(&config, convert),
    }
}
