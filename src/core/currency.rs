//! Currency identifiers and exchange rate abstractions

use crate::core::error::RateError;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// Number of consecutive days without a published rate tolerated by a lookup.
pub const DEFAULT_MAX_LOOKBACK: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Pln,
    Eur,
    Usd,
    Gbp,
    Chf,
}

impl Currency {
    /// The currency all reported values are expressed in.
    pub const HOME: Currency = Currency::Pln;

    pub fn code(&self) -> &'static str {
        match self {
            Currency::Pln => "PLN",
            Currency::Eur => "EUR",
            Currency::Usd => "USD",
            Currency::Gbp => "GBP",
            Currency::Chf => "CHF",
        }
    }

    pub fn is_home(&self) -> bool {
        *self == Self::HOME
    }
}

impl Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Currency {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "PLN" => Ok(Currency::Pln),
            "EUR" => Ok(Currency::Eur),
            "USD" => Ok(Currency::Usd),
            "GBP" => Ok(Currency::Gbp),
            "CHF" => Ok(Currency::Chf),
            _ => Err(anyhow::anyhow!("Unsupported currency: {}", s)),
        }
    }
}

/// Answers "how many units of the home currency was one unit of `from` worth
/// on `day`".
///
/// Only home-relative queries are supported: `to` is kept for cross-rate
/// support and only participates in the identity short-circuit today.
pub trait ExchangeRateProvider {
    fn ratio(
        &self,
        day: NaiveDateTime,
        from: Currency,
        to: Currency,
        max_lookback: u32,
    ) -> Result<Decimal, RateError>;
}
