//! Normalized trade records produced from broker statements

use crate::core::currency::{Currency, ExchangeRateProvider};
use crate::core::error::RateError;
use anyhow::Result;
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt::Display;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Activity {
    Buy,
    Sell,
}

impl Display for Activity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Activity::Buy => "BUY",
                Activity::Sell => "SELL",
            }
        )
    }
}

impl FromStr for Activity {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Kupno" => Ok(Activity::Buy),
            "Sprzedaż" => Ok(Activity::Sell),
            _ => match s.to_uppercase().as_str() {
                "BUY" => Ok(Activity::Buy),
                "SELL" => Ok(Activity::Sell),
                _ => Err(anyhow::anyhow!("Invalid activity: {}", s)),
            },
        }
    }
}

/// A single executed trade. Amounts are in `currency`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transaction {
    pub trade_date: NaiveDateTime,
    pub settle_date: NaiveDate,
    pub currency: Currency,
    pub activity: Activity,
    pub symbol: String,
    pub quantity: Decimal,
    pub price: Decimal,
    pub amount: Decimal,
    pub dividend_tax_deducted: Decimal,
}

impl Transaction {
    /// Builds a trade, or `None` when `quantity * price` does not fit a
    /// `Decimal`.
    pub fn new(
        trade_date: NaiveDateTime,
        settle_date: NaiveDate,
        currency: Currency,
        activity: Activity,
        symbol: impl Into<String>,
        quantity: Decimal,
        price: Decimal,
    ) -> Option<Self> {
        let amount = quantity.checked_mul(price)?;
        Some(Self {
            trade_date,
            settle_date,
            currency,
            activity,
            symbol: symbol.into(),
            quantity,
            price,
            amount,
            dividend_tax_deducted: Decimal::ZERO,
        })
    }

    /// `amount` expressed in the home currency at the trade date rate.
    pub fn home_amount(
        &self,
        rates: &dyn ExchangeRateProvider,
        max_lookback: u32,
    ) -> Result<Decimal, RateError> {
        let ratio = rates.ratio(self.trade_date, self.currency, Currency::HOME, max_lookback)?;
        self.amount
            .checked_mul(ratio)
            .ok_or(RateError::AmountOverflow {
                amount: self.amount,
                ratio,
            })
    }
}

/// A source of normalized transactions, e.g. one broker's exports.
pub trait TransactionProvider {
    fn provide(&self) -> Result<Vec<Transaction>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    struct FixedRate(Decimal);

    impl ExchangeRateProvider for FixedRate {
        fn ratio(
            &self,
            _day: NaiveDateTime,
            from: Currency,
            _to: Currency,
            _max_lookback: u32,
        ) -> Result<Decimal, RateError> {
            if from.is_home() {
                return Ok(Decimal::ONE);
            }
            Ok(self.0)
        }
    }

    fn trade(currency: Currency, quantity: Decimal, price: Decimal) -> Transaction {
        let day = NaiveDate::from_ymd_opt(2023, 3, 14).unwrap();
        Transaction::new(
            day.and_hms_opt(15, 30, 0).unwrap(),
            day,
            currency,
            Activity::Buy,
            "AAPL",
            quantity,
            price,
        )
        .unwrap()
    }

    #[test]
    fn test_amount_is_exact_product() {
        let cases = [
            (dec!(10), dec!(123.45)),
            (dec!(3), dec!(0.1)),
            (dec!(1234), dec!(9999.9999)),
            (dec!(7), dec!(0.0001)),
        ];
        for (quantity, price) in cases {
            let tx = trade(Currency::Usd, quantity, price);
            assert_eq!(tx.amount, quantity * price);
            assert_eq!(tx.dividend_tax_deducted, Decimal::ZERO);
        }
        assert_eq!(trade(Currency::Usd, dec!(3), dec!(0.1)).amount, dec!(0.3));
    }

    #[test]
    fn test_home_amount_uses_rate() {
        let rates = FixedRate(dec!(4.25));
        let tx = trade(Currency::Usd, dec!(2), dec!(10.50));
        assert_eq!(tx.home_amount(&rates, 5).unwrap(), dec!(89.25));

        let tx = trade(Currency::Pln, dec!(2), dec!(10.50));
        assert_eq!(tx.home_amount(&rates, 5).unwrap(), dec!(21.00));
    }

    #[test]
    fn test_amount_overflow_is_rejected() {
        let day = NaiveDate::from_ymd_opt(2023, 3, 14).unwrap();
        let tx = Transaction::new(
            day.and_hms_opt(15, 30, 0).unwrap(),
            day,
            Currency::Usd,
            Activity::Buy,
            "AAPL",
            Decimal::MAX,
            dec!(2),
        );
        assert!(tx.is_none());
    }

    #[test]
    fn test_home_amount_overflow_is_an_error() {
        let rates = FixedRate(dec!(1000));
        let tx = trade(Currency::Usd, Decimal::MAX, Decimal::ONE);
        let err = tx.home_amount(&rates, 5).unwrap_err();
        assert!(matches!(err, RateError::AmountOverflow { .. }));
    }

    #[test]
    fn test_activity_from_str() {
        assert_eq!("Kupno".parse::<Activity>().unwrap(), Activity::Buy);
        assert_eq!("Sprzedaż".parse::<Activity>().unwrap(), Activity::Sell);
        assert_eq!("sell".parse::<Activity>().unwrap(), Activity::Sell);
        assert!("Dywidenda".parse::<Activity>().is_err());
    }
}
