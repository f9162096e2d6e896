//! Error types for rate loading, rate lookup and statement rows.

use crate::core::currency::Currency;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::path::PathBuf;

/// Failures while loading rate tables or resolving a rate.
#[derive(Debug, thiserror::Error)]
pub enum RateError {
    #[error("no {currency} rate within {max_lookback} days before {date}")]
    MissingRate {
        currency: Currency,
        date: NaiveDate,
        max_lookback: u32,
    },

    #[error("rate file {} has no column labelled {label}", .file.display())]
    MissingColumn { label: String, file: PathBuf },

    #[error("invalid date {value:?} in {}: {reason}", .file.display())]
    InvalidDate {
        value: String,
        file: PathBuf,
        reason: String,
    },

    #[error("invalid rate {value:?} for {currency} in {}: {reason}", .file.display())]
    InvalidNumber {
        value: String,
        currency: Currency,
        file: PathBuf,
        reason: String,
    },

    #[error("rate file {} is not readable as a table: {source}", .file.display())]
    Csv {
        file: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{amount} converted at {ratio} does not fit a decimal")]
    AmountOverflow { amount: Decimal, ratio: Decimal },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Outcome of a statement row that did not produce a transaction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RowError {
    /// Not a trade line (fees, deposits, dividends, interest).
    #[error("row is not a trade")]
    Ignorable,

    #[error("no ticker symbol mapped for product {product:?}")]
    UnresolvedSymbol { product: String },

    #[error("malformed row: {row:?}")]
    MalformedRow { row: Vec<String> },

    #[error("unexpected failure on row {row:?}: {reason}")]
    Unexpected { row: Vec<String>, reason: String },
}

impl RowError {
    /// Whether the row can be dropped without aborting the file.
    pub fn is_skippable(&self) -> bool {
        !matches!(self, RowError::Unexpected { .. })
    }
}
