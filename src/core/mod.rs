//! Core business logic abstractions

pub mod config;
pub mod currency;
pub mod error;
pub mod log;
pub mod symbols;
pub mod transaction;

// Re-export main types for cleaner imports
pub use currency::{Currency, DEFAULT_MAX_LOOKBACK, ExchangeRateProvider};
pub use error::{RateError, RowError};
pub use symbols::{SymbolMap, SymbolMapping};
pub use transaction::{Activity, Transaction, TransactionProvider};
