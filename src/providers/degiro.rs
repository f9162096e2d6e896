//! DEGIRO account statement exports (Polish locale).
//!
//! Statements are `,`-delimited with a header row. Trades are recognised from
//! the free-text description column, e.g. `Kupno 10 TESLA INC@113,64 USD`;
//! every other row (fees, deposits, dividends, interest) is skipped.

use crate::core::currency::Currency;
use crate::core::error::RowError;
use crate::core::symbols::SymbolMap;
use crate::core::transaction::{Activity, Transaction, TransactionProvider};
use crate::providers::util::{list_files, parse_local_decimal};
use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use csv::StringRecord;
use regex::Regex;
use rust_decimal::Decimal;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::{debug, error, info, instrument, warn};

const DATE_FORMAT: &str = "%d-%m-%Y";

// Data,Czas,Data,Produkt,ISIN,Opis,Kurs,Zmiana,,Saldo,,Identyfikator zlecenia
const SETTLE_DATE_COLUMN: usize = 0;
const TRADE_TIME_COLUMN: usize = 1;
const TRADE_DATE_COLUMN: usize = 2;
const PRODUCT_COLUMN: usize = 3;
const DESCRIPTION_COLUMN: usize = 5;

static TRADE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(Sprzedaż|Kupno) (\d{1,3}(?:[ \x{a0}]\d{3})*|\d+) (.*)@([0-9,\x{a0}]+) ([A-Z]+)")
        .expect("trade pattern is a valid regex")
});

/// Trade fields extracted from a statement description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTrade {
    pub activity: Activity,
    pub quantity: Decimal,
    pub price: Decimal,
    pub currency: Currency,
}

/// Extracts the trade from a description such as `Sprzedaż 5 NIO INC@9,87 USD`.
///
/// Text that is not a buy or sell line yields [`RowError::Ignorable`].
/// Trade lines with values that cannot be represented (unsupported currency,
/// unparsable or non-positive numbers) yield [`RowError::Unexpected`].
pub fn parse_description(description: &str) -> Result<ParsedTrade, RowError> {
    let caps = TRADE_PATTERN
        .captures(description)
        .ok_or(RowError::Ignorable)?;

    let unexpected = |reason: String| RowError::Unexpected {
        row: vec![description.to_string()],
        reason,
    };
    let positive = |value: &str, what: &str| {
        parse_local_decimal(value)
            .map_err(|e| unexpected(format!("invalid {what} {value:?}: {e}")))
            .and_then(|d| {
                if d > Decimal::ZERO {
                    Ok(d)
                } else {
                    Err(unexpected(format!("{what} must be positive, got {d}")))
                }
            })
    };

    let activity = caps[1]
        .parse::<Activity>()
        .map_err(|e| unexpected(e.to_string()))?;
    let quantity = positive(&caps[2], "quantity")?;
    let price = positive(&caps[4], "price")?;
    let currency = caps[5]
        .parse::<Currency>()
        .map_err(|e| unexpected(e.to_string()))?;

    Ok(ParsedTrade {
        activity,
        quantity,
        price,
        currency,
    })
}

/// A statement row that was dropped or aborted the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowDiagnostic {
    /// 1-based line in the statement file, when known.
    pub line: Option<u64>,
    pub error: RowError,
}

pub struct DegiroProvider {
    dir: PathBuf,
    symbols: SymbolMap,
    log_ignored_rows: bool,
}

impl DegiroProvider {
    pub fn new<P: Into<PathBuf>>(dir: P, symbols: SymbolMap) -> Self {
        DegiroProvider {
            dir: dir.into(),
            symbols,
            log_ignored_rows: false,
        }
    }

    /// Logs skipped non-trade rows at debug level.
    pub fn log_ignored_rows(mut self, enabled: bool) -> Self {
        self.log_ignored_rows = enabled;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Statement files of the configured directory, in name order.
    pub fn statement_files(&self) -> Result<Vec<PathBuf>> {
        list_files(&self.dir)
            .with_context(|| format!("Failed to list statements in {}", self.dir.display()))
    }

    #[instrument(skip_all, fields(dir = %dir.as_ref().display()))]
    pub fn provide_for_directory<P: AsRef<Path>>(&self, dir: P) -> Result<Vec<Transaction>> {
        let dir = dir.as_ref();
        let files = list_files(dir)
            .with_context(|| format!("Failed to list statements in {}", dir.display()))?;

        let mut transactions = Vec::new();
        for file in files {
            transactions.extend(self.provide_for_file(&file)?);
        }
        info!(count = transactions.len(), "Normalized broker transactions");
        Ok(transactions)
    }

    /// Normalizes one statement, reporting dropped rows through `tracing`.
    pub fn provide_for_file<P: AsRef<Path>>(&self, path: P) -> Result<Vec<Transaction>> {
        let path = path.as_ref();
        debug!("Reading statement {}", path.display());
        let file = File::open(path)
            .with_context(|| format!("Failed to open statement {}", path.display()))?;

        let mut report = |diagnostic: &RowDiagnostic| log_diagnostic(path, diagnostic);
        let transactions = self
            .normalize(file, &mut report)
            .with_context(|| format!("Failed to normalize statement {}", path.display()))?;
        debug!(
            count = transactions.len(),
            "Statement {} normalized",
            path.display()
        );
        Ok(transactions)
    }

    /// Normalizes a statement read from `reader`.
    ///
    /// Unresolved products and short rows are reported to `on_diagnostic`
    /// and skipped. Any other failure is reported and then returned, which
    /// abandons the rest of the statement.
    pub fn normalize<R: Read>(
        &self,
        reader: R,
        on_diagnostic: &mut dyn FnMut(&RowDiagnostic),
    ) -> Result<Vec<Transaction>, RowError> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let mut transactions = Vec::new();
        for record in rdr.records() {
            let (line, outcome) = match record {
                Ok(record) => (
                    record.position().map(|p| p.line()),
                    self.normalize_row(&record).map_err(|e| (e, Some(record))),
                ),
                Err(e) => (
                    e.position().map(|p| p.line()),
                    Err((
                        RowError::Unexpected {
                            row: vec![],
                            reason: e.to_string(),
                        },
                        None,
                    )),
                ),
            };

            match outcome {
                Ok(transaction) => transactions.push(transaction),
                Err((RowError::Ignorable, record)) => {
                    if self.log_ignored_rows {
                        debug!(?line, ?record, "Skipping non-trade row");
                    }
                }
                Err((error, _)) => {
                    let fatal = !error.is_skippable();
                    let diagnostic = RowDiagnostic { line, error };
                    on_diagnostic(&diagnostic);
                    if fatal {
                        return Err(diagnostic.error);
                    }
                }
            }
        }
        Ok(transactions)
    }

    fn normalize_row(&self, record: &StringRecord) -> Result<Transaction, RowError> {
        let row = || record.iter().map(str::to_string).collect::<Vec<_>>();
        let column = |index: usize| {
            record
                .get(index)
                .ok_or_else(|| RowError::MalformedRow { row: row() })
        };

        let trade = parse_description(column(DESCRIPTION_COLUMN)?).map_err(|e| match e {
            RowError::Unexpected { reason, .. } => RowError::Unexpected { row: row(), reason },
            other => other,
        })?;
        let symbol = self.symbols.resolve(column(PRODUCT_COLUMN)?)?;

        let unexpected = |reason: String| RowError::Unexpected { row: row(), reason };
        let settle_date = parse_date(column(SETTLE_DATE_COLUMN)?).map_err(unexpected)?;
        let trade_day = parse_date(column(TRADE_DATE_COLUMN)?).map_err(unexpected)?;
        let trade_time = parse_time(column(TRADE_TIME_COLUMN)?).map_err(unexpected)?;

        Transaction::new(
            NaiveDateTime::new(trade_day, trade_time),
            settle_date,
            trade.currency,
            trade.activity,
            symbol,
            trade.quantity,
            trade.price,
        )
        .ok_or_else(|| unexpected("amount overflows".to_string()))
    }
}

impl TransactionProvider for DegiroProvider {
    fn provide(&self) -> Result<Vec<Transaction>> {
        self.provide_for_directory(&self.dir)
    }
}

fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map_err(|e| format!("invalid date {value:?}: {e}"))
}

/// Reads `HH:MM`, ignoring anything after the minutes (e.g. seconds).
fn parse_time(value: &str) -> Result<NaiveTime, String> {
    let mut parts = value.trim().split(':');
    let mut next = || parts.next().and_then(|p| p.trim().parse::<u32>().ok());
    next()
        .zip(next())
        .and_then(|(hour, minute)| NaiveTime::from_hms_opt(hour, minute, 0))
        .ok_or_else(|| format!("invalid time {value:?}"))
}

fn log_diagnostic(path: &Path, diagnostic: &RowDiagnostic) {
    let file = path.display();
    let line = diagnostic.line;
    match &diagnostic.error {
        RowError::UnresolvedSymbol { product } => warn!(
            %file,
            ?line,
            product = %product,
            "Missing product to symbol mapping, add it to the symbols table"
        ),
        RowError::MalformedRow { row } => warn!(%file, ?line, ?row, "Malformed statement row"),
        RowError::Unexpected { row, reason } => {
            error!(%file, ?line, ?row, %reason, "Unexpected statement row")
        }
        RowError::Ignorable => debug!(%file, ?line, "Skipping non-trade row"),
    }
}
