//! Historical exchange rates published by the National Bank of Poland.
//!
//! Rate files are `;`-delimited tables. The header names one column per
//! currency as `<units><CODE>` (`1USD`, `1EUR`, `100JPY`) and every data row
//! starts with its publication date as `YYYYMMDD`, followed by rates written
//! with a decimal comma.

use crate::core::currency::{Currency, ExchangeRateProvider};
use crate::core::error::RateError;
use crate::providers::util::{list_files, parse_local_decimal};
use chrono::{NaiveDate, NaiveDateTime};
use csv::StringRecord;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, instrument};

const DATE_FORMAT: &str = "%Y%m%d";

/// Rates per publication date, in home currency per one unit of foreign
/// currency. The home currency itself is never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RateTable {
    days: BTreeMap<NaiveDate, HashMap<Currency, Decimal>>,
}

impl RateTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct dates with published rates.
    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn get(&self, date: NaiveDate, currency: Currency) -> Option<Decimal> {
        self.days
            .get(&date)
            .and_then(|rates| rates.get(&currency))
            .copied()
    }

    /// Publication dates in ascending order.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.days.keys().copied()
    }

    /// Replaces every rate published on `date`.
    pub fn insert_day(&mut self, date: NaiveDate, rates: HashMap<Currency, Decimal>) {
        self.days.insert(date, rates);
    }

    /// Adds all days from `other`; a date present in both takes `other`'s rates.
    pub fn merge(&mut self, other: RateTable) {
        self.days.extend(other.days);
    }

    /// Loads every regular file in `dir` (non-recursive), in file name order.
    #[instrument(skip_all, fields(dir = %dir.as_ref().display()))]
    pub fn load_dir<P: AsRef<Path>>(dir: P, currencies: &[Currency]) -> Result<Self, RateError> {
        let mut table = RateTable::new();
        for file in list_files(dir.as_ref())? {
            let loaded = Self::load_file(&file, currencies)?;
            let collisions = loaded
                .dates()
                .filter(|date| table.days.contains_key(date))
                .count();
            if collisions > 0 {
                debug!(
                    file = %file.display(),
                    collisions,
                    "Rate file redefines already loaded dates, keeping the later file"
                );
            }
            table.merge(loaded);
        }
        info!(days = table.len(), "Loaded exchange rate tables");
        Ok(table)
    }

    pub fn load_file<P: AsRef<Path>>(path: P, currencies: &[Currency]) -> Result<Self, RateError> {
        let path = path.as_ref();
        debug!("Loading rate file {}", path.display());
        let file = File::open(path)?;
        Self::load_reader(file, path, currencies)
    }

    /// Parses one rate table. `source` only names the input in errors.
    pub fn load_reader<R: Read>(
        reader: R,
        source: &Path,
        currencies: &[Currency],
    ) -> Result<Self, RateError> {
        let csv_err = |source_err: csv::Error| RateError::Csv {
            file: source.to_path_buf(),
            source: source_err,
        };

        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(b';')
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);
        let mut records = rdr.records();

        let header = match records.next() {
            Some(record) => record.map_err(csv_err)?,
            None => {
                debug!("Rate file {} is empty", source.display());
                return Ok(RateTable::new());
            }
        };
        let columns = locate_columns(&header, currencies, source)?;

        let mut table = RateTable::new();
        for record in records {
            let record = record.map_err(csv_err)?;
            let date = parse_date(record.get(0).unwrap_or_default(), source)?;
            let mut rates = HashMap::with_capacity(columns.len());
            for column in &columns {
                rates.insert(column.currency, column.rate(&record, source)?);
            }
            table.insert_day(date, rates);
        }
        Ok(table)
    }
}

struct RateColumn {
    currency: Currency,
    index: usize,
    units: Decimal,
}

impl RateColumn {
    fn rate(&self, record: &StringRecord, source: &Path) -> Result<Decimal, RateError> {
        let invalid = |value: &str, reason: String| RateError::InvalidNumber {
            value: value.to_string(),
            currency: self.currency,
            file: source.to_path_buf(),
            reason,
        };

        let cell = record
            .get(self.index)
            .ok_or_else(|| invalid("", format!("row has no column {}", self.index)))?;
        let value = parse_local_decimal(cell).map_err(|e| invalid(cell, e.to_string()))?;
        Ok(value / self.units)
    }
}

/// Splits a header label such as `100JPY` into its unit count and code.
fn parse_label(label: &str) -> Option<(u32, &str)> {
    let label = label.trim();
    let split = label.find(|c: char| !c.is_ascii_digit())?;
    let units = label[..split].parse::<u32>().ok().filter(|u| *u > 0)?;
    Some((units, &label[split..]))
}

fn locate_columns(
    header: &StringRecord,
    currencies: &[Currency],
    source: &Path,
) -> Result<Vec<RateColumn>, RateError> {
    currencies
        .iter()
        .filter(|currency| !currency.is_home())
        .map(|currency| {
            header
                .iter()
                .enumerate()
                .find_map(|(index, label)| {
                    parse_label(label)
                        .filter(|(_, code)| *code == currency.code())
                        .map(|(units, _)| RateColumn {
                            currency: *currency,
                            index,
                            units: Decimal::from(units),
                        })
                })
                .ok_or_else(|| RateError::MissingColumn {
                    label: format!("1{}", currency.code()),
                    file: source.to_path_buf(),
                })
        })
        .collect()
}

fn parse_date(value: &str, source: &Path) -> Result<NaiveDate, RateError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|e| RateError::InvalidDate {
        value: value.to_string(),
        file: source.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Rate resolver over pre-loaded NBP tables.
#[derive(Debug, Clone, Default)]
pub struct NbpRates {
    table: RateTable,
}

impl NbpRates {
    pub fn new(table: RateTable) -> Self {
        Self { table }
    }

    pub fn from_dir<P: AsRef<Path>>(dir: P, currencies: &[Currency]) -> Result<Self, RateError> {
        Ok(Self::new(RateTable::load_dir(dir, currencies)?))
    }

    pub fn table(&self) -> &RateTable {
        &self.table
    }
}

impl ExchangeRateProvider for NbpRates {
    /// Rates published on a day apply to trades on the following day, so the
    /// search starts the day before `day` and walks back at most
    /// `max_lookback` further days over weekends and holidays.
    fn ratio(
        &self,
        day: NaiveDateTime,
        from: Currency,
        to: Currency,
        max_lookback: u32,
    ) -> Result<Decimal, RateError> {
        if from.is_home() {
            return Ok(Decimal::ONE);
        }
        if !to.is_home() {
            debug!(%from, %to, "Cross rates are not supported, using the home currency rate");
        }

        let requested = day.date();
        let missing = || RateError::MissingRate {
            currency: from,
            date: requested,
            max_lookback,
        };

        let mut date = requested;
        let mut remaining = max_lookback;
        loop {
            date = date.pred_opt().ok_or_else(missing)?;
            if let Some(rate) = self.table.get(date, from) {
                return Ok(rate);
            }
            if remaining == 0 {
                return Err(missing());
            }
            debug!(%from, %date, remaining, "No published rate, checking the previous day");
            remaining -= 1;
        }
    }
}
