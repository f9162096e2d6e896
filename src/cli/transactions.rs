use super::ui;
use crate::core::config::AppConfig;
use crate::core::{Currency, Transaction};
use crate::providers::{DegiroProvider, NbpRates};
use anyhow::{Context, Result};
use comfy_table::Cell;
use rust_decimal::Decimal;
use tracing::{debug, warn};

/// Renders transactions, with a home currency column when `home_amounts`
/// is given (one entry per transaction).
pub fn display_as_table(
    transactions: &[Transaction],
    home_amounts: Option<&[Option<Decimal>]>,
) -> String {
    let mut table = ui::new_styled_table();

    let mut header = vec![
        ui::header_cell("Trade date"),
        ui::header_cell("Settle date"),
        ui::header_cell("Activity"),
        ui::header_cell("Symbol"),
        ui::header_cell("Quantity"),
        ui::header_cell("Price"),
        ui::header_cell("Amount"),
    ];
    if home_amounts.is_some() {
        header.push(ui::header_cell(&format!("Amount ({})", Currency::HOME)));
    }
    table.set_header(header);

    for (i, tx) in transactions.iter().enumerate() {
        let mut row = vec![
            Cell::new(tx.trade_date.format("%Y-%m-%d %H:%M")),
            Cell::new(tx.settle_date.format("%Y-%m-%d")),
            ui::activity_cell(tx.activity),
            Cell::new(&tx.symbol),
            ui::decimal_cell(tx.quantity),
            ui::decimal_cell(tx.price),
            Cell::new(format!("{} {}", tx.amount.normalize(), tx.currency)),
        ];
        if let Some(amounts) = home_amounts {
            row.push(ui::format_optional_cell(amounts.get(i).copied().flatten(), 2));
        }
        table.add_row(row);
    }

    let mut output = format!(
        "{}\n\n",
        ui::style_text("Broker transactions", ui::StyleType::Title)
    );
    output.push_str(&table.to_string());
    output.push_str(&format!(
        "\n\n{}: {}",
        ui::style_text("Transactions", ui::StyleType::TotalLabel),
        transactions.len()
    ));
    output
}

pub fn run(config: &AppConfig, convert: bool) -> Result<()> {
    let provider = DegiroProvider::new(&config.statements.path, config.symbols.clone())
        .log_ignored_rows(config.statements.log_ignored_rows);

    let files = provider.statement_files()?;
    if files.is_empty() {
        println!(
            "No statements found in {}.",
            provider.dir().display()
        );
        return Ok(());
    }

    let pb = ui::new_progress_bar(files.len() as u64);
    pb.set_message("Reading statements...");
    let mut transactions = Vec::new();
    for file in &files {
        let result = provider.provide_for_file(file);
        pb.inc(1);
        match result {
            Ok(found) => transactions.extend(found),
            Err(e) => {
                pb.finish_and_clear();
                return Err(e);
            }
        }
    }
    pb.finish_and_clear();
    debug!(count = transactions.len(), "Statements normalized");

    let home_amounts = if convert {
        let rates = NbpRates::from_dir(&config.rates.path, &config.rates.currencies)
            .with_context(|| {
                format!("Failed to load rates from {}", config.rates.path.display())
            })?;
        let amounts: Vec<Option<Decimal>> = transactions
            .iter()
            .map(|tx| match tx.home_amount(&rates, config.rates.max_lookback_days) {
                Ok(amount) => Some(amount),
                Err(e) => {
                    warn!(symbol = %tx.symbol, trade_date = %tx.trade_date, "{e}");
                    None
                }
            })
            .collect();
        Some(amounts)
    } else {
        None
    };

    println!("{}", display_as_table(&transactions, home_amounts.as_deref()));
    Ok(())
}
