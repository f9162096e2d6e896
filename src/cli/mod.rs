pub mod rates;
pub mod setup;
pub mod transactions;
pub mod ui;
