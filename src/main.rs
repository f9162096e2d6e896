use anyhow::Result;
use chrono::NaiveDate;
use clap::{CommandFactory, Parser, Subcommand};
use fxledger::core::Currency;
use fxledger::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Show the home currency rate applied to a trade on a date
    Rate {
        /// Trade date (YYYY-MM-DD)
        #[arg(short, long)]
        date: NaiveDate,
        /// Currency code, e.g. USD
        #[arg(short = 'u', long)]
        currency: Currency,
        /// Days without a published rate to tolerate
        #[arg(short, long)]
        lookback: Option<u32>,
    },
    /// List trades from broker statements
    Transactions {
        /// Also show amounts in the home currency
        #[arg(long)]
        convert: bool,
    },
}

impl From<Commands> for fxledger::AppCommand {
    fn from(cmd: Commands) -> fxledger::AppCommand {
        match cmd {
            Commands::Rate {
                date,
                currency,
                lookback,
            } => fxledger::AppCommand::Rate {
                date,
                currency,
                lookback,
            },
            Commands::Transactions { convert } => fxledger::AppCommand::Transactions { convert },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => fxledger::cli::setup::setup(),
        Some(cmd) => fxledger::run_command(cmd.into(), cli.config_path.as_deref()),
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
