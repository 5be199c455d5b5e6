use anyhow::Result;
use chrono::NaiveDate;
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use cryptodash::cli::history::HistoryOptions;
use cryptodash::cli::portfolio::EntryEdit;
use cryptodash::core::Coin;
use cryptodash::core::analytics::{SortKey, SortOrder};
use cryptodash::core::log::init_logging;
use cryptodash::{AppCommand, PortfolioCommand};
use rust_decimal::Decimal;

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

#[derive(Clone, Copy, ValueEnum)]
enum SortArg {
    Date,
    Price,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Show current prices with 24h and 7d changes
    Prices,
    /// Show daily price history for a coin
    History {
        /// bitcoin/btc or ethereum/eth
        coin: Coin,
        /// Rows per page
        #[arg(short, long, default_value_t = 10)]
        rows: usize,
        /// Jump to the page holding this date (YYYY-MM-DD)
        #[arg(short, long)]
        date: Option<NaiveDate>,
        /// Column to sort by
        #[arg(short, long, value_enum, default_value = "date")]
        sort: SortArg,
        /// Sort ascending instead of descending
        #[arg(long)]
        asc: bool,
    },
    /// Manage recorded purchases
    #[command(subcommand)]
    Portfolio(PortfolioCommands),
}

#[derive(Subcommand)]
enum PortfolioCommands {
    /// List purchases and per-coin balances
    List,
    /// Show the total portfolio value
    Total,
    /// Buy coins for an amount of EUR at the current price
    Buy { coin: Coin, eur: Decimal },
    /// Change fields of a purchase
    Update {
        id: i64,
        #[arg(long)]
        amount: Option<Decimal>,
        #[arg(long)]
        price: Option<Decimal>,
        #[arg(long)]
        coin: Option<Coin>,
    },
    /// Delete a purchase
    Delete { id: i64 },
}

impl From<Commands> for AppCommand {
    fn from(cmd: Commands) -> AppCommand {
        match cmd {
            Commands::Prices => AppCommand::Prices,
            Commands::History {
                coin,
                rows,
                date,
                sort,
                asc,
            } => AppCommand::History {
                coin,
                options: HistoryOptions {
                    rows,
                    date,
                    sort: match sort {
                        SortArg::Date => SortKey::Date,
                        SortArg::Price => SortKey::Price,
                    },
                    order: if asc { SortOrder::Asc } else { SortOrder::Desc },
                },
            },
            Commands::Portfolio(cmd) => AppCommand::Portfolio(cmd.into()),
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

impl From<PortfolioCommands> for PortfolioCommand {
    fn from(cmd: PortfolioCommands) -> PortfolioCommand {
        match cmd {
            PortfolioCommands::List => PortfolioCommand::List,
            PortfolioCommands::Total => PortfolioCommand::Total,
            PortfolioCommands::Buy { coin, eur } => PortfolioCommand::Buy { coin, eur },
            PortfolioCommands::Update {
                id,
                amount,
                price,
                coin,
            } => PortfolioCommand::Update {
                id,
                edit: EntryEdit {
                    amount,
                    purchase_price: price,
                    currency: coin,
                },
            },
            PortfolioCommands::Delete { id } => PortfolioCommand::Delete { id },
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => cryptodash::cli::setup::setup(),
        Some(cmd) => cryptodash::run_command(cmd.into(), cli.config_path.as_deref()).await,
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
