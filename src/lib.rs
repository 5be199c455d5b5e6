pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

use crate::cli::history::HistoryOptions;
use crate::cli::portfolio::EntryEdit;
use crate::core::Coin;
use crate::core::config::AppConfig;
use crate::providers::coingecko::CoinGeckoProvider;
use crate::providers::portfolio_api::PortfolioApiClient;
use anyhow::Result;
use rust_decimal::Decimal;
use tracing::{debug, info};

pub enum AppCommand {
    Prices,
    History { coin: Coin, options: HistoryOptions },
    Portfolio(PortfolioCommand),
}

pub enum PortfolioCommand {
    List,
    Total,
    Buy { coin: Coin, eur: Decimal },
    Update { id: i64, edit: EntryEdit },
    Delete { id: i64 },
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("cryptodash starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let client = providers::util::http_client(config.request_timeout())?;
    let cache = store::open_cache_store(&config);
    let prices = CoinGeckoProvider::new(config.coingecko_url(), client.clone(), cache);
    let backend = PortfolioApiClient::new(config.portfolio_url(), client);

    match command {
        AppCommand::Prices => cli::prices::run(&prices).await,
        AppCommand::History { coin, options } => cli::history::run(&prices, coin, &options).await,
        AppCommand::Portfolio(cmd) => match cmd {
            PortfolioCommand::List => cli::portfolio::list(&backend).await,
            PortfolioCommand::Total => cli::portfolio::total(&backend).await,
            PortfolioCommand::Buy { coin, eur } => {
                cli::portfolio::buy(&prices, &backend, coin, eur).await.map(|_| ())
            }
            PortfolioCommand::Update { id, edit } => {
                cli::portfolio::update(&backend, id, &edit).await.map(|_| ())
            }
            PortfolioCommand::Delete { id } => cli::portfolio::delete(&backend, id).await,
        },
    }
}
