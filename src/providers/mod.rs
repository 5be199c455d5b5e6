pub mod coingecko;
pub mod portfolio_api;
pub mod util;
