//! Pricing abstractions and core types

use crate::core::error::Result;
use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Display;
use std::str::FromStr;

/// Quote currency used for every price in the dashboard.
pub const QUOTE_CURRENCY: &str = "eur";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum Coin {
    Bitcoin,
    Ethereum,
}

impl Coin {
    pub const ALL: [Coin; 2] = [Coin::Bitcoin, Coin::Ethereum];

    /// Identifier used by the price API.
    pub fn api_id(&self) -> &'static str {
        match self {
            Coin::Bitcoin => "bitcoin",
            Coin::Ethereum => "ethereum",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Coin::Bitcoin => "BTC",
            Coin::Ethereum => "ETH",
        }
    }
}

impl Display for Coin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Coin::Bitcoin => "Bitcoin",
                Coin::Ethereum => "Ethereum",
            }
        )
    }
}

impl FromStr for Coin {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "bitcoin" | "btc" => Ok(Coin::Bitcoin),
            "ethereum" | "eth" => Ok(Coin::Ethereum),
            _ => Err(anyhow!("Unsupported coin: {}", s)),
        }
    }
}

/// A single time-stamped price sample in EUR.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceRecord {
    timestamp: DateTime<Utc>,
    price: Decimal,
}

impl PriceRecord {
    pub fn new(timestamp: DateTime<Utc>, price: Decimal) -> Self {
        Self { timestamp, price }
    }

    /// Builds a record from a raw `[epochMillis, price]` market chart pair,
    /// rounding the price to cents. Returns `None` for pairs that do not map
    /// to a valid instant or a finite price.
    pub fn from_market_pair(epoch_millis: i64, price: f64) -> Option<Self> {
        let timestamp = DateTime::from_timestamp_millis(epoch_millis)?;
        let price = Decimal::from_f64_retain(price)?
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        Some(Self { timestamp, price })
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn price(&self) -> Decimal {
        self.price
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpotQuote {
    #[serde(with = "rust_decimal::serde::float")]
    pub eur: Decimal,
}

/// Spot prices keyed by API coin id, exactly as the payload carried them.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpotPrices(BTreeMap<String, SpotQuote>);

impl SpotPrices {
    pub fn from_value(value: &serde_json::Value) -> serde_json::Result<Self> {
        Self::deserialize(value)
    }

    pub fn get(&self, coin: Coin) -> Option<Decimal> {
        self.0.get(coin.api_id()).map(|q| q.eur)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Decimal)> {
        self.0.iter().map(|(id, q)| (id.as_str(), q.eur))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, Decimal)> for SpotPrices {
    fn from_iter<I: IntoIterator<Item = (String, Decimal)>>(iter: I) -> Self {
        SpotPrices(
            iter.into_iter()
                .map(|(id, eur)| (id, SpotQuote { eur }))
                .collect(),
        )
    }
}

#[async_trait]
pub trait PriceProvider: Send + Sync {
    async fn fetch_spot_prices(&self) -> Result<SpotPrices>;
    async fn fetch_price_history(&self, coin: Coin) -> Result<Vec<PriceRecord>>;
}
