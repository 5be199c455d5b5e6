use super::util::ensure_success;
use crate::core::cache::{CacheKey, CacheStore};
use crate::core::error::{CoreError, Result};
use crate::core::price::{Coin, PriceProvider, PriceRecord, QUOTE_CURRENCY, SpotPrices};
use anyhow::{Context, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Days of history requested from the market chart endpoint.
pub const HISTORY_DAYS: u32 = 365;

/// Price client over the CoinGecko API with a last-known-good fallback.
///
/// Every successful fetch overwrites its cache slot. When the remote call
/// fails for any reason (network, non-2xx status, malformed body) the cached
/// payload is served instead; `DataUnavailable` is returned only when there
/// is nothing usable in the cache.
pub struct CoinGeckoProvider {
    base_url: String,
    client: Client,
    cache: Arc<dyn CacheStore>,
}

impl CoinGeckoProvider {
    pub fn new(base_url: &str, client: Client, cache: Arc<dyn CacheStore>) -> Self {
        CoinGeckoProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            cache,
        }
    }

    async fn request_json(&self, url: &str) -> anyhow::Result<Value> {
        debug!("Requesting price data from {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {} URL: {}", e, url))?;
        let text = ensure_success(response)?.text().await?;
        serde_json::from_str(&text)
            .map_err(|e| anyhow!("Failed to parse JSON response from {}: {}", url, e))
    }

    /// Fetches `url`, keeps the part of the body selected by `extract` as
    /// the cache payload and normalizes it. Falls back to the cached payload
    /// for `key` when any step fails.
    async fn fetch_with_fallback<T, E, N>(
        &self,
        key: CacheKey,
        url: &str,
        extract: E,
        normalize: N,
    ) -> Result<T>
    where
        T: Send,
        E: FnOnce(Value) -> anyhow::Result<Value> + Send,
        N: Fn(&Value) -> anyhow::Result<T> + Send + Sync,
    {
        let fetched = match self.request_json(url).await {
            Ok(body) => extract(body)
                .and_then(|payload| normalize(&payload).map(|data| (payload, data))),
            Err(e) => Err(e),
        };

        let remote_error = match fetched {
            Ok((payload, data)) => {
                self.cache.set(key, payload).await;
                return Ok(data);
            }
            Err(e) => e,
        };

        warn!(key = %key, error = %remote_error, "Remote fetch failed, falling back to cache");
        let Some(payload) = self.cache.get(&key).await else {
            return Err(CoreError::DataUnavailable {
                key: key.to_string(),
                reason: format!("{remote_error:#}"),
            });
        };

        normalize(&payload).map_err(|cache_error| {
            warn!(key = %key, error = %cache_error, "Cached payload is unusable");
            CoreError::DataUnavailable {
                key: key.to_string(),
                reason: format!("{remote_error:#}; cached payload unusable: {cache_error:#}"),
            }
        })
    }
}

fn spot_prices(payload: &Value) -> anyhow::Result<SpotPrices> {
    SpotPrices::from_value(payload).context("Malformed spot price payload")
}

fn market_chart_prices(mut body: Value) -> anyhow::Result<Value> {
    body.get_mut("prices")
        .map(Value::take)
        .ok_or_else(|| anyhow!("Market chart response has no 'prices' field"))
}

/// Normalizes raw `[epochMillis, price]` pairs, keeping their order.
fn price_records(pairs: &Value) -> anyhow::Result<Vec<PriceRecord>> {
    let pairs: Vec<(f64, f64)> =
        serde_json::from_value(pairs.clone()).context("Malformed market chart pairs")?;
    pairs
        .into_iter()
        .map(|(ts, price)| {
            ts.is_finite()
                .then(|| PriceRecord::from_market_pair(ts as i64, price))
                .flatten()
                .ok_or_else(|| anyhow!("Invalid market chart pair [{}, {}]", ts, price))
        })
        .collect()
}

#[async_trait]
impl PriceProvider for CoinGeckoProvider {
    #[instrument(name = "CoinGeckoSpotFetch", skip(self))]
    async fn fetch_spot_prices(&self) -> Result<SpotPrices> {
        let ids = Coin::ALL
            .iter()
            .map(|c| c.api_id())
            .collect::<Vec<_>>()
            .join(",");
        let url = format!(
            "{}/simple/price?ids={}&vs_currencies={}",
            self.base_url, ids, QUOTE_CURRENCY
        );

        self.fetch_with_fallback(CacheKey::Spot, &url, |body| Ok(body), spot_prices)
            .await
    }

    #[instrument(name = "CoinGeckoHistoryFetch", skip(self), fields(coin = %coin))]
    async fn fetch_price_history(&self, coin: Coin) -> Result<Vec<PriceRecord>> {
        let url = format!(
            "{}/coins/{}/market_chart?vs_currency={}&days={}",
            self.base_url,
            coin.api_id(),
            QUOTE_CURRENCY,
            HISTORY_DAYS
        );

        self.fetch_with_fallback(
            CacheKey::History(coin),
            &url,
            market_chart_prices,
            price_records,
        )
        .await
    }
}
