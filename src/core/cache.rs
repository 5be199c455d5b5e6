use crate::core::price::Coin;
use async_trait::async_trait;
use serde_json::Value;
use std::fmt::Display;

/// Logical slot under which the last successful fetch is kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Spot,
    History(Coin),
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheKey::Spot => write!(f, "spot"),
            CacheKey::History(coin) => write!(f, "history:{}", coin.api_id()),
        }
    }
}

/// Last-known-good payload store. Entries never expire; the latest `set`
/// for a key wins.
///
/// Implementations swallow their own failures: a broken medium reads as
/// empty and ignores writes.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &CacheKey) -> Option<Value>;
    async fn set(&self, key: CacheKey, payload: Value);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key_names() {
        assert_eq!(CacheKey::Spot.to_string(), "spot");
        assert_eq!(
            CacheKey::History(Coin::Bitcoin).to_string(),
            "history:bitcoin"
        );
        assert_eq!(
            CacheKey::History(Coin::Ethereum).to_string(),
            "history:ethereum"
        );
    }
}
