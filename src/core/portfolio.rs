//! Portfolio entry model and the backend store abstraction

use crate::core::error::{CoreError, Result};
use crate::core::price::Coin;
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A recorded hypothetical purchase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub currency: Coin,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub purchase_price: Decimal,
    pub purchase_time: String,
}

impl PortfolioEntry {
    /// Builds an unsaved entry for spending `eur_to_spend` at `spot_price`.
    pub fn purchase(
        coin: Coin,
        eur_to_spend: Decimal,
        spot_price: Decimal,
        time: DateTime<Utc>,
    ) -> Result<Self> {
        if eur_to_spend <= Decimal::ZERO {
            return Err(CoreError::InvalidEntry(format!(
                "amount to spend must be positive, got {eur_to_spend}"
            )));
        }
        if spot_price <= Decimal::ZERO {
            return Err(CoreError::InvalidPrice(spot_price));
        }

        let amount = eur_to_spend.checked_div(spot_price).ok_or_else(|| {
            CoreError::InvalidEntry(format!(
                "cannot buy {eur_to_spend} EUR worth at {spot_price}, amount is out of range"
            ))
        })?;

        Ok(Self {
            id: None,
            currency: coin,
            amount,
            purchase_price: spot_price,
            purchase_time: time.to_rfc3339_opts(SecondsFormat::Millis, true),
        })
    }

    /// Checks the constraints the backend enforces on writes.
    pub fn validate(&self) -> Result<()> {
        if self.amount <= Decimal::ZERO {
            return Err(CoreError::InvalidEntry(format!(
                "amount must be positive, got {}",
                self.amount
            )));
        }
        if self.purchase_price <= Decimal::ZERO {
            return Err(CoreError::InvalidEntry(format!(
                "purchase price must be positive, got {}",
                self.purchase_price
            )));
        }
        if self.purchase_time.trim().is_empty() {
            return Err(CoreError::InvalidEntry(
                "purchase time is required".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
pub trait PortfolioStore: Send + Sync {
    async fn create(&self, entry: &PortfolioEntry) -> Result<PortfolioEntry>;
    async fn update(&self, id: i64, entry: &PortfolioEntry) -> Result<PortfolioEntry>;
    async fn delete(&self, id: i64) -> Result<()>;
    async fn list_all(&self) -> Result<Vec<PortfolioEntry>>;
    async fn total_value(&self) -> Result<Decimal>;
}
