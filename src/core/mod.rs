//! Core business logic abstractions

pub mod analytics;
pub mod cache;
pub mod config;
pub mod error;
pub mod log;
pub mod portfolio;
pub mod price;

// Re-export main types for cleaner imports
pub use cache::{CacheKey, CacheStore};
pub use error::CoreError;
pub use portfolio::{PortfolioEntry, PortfolioStore};
pub use price::{Coin, PriceProvider, PriceRecord, SpotPrices};
