use super::util::ensure_success;
use crate::core::error::{CoreError, Result};
use crate::core::portfolio::{PortfolioEntry, PortfolioStore};
use anyhow::{Context, anyhow};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

/// Pass-through client for the portfolio backend.
///
/// Nothing is cached or retried: every failure is returned to the caller as
/// `RemoteReadFailed` or `RemoteWriteFailed`.
pub struct PortfolioApiClient {
    base_url: String,
    client: Client,
}

impl PortfolioApiClient {
    pub fn new(base_url: &str, client: Client) -> Self {
        PortfolioApiClient {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/portfolio{}", self.base_url, path)
    }
}

async fn send(request: RequestBuilder) -> anyhow::Result<reqwest::Response> {
    let response = request
        .send()
        .await
        .map_err(|e| anyhow!("Request error: {}", e))?;
    ensure_success(response)
}

async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> anyhow::Result<T> {
    let text = send(request).await?.text().await?;
    serde_json::from_str(&text).context("Failed to parse portfolio response")
}

#[async_trait]
impl PortfolioStore for PortfolioApiClient {
    #[instrument(name = "PortfolioCreate", skip(self, entry), fields(currency = %entry.currency))]
    async fn create(&self, entry: &PortfolioEntry) -> Result<PortfolioEntry> {
        let url = self.url("");
        debug!("Saving portfolio entry to {}", url);
        let saved: PortfolioEntry = send_json(self.client.post(&url).json(entry))
            .await
            .map_err(|e| CoreError::write_failed("create", e))?;
        if saved.id.is_none() {
            return Err(CoreError::write_failed(
                "create",
                "response did not carry an id",
            ));
        }
        Ok(saved)
    }

    #[instrument(name = "PortfolioUpdate", skip(self, entry))]
    async fn update(&self, id: i64, entry: &PortfolioEntry) -> Result<PortfolioEntry> {
        let url = self.url(&format!("/{id}"));
        debug!("Updating portfolio entry at {}", url);
        send_json(self.client.put(&url).json(entry))
            .await
            .map_err(|e| CoreError::write_failed("update", e))
    }

    #[instrument(name = "PortfolioDelete", skip(self))]
    async fn delete(&self, id: i64) -> Result<()> {
        let url = self.url(&format!("/{id}"));
        debug!("Deleting portfolio entry at {}", url);
        send(self.client.delete(&url))
            .await
            .map(|_| ())
            .map_err(|e| CoreError::write_failed("delete", e))
    }

    async fn list_all(&self) -> Result<Vec<PortfolioEntry>> {
        let url = self.url("");
        debug!("Listing portfolio entries from {}", url);
        send_json(self.client.get(&url))
            .await
            .map_err(|e| CoreError::read_failed("list", e))
    }

    async fn total_value(&self) -> Result<Decimal> {
        let url = self.url("/totalValue");
        debug!("Requesting portfolio total from {}", url);
        let total: f64 = send_json(self.client.get(&url))
            .await
            .map_err(|e| CoreError::read_failed("totalValue", e))?;
        Decimal::try_from(total).map_err(|e| CoreError::read_failed("totalValue", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::price::Coin;
    use rust_decimal_macros::dec;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> PortfolioApiClient {
        let http = crate::providers::util::http_client(Duration::from_secs(5)).unwrap();
        PortfolioApiClient::new(&server.uri(), http)
    }

    fn new_entry() -> PortfolioEntry {
        PortfolioEntry {
            id: None,
            currency: Coin::Bitcoin,
            amount: dec!(0.5),
            purchase_price: dec!(40000),
            purchase_time: "2023-12-03T10:30:00.000Z".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_then_list_round_trip() {
        let server = MockServer::start().await;
        let stored = json!({
            "id": 12,
            "currency": "Bitcoin",
            "amount": 0.5,
            "purchasePrice": 40000.0,
            "purchaseTime": "2023-12-03T10:30:00.000Z"
        });

        Mock::given(method("POST"))
            .and(path("/portfolio"))
            .and(body_json(json!({
                "currency": "Bitcoin",
                "amount": 0.5,
                "purchasePrice": 40000.0,
                "purchaseTime": "2023-12-03T10:30:00.000Z"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(&stored))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/portfolio"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([stored])))
            .mount(&server)
            .await;

        let client = client(&server);
        let created = client.create(&new_entry()).await.unwrap();
        assert_eq!(created.id, Some(12));

        let entries = client.list_all().await.unwrap();
        let found = entries
            .iter()
            .find(|e| e.id == created.id)
            .expect("created entry should be listed");
        assert_eq!(found.amount, dec!(0.5));
        assert_eq!(found.currency, Coin::Bitcoin);
    }

    #[tokio::test]
    async fn test_create_rejected_by_validation() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/portfolio"))
            .respond_with(
                ResponseTemplate::new(400).set_body_string("Validation failed: amount"),
            )
            .mount(&server)
            .await;

        let err = client(&server).create(&new_entry()).await.unwrap_err();
        match err {
            CoreError::RemoteWriteFailed { operation, reason } => {
                assert_eq!(operation, "create");
                assert!(reason.contains("400"));
            }
            other => panic!("Expected RemoteWriteFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_create_without_id_in_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/portfolio"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "currency": "Bitcoin",
                "amount": 0.5,
                "purchasePrice": 40000.0,
                "purchaseTime": "2023-12-03T10:30:00.000Z"
            })))
            .mount(&server)
            .await;

        let err = client(&server).create(&new_entry()).await.unwrap_err();
        assert!(matches!(err, CoreError::RemoteWriteFailed { .. }));
    }

    #[tokio::test]
    async fn test_update_not_found_is_write_failure() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/portfolio/5"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let local = PortfolioEntry {
            id: Some(5),
            amount: dec!(1.0),
            ..new_entry()
        };
        let mut edited = local.clone();
        edited.amount = dec!(2.0);

        let err = client(&server).update(5, &edited).await.unwrap_err();
        assert!(matches!(err, CoreError::RemoteWriteFailed { ref operation, .. } if operation == "update"));
        // Nothing was applied to the caller's copy
        assert_eq!(local.amount, dec!(1.0));
    }

    #[tokio::test]
    async fn test_update_returns_stored_entry() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/portfolio/5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 5,
                "currency": "Ethereum",
                "amount": 2.0,
                "purchasePrice": 2100.0,
                "purchaseTime": "2023-12-03T10:30:00"
            })))
            .mount(&server)
            .await;

        let edited = PortfolioEntry {
            id: Some(5),
            currency: Coin::Ethereum,
            amount: dec!(2.0),
            purchase_price: dec!(2100),
            ..new_entry()
        };
        let updated = client(&server).update(5, &edited).await.unwrap();
        assert_eq!(updated.id, Some(5));
        assert_eq!(updated.currency, Coin::Ethereum);
        assert_eq!(updated.amount, dec!(2));
    }

    #[tokio::test]
    async fn test_delete() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/portfolio/3"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/portfolio/4"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = client(&server);
        assert!(client.delete(3).await.is_ok());
        assert!(matches!(
            client.delete(4).await,
            Err(CoreError::RemoteWriteFailed { .. })
        ));
    }

    #[tokio::test]
    async fn test_reads_surface_failures() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/portfolio"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/portfolio/totalValue"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not a number"))
            .mount(&server)
            .await;

        let client = client(&server);
        assert!(matches!(
            client.list_all().await,
            Err(CoreError::RemoteReadFailed { .. })
        ));
        assert!(matches!(
            client.total_value().await,
            Err(CoreError::RemoteReadFailed { .. })
        ));
    }

    #[tokio::test]
    async fn test_total_value() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/portfolio/totalValue"))
            .respond_with(ResponseTemplate::new(200).set_body_string("24000.5"))
            .mount(&server)
            .await;

        let total = client(&server).total_value().await.unwrap();
        assert_eq!(total, dec!(24000.5));
    }
}
