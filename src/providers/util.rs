use anyhow::{Result, anyhow};
use reqwest::{Client, Response};
use std::time::Duration;

/// Builds the HTTP client shared by the remote providers.
pub fn http_client(timeout: Duration) -> Result<Client> {
    let client = Client::builder()
        .user_agent(concat!("cryptodash/", env!("CARGO_PKG_VERSION")))
        .timeout(timeout)
        .build()?;
    Ok(client)
}

/// Turns a non-2xx response into an error carrying the status and URL.
pub fn ensure_success(response: Response) -> Result<Response> {
    let status = response.status();
    if !status.is_success() {
        return Err(anyhow!("HTTP error: {} for URL: {}", status, response.url()));
    }
    Ok(response)
}
