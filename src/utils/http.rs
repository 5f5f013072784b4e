//! HTTP client utilities.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::{AppError, Result};
use crate::models::ListingConfig;
use crate::services::{ListingClient, ListingResponse};

/// Create a configured asynchronous HTTP client.
pub fn create_async_client(config: &ListingConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;
    Ok(client)
}

/// [`ListingClient`] backed by reqwest.
pub struct HttpListingClient {
    client: reqwest::Client,
}

impl HttpListingClient {
    pub fn new(config: &ListingConfig) -> Result<Self> {
        Ok(Self {
            client: create_async_client(config)?,
        })
    }
}

#[async_trait]
impl ListingClient for HttpListingClient {
    async fn get(&self, url: &str) -> Result<ListingResponse> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AppError::network(url, describe(&e)))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.to_string(),
                    value.to_str().unwrap_or("<binary>").to_string(),
                )
            })
            .collect();
        let body = response
            .bytes()
            .await
            .map_err(|e| AppError::network(url, describe(&e)))?
            .to_vec();

        Ok(ListingResponse {
            status,
            headers,
            body,
        })
    }
}

fn describe(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        format!("request timed out ({err})")
    } else if err.is_connect() {
        format!("connection failed ({err})")
    } else {
        err.to_string()
    }
}
