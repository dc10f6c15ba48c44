// src/services/fetcher.rs

//! Free-games fetcher for the STOVE store API.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;

use crate::error::{AppError, Result};
use crate::models::{ApiConfig, RawListing};
use crate::utils::http::{build_url, create_client, snippet};
use crate::utils::unix_now_millis;

/// Headers the store frontend sends; the API rejects bare requests.
///
/// `accept-encoding` is left to reqwest so responses are decompressed.
const STORE_HEADERS: [(&str, &str); 18] = [
    ("accept", "application/json, text/plain, */*"),
    ("accept-language", "en-US,en;q=0.9"),
    ("caller-detail", "b793a69d-5fb7-466f-a428-5380940-f6a5"),
    ("caller-id", "indie-web-store"),
    ("origin", "https://store.onstove.com"),
    ("priority", "u=1, i"),
    ("referer", "https://store.onstove.com/"),
    (
        "sec-ch-ua",
        "\"Google Chrome\";v=\"133\"; \"Chromium\";v=\"133\"; \"Not_A Brand\";v=\"24\"",
    ),
    ("sec-ch-ua-mobile", "?0"),
    ("sec-ch-ua-platform", "\"Windows\""),
    ("sec-fetch-dest", "empty"),
    ("sec-fetch-mode", "cors"),
    ("sec-fetch-site", "same-site"),
    ("x-client-lang", "en"),
    ("x-lang", "EN"),
    ("x-nation", "US"),
    ("x-timezone", "America/Los_Angeles"),
    ("x-utc-offset", "-420"),
];

/// Cache-busting query parameter expected by the API (sic).
const TIMESTAMP_PARAM: &str = "timestemp";

/// Source of the current free-games snapshot.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch the listings currently offered for free, in API order.
    async fn fetch(&self) -> Result<Vec<RawListing>>;
}

/// Fetcher backed by the STOVE store HTTP API.
pub struct StoveFetcher {
    config: ApiConfig,
    client: Client,
}

impl StoveFetcher {
    /// Create a new fetcher with the given API configuration.
    pub fn new(config: ApiConfig) -> Result<Self> {
        let client = create_client(&config.user_agent, config.timeout_secs, &STORE_HEADERS)?;
        Ok(Self { config, client })
    }

    fn request_url(&self) -> Result<url::Url> {
        let mut params = self.config.query_params();
        params.push((TIMESTAMP_PARAM.to_string(), unix_now_millis().to_string()));
        build_url(&self.config.base_url, params)
    }
}

#[async_trait]
impl Fetcher for StoveFetcher {
    async fn fetch(&self) -> Result<Vec<RawListing>> {
        let url = self.request_url()?;
        log::debug!("Fetching free games from {url}");

        let response = self.client.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if status != StatusCode::OK {
            return Err(AppError::fetch(format!(
                "HTTP {} - Response: {}",
                status.as_u16(),
                snippet(&body, 500)
            )));
        }

        parse_contents(&body)
    }
}

/// Extract `value.contents` from an API response body.
pub fn parse_contents(body: &str) -> Result<Vec<RawListing>> {
    let mut data: Value = serde_json::from_str(body)
        .map_err(|e| AppError::protocol(format!("Invalid JSON response: {e}")))?;

    let contents = data
        .get_mut("value")
        .and_then(|value| value.get_mut("contents"))
        .map(Value::take)
        .ok_or_else(|| AppError::protocol("Unexpected API response structure"))?;

    serde_json::from_value(contents)
        .map_err(|e| AppError::protocol(format!("Unexpected listing shape: {e}")))
}
