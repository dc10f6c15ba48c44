// src/utils/http.rs

//! HTTP client utilities.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use url::Url;

use crate::error::{AppError, Result};

/// Create a configured asynchronous HTTP client.
pub fn create_client(
    user_agent: &str,
    timeout_secs: u64,
    headers: &[(&'static str, &'static str)],
) -> Result<reqwest::Client> {
    let mut default_headers = HeaderMap::with_capacity(headers.len());
    for &(name, value) in headers {
        default_headers.insert(
            HeaderName::from_static(name),
            HeaderValue::from_static(value),
        );
    }

    let client = reqwest::Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(timeout_secs))
        .default_headers(default_headers)
        .build()?;
    Ok(client)
}

/// Append query parameters to a base URL.
pub fn build_url<I, K, V>(base: &str, params: I) -> Result<Url>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let url = Url::parse_with_params(base, params)?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(AppError::config(format!("Unsupported URL scheme: {url}")));
    }
    Ok(url)
}

/// Shorten a response body for error messages.
pub fn snippet(body: &str, max_chars: usize) -> String {
    match body.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
