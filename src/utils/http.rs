// src/utils/http.rs

//! HTTP client utilities.

use std::time::Duration;

use reqwest::Response;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};

use crate::error::{AppError, Result};
use crate::models::HttpConfig;

/// Create a configured asynchronous HTTP client.
pub fn create_async_client(config: &HttpConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;
    Ok(client)
}

/// Turn a non-success status into an error.
pub fn check_status(url: &str, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(AppError::Http {
            url: url.to_string(),
            status: status.as_u16(),
        })
    }
}

/// Fetch a page body as text.
pub async fn fetch_text(client: &reqwest::Client, url: &str) -> Result<String> {
    let response = check_status(url, client.get(url).send().await?)?;
    Ok(response.text().await?)
}

/// Declared media type and size of a response.
pub fn content_info(response: &Response) -> (Option<String>, Option<u64>) {
    let headers = response.headers();
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string());
    let content_length = headers
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse::<u64>().ok());
    (content_type, content_length)
}

/// Issue a HEAD request and report the declared media type and size.
pub async fn probe(client: &reqwest::Client, url: &str) -> Result<(Option<String>, Option<u64>)> {
    let response = check_status(url, client.head(url).send().await?)?;
    Ok(content_info(&response))
}
