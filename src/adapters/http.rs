//! Shared blocking HTTP plumbing for the web price sources.

use std::time::Duration;

use reqwest::blocking::Client;

use crate::domain::error::StatplotsError;

const USER_AGENT: &str = concat!("statplots/", env!("CARGO_PKG_VERSION"));

pub fn build_client(timeout_secs: u64) -> Result<Client, StatplotsError> {
    let client = Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .user_agent(USER_AGENT)
        .build()?;
    Ok(client)
}

/// GETs `url` and returns the body, mapping non-2xx statuses to a source error.
pub fn get_text(
    client: &Client,
    url: &str,
    source_name: &str,
    ticker: &str,
) -> Result<String, StatplotsError> {
    tracing::debug!(source = source_name, url, "GET");
    let response = client.get(url).send()?;
    let status = response.status();
    if !status.is_success() {
        let body = response.text().unwrap_or_default();
        return Err(StatplotsError::Source {
            source_name: source_name.to_string(),
            ticker: ticker.to_string(),
            reason: format!("HTTP {}: {}", status, body.trim()),
        });
    }
    Ok(response.text()?)
}

pub fn trim_base(base_url: &str) -> String {
    base_url.trim_end_matches('/').to_string()
}
