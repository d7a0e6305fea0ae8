use std::time::Duration;

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use crate::error::CollectError;

const USER_AGENT: &str = concat!("session_docs/", env!("CARGO_PKG_VERSION"));
const TIMEOUT: Duration = Duration::from_secs(60);

/// Fetch the documents listing page. Any transport error or non-success
/// status is a `Fetch` failure; there is no retry.
pub async fn fetch_listing(url: &str) -> Result<String> {
    let client = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(TIMEOUT)
        .build()?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    spinner.set_message(format!("Fetching {}", url));
    spinner.enable_steady_tick(Duration::from_millis(120));

    let result = get_text(&client, url).await;
    spinner.finish_and_clear();

    let body = result.map_err(|reason| CollectError::Fetch {
        url: url.to_string(),
        reason,
    })?;
    info!("Fetched listing page: {} bytes", body.len());
    Ok(body)
}

async fn get_text(client: &reqwest::Client, url: &str) -> std::result::Result<String, String> {
    let response = client.get(url).send().await.map_err(|e| e.to_string())?;
    let status = response.status();
    if !status.is_success() {
        return Err(format!("HTTP {}", status));
    }
    response.text().await.map_err(|e| e.to_string())
}
