use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

use super::traits::TextFetcher;
use crate::config::FetchConfig;
use crate::errors::{AppError, AppResult};
use crate::utils::url::UrlUtils;

/// [`TextFetcher`] over HTTP(S)
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Build a fetcher sending `user_agent` and giving up after `timeout`
    pub fn new(user_agent: &str, timeout: Duration) -> AppResult<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }

    pub fn from_config(config: &FetchConfig) -> AppResult<Self> {
        Self::new(&config.user_agent, config.timeout()?)
    }
}

#[async_trait]
impl TextFetcher for HttpFetcher {
    async fn fetch_text(&self, url: &str) -> AppResult<String> {
        if !UrlUtils::is_http(url) {
            return Err(AppError::validation(format!(
                "Only http and https URLs can be fetched: {}",
                UrlUtils::obfuscate_credentials(url)
            )));
        }

        let display_url = UrlUtils::obfuscate_credentials(url);
        debug!("Fetching {}", display_url);

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!("Upstream returned {} for {}", status, display_url);
            return Err(AppError::UpstreamStatus {
                status: status.as_u16(),
                url: display_url,
            });
        }

        let body = response.text().await?;
        if body.trim().is_empty() {
            warn!("Empty response body from {}", display_url);
            return Err(AppError::EmptyResponse { url: display_url });
        }

        debug!("Fetched {} bytes from {}", body.len(), display_url);
        Ok(body)
    }
}
