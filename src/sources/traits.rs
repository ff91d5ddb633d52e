use async_trait::async_trait;

use crate::errors::AppResult;

/// Retrieves the text body behind a URL
#[async_trait]
pub trait TextFetcher: Send + Sync {
    /// Fetch `url` and return its body.
    ///
    /// Implementations reject non-success responses and empty bodies with
    /// an error rather than handing back an empty string.
    async fn fetch_text(&self, url: &str) -> AppResult<String>;
}
