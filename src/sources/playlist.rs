use tracing::info;

use super::traits::TextFetcher;
use crate::errors::AppResult;
use crate::models::ParseResult;
use crate::parser::{ParserOptions, parse_playlist_with};
use crate::utils::url::UrlUtils;

/// Fetch a playlist and parse it.
///
/// Transport failures are errors; per-line problems end up in
/// [`ParseResult::errors`] like they do for local input.
pub async fn fetch_and_parse(
    fetcher: &dyn TextFetcher,
    url: &str,
    options: &ParserOptions,
) -> AppResult<ParseResult> {
    let content = fetcher.fetch_text(url).await?;
    let result = parse_playlist_with(&content, options);

    info!(
        "Loaded playlist {}: {} channels, {} with catchup, {} errors",
        UrlUtils::obfuscate_credentials(url),
        result.total_parsed,
        result.catchup_channels,
        result.errors.len()
    );

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AppError;
    use async_trait::async_trait;
    use std::collections::HashMap;

    struct StaticFetcher(HashMap<&'static str, &'static str>);

    #[async_trait]
    impl TextFetcher for StaticFetcher {
        async fn fetch_text(&self, url: &str) -> AppResult<String> {
            match self.0.get(url) {
                Some(body) if !body.trim().is_empty() => Ok(body.to_string()),
                Some(_) => Err(AppError::EmptyResponse { url: url.to_string() }),
                None => Err(AppError::UpstreamStatus {
                    status: 404,
                    url: url.to_string(),
                }),
            }
        }
    }

    #[tokio::test]
    async fn test_fetch_and_parse() {
        let fetcher = StaticFetcher(HashMap::from([
            (
                "http://host/list.m3u",
                "#EXTM3U\n#EXTINF:-1 catchup=\"default\",One\nhttp://host/1.ts\n",
            ),
            ("http://host/empty.m3u", "  \n"),
        ]));
        let options = ParserOptions::default();

        let result = fetch_and_parse(&fetcher, "http://host/list.m3u", &options)
            .await
            .unwrap();
        assert_eq!(result.total_parsed, 1);
        assert_eq!(result.catchup_channels, 1);

        let err = fetch_and_parse(&fetcher, "http://host/empty.m3u", &options)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::EmptyResponse { .. }));

        let err = fetch_and_parse(&fetcher, "http://host/missing.m3u", &options)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::UpstreamStatus { status: 404, .. }));
    }
}
