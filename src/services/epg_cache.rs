use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock, RwLockReadGuard};
use tracing::{debug, error, info};

use crate::epg::{EpgGuide, parse_xmltv};
use crate::errors::AppResult;
use crate::sources::TextFetcher;
use crate::utils::clock::Clock;
use crate::utils::time::LocalZone;
use crate::utils::url::UrlUtils;

#[derive(Debug, Default)]
struct LoadState {
    last_update: Option<DateTime<Utc>>,
    has_real_data: bool,
}

/// Keeps an [`EpgGuide`] loaded from an XMLTV URL and reloads it once the
/// TTL has passed.
///
/// Only one load runs at a time; callers arriving during a load wait for
/// it and then see the fresh guide instead of fetching again. A failed
/// load is logged and keeps whatever guide was loaded before.
pub struct EpgCache {
    fetcher: Arc<dyn TextFetcher>,
    url: Option<String>,
    ttl: Duration,
    zone: LocalZone,
    clock: Arc<dyn Clock>,
    state: Mutex<LoadState>,
    guide: RwLock<EpgGuide>,
}

impl EpgCache {
    pub fn new(
        fetcher: Arc<dyn TextFetcher>,
        url: Option<String>,
        ttl: Duration,
        clock: Arc<dyn Clock>,
        zone: LocalZone,
    ) -> Self {
        Self {
            fetcher,
            url,
            ttl,
            zone,
            guide: RwLock::new(EpgGuide::new(clock.clone(), zone)),
            clock,
            state: Mutex::new(LoadState::default()),
        }
    }

    /// Whether an XMLTV URL is configured
    pub fn has_source(&self) -> bool {
        self.url.is_some()
    }

    /// Whether the current guide came from a successful download
    pub async fn has_real_data(&self) -> bool {
        self.state.lock().await.has_real_data
    }

    pub async fn last_update(&self) -> Option<DateTime<Utc>> {
        self.state.lock().await.last_update
    }

    /// Read access to the guide
    pub async fn guide(&self) -> RwLockReadGuard<'_, EpgGuide> {
        self.guide.read().await
    }

    pub async fn is_cache_valid(&self) -> bool {
        let state = self.state.lock().await;
        self.is_fresh(&state).await
    }

    async fn is_fresh(&self, state: &LoadState) -> bool {
        let Some(last_update) = state.last_update else {
            return false;
        };
        if self.guide.read().await.is_empty() {
            return false;
        }
        // A clock that moved backwards keeps the cache
        self.clock
            .now()
            .signed_duration_since(last_update)
            .to_std()
            .map_or(true, |age| age < self.ttl)
    }

    /// Make sure a fresh guide is loaded.
    ///
    /// Never fails: download and parse errors are logged and the previous
    /// guide stays in place, so an unreachable source degrades the player
    /// instead of breaking it.
    pub async fn load(&self) {
        let mut state = self.state.lock().await;
        if self.is_fresh(&state).await {
            debug!("Using cached EPG data");
            return;
        }

        let Some(url) = self.url.as_deref() else {
            debug!("No XMLTV source configured");
            state.has_real_data = false;
            state.last_update = Some(self.clock.now());
            return;
        };

        let display_url = UrlUtils::obfuscate_credentials(url);
        info!("Loading EPG from XMLTV source: {}", display_url);

        match self.fetch_guide(url).await {
            Ok(data) => {
                let channels = data.len();
                self.guide.write().await.load(data);
                state.has_real_data = true;
                info!("Loaded {} EPG channels from {}", channels, display_url);
            }
            Err(e) => {
                error!("Failed to load XMLTV from {}: {}", display_url, e);
                state.has_real_data = false;
            }
        }
        state.last_update = Some(self.clock.now());
    }

    /// Replace the guide with an XMLTV document supplied directly.
    ///
    /// Unlike [`load`](Self::load) a parse failure is returned to the caller.
    pub async fn load_from_xml(&self, xml: &str) -> AppResult<()> {
        let mut state = self.state.lock().await;
        let data = parse_xmltv(xml, &self.zone)?;
        info!("Loaded {} EPG channels from XML", data.len());
        self.guide.write().await.load(data);
        state.last_update = Some(self.clock.now());
        Ok(())
    }

    async fn fetch_guide(&self, url: &str) -> AppResult<crate::models::EpgData> {
        let xml = self.fetcher.fetch_text(url).await?;
        parse_xmltv(&xml, &self.zone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AppError;
    use crate::utils::clock::FixedClock;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex as StdMutex;

    const GUIDE: &str = r#"<tv>
  <channel id="one"><display-name>Channel One</display-name></channel>
  <programme channel="one" start="20240510120000 +0000" stop="20240510130000 +0000"><title>News</title></programme>
</tv>"#;

    struct CountingFetcher {
        body: StdMutex<Option<&'static str>>,
        calls: AtomicUsize,
    }

    impl CountingFetcher {
        fn new(body: Option<&'static str>) -> Arc<Self> {
            Arc::new(Self {
                body: StdMutex::new(body),
                calls: AtomicUsize::new(0),
            })
        }

        fn set_body(&self, body: Option<&'static str>) {
            *self.body.lock().unwrap() = body;
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TextFetcher for CountingFetcher {
        async fn fetch_text(&self, url: &str) -> AppResult<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::task::yield_now().await;
            let body = *self.body.lock().unwrap();
            body.map(str::to_string).ok_or_else(|| AppError::UpstreamStatus {
                status: 500,
                url: url.to_string(),
            })
        }
    }

    fn cache(fetcher: Arc<CountingFetcher>, url: Option<&str>) -> (EpgCache, FixedClock) {
        let clock = FixedClock::new(Utc.with_ymd_and_hms(2024, 5, 10, 12, 30, 0).unwrap());
        let cache = EpgCache::new(
            fetcher,
            url.map(str::to_string),
            Duration::from_secs(3600),
            Arc::new(clock.clone()),
            LocalZone::Named(chrono_tz::UTC),
        );
        (cache, clock)
    }

    #[tokio::test]
    async fn test_load_and_ttl() {
        let fetcher = CountingFetcher::new(Some(GUIDE));
        let (cache, clock) = cache(fetcher.clone(), Some("http://host/guide.xml"));

        cache.load().await;
        assert!(cache.has_real_data().await);
        assert_eq!(cache.guide().await.current_program("channel one").0.unwrap().title, "News");

        clock.advance(chrono::Duration::minutes(59));
        cache.load().await;
        assert_eq!(fetcher.calls(), 1);

        clock.advance(chrono::Duration::minutes(2));
        assert!(!cache.is_cache_valid().await);
        cache.load().await;
        assert_eq!(fetcher.calls(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_loads_fetch_once() {
        let fetcher = CountingFetcher::new(Some(GUIDE));
        let (cache, _) = cache(fetcher.clone(), Some("http://host/guide.xml"));

        tokio::join!(cache.load(), cache.load(), cache.load());
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn test_failed_reload_keeps_previous_guide() {
        let fetcher = CountingFetcher::new(Some(GUIDE));
        let (cache, clock) = cache(fetcher.clone(), Some("http://host/guide.xml"));

        cache.load().await;
        assert!(cache.has_real_data().await);

        fetcher.set_body(None);
        clock.advance(chrono::Duration::minutes(61));
        cache.load().await;

        assert_eq!(fetcher.calls(), 2);
        assert!(!cache.has_real_data().await);
        assert_eq!(cache.last_update().await, Some(clock.now()));
        let guide = cache.guide().await;
        assert_eq!(guide.channel_count(), 1);
        let day = chrono::NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();
        let titles: Vec<_> = guide
            .programs_for_date("channel one", day)
            .iter()
            .map(|p| p.title.as_str())
            .collect();
        assert_eq!(titles, vec!["News"]);
    }

    #[tokio::test]
    async fn test_failure_without_previous_guide() {
        let fetcher = CountingFetcher::new(None);
        let (cache, clock) = cache(fetcher.clone(), Some("http://host/guide.xml"));

        cache.load().await;
        assert!(!cache.has_real_data().await);
        assert!(cache.guide().await.is_empty());
        assert_eq!(cache.last_update().await, Some(clock.now()));

        // An empty guide is never fresh
        cache.load().await;
        assert_eq!(fetcher.calls(), 2);
    }

    #[tokio::test]
    async fn test_without_source() {
        let fetcher = CountingFetcher::new(Some(GUIDE));
        let (cache, _) = cache(fetcher.clone(), None);

        assert!(!cache.has_source());
        cache.load().await;
        assert_eq!(fetcher.calls(), 0);
        assert!(cache.last_update().await.is_some());
    }

    #[tokio::test]
    async fn test_load_from_xml() {
        let (cache, _) = cache(CountingFetcher::new(None), None);
        cache.load_from_xml(GUIDE).await.unwrap();
        assert_eq!(cache.guide().await.channel_count(), 1);

        let err = cache.load_from_xml("<tv><oops></tv>").await.unwrap_err();
        assert!(matches!(err, AppError::Xmltv { .. }));
        assert_eq!(cache.guide().await.channel_count(), 1);
    }
}
