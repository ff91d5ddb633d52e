//! VOD classification
//!
//! Tags playlist entries as movies, series or episodes from their name,
//! group and URL. Purely heuristic: no lookups, never fails.

use regex::Regex;
use std::sync::LazyLock;

use crate::models::{SeriesInfo, VodType};

static VOD_GROUP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)movies?|films?|vod|series|shows?|tv\s*series|episodes?|seasons?")
        .expect("valid VOD group regex")
});

static VOD_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)/movie/|/series/|/vod/|\.mp4$|\.mkv$|\.avi$").expect("valid VOD URL regex")
});

/// `Title S01E05`, `Title s1 e105`
static SEASON_EPISODE_SHORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(.+?)\s*[Ss](\d{1,2})\s*[Ee](\d{1,3})").expect("valid SxxEyy regex")
});

/// `Title Season 2 Episode 10`
static SEASON_EPISODE_LONG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(.+?)\s*Season\s*(\d+)\s*Episode\s*(\d+)").expect("valid season regex")
});

/// `Title (1999)`
static RELEASE_YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r".+?\s*\(\d{4}\)").expect("valid year regex"));

/// VOD fields merged into a channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VodClassification {
    pub vod_type: Option<VodType>,
    pub series_info: Option<SeriesInfo>,
}

impl VodClassification {
    fn episode(caps: &regex::Captures<'_>) -> Self {
        Self {
            vod_type: Some(VodType::Episode),
            series_info: Some(SeriesInfo {
                name: caps[1].trim().to_string(),
                season: caps[2].parse().ok(),
                episode: caps[3].parse().ok(),
            }),
        }
    }

    fn of(vod_type: Option<VodType>) -> Self {
        Self {
            vod_type,
            series_info: None,
        }
    }
}

/// Classify an entry; `None` means a plain live channel
pub fn classify_vod(name: &str, group: Option<&str>, url: &str) -> Option<VodClassification> {
    let group = group.unwrap_or_default().to_lowercase();

    if !VOD_GROUP.is_match(&group) && !VOD_URL.is_match(url) {
        return None;
    }

    if let Some(caps) = SEASON_EPISODE_SHORT.captures(name) {
        return Some(VodClassification::episode(&caps));
    }
    if let Some(caps) = SEASON_EPISODE_LONG.captures(name) {
        return Some(VodClassification::episode(&caps));
    }

    if RELEASE_YEAR.is_match(name) || group.contains("movie") || group.contains("film") {
        return Some(VodClassification::of(Some(VodType::Movie)));
    }

    if group.contains("series") || group.contains("show") {
        return Some(VodClassification::of(Some(VodType::Series)));
    }

    Some(VodClassification::of(None))
}
