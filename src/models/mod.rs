use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

pub mod epg;

pub use epg::{EpgChannel, EpgData, EpgProgram};

/// Catchup days assumed when a provider signals catchup without a window
pub const DEFAULT_CATCHUP_DAYS: u32 = 7;

/// One playlist entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Channel {
    /// Derived from `(name, url)`; the only identity key across refreshes
    pub id: Uuid,
    pub name: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tvg_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tvg_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tvg_chno: Option<i64>,
    pub order: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catchup: Option<CatchupInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_vod: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vod_type: Option<VodType>,
    /// Only present when `vod_type` is [`VodType::Episode`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series_info: Option<SeriesInfo>,
    /// User state, never set by the parser
    #[serde(default)]
    pub is_favorite: bool,
    #[serde(default)]
    pub is_hidden: bool,
}

impl Channel {
    pub fn has_catchup(&self) -> bool {
        self.catchup.as_ref().is_some_and(|c| c.days > 0)
    }
}

/// Timeshift capability of a channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatchupInfo {
    #[serde(rename = "type")]
    pub kind: CatchupType,
    /// Width of the rolling availability window
    pub days: u32,
    /// URL template with `{utc}`-style placeholders
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// Provider catchup conventions.
///
/// `Other` carries a value no resolver understands; such channels still
/// parse, but resolve to no URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CatchupType {
    Default,
    Append,
    Shift,
    Flussonic,
    Fs,
    Xc,
    Vod,
    Other(String),
}

impl CatchupType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Default => "default",
            Self::Append => "append",
            Self::Shift => "shift",
            Self::Flussonic => "flussonic",
            Self::Fs => "fs",
            Self::Xc => "xc",
            Self::Vod => "vod",
            Self::Other(value) => value,
        }
    }
}

impl From<&str> for CatchupType {
    fn from(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "default" => Self::Default,
            "append" => Self::Append,
            "shift" => Self::Shift,
            "flussonic" => Self::Flussonic,
            "fs" => Self::Fs,
            "xc" => Self::Xc,
            "vod" => Self::Vod,
            _ => Self::Other(value.to_string()),
        }
    }
}

impl From<String> for CatchupType {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<CatchupType> for String {
    fn from(value: CatchupType) -> Self {
        match value {
            CatchupType::Other(value) => value,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for CatchupType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VodType {
    Movie,
    Series,
    Episode,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesInfo {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub episode: Option<u32>,
}

/// Outcome of one playlist parse
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseResult {
    pub channels: Vec<Channel>,
    /// Always `channels.len()`
    pub total_parsed: usize,
    /// `"Error parsing line <n>: ..."`, 1-based
    pub errors: Vec<String>,
    pub catchup_channels: usize,
}

/// Summary of merging a refreshed playlist into a stored one
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshResult {
    pub added: usize,
    pub removed: usize,
    pub total: usize,
    pub errors: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catchup_type_parsing() {
        assert_eq!(CatchupType::from("default"), CatchupType::Default);
        assert_eq!(CatchupType::from(" XC "), CatchupType::Xc);
        assert_eq!(CatchupType::from("Flussonic"), CatchupType::Flussonic);
        assert_eq!(
            CatchupType::from("timeshift-v2"),
            CatchupType::Other("timeshift-v2".to_string())
        );
    }

    #[test]
    fn test_catchup_info_serializes_with_provider_strings() {
        let info = CatchupInfo {
            kind: CatchupType::Shift,
            days: 3,
            source: None,
        };
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json, serde_json::json!({"type": "shift", "days": 3}));

        let back: CatchupInfo =
            serde_json::from_str(r#"{"type":"mystery","days":2,"source":"http://x/{utc}"}"#)
                .unwrap();
        assert_eq!(back.kind, CatchupType::Other("mystery".to_string()));
        assert_eq!(back.source.as_deref(), Some("http://x/{utc}"));
    }

    #[test]
    fn test_channel_json_uses_camel_case() {
        let channel = Channel {
            id: Uuid::nil(),
            name: "News".to_string(),
            url: "http://example.com/news.m3u8".to_string(),
            logo: None,
            group: Some("UK".to_string()),
            tvg_id: Some("news.uk".to_string()),
            tvg_name: None,
            tvg_chno: Some(101),
            order: 0,
            catchup: None,
            is_vod: None,
            vod_type: None,
            series_info: None,
            is_favorite: false,
            is_hidden: false,
        };
        let json = serde_json::to_value(&channel).unwrap();
        assert_eq!(json["tvgId"], "news.uk");
        assert_eq!(json["tvgChno"], 101);
        assert_eq!(json["isFavorite"], false);
        assert!(json.get("catchup").is_none());
    }

    #[test]
    fn test_has_catchup_requires_positive_window() {
        let mut channel: Channel = serde_json::from_value(serde_json::json!({
            "id": Uuid::nil(),
            "name": "Archive",
            "url": "http://example.com/a.m3u8",
            "order": 0,
            "catchup": {"type": "default", "days": 0}
        }))
        .unwrap();
        assert!(!channel.has_catchup());

        channel.catchup = Some(CatchupInfo {
            kind: CatchupType::Default,
            days: 1,
            source: None,
        });
        assert!(channel.has_catchup());
    }
}
