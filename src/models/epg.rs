use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A programme from an XMLTV guide
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpgProgram {
    /// `<channel>_<raw start attribute>`
    pub id: String,
    pub channel_id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl EpgProgram {
    /// Minimal programme for a bare time window
    pub fn window(title: impl Into<String>, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        let title = title.into();
        Self {
            id: format!("adhoc_{}", start.timestamp()),
            channel_id: String::new(),
            title,
            description: None,
            start,
            end,
            category: None,
            rating: None,
            image: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpgChannel {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// Sorted by start
    pub programs: Vec<EpgProgram>,
}

/// Guide channels keyed by XMLTV channel id
pub type EpgData = BTreeMap<String, EpgChannel>;
