//! EXTINF metadata extraction
//!
//! Providers disagree on how to express catchup support, so four attribute
//! conventions are consulted:
//!
//! - `catchup="default" catchup-days="7" catchup-source="..."`
//! - `catchup-type="..."` / `timeshift="3"`
//! - `tvg-rec="3"` and `catchup-length="72"` (hours) or `"3d"` (days)
//! - `archive="1" archive-days="7"`
//!
//! Attribute matching is permissive on purpose: quoting mistakes and
//! unknown keys are ignored rather than rejected, because real-world
//! playlists are full of them.

use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

use crate::errors::{AppError, AppResult};
use crate::models::{CatchupInfo, CatchupType};

pub const EXTINF_TAG: &str = "#EXTINF";

/// `key="value` preceded by start, whitespace, `:`, `,` or the closing
/// quote of a previous value, so that `catchup=` never matches inside
/// `tvg-catchup=`. The closing quote is left out of the match so it can
/// serve as the next key's boundary.
static ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:^|[\s:,"])([A-Za-z0-9_-]+)="([^"]*)"#).expect("valid attribute regex")
});

/// Day-count attributes in precedence order; `catchup-length` is handled last
const DAY_ATTRIBUTES: &[&str] = &["catchup-days", "timeshift", "tvg-rec", "archive-days"];

/// Everything one EXTINF line contributes to a channel
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtinfEntry {
    /// Display name; `None` means the entry cannot become a channel
    pub name: Option<String>,
    pub tvg_id: Option<String>,
    pub tvg_name: Option<String>,
    pub logo: Option<String>,
    pub group: Option<String>,
    pub tvg_chno: Option<i64>,
    pub catchup: Option<CatchupInfo>,
    /// All quoted attributes, first occurrence of each key
    pub attributes: HashMap<String, String>,
}

/// Parse one `#EXTINF` line.
///
/// Fails only when the line is not an EXTINF line at all, or when the tag
/// runs straight into other text (`#EXTINF-1,Name`, `#EXTINFO:`). Both
/// `:` and whitespace are accepted as the separator.
pub fn parse_extinf(line: &str, default_catchup_days: u32) -> AppResult<ExtinfEntry> {
    let body = line
        .strip_prefix(EXTINF_TAG)
        .ok_or_else(|| AppError::parse("line does not start with #EXTINF"))?;
    if !body.starts_with(|c: char| c == ':' || c.is_whitespace()) {
        return Err(AppError::parse(format!(
            "expected ':' or whitespace after #EXTINF, found {:?}",
            body.chars().next().map(String::from).unwrap_or_default()
        )));
    }

    let attributes = parse_attributes(line);

    let tvg_name = attributes.get("tvg-name").cloned();
    let name = line
        .rfind(',')
        .map(|pos| line[pos + 1..].trim())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .or_else(|| tvg_name.clone().filter(|n| !n.is_empty()));

    let tvg_chno = non_empty(&attributes, "tvg-chno")
        .or_else(|| non_empty(&attributes, "channel-number"))
        .and_then(parse_int_prefix);

    Ok(ExtinfEntry {
        name,
        tvg_id: attributes.get("tvg-id").cloned(),
        tvg_name,
        logo: attributes.get("tvg-logo").cloned(),
        group: attributes.get("group-title").cloned(),
        tvg_chno,
        catchup: detect_catchup(&attributes, default_catchup_days),
        attributes,
    })
}

/// Collect quoted attributes; the first occurrence of a key wins
pub fn parse_attributes(line: &str) -> HashMap<String, String> {
    let mut attributes = HashMap::new();
    for caps in ATTRIBUTE.captures_iter(line) {
        let closed = caps
            .get(0)
            .is_some_and(|m| line[m.end()..].starts_with('"'));
        if !closed {
            continue;
        }
        attributes
            .entry(caps[1].to_ascii_lowercase())
            .or_insert_with(|| caps[2].to_string());
    }
    attributes
}

fn non_empty<'a>(attributes: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    attributes
        .get(key)
        .map(String::as_str)
        .filter(|v| !v.is_empty())
}

/// Build the catchup descriptor, if the line signals any catchup support
fn detect_catchup(
    attributes: &HashMap<String, String>,
    default_days: u32,
) -> Option<CatchupInfo> {
    let kind = non_empty(attributes, "catchup")
        .or_else(|| non_empty(attributes, "catchup-type"))
        .map(CatchupType::from)
        .or_else(|| (non_empty(attributes, "archive") == Some("1")).then_some(CatchupType::Default));

    let days = catchup_days(attributes).filter(|d| *d > 0);

    if kind.is_none() && days.is_none() {
        return None;
    }

    Some(CatchupInfo {
        kind: kind.unwrap_or(CatchupType::Default),
        days: days.unwrap_or(default_days),
        source: attributes.get("catchup-source").cloned(),
    })
}

/// The day count from the first non-empty day attribute.
///
/// Only the first present attribute is consulted: a present but
/// unparseable value yields `None` instead of falling through.
fn catchup_days(attributes: &HashMap<String, String>) -> Option<u32> {
    if let Some(value) = DAY_ATTRIBUTES
        .iter()
        .find_map(|key| non_empty(attributes, key))
    {
        return parse_int_prefix(value).and_then(|d| u32::try_from(d).ok());
    }

    let length = non_empty(attributes, "catchup-length")?;
    if length.ends_with('d') {
        return parse_int_prefix(length).and_then(|d| u32::try_from(d).ok());
    }

    // Anything else is hours
    let hours = u32::try_from(parse_int_prefix(length)?).ok()?;
    Some(hours.div_ceil(24))
}

/// Leading integer of a string, tolerating surrounding junk: `"72h"` is 72,
/// `" 12 "` is 12, `"abc"` is `None`.
pub fn parse_int_prefix(value: &str) -> Option<i64> {
    let trimmed = value.trim_start();
    let (sign, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (-1, &trimmed[1..]),
        Some(b'+') => (1, &trimmed[1..]),
        _ => (1, trimmed),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse::<i64>().ok().map(|n| sign * n)
}
